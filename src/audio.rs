/*
 * @file audio.rs
 * @brief Bark sound loading and playback
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Bark sound playback.
//!
//! This module decodes the bark recording with hound and plays it on the
//! default output device through CPAL. When that fails for any reason the
//! bark is spoken instead.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, StreamConfig, StreamError};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::media::PlayResult;
use crate::speech::{speak_utterance, Utterance};
use crate::stage::BARK_TEXT;

/// Extra time the output stream is kept alive after the last sample.
///
/// Lets the device drain its buffer so the tail of the bark is not cut.
const DRAIN_MARGIN: Duration = Duration::from_millis(50);

/// A decoded recording, interleaved and scaled to `-1.0..=1.0`.
#[derive(Clone, Debug, PartialEq)]
pub struct Clip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Clip {
    /// Playback length of the clip.
    pub fn duration(&self) -> Duration {
        let frames = self.samples.len() as u64 / u64::from(self.channels.max(1));
        Duration::from_micros(frames * 1_000_000 / u64::from(self.sample_rate.max(1)))
    }
}

/// Something that can make the poodle bark.
///
/// Implementations handle their own fallbacks; the result reports whether
/// anything was heard at all.
pub trait SoundPlayer: Send + Sync {
    fn play_bark(&self) -> PlayResult;
}

/// Plays a WAV recording, falling back to synthesized speech.
#[derive(Clone, Debug)]
pub struct BarkSound {
    path: PathBuf,
    text: String,
}

impl BarkSound {
    /// Creates a bark source for the recording at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            text: BARK_TEXT.to_string(),
        }
    }

    /// Overrides what is spoken when the recording cannot play.
    pub fn with_fallback_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Plays only the recording, without any fallback.
    ///
    /// # Returns
    /// * `PlayResult::Ok` - The recording played to the end.
    /// * `PlayResult::Failed` - The file is missing, unreadable, or no
    ///   output device accepted it.
    pub fn play_recording(&self) -> PlayResult {
        match load_wav(&self.path).and_then(|clip| play_clip(&clip)) {
            Ok(()) => PlayResult::Ok,
            Err(err) => PlayResult::Failed(format!("{err:#}")),
        }
    }
}

impl SoundPlayer for BarkSound {
    fn play_bark(&self) -> PlayResult {
        let reason = match self.play_recording() {
            PlayResult::Ok => return PlayResult::Ok,
            PlayResult::Failed(reason) => reason,
        };
        tracing::info!(%reason, "bark recording missing or blocked, using speech");
        match speak_utterance(&Utterance::toy_poodle(self.text.as_str())) {
            Ok(()) => PlayResult::Ok,
            Err(err) => {
                tracing::warn!("speech fallback failed: {err:#}");
                PlayResult::Failed(format!("{reason}; {err:#}"))
            }
        }
    }
}

/// Decodes a WAV file into a [`Clip`].
///
/// # Parameters
/// * `path` - The recording to load.
///
/// # Errors
/// Returns an error if the file cannot be opened, is not a WAV file, or
/// holds no samples.
pub fn load_wav(path: &Path) -> Result<Clip> {
    let reader = WavReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let spec = reader.spec();
    let samples = read_samples(reader, spec)
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    if samples.is_empty() {
        anyhow::bail!("{} contains no audio", path.display());
    }
    Ok(Clip {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Reads every sample and scales integer formats to `-1.0..=1.0`.
fn read_samples<R: std::io::Read>(mut reader: WavReader<R>, spec: WavSpec) -> Result<Vec<f32>> {
    let samples = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|value| value as f32 / scale))
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(samples)
}

/// Saves 16-bit mono samples to a WAV file.
///
/// # Parameters
/// * `path` - Destination path for the generated WAV file.
/// * `sample_rate` - Sample rate in Hertz.
/// * `samples` - Signed 16-bit PCM frames to persist.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn save_wav(path: &Path, sample_rate: u32, samples: &[i16]) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Plays a clip on the default output device and blocks until it ends.
///
/// # Errors
/// Returns an error if there is no output device or it rejects the clip's
/// format.
pub fn play_clip(clip: &Clip) -> Result<()> {
    let device = default_output_device()?;
    let config = output_config(clip);
    let samples = clip.samples.clone();
    let mut position = 0;
    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &_| fill_buffer(&samples, &mut position, data),
            log_stream_error,
            None,
        )
        .map_err(|err| anyhow::anyhow!(err))?;
    stream.play()?;
    std::thread::sleep(clip.duration() + DRAIN_MARGIN);
    drop(stream);
    Ok(())
}

/// Locates the system default output device.
///
/// # Errors
/// Returns an error when no speaker is available.
fn default_output_device() -> Result<Device> {
    cpal::default_host()
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("No output device"))
}

/// Stream configuration matching the clip's own format.
fn output_config(clip: &Clip) -> StreamConfig {
    StreamConfig {
        channels: clip.channels,
        sample_rate: cpal::SampleRate(clip.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    }
}

/// Copies the next run of samples into the device buffer.
///
/// # Parameters
/// * `samples` - The whole clip.
/// * `position` - Index of the next unplayed sample; advanced in place.
/// * `out` - Device buffer; padded with silence once the clip is done.
fn fill_buffer(samples: &[f32], position: &mut usize, out: &mut [f32]) {
    let start = (*position).min(samples.len());
    let available = (samples.len() - start).min(out.len());
    out[..available].copy_from_slice(&samples[start..start + available]);
    out[available..].fill(0.0);
    *position = start + available;
}

/// Logs recoverable stream errors emitted by CPAL.
fn log_stream_error(error: StreamError) {
    tracing::warn!("audio stream error: {error}");
}
