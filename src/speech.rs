/*
 * @file speech.rs
 * @brief Text-to-speech helper built on the macOS `say` command
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

//! Synthesized speech used when the bark recording cannot play.

use std::sync::Mutex;

use anyhow::{Context, Result};

/// Speaking rate of `say` at a rate multiplier of 1.0, in words per minute.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// Baseline pitch of the default voice, in `pbas` units.
const BASE_PITCH: f32 = 46.0;

/// A line of speech and how to voice it.
///
/// # Details
/// `pitch`, `rate` and `volume` are multipliers where 1.0 is the voice's
/// normal delivery; `volume` is clamped to `0.0..=1.0`.
#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub pitch: f32,
    pub rate: f32,
    pub volume: f32,
}

impl Utterance {
    /// Plain delivery at the voice's defaults.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pitch: 1.0,
            rate: 1.0,
            volume: 1.0,
        }
    }

    /// The high, quick yip of a toy poodle.
    pub fn toy_poodle(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pitch: 1.8,
            rate: 1.3,
            volume: 0.8,
        }
    }

    /// Arguments passed to `say`.
    ///
    /// Pitch and volume travel as embedded speech commands in front of the
    /// text; rate uses `-r`.
    fn say_args(&self) -> Vec<String> {
        let words_per_minute = (BASE_WORDS_PER_MINUTE * self.rate).round() as u32;
        let pitch = (BASE_PITCH * self.pitch).round() as u32;
        let volume = self.volume.clamp(0.0, 1.0);
        vec![
            "-r".to_string(),
            words_per_minute.to_string(),
            format!("[[pbas {pitch}]] [[volm {volume:.2}]] {}", self.text.trim()),
        ]
    }
}

/// Speaks plain text at the voice's defaults.
///
/// # Errors
/// Returns an error if the text is blank or `say` cannot be run.
pub fn speak(text: &str) -> Result<()> {
    speak_utterance(&Utterance::new(text))
}

/// Speaks an utterance and waits for it to finish.
///
/// # Arguments
/// * `utterance` - Text and delivery settings.
///
/// # Errors
/// Returns an error if the text is blank or `say` cannot be run or exits
/// unsuccessfully.
pub fn speak_utterance(utterance: &Utterance) -> Result<()> {
    if utterance.text.trim().is_empty() {
        anyhow::bail!("Cannot speak empty text");
    }

    if cfg!(test) {
        if *FORCE_ERROR.lock().unwrap_or_else(|e| e.into_inner()) {
            anyhow::bail!("Forced failure for testing");
        }
        return Ok(());
    }

    let status = std::process::Command::new("say")
        .args(utterance.say_args())
        .status()
        .context("Failed to run say")?;
    if !status.success() {
        anyhow::bail!("say exited with {status}");
    }
    Ok(())
}

#[cfg_attr(not(test), allow(dead_code))]
pub(crate) static FORCE_ERROR: Mutex<bool> = Mutex::new(false);

/// Serializes tests that speak, since they share [`FORCE_ERROR`].
#[cfg(test)]
pub(crate) static SPEECH_TEST_LOCK: Mutex<()> = Mutex::new(());
