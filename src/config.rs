/*
 * @file config.rs
 * @brief Runtime configuration loading
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

//! `config.json` loading with baked-in defaults and environment overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::listener::DEFAULT_LANGUAGE;
use crate::stage::{BarkStyle, BARK_CLASS_DURATION, BARK_TEXT, SPEECH_BUBBLE_DURATION};

/// Default path of the runtime configuration file.
pub const CONFIG_PATH: &str = "config.json";

/// Directory holding the poodle's videos and posters when nothing is configured.
const FALLBACK_ASSETS_DIR: &str = "assets";

/// Bark recording used when nothing is configured.
const FALLBACK_BARK_SOUND: &str = "assets/bark.wav";

/// Environment variable overriding `assets_dir`.
pub const ASSETS_DIR_ENV: &str = "POODLE_ASSETS_DIR";

/// Environment variable overriding `bark_sound`.
pub const BARK_SOUND_ENV: &str = "POODLE_BARK_SOUND";

/// Strongly typed representation of `config.json`.
///
/// # Details
/// Every field is optional in the file; absent fields take the defaults
/// the poodle ships with.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    #[serde(default = "fallback_assets_dir")]
    pub assets_dir: PathBuf,
    #[serde(default = "fallback_bark_sound")]
    pub bark_sound: PathBuf,
    #[serde(default = "fallback_language")]
    pub language: String,
    #[serde(default = "fallback_bark_class_ms")]
    pub bark_class_ms: u64,
    #[serde(default = "fallback_bubble_ms")]
    pub bubble_ms: u64,
    #[serde(default = "fallback_bubble_text")]
    pub bubble_text: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assets_dir: fallback_assets_dir(),
            bark_sound: fallback_bark_sound(),
            language: fallback_language(),
            bark_class_ms: fallback_bark_class_ms(),
            bubble_ms: fallback_bubble_ms(),
            bubble_text: fallback_bubble_text(),
        }
    }
}

impl AppConfig {
    /// Bark reaction timings and text for the stage.
    pub fn bark_style(&self) -> BarkStyle {
        BarkStyle {
            class_duration: Duration::from_millis(self.bark_class_ms),
            bubble_duration: Duration::from_millis(self.bubble_ms),
            bubble_text: self.bubble_text.clone(),
        }
    }

    /// Applies `POODLE_ASSETS_DIR` and `POODLE_BARK_SOUND` when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = env::var(ASSETS_DIR_ENV) {
            self.assets_dir = PathBuf::from(dir);
        }
        if let Ok(sound) = env::var(BARK_SOUND_ENV) {
            self.bark_sound = PathBuf::from(sound);
        }
        self
    }
}

/// Loads configuration from `path`, falling back to baked defaults.
///
/// # Details
/// A missing file is normal and logged at debug level; an unreadable or
/// invalid file is logged as a warning. Either way the poodle starts.
///
/// # Arguments
/// * `path` - Location of the JSON configuration file.
///
/// # Returns
/// * `AppConfig` - The loaded or default configuration, with environment
///   overrides applied.
pub fn load_app_config(path: &Path) -> AppConfig {
    let config = if path.exists() {
        read_app_config(path).unwrap_or_else(|err| {
            tracing::warn!("config load error: {err:#}");
            AppConfig::default()
        })
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        AppConfig::default()
    };
    config.with_env_overrides()
}

fn read_app_config(path: &Path) -> Result<AppConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn fallback_assets_dir() -> PathBuf {
    PathBuf::from(FALLBACK_ASSETS_DIR)
}

fn fallback_bark_sound() -> PathBuf {
    PathBuf::from(FALLBACK_BARK_SOUND)
}

fn fallback_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn fallback_bark_class_ms() -> u64 {
    BARK_CLASS_DURATION.as_millis() as u64
}

fn fallback_bubble_ms() -> u64 {
    SPEECH_BUBBLE_DURATION.as_millis() as u64
}

fn fallback_bubble_text() -> String {
    BARK_TEXT.to_string()
}
