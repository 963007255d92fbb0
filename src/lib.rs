/*
 * @file lib.rs
 * @brief Poodle library root
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

//! Poodle - a toy poodle that obeys spoken and pressed commands.
//!
//! This library provides:
//! - a phrase normalizer that maps free text onto eight canonical actions
//! - a presentation state machine that turns actions into ordered page effects
//! - a recognition session machine with auto-restart
//! - media, bark sound and speech collaborators, and a terminal runtime
//!
//! # Example
//! ```
//! use poodle::commands::normalize;
//! use poodle::stage::{PresentationState, Stage};
//!
//! let mut stage = Stage::new();
//! if let Some(action) = normalize("please sit down now") {
//!     let (state, _effects) = stage.apply(action);
//!     assert_eq!(state, PresentationState::Sit);
//! }
//! ```

pub mod audio;
pub mod commands;
pub mod config;
pub mod listener;
pub mod media;
pub mod page;
pub mod runtime;
pub mod speech;
pub mod stage;
pub mod traits;
