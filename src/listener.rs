/*
 * @file listener.rs
 * @brief Speech recognition session lifecycle
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

//! Recognition session lifecycle as an explicit `{Stopped, Listening}` machine.

use crate::commands::prepare_phrase;
use crate::traits::MealyMachine;

/// Status text while a session is running.
pub const STATUS_LISTENING: &str = "Listening...";

/// Status text after the user stopped listening.
pub const STATUS_PAUSED: &str = "Paused";

/// Status text when no recogniser is available.
pub const STATUS_UNSUPPORTED: &str = "Speech recognition is not supported";

/// Default recognition language.
pub const DEFAULT_LANGUAGE: &str = "en-US";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListenerPhase {
    #[default]
    Stopped,
    Listening,
}

/// Something the recogniser or the microphone control reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListenerEvent {
    /// The user pressed the microphone control.
    MicPressed,
    /// The recogniser confirmed a session is running.
    SessionStarted,
    /// The session ended, for whatever reason.
    SessionEnded,
    /// A final transcript, as heard.
    Transcript(String),
    /// The recogniser reported an error.
    SessionError(String),
    /// No recogniser exists on this platform.
    Unsupported,
}

/// Work the runtime must do for the listener.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListenerCommand {
    StartSession { language: String },
    StopSession,
    SetMicIndicator(bool),
    /// Update the status line. `active: None` leaves the indicator as is.
    SetStatus { text: String, active: Option<bool> },
    /// Hand a prepared phrase to the command normalizer.
    Dispatch(String),
    HideMic,
}

/// Recognition session state.
///
/// # Details
/// `Listening` doubles as the auto-restart flag: while set, an unsolicited
/// session end restarts the session immediately. Only pressing the
/// microphone control clears it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Listener {
    phase: ListenerPhase,
    supported: bool,
    language: String,
}

impl Default for Listener {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl Listener {
    /// Creates a stopped listener for `language`.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            phase: ListenerPhase::Stopped,
            supported: true,
            language: language.into(),
        }
    }

    pub fn phase(&self) -> ListenerPhase {
        self.phase
    }

    pub fn is_listening(&self) -> bool {
        self.phase == ListenerPhase::Listening
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    fn start(&self) -> ListenerCommand {
        ListenerCommand::StartSession {
            language: self.language.clone(),
        }
    }

    fn status(text: impl Into<String>, active: Option<bool>) -> ListenerCommand {
        ListenerCommand::SetStatus {
            text: text.into(),
            active,
        }
    }
}

impl MealyMachine for Listener {
    type Event = ListenerEvent;
    type Command = ListenerCommand;

    fn transition(mut self, event: ListenerEvent) -> (Self, Vec<ListenerCommand>) {
        if !self.supported {
            return (self, Vec::new());
        }
        let commands = match event {
            ListenerEvent::MicPressed => match self.phase {
                ListenerPhase::Listening => {
                    self.phase = ListenerPhase::Stopped;
                    vec![
                        ListenerCommand::StopSession,
                        ListenerCommand::SetMicIndicator(false),
                    ]
                }
                ListenerPhase::Stopped => vec![self.start()],
            },
            ListenerEvent::SessionStarted => {
                self.phase = ListenerPhase::Listening;
                vec![
                    ListenerCommand::SetMicIndicator(true),
                    Self::status(STATUS_LISTENING, Some(true)),
                ]
            }
            ListenerEvent::SessionEnded => match self.phase {
                ListenerPhase::Listening => {
                    tracing::debug!("recognition session ended, restarting");
                    vec![self.start()]
                }
                ListenerPhase::Stopped => vec![Self::status(STATUS_PAUSED, Some(false))],
            },
            ListenerEvent::Transcript(raw) => {
                let phrase = prepare_phrase(&raw);
                match self.is_listening() && !phrase.is_empty() {
                    true => vec![ListenerCommand::Dispatch(phrase)],
                    false => Vec::new(),
                }
            }
            ListenerEvent::SessionError(reason) => {
                tracing::error!(%reason, "speech recognition error");
                vec![Self::status(format!("Error: {reason}"), None)]
            }
            ListenerEvent::Unsupported => {
                self.supported = false;
                self.phase = ListenerPhase::Stopped;
                vec![
                    ListenerCommand::HideMic,
                    Self::status(STATUS_UNSUPPORTED, Some(false)),
                ]
            }
        };
        (self, commands)
    }
}
