/*
 * @file runtime.rs
 * @brief Event loop wiring the poodle's inputs, core and collaborators
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

//! Poodle runtime orchestration module.

use std::collections::VecDeque;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::audio::{BarkSound, SoundPlayer};
use crate::commands::{self, Action, CommandsConfig};
use crate::config::{self, AppConfig};
use crate::listener::{Listener, ListenerCommand, ListenerEvent};
use crate::media::{FileVideoPlayer, MediaSelector, PlayResult, VideoPlayer};
use crate::page::Page;
use crate::stage::{ContainerClass, EffectRequest, PresentationState, SoundKind, Stage};
use crate::traits::MealyMachine;

/// Prefix marking a terminal line as a control instruction rather than speech.
const CONTROL_PREFIX: char = ':';

/// One line typed at the terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// Speech as the recogniser heard it.
    Transcript(String),
    /// A control was pressed; carries its identifier.
    Press(String),
    /// The microphone control was pressed.
    Mic,
    /// The recognition session ended without being asked to.
    DropSession,
    Help,
    Quit,
}

/// Parses a terminal line.
///
/// # Details
/// Lines starting with `:` are instructions (`:mic`, `:press <id>`,
/// `:drop`, `:help`, `:quit`); anything else is a transcript. An unknown
/// instruction is treated as `:help`.
///
/// # Examples
/// ```
/// use poodle::runtime::{parse_input, Input};
///
/// assert_eq!(parse_input(":press go-back"), Input::Press("go-back".to_string()));
/// assert_eq!(parse_input("Sit!"), Input::Transcript("Sit!".to_string()));
/// ```
pub fn parse_input(line: &str) -> Input {
    let Some(instruction) = line.trim().strip_prefix(CONTROL_PREFIX) else {
        return Input::Transcript(line.to_string());
    };
    let mut parts = instruction.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("mic"), None) => Input::Mic,
        (Some("press"), Some(id)) => Input::Press(id.to_string()),
        (Some("drop"), None) => Input::DropSession,
        (Some("quit"), None) | (Some("exit"), None) => Input::Quit,
        _ => Input::Help,
    }
}

/// Everything the runtime reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeEvent {
    Input(Input),
    Recognition(ListenerEvent),
    /// A transient class's timer fired.
    Expired(ContainerClass),
    /// The speech bubble's timer fired.
    BubbleElapsed,
}

/// Whether the loop keeps going after an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Deferred and background work requested by the runtime.
///
/// # Details
/// Timers are fire-once and never cancelled; the event they carry is fed
/// back to [`PoodleRuntime::handle`] when they expire. Sounds play without
/// blocking the loop and their outcome is only logged.
pub trait Scheduler {
    fn schedule(&mut self, after: Duration, event: RuntimeEvent);
    fn play(&mut self, sound: Arc<dyn SoundPlayer>, kind: SoundKind);
}

/// [`Scheduler`] backed by tokio tasks feeding the runtime's channel.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
    events: mpsc::UnboundedSender<RuntimeEvent>,
}

impl TokioScheduler {
    pub fn new(events: mpsc::UnboundedSender<RuntimeEvent>) -> Self {
        Self { events }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, after: Duration, event: RuntimeEvent) {
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // The loop may already be gone; nothing left to update then.
            let _ = events.send(event);
        });
    }

    fn play(&mut self, sound: Arc<dyn SoundPlayer>, kind: SoundKind) {
        tokio::task::spawn_blocking(move || match sound.play_bark() {
            PlayResult::Ok => tracing::debug!(?kind, "sound played"),
            PlayResult::Failed(reason) => tracing::warn!(?kind, %reason, "sound unavailable"),
        });
    }
}

/// Runtime container that owns the poodle's state and collaborators.
///
/// # Details
/// Single-threaded: every event is handled to completion before the next
/// one, so no effect sequence is ever observed half-applied. Follow-up
/// events raised while handling one (session start, restart) are queued
/// and handled before `handle` returns.
pub struct PoodleRuntime<S: Scheduler> {
    stage: Stage,
    listener: Listener,
    commands: CommandsConfig,
    media: MediaSelector,
    player: Box<dyn VideoPlayer>,
    sound: Arc<dyn SoundPlayer>,
    page: Page,
    scheduler: S,
    pending: VecDeque<RuntimeEvent>,
    last_render: String,
}

impl<S: Scheduler> PoodleRuntime<S> {
    /// Builds a runtime from configuration.
    ///
    /// Videos are checked on disk and the bark uses the configured
    /// recording; see [`PoodleRuntime::with_collaborators`] to swap them.
    pub fn new(config: &AppConfig, commands: CommandsConfig, scheduler: S) -> Self {
        let sound = BarkSound::new(config.bark_sound.clone())
            .with_fallback_text(config.bubble_text.clone());
        Self {
            stage: Stage::with_bark_style(config.bark_style()),
            listener: Listener::new(config.language.clone()),
            commands,
            media: MediaSelector::new(config.assets_dir.clone()),
            player: Box::new(FileVideoPlayer),
            sound: Arc::new(sound),
            page: Page::new(),
            scheduler,
            pending: VecDeque::new(),
            last_render: String::new(),
        }
    }

    /// Replaces the video and sound collaborators.
    pub fn with_collaborators(
        mut self,
        player: Box<dyn VideoPlayer>,
        sound: Arc<dyn SoundPlayer>,
    ) -> Self {
        self.player = player;
        self.sound = sound;
        self
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn listener(&self) -> &Listener {
        &self.listener
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Shows the idle media. Call once before handling events.
    pub fn start(&mut self) {
        self.perform(vec![EffectRequest::SelectMedia(PresentationState::Idle)]);
        self.publish();
    }

    /// Handles one event and everything it triggers.
    ///
    /// # Returns
    /// * `Flow::Quit` - The user asked to leave.
    /// * `Flow::Continue` - Keep looping.
    pub fn handle(&mut self, event: RuntimeEvent) -> Flow {
        self.pending.push_back(event);
        let mut flow = Flow::Continue;
        while let Some(event) = self.pending.pop_front() {
            if self.dispatch(event) == Flow::Quit {
                self.pending.clear();
                flow = Flow::Quit;
            }
        }
        self.publish();
        flow
    }

    fn dispatch(&mut self, event: RuntimeEvent) -> Flow {
        match event {
            RuntimeEvent::Input(Input::Transcript(text)) => {
                tracing::info!(transcript = %text, "voice command");
                self.drive_listener(ListenerEvent::Transcript(text));
            }
            RuntimeEvent::Input(Input::Press(id)) => match id.parse::<Action>() {
                Ok(action) => self.execute(action),
                Err(err) => tracing::warn!("{err}"),
            },
            RuntimeEvent::Input(Input::Mic) => self.drive_listener(ListenerEvent::MicPressed),
            RuntimeEvent::Input(Input::DropSession) => {
                self.drive_listener(ListenerEvent::SessionEnded)
            }
            RuntimeEvent::Input(Input::Help) => {
                println!("{}", commands::describe_commands(&self.commands));
                println!("Controls: :mic, :press <{}>, :drop, :quit", control_ids());
            }
            RuntimeEvent::Input(Input::Quit) => return Flow::Quit,
            RuntimeEvent::Recognition(event) => self.drive_listener(event),
            RuntimeEvent::Expired(class) => {
                let effects = self.stage.expire(class);
                self.perform(effects);
            }
            RuntimeEvent::BubbleElapsed => self.page.hide_bubble(),
        }
        Flow::Continue
    }

    /// Runs one action through the stage and applies its effects.
    fn execute(&mut self, action: Action) {
        tracing::info!(%action, "executing");
        let (_, effects) = self.stage.apply(action);
        self.perform(effects);
    }

    fn drive_listener(&mut self, event: ListenerEvent) {
        let listener = std::mem::take(&mut self.listener);
        let (listener, requests) = listener.transition(event);
        self.listener = listener;
        for request in requests {
            match request {
                ListenerCommand::StartSession { language } => {
                    tracing::info!(%language, "recognition session started");
                    self.pending
                        .push_back(RuntimeEvent::Recognition(ListenerEvent::SessionStarted));
                }
                ListenerCommand::StopSession => {
                    tracing::info!("recognition session stopped");
                    self.pending
                        .push_back(RuntimeEvent::Recognition(ListenerEvent::SessionEnded));
                }
                ListenerCommand::SetMicIndicator(listening) => {
                    self.page.set_mic_listening(listening)
                }
                ListenerCommand::SetStatus { text, active } => self.page.set_status(text, active),
                ListenerCommand::Dispatch(phrase) => {
                    match commands::find_action(&self.commands, &phrase) {
                        Some(action) => self.execute(action),
                        None => tracing::debug!(%phrase, "no command recognised"),
                    }
                }
                ListenerCommand::HideMic => self.page.hide_mic(),
            }
        }
    }

    /// Applies effect requests to the page in the order given.
    fn perform(&mut self, effects: Vec<EffectRequest>) {
        for effect in effects {
            match effect {
                EffectRequest::SetContainerClasses(classes) => self.page.set_classes(classes),
                EffectRequest::SelectMedia(state) => {
                    let view = self.media.select(state, self.player.as_mut()).clone();
                    self.page.set_media(view);
                }
                EffectRequest::HighlightControl(action) => self.page.highlight(action),
                EffectRequest::ShowSpeechBubble { text, duration } => {
                    self.page.show_bubble(text);
                    self.scheduler
                        .schedule(duration, RuntimeEvent::BubbleElapsed);
                }
                EffectRequest::PlaySound(kind) => self.scheduler.play(self.sound.clone(), kind),
                EffectRequest::ExpireClass { class, after } => {
                    self.scheduler.schedule(after, RuntimeEvent::Expired(class))
                }
            }
        }
    }

    /// Logs the page whenever it changed.
    fn publish(&mut self) {
        let render = self.page.render();
        if render != self.last_render {
            tracing::info!(target: "poodle::page", "{render}");
            self.last_render = render;
        }
    }
}

fn control_ids() -> String {
    Action::ALL
        .iter()
        .map(|action| action.control_id())
        .collect::<Vec<_>>()
        .join("|")
}

/// Command-line options for [`run_poodle`].
#[derive(Clone, Debug)]
pub struct RunOptions {
    pub config_path: PathBuf,
    pub commands_path: PathBuf,
    /// Start with the microphone on.
    pub listen: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(config::CONFIG_PATH),
            commands_path: PathBuf::from(commands::COMMANDS_FILE),
            listen: false,
        }
    }
}

/// Runs the poodle on the terminal until `:quit` or end of input.
///
/// # Details
/// Standard input is the recogniser: each line is a transcript or a
/// control instruction (see [`parse_input`]). Terminal lines and timers
/// share one channel and are handled one at a time on the loop.
///
/// # Errors
/// Returns an error only if the terminal reader thread cannot be spawned.
pub async fn run_poodle(options: RunOptions) -> Result<()> {
    let config = config::load_app_config(&options.config_path);
    let vocabulary = commands::load_commands(&options.commands_path);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut runtime = PoodleRuntime::new(&config, vocabulary, TokioScheduler::new(tx.clone()));
    runtime.start();
    if options.listen {
        runtime.handle(RuntimeEvent::Input(Input::Mic));
    }

    spawn_terminal_reader(tx)?;
    while let Some(event) = rx.recv().await {
        if runtime.handle(event) == Flow::Quit {
            break;
        }
    }
    Ok(())
}

/// Forwards terminal lines to the loop, then asks it to quit at end of input.
///
/// A blocking read cannot be cancelled, so the reader lives on its own
/// detached thread and simply dies with the process.
fn spawn_terminal_reader(events: mpsc::UnboundedSender<RuntimeEvent>) -> Result<()> {
    std::thread::Builder::new()
        .name("terminal".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        tracing::error!("failed to read stdin: {err}");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                if events.send(RuntimeEvent::Input(parse_input(&line))).is_err() {
                    return;
                }
            }
            let _ = events.send(RuntimeEvent::Input(Input::Quit));
        })
        .context("Failed to spawn terminal reader")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instructions_parse() {
        assert_eq!(parse_input(":mic"), Input::Mic);
        assert_eq!(parse_input("  :drop "), Input::DropSession);
        assert_eq!(parse_input(":quit"), Input::Quit);
        assert_eq!(parse_input(":exit"), Input::Quit);
        assert_eq!(parse_input(":press sit"), Input::Press("sit".to_string()));
        assert_eq!(parse_input(":press"), Input::Help);
        assert_eq!(parse_input(":dance now"), Input::Help);
    }

    #[test]
    fn speech_is_passed_through_untouched() {
        assert_eq!(
            parse_input("  Come HERE "),
            Input::Transcript("  Come HERE ".to_string())
        );
    }

    #[test]
    fn control_ids_cover_every_action() {
        let ids = control_ids();
        assert_eq!(ids.split('|').count(), Action::ALL.len());
        assert!(ids.contains("go-back"));
    }
}
