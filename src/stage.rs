/*
 * @file stage.rs
 * @brief Presentation state machine for the poodle
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

//! Presentation state machine.
//!
//! The [`Stage`] owns the poodle's pose, the classes on its container and
//! the highlighted control. Applying an [`Action`] updates all three and
//! returns the ordered effects the page must perform. Nothing here touches
//! I/O; the runtime executes the effects.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use crate::commands::Action;
use crate::traits::MealyMachine;

/// How long the transient `bark` class stays on the container.
pub const BARK_CLASS_DURATION: Duration = Duration::from_millis(500);

/// How long the speech bubble stays visible after a bark.
pub const SPEECH_BUBBLE_DURATION: Duration = Duration::from_millis(1000);

/// Text shown in the speech bubble when barking.
pub const BARK_TEXT: &str = "Yip yip!";

/// The poodle's current pose.
///
/// # Details
/// Also the key used to look up media. Both move actions share `Move`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PresentationState {
    #[default]
    Idle,
    Sit,
    Jump,
    Move,
    Come,
    Stay,
    GoBack,
}

impl PresentationState {
    /// Every state, starting with the initial one.
    pub const ALL: [PresentationState; 7] = [
        PresentationState::Idle,
        PresentationState::Sit,
        PresentationState::Jump,
        PresentationState::Move,
        PresentationState::Come,
        PresentationState::Stay,
        PresentationState::GoBack,
    ];

    /// Pose reached by `action`, or `None` for actions that are reactions
    /// rather than poses (bark).
    pub fn after(action: Action) -> Option<Self> {
        match action {
            Action::Sit => Some(PresentationState::Sit),
            Action::Jump => Some(PresentationState::Jump),
            Action::MoveLeft | Action::MoveRight => Some(PresentationState::Move),
            Action::Come => Some(PresentationState::Come),
            Action::Stay => Some(PresentationState::Stay),
            Action::GoBack => Some(PresentationState::GoBack),
            Action::Bark => None,
        }
    }

    /// Media lookup key.
    pub fn key(self) -> &'static str {
        match self {
            PresentationState::Idle => "idle",
            PresentationState::Sit => "sit",
            PresentationState::Jump => "jump",
            PresentationState::Move => "move",
            PresentationState::Come => "come",
            PresentationState::Stay => "stay",
            PresentationState::GoBack => "go-back",
        }
    }
}

impl fmt::Display for PresentationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A visual class carried by the poodle container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContainerClass {
    Sit,
    Jump,
    Bark,
    Stay,
    MoveLeft,
    MoveRight,
}

impl ContainerClass {
    /// Class added by `action`, if any. `Come` and `GoBack` add none.
    pub fn for_action(action: Action) -> Option<Self> {
        match action {
            Action::Sit => Some(ContainerClass::Sit),
            Action::Jump => Some(ContainerClass::Jump),
            Action::MoveLeft => Some(ContainerClass::MoveLeft),
            Action::MoveRight => Some(ContainerClass::MoveRight),
            Action::Stay => Some(ContainerClass::Stay),
            Action::Bark => Some(ContainerClass::Bark),
            Action::Come | Action::GoBack => None,
        }
    }

    pub fn is_move(self) -> bool {
        matches!(self, ContainerClass::MoveLeft | ContainerClass::MoveRight)
    }

    pub fn name(self) -> &'static str {
        match self {
            ContainerClass::Sit => "sit",
            ContainerClass::Jump => "jump",
            ContainerClass::Bark => "bark",
            ContainerClass::Stay => "stay",
            ContainerClass::MoveLeft => "move-left",
            ContainerClass::MoveRight => "move-right",
        }
    }
}

impl fmt::Display for ContainerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered set of container classes.
pub type ClassSet = BTreeSet<ContainerClass>;

/// Sounds the page can be asked to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundKind {
    Bark,
}

/// A side effect requested by the stage.
///
/// # Details
/// Effects from one transition are returned in the order they must be
/// applied: classes, then media, then the bark extras, then the highlight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EffectRequest {
    /// Replace the container's classes with exactly this set.
    SetContainerClasses(ClassSet),
    /// Show the media for this pose.
    SelectMedia(PresentationState),
    /// Highlight the control bound to this action and no other.
    HighlightControl(Action),
    /// Show a speech bubble that hides itself after `duration`.
    ShowSpeechBubble { text: String, duration: Duration },
    /// Play a sound, fire and forget.
    PlaySound(SoundKind),
    /// Arm a fire-once timer that feeds [`StageEvent::Expired`] back.
    ExpireClass {
        class: ContainerClass,
        after: Duration,
    },
}

/// Inputs accepted by the stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageEvent {
    Command(Action),
    Expired(ContainerClass),
}

/// Durations and text used for the bark reaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BarkStyle {
    pub class_duration: Duration,
    pub bubble_duration: Duration,
    pub bubble_text: String,
}

impl Default for BarkStyle {
    fn default() -> Self {
        Self {
            class_duration: BARK_CLASS_DURATION,
            bubble_duration: SPEECH_BUBBLE_DURATION,
            bubble_text: BARK_TEXT.to_string(),
        }
    }
}

/// Holder of the poodle's presentation state.
///
/// # Details
/// Starts idle with no classes and nothing highlighted. Lives as long as
/// the runtime; there is no teardown.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stage {
    current: PresentationState,
    classes: ClassSet,
    highlighted: Option<Action>,
    bark: BarkStyle,
}

impl Stage {
    /// Creates an idle stage with the default bark style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an idle stage with custom bark timings and text.
    pub fn with_bark_style(bark: BarkStyle) -> Self {
        Self {
            bark,
            ..Self::default()
        }
    }

    pub fn current(&self) -> PresentationState {
        self.current
    }

    pub fn classes(&self) -> &ClassSet {
        &self.classes
    }

    pub fn highlighted(&self) -> Option<Action> {
        self.highlighted
    }

    /// Applies one action.
    ///
    /// # Details
    /// Pose actions clear `sit`, `jump`, `bark` and `stay`, keep move
    /// classes only for moves, then add their own class and select media.
    /// `GoBack` clears every class. `Bark` leaves the pose and its classes
    /// alone, adds a transient `bark` class and requests the bubble and the
    /// sound. Every action moves the highlight to its own control.
    ///
    /// # Arguments
    /// * `action` - The canonical action to apply.
    ///
    /// # Returns
    /// * `(PresentationState, Vec<EffectRequest>)` - The pose after the
    ///   action and the effects to perform, in order.
    pub fn apply(&mut self, action: Action) -> (PresentationState, Vec<EffectRequest>) {
        let mut effects = Vec::with_capacity(5);
        match PresentationState::after(action) {
            Some(state) => {
                self.classes
                    .retain(|class| class.is_move() && action.is_move());
                match action {
                    Action::GoBack => self.classes.clear(),
                    Action::MoveLeft => {
                        self.classes.remove(&ContainerClass::MoveRight);
                    }
                    Action::MoveRight => {
                        self.classes.remove(&ContainerClass::MoveLeft);
                    }
                    _ => {}
                }
                if let Some(class) = ContainerClass::for_action(action) {
                    self.classes.insert(class);
                }
                self.current = state;
                effects.push(EffectRequest::SetContainerClasses(self.classes.clone()));
                effects.push(EffectRequest::SelectMedia(state));
            }
            None => {
                self.classes.insert(ContainerClass::Bark);
                effects.push(EffectRequest::SetContainerClasses(self.classes.clone()));
                effects.push(EffectRequest::ExpireClass {
                    class: ContainerClass::Bark,
                    after: self.bark.class_duration,
                });
                effects.push(EffectRequest::ShowSpeechBubble {
                    text: self.bark.bubble_text.clone(),
                    duration: self.bark.bubble_duration,
                });
                effects.push(EffectRequest::PlaySound(SoundKind::Bark));
            }
        }
        self.highlighted = Some(action);
        effects.push(EffectRequest::HighlightControl(action));
        tracing::debug!(%action, state = %self.current, "applied action");
        (self.current, effects)
    }

    /// Removes a transient class when its timer fires.
    ///
    /// Does nothing if a later action already removed it.
    pub fn expire(&mut self, class: ContainerClass) -> Vec<EffectRequest> {
        match self.classes.remove(&class) {
            true => vec![EffectRequest::SetContainerClasses(self.classes.clone())],
            false => Vec::new(),
        }
    }
}

impl MealyMachine for Stage {
    type Event = StageEvent;
    type Command = EffectRequest;

    fn transition(mut self, event: StageEvent) -> (Self, Vec<EffectRequest>) {
        let effects = match event {
            StageEvent::Command(action) => self.apply(action).1,
            StageEvent::Expired(class) => self.expire(class),
        };
        (self, effects)
    }
}
