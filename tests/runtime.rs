use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use poodle::audio::SoundPlayer;
use poodle::commands::{Action, CommandsConfig};
use poodle::config::AppConfig;
use poodle::listener::{ListenerEvent, STATUS_LISTENING, STATUS_PAUSED};
use poodle::media::{PlayResult, VideoPlayer};
use poodle::runtime::{Flow, Input, PoodleRuntime, RuntimeEvent, Scheduler};
use poodle::stage::{ContainerClass, PresentationState, SoundKind};

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Records timers and sounds instead of running them.
#[derive(Default)]
struct ManualScheduler {
    timers: Vec<(Duration, RuntimeEvent)>,
    sounds: Vec<SoundKind>,
}

impl ManualScheduler {
    fn take_timers(&mut self) -> Vec<(Duration, RuntimeEvent)> {
        std::mem::take(&mut self.timers)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, after: Duration, event: RuntimeEvent) {
        self.timers.push((after, event));
    }

    fn play(&mut self, sound: Arc<dyn SoundPlayer>, kind: SoundKind) {
        sound.play_bark();
        self.sounds.push(kind);
    }
}

/// Plays only videos whose file name is listed.
struct PickyPlayer(Vec<&'static str>);

impl VideoPlayer for PickyPlayer {
    fn play(&mut self, video: &Path) -> PlayResult {
        let name = video.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        match self.0.iter().any(|file| *file == name) {
            true => PlayResult::Ok,
            false => PlayResult::Failed("missing".to_string()),
        }
    }
}

#[derive(Default)]
struct CountingBark(AtomicUsize);

impl SoundPlayer for CountingBark {
    fn play_bark(&self) -> PlayResult {
        self.0.fetch_add(1, Ordering::SeqCst);
        PlayResult::Ok
    }
}

fn new_runtime() -> (PoodleRuntime<ManualScheduler>, Arc<CountingBark>) {
    let config = AppConfig {
        assets_dir: PathBuf::from("assets"),
        ..AppConfig::default()
    };
    let bark = Arc::new(CountingBark::default());
    let mut runtime = PoodleRuntime::new(&config, CommandsConfig::default(), ManualScheduler::default())
        .with_collaborators(Box::new(PickyPlayer(vec!["idle.mp4", "sit.mp4"])), bark.clone());
    runtime.start();
    (runtime, bark)
}

fn input(runtime: &mut PoodleRuntime<ManualScheduler>, input: Input) -> Flow {
    runtime.handle(RuntimeEvent::Input(input))
}

fn say(runtime: &mut PoodleRuntime<ManualScheduler>, phrase: &str) {
    input(runtime, Input::Transcript(phrase.to_string()));
}

fn listening_runtime() -> (PoodleRuntime<ManualScheduler>, Arc<CountingBark>) {
    let (mut runtime, bark) = new_runtime();
    input(&mut runtime, Input::Mic);
    (runtime, bark)
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[test]
fn starts_idle_with_idle_video() {
    let (runtime, _) = new_runtime();
    assert_eq!(runtime.stage().current(), PresentationState::Idle);
    assert_eq!(
        runtime.page().media().visible(),
        Some(Path::new("assets/idle.mp4"))
    );
    assert!(!runtime.listener().is_listening());
}

#[test]
fn mic_press_starts_listening() {
    let (runtime, _) = listening_runtime();
    assert!(runtime.listener().is_listening());
    assert!(runtime.page().mic_listening());
    assert_eq!(runtime.page().status(), STATUS_LISTENING);
    assert!(runtime.page().status_active());
}

#[test]
fn spoken_sit_updates_the_page() {
    let (mut runtime, _) = listening_runtime();
    say(&mut runtime, "  Please SIT down now ");
    assert_eq!(runtime.stage().current(), PresentationState::Sit);
    assert_eq!(runtime.page().highlighted(), Some(Action::Sit));
    assert_eq!(
        runtime.page().container_classes().iter().copied().collect::<Vec<_>>(),
        vec![ContainerClass::Sit]
    );
    assert_eq!(
        runtime.page().media().visible(),
        Some(Path::new("assets/sit.mp4"))
    );
}

#[test]
fn missing_video_shows_poster() {
    let (mut runtime, _) = listening_runtime();
    say(&mut runtime, "jump");
    assert_eq!(
        runtime.page().media().visible(),
        Some(Path::new("assets/poodle-jump.png"))
    );
}

#[test]
fn speech_is_ignored_while_stopped() {
    let (mut runtime, _) = new_runtime();
    say(&mut runtime, "sit");
    assert_eq!(runtime.stage().current(), PresentationState::Idle);
    assert_eq!(runtime.page().highlighted(), None);
}

#[test]
fn unrecognised_phrase_changes_nothing() {
    let (mut runtime, _) = listening_runtime();
    say(&mut runtime, "stay");
    let page = runtime.page().clone();
    say(&mut runtime, "the weather is nice");
    assert_eq!(runtime.page(), &page);
    assert_eq!(runtime.stage().current(), PresentationState::Stay);
}

#[test]
fn pressed_control_bypasses_the_normalizer() {
    let (mut runtime, _) = new_runtime();
    input(&mut runtime, Input::Press("move-left".to_string()));
    input(&mut runtime, Input::Press("move-right".to_string()));
    assert_eq!(runtime.stage().current(), PresentationState::Move);
    assert_eq!(
        runtime.page().container_classes().iter().copied().collect::<Vec<_>>(),
        vec![ContainerClass::MoveRight]
    );
    assert_eq!(runtime.page().highlighted(), Some(Action::MoveRight));
}

#[test]
fn unknown_control_is_ignored() {
    let (mut runtime, _) = new_runtime();
    let before = runtime.page().clone();
    assert_eq!(input(&mut runtime, Input::Press("roll-over".to_string())), Flow::Continue);
    assert_eq!(runtime.page(), &before);
}

#[test]
fn bark_runs_timers_and_sound() {
    let (mut runtime, bark) = listening_runtime();
    say(&mut runtime, "sit");
    say(&mut runtime, "speak");

    assert_eq!(runtime.stage().current(), PresentationState::Sit);
    assert_eq!(runtime.page().bubble(), Some("Yip yip!"));
    assert!(runtime
        .page()
        .container_classes()
        .contains(&ContainerClass::Bark));
    assert_eq!(bark.0.load(Ordering::SeqCst), 1);
    assert_eq!(runtime.scheduler_mut().sounds, vec![SoundKind::Bark]);

    let timers = runtime.scheduler_mut().take_timers();
    assert_eq!(
        timers,
        vec![
            (
                Duration::from_millis(500),
                RuntimeEvent::Expired(ContainerClass::Bark)
            ),
            (Duration::from_millis(1000), RuntimeEvent::BubbleElapsed),
        ]
    );
    for (_, event) in timers {
        runtime.handle(event);
    }
    assert_eq!(runtime.page().bubble(), None);
    assert_eq!(
        runtime.page().container_classes().iter().copied().collect::<Vec<_>>(),
        vec![ContainerClass::Sit]
    );
}

#[test]
fn late_bark_timer_after_new_pose_is_harmless() {
    let (mut runtime, _) = listening_runtime();
    say(&mut runtime, "bark");
    say(&mut runtime, "jump");
    for (_, event) in runtime.scheduler_mut().take_timers() {
        runtime.handle(event);
    }
    assert_eq!(
        runtime.page().container_classes().iter().copied().collect::<Vec<_>>(),
        vec![ContainerClass::Jump]
    );
}

#[test]
fn sit_jump_go_back_ends_with_no_classes() {
    let (mut runtime, _) = listening_runtime();
    let mut states = Vec::new();
    for phrase in ["sit", "jump", "go back"] {
        say(&mut runtime, phrase);
        states.push(runtime.stage().current());
    }
    assert_eq!(
        states,
        vec![
            PresentationState::Sit,
            PresentationState::Jump,
            PresentationState::GoBack
        ]
    );
    assert!(runtime.page().container_classes().is_empty());
    assert_eq!(
        runtime.page().media().poster.as_deref(),
        Some(Path::new("assets/poodle-go-back.png"))
    );
}

#[test]
fn dropped_session_restarts_while_listening() {
    let (mut runtime, _) = listening_runtime();
    input(&mut runtime, Input::DropSession);
    assert!(runtime.listener().is_listening());
    assert_eq!(runtime.page().status(), STATUS_LISTENING);
    say(&mut runtime, "come here");
    assert_eq!(runtime.stage().current(), PresentationState::Come);
}

#[test]
fn stopping_the_mic_pauses() {
    let (mut runtime, _) = listening_runtime();
    input(&mut runtime, Input::Mic);
    assert!(!runtime.listener().is_listening());
    assert!(!runtime.page().mic_listening());
    assert_eq!(runtime.page().status(), STATUS_PAUSED);
    assert!(!runtime.page().status_active());
}

#[test]
fn recognition_error_is_shown() {
    let (mut runtime, _) = listening_runtime();
    runtime.handle(RuntimeEvent::Recognition(ListenerEvent::SessionError(
        "network".to_string(),
    )));
    assert_eq!(runtime.page().status(), "Error: network");
    assert!(runtime.listener().is_listening());
}

#[test]
fn unsupported_recogniser_hides_the_mic() {
    let (mut runtime, _) = new_runtime();
    runtime.handle(RuntimeEvent::Recognition(ListenerEvent::Unsupported));
    assert!(!runtime.page().mic_visible());
    input(&mut runtime, Input::Mic);
    assert!(!runtime.listener().is_listening());
    input(&mut runtime, Input::Press("stay".to_string()));
    assert_eq!(runtime.stage().current(), PresentationState::Stay);
}

#[test]
fn quit_stops_the_loop() {
    let (mut runtime, _) = new_runtime();
    assert_eq!(input(&mut runtime, Input::Help), Flow::Continue);
    assert_eq!(input(&mut runtime, Input::Quit), Flow::Quit);
}
