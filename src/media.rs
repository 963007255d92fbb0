/*
 * @file media.rs
 * @brief Video and poster selection for each poodle pose
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

//! Media selection: try the pose's video, fall back to its poster image.

use std::fs;
use std::path::{Path, PathBuf};

use crate::stage::PresentationState;

/// Outcome of asking a collaborator to play something.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayResult {
    Ok,
    Failed(String),
}

impl PlayResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, PlayResult::Ok)
    }
}

/// Something that can start a video.
pub trait VideoPlayer {
    fn play(&mut self, video: &Path) -> PlayResult;
}

/// Plays a video if the asset is present on disk.
///
/// # Details
/// The terminal front end has no decoder; an asset counts as playable when
/// it is a non-empty regular file.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileVideoPlayer;

impl VideoPlayer for FileVideoPlayer {
    fn play(&mut self, video: &Path) -> PlayResult {
        match fs::metadata(video) {
            Ok(meta) if meta.is_file() && meta.len() > 0 => PlayResult::Ok,
            Ok(_) => PlayResult::Failed("not a playable file".to_string()),
            Err(err) => PlayResult::Failed(err.to_string()),
        }
    }
}

/// Poster image file for a pose. Every pose has one.
fn image_file(state: PresentationState) -> &'static str {
    match state {
        PresentationState::Idle | PresentationState::Stay => "poodle-stand.png",
        PresentationState::Sit => "poodle-sit.png",
        PresentationState::Jump => "poodle-jump.png",
        PresentationState::Come => "poodle-come.png",
        PresentationState::Move => "poodle-left.png",
        PresentationState::GoBack => "poodle-go-back.png",
    }
}

/// Video file for a pose. `GoBack` has none.
fn video_file(state: PresentationState) -> Option<&'static str> {
    match state {
        PresentationState::Idle => Some("idle.mp4"),
        PresentationState::Sit => Some("sit.mp4"),
        PresentationState::Jump => Some("jump.mp4"),
        PresentationState::Stay => Some("stay.mp4"),
        PresentationState::Come => Some("come.mp4"),
        PresentationState::Move => Some("move.mp4"),
        PresentationState::GoBack => None,
    }
}

/// Asset references for one pose.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaSelection {
    pub video: Option<PathBuf>,
    pub poster: PathBuf,
}

/// What the media element currently holds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MediaView {
    pub video: Option<PathBuf>,
    pub poster: Option<PathBuf>,
    pub playing: bool,
}

impl MediaView {
    /// The asset a viewer actually sees: the video while it plays,
    /// otherwise the poster.
    pub fn visible(&self) -> Option<&Path> {
        match (self.playing, &self.video) {
            (true, Some(video)) => Some(video.as_path()),
            _ => self.poster.as_deref(),
        }
    }
}

/// Resolves poses to assets and tracks what is loaded.
#[derive(Clone, Debug)]
pub struct MediaSelector {
    assets_dir: PathBuf,
    view: MediaView,
}

impl MediaSelector {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            view: MediaView::default(),
        }
    }

    pub fn view(&self) -> &MediaView {
        &self.view
    }

    /// Asset paths for `state` under the assets directory.
    pub fn assets(&self, state: PresentationState) -> MediaSelection {
        MediaSelection {
            video: video_file(state).map(|file| self.assets_dir.join(file)),
            poster: self.assets_dir.join(image_file(state)),
        }
    }

    /// Shows the media for `state`.
    ///
    /// # Details
    /// A video that is not already loaded replaces the current one with the
    /// pose image as its poster and is started; if it cannot play, the
    /// poster is what shows. When the pose has no video, or its video is
    /// already loaded, only the poster changes.
    ///
    /// # Arguments
    /// * `state` - Pose whose media should be shown.
    /// * `player` - Collaborator that starts videos.
    ///
    /// # Returns
    /// * `&MediaView` - The media element after the change.
    pub fn select(&mut self, state: PresentationState, player: &mut dyn VideoPlayer) -> &MediaView {
        let selection = self.assets(state);
        match selection.video {
            Some(video) if self.view.video.as_deref() != Some(video.as_path()) => {
                let result = player.play(&video);
                if let PlayResult::Failed(reason) = &result {
                    tracing::info!(%state, %reason, "video not available, using image");
                }
                self.view = MediaView {
                    video: Some(video),
                    poster: Some(selection.poster),
                    playing: result.is_ok(),
                };
            }
            _ => self.view.poster = Some(selection.poster),
        }
        &self.view
    }
}
