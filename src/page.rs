/*
 * @file page.rs
 * @brief Visible surface the poodle's effects are applied to
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

//! In-memory page: container classes, controls, bubble, status and media.

use crate::commands::Action;
use crate::media::MediaView;
use crate::stage::ClassSet;

/// Everything a viewer can see.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    container_classes: ClassSet,
    highlighted: Option<Action>,
    bubble: Option<String>,
    status: String,
    status_active: bool,
    mic_listening: bool,
    mic_visible: bool,
    media: MediaView,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            container_classes: ClassSet::new(),
            highlighted: None,
            bubble: None,
            status: String::new(),
            status_active: false,
            mic_listening: false,
            mic_visible: true,
            media: MediaView::default(),
        }
    }
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn container_classes(&self) -> &ClassSet {
        &self.container_classes
    }

    pub fn highlighted(&self) -> Option<Action> {
        self.highlighted
    }

    pub fn bubble(&self) -> Option<&str> {
        self.bubble.as_deref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn status_active(&self) -> bool {
        self.status_active
    }

    pub fn mic_listening(&self) -> bool {
        self.mic_listening
    }

    pub fn mic_visible(&self) -> bool {
        self.mic_visible
    }

    pub fn media(&self) -> &MediaView {
        &self.media
    }

    pub fn set_classes(&mut self, classes: ClassSet) {
        self.container_classes = classes;
    }

    /// Highlights `action`'s control; every other control loses it.
    pub fn highlight(&mut self, action: Action) {
        self.highlighted = Some(action);
    }

    pub fn show_bubble(&mut self, text: impl Into<String>) {
        self.bubble = Some(text.into());
    }

    /// Hides the bubble. Safe to call when it is already hidden.
    pub fn hide_bubble(&mut self) {
        self.bubble = None;
    }

    /// Updates the status line; `active: None` keeps the indicator state.
    pub fn set_status(&mut self, text: impl Into<String>, active: Option<bool>) {
        self.status = text.into();
        if let Some(active) = active {
            self.status_active = active;
        }
    }

    pub fn set_mic_listening(&mut self, listening: bool) {
        self.mic_listening = listening;
    }

    pub fn hide_mic(&mut self) {
        self.mic_visible = false;
        self.mic_listening = false;
    }

    pub fn set_media(&mut self, media: MediaView) {
        self.media = media;
    }

    /// One-line description of the page for the terminal.
    ///
    /// # Examples
    /// ```
    /// use poodle::commands::Action;
    /// use poodle::page::Page;
    ///
    /// let mut page = Page::new();
    /// page.highlight(Action::Bark);
    /// page.show_bubble("Yip yip!");
    /// assert_eq!(
    ///     page.render(),
    ///     "poodle[] media=- control=bark bubble=\"Yip yip!\" mic=off"
    /// );
    /// ```
    pub fn render(&self) -> String {
        let classes = self
            .container_classes
            .iter()
            .map(|class| class.name())
            .collect::<Vec<_>>()
            .join(" ");
        let media = self
            .media
            .visible()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        let control = self.highlighted.map(Action::control_id).unwrap_or("-");
        let mut line = format!("poodle[{classes}] media={media} control={control}");
        if let Some(text) = &self.bubble {
            line.push_str(&format!(" bubble=\"{text}\""));
        }
        let mic = match (self.mic_visible, self.mic_listening) {
            (false, _) => "hidden",
            (true, true) => "on",
            (true, false) => "off",
        };
        line.push_str(&format!(" mic={mic}"));
        if !self.status.is_empty() {
            line.push_str(&format!(" status=\"{}\"", self.status));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::ContainerClass;
    use std::path::PathBuf;

    #[test]
    fn starts_blank_with_mic_visible() {
        let page = Page::new();
        assert!(page.container_classes().is_empty());
        assert_eq!(page.highlighted(), None);
        assert!(page.mic_visible());
        assert!(!page.mic_listening());
    }

    #[test]
    fn error_status_keeps_indicator() {
        let mut page = Page::new();
        page.set_status("Listening...", Some(true));
        page.set_status("Error: network", None);
        assert_eq!(page.status(), "Error: network");
        assert!(page.status_active());
    }

    #[test]
    fn hiding_bubble_twice_is_harmless() {
        let mut page = Page::new();
        page.show_bubble("Yip yip!");
        page.hide_bubble();
        page.hide_bubble();
        assert_eq!(page.bubble(), None);
    }

    #[test]
    fn render_lists_classes_media_and_status() {
        let mut page = Page::new();
        page.set_classes([ContainerClass::Sit, ContainerClass::Bark].into_iter().collect());
        page.set_media(MediaView {
            video: Some(PathBuf::from("assets/sit.mp4")),
            poster: Some(PathBuf::from("assets/poodle-sit.png")),
            playing: false,
        });
        page.highlight(Action::Sit);
        page.set_mic_listening(true);
        page.set_status("Listening...", Some(true));
        assert_eq!(
            page.render(),
            "poodle[sit bark] media=assets/poodle-sit.png control=sit mic=on status=\"Listening...\""
        );
    }

    #[test]
    fn hidden_mic_renders_as_hidden() {
        let mut page = Page::new();
        page.set_mic_listening(true);
        page.hide_mic();
        assert!(page.render().contains("mic=hidden"));
    }
}
