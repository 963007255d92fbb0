/*
 * @file commands.rs
 * @brief Poodle command vocabulary and phrase matching logic
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

//! Canonical poodle actions and the phrase matcher that produces them.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default path of the optional vocabulary override file.
pub const COMMANDS_FILE: &str = "commands.json";

/// Built-in trigger table, highest priority first.
///
/// Triggers overlap ("sit up" holds both "sit" and "up"), so the order of
/// this table is the tie-break.
const DEFAULT_RULES: [(Action, &[&str]); 8] = [
    (Action::Sit, &["sit"]),
    (Action::Jump, &["jump", "up"]),
    (Action::Stay, &["stay", "wait"]),
    (Action::Come, &["come", "here"]),
    (Action::MoveLeft, &["left"]),
    (Action::MoveRight, &["right"]),
    (Action::Bark, &["bark", "speak"]),
    (Action::GoBack, &["back", "return"]),
];

/// One of the eight things the poodle can be told to do.
///
/// # Details
/// The serialized form is the kebab-case control identifier, which is also
/// what a pressed control reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Sit,
    Jump,
    MoveLeft,
    MoveRight,
    Come,
    Stay,
    GoBack,
    Bark,
}

impl Action {
    /// Every action, in control-panel order.
    pub const ALL: [Action; 8] = [
        Action::Sit,
        Action::Jump,
        Action::MoveLeft,
        Action::MoveRight,
        Action::Come,
        Action::Stay,
        Action::GoBack,
        Action::Bark,
    ];

    /// Returns the identifier of the control bound to this action.
    pub fn control_id(self) -> &'static str {
        match self {
            Action::Sit => "sit",
            Action::Jump => "jump",
            Action::MoveLeft => "move-left",
            Action::MoveRight => "move-right",
            Action::Come => "come",
            Action::Stay => "stay",
            Action::GoBack => "go-back",
            Action::Bark => "bark",
        }
    }

    /// Whether the action slides the poodle sideways.
    pub fn is_move(self) -> bool {
        matches!(self, Action::MoveLeft | Action::MoveRight)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.control_id())
    }
}

/// A control identifier that names no action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action '{0}'")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .iter()
            .copied()
            .find(|action| action.control_id() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// Keywords that trigger a single action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRule {
    /// Action produced when any keyword matches.
    pub action: Action,
    /// Substrings searched for in the phrase.
    pub keywords: Vec<String>,
}

/// Ordered vocabulary used to interpret phrases.
///
/// # Details
/// Rules are tried top to bottom and the first rule with a matching keyword
/// wins. Loaded from commands.json when present, otherwise the built-in
/// table is used.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandsConfig {
    /// Rules in priority order.
    pub commands: Vec<CommandRule>,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            commands: DEFAULT_RULES
                .iter()
                .map(|(action, keywords)| CommandRule {
                    action: *action,
                    keywords: keywords.iter().map(|k| k.to_string()).collect(),
                })
                .collect(),
        }
    }
}

/// Loads the vocabulary from `path`.
///
/// # Details
/// A missing, unreadable or invalid file is logged and replaced by the
/// built-in vocabulary so the poodle always understands the basics.
///
/// # Arguments
/// * `path` - Location of the JSON vocabulary file.
///
/// # Returns
/// * `CommandsConfig` - Loaded or default vocabulary.
pub fn load_commands(path: &Path) -> CommandsConfig {
    load_commands_from_file(path).unwrap_or_else(|err| {
        tracing::warn!(
            path = %path.display(),
            "failed to load vocabulary, using built-in commands: {err:#}"
        );
        CommandsConfig::default()
    })
}

/// Reads and validates the vocabulary file.
///
/// # Errors
/// Returns an error if the file cannot be read, is not valid JSON, or
/// contains an empty keyword (which would match every phrase).
fn load_commands_from_file(path: &Path) -> Result<CommandsConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: CommandsConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    if let Some(rule) = config
        .commands
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| k.trim().is_empty()))
    {
        anyhow::bail!("empty keyword for action '{}'", rule.action);
    }
    Ok(config)
}

/// Maps a prepared phrase onto an action using the built-in table.
///
/// # Details
/// The phrase must already be trimmed and lower-cased (see
/// [`prepare_phrase`]). `None` means nothing matched, which callers treat
/// as "ignore".
///
/// # Examples
/// ```
/// use poodle::commands::{normalize, Action};
///
/// assert_eq!(normalize("please sit down now"), Some(Action::Sit));
/// assert_eq!(normalize("sit and jump"), Some(Action::Sit));
/// assert_eq!(normalize("the weather is nice"), None);
/// ```
pub fn normalize(phrase: &str) -> Option<Action> {
    DEFAULT_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| phrase.contains(k)))
        .map(|(action, _)| *action)
}

/// Maps a prepared phrase onto an action using a loaded vocabulary.
///
/// # Arguments
/// * `commands` - Vocabulary to search, in priority order.
/// * `phrase` - Trimmed, lower-cased utterance.
///
/// # Returns
/// * `Some(Action)` - Action of the first rule with a matching keyword.
/// * `None` - No rule matched.
pub fn find_action(commands: &CommandsConfig, phrase: &str) -> Option<Action> {
    commands
        .commands
        .iter()
        .find(|rule| {
            rule.keywords
                .iter()
                .any(|keyword| phrase.contains(keyword.as_str()))
        })
        .map(|rule| rule.action)
}

/// Trims and lower-cases a raw transcript before matching.
pub fn prepare_phrase(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Renders the vocabulary as a help listing, one action per line.
pub fn describe_commands(commands: &CommandsConfig) -> String {
    let mut result = String::from("Say one of:\n");
    for rule in &commands.commands {
        result.push_str(&format!(
            "- {}: {}\n",
            rule.action,
            rule.keywords.join(", ")
        ));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn every_rule_has_its_trigger() {
        assert_eq!(normalize("sit"), Some(Action::Sit));
        assert_eq!(normalize("jump"), Some(Action::Jump));
        assert_eq!(normalize("get up"), Some(Action::Jump));
        assert_eq!(normalize("stay there"), Some(Action::Stay));
        assert_eq!(normalize("wait"), Some(Action::Stay));
        assert_eq!(normalize("come"), Some(Action::Come));
        assert_eq!(normalize("over here"), Some(Action::Come));
        assert_eq!(normalize("go left"), Some(Action::MoveLeft));
        assert_eq!(normalize("go right"), Some(Action::MoveRight));
        assert_eq!(normalize("bark"), Some(Action::Bark));
        assert_eq!(normalize("speak"), Some(Action::Bark));
        assert_eq!(normalize("go back"), Some(Action::GoBack));
        assert_eq!(normalize("return"), Some(Action::GoBack));
    }

    #[test]
    fn earlier_rules_win() {
        assert_eq!(normalize("sit then jump"), Some(Action::Sit));
        assert_eq!(normalize("jump and stay"), Some(Action::Jump));
        assert_eq!(normalize("come back"), Some(Action::Come));
        assert_eq!(normalize("left or right"), Some(Action::MoveLeft));
    }

    #[test]
    fn unrelated_phrase_is_ignored() {
        assert_eq!(normalize("the weather is nice"), None);
        assert_eq!(normalize(""), None);
    }

    #[test]
    fn prepare_phrase_trims_and_lowercases() {
        assert_eq!(prepare_phrase("  Please SIT Down Now \n"), "please sit down now");
        assert_eq!(normalize(&prepare_phrase("  SIT ")), Some(Action::Sit));
    }

    #[test]
    fn control_ids_round_trip_through_from_str() {
        for action in Action::ALL {
            assert_eq!(action.control_id().parse::<Action>(), Ok(action));
        }
        assert_eq!(
            "roll-over".parse::<Action>(),
            Err(UnknownAction("roll-over".to_string()))
        );
    }

    #[test]
    fn default_vocabulary_matches_builtin_normalizer() {
        let config = CommandsConfig::default();
        for phrase in ["sit", "up", "wait", "here", "left", "right", "speak", "return", "nope"] {
            assert_eq!(find_action(&config, phrase), normalize(phrase));
        }
    }

    #[test]
    fn custom_vocabulary_is_respected() {
        let config = CommandsConfig {
            commands: vec![CommandRule {
                action: Action::Bark,
                keywords: vec!["woof".to_string()],
            }],
        };
        assert_eq!(find_action(&config, "say woof"), Some(Action::Bark));
        assert_eq!(find_action(&config, "sit"), None);
    }

    #[test]
    fn vocabulary_file_loads_and_validates() {
        let dir = std::env::temp_dir();
        let good = dir.join("poodle_commands_good.json");
        fs::write(
            &good,
            r#"{"commands":[{"action":"move-left","keywords":["port"]}]}"#,
        )
        .expect("write vocabulary");
        let config = load_commands(&good);
        assert_eq!(find_action(&config, "hard to port"), Some(Action::MoveLeft));

        let empty = dir.join("poodle_commands_empty_keyword.json");
        fs::write(&empty, r#"{"commands":[{"action":"sit","keywords":[""]}]}"#)
            .expect("write vocabulary");
        assert!(load_commands_from_file(&empty).is_err());
        assert_eq!(load_commands(&empty), CommandsConfig::default());

        fs::remove_file(good).ok();
        fs::remove_file(empty).ok();
    }

    #[test]
    fn missing_vocabulary_falls_back() {
        let path = std::env::temp_dir().join("poodle_commands_missing.json");
        fs::remove_file(&path).ok();
        assert_eq!(load_commands(&path), CommandsConfig::default());
    }

    #[test]
    fn description_lists_every_rule() {
        let text = describe_commands(&CommandsConfig::default());
        assert!(text.contains("- move-left: left"));
        assert!(text.contains("- bark: bark, speak"));
        assert_eq!(text.lines().count(), 9);
    }

    proptest! {
        #[test]
        fn any_phrase_containing_sit_is_sit(
            prefix in "[a-z ]{0,16}",
            suffix in "[a-z ]{0,16}",
        ) {
            let phrase = format!("{prefix}sit{suffix}");
            prop_assert_eq!(normalize(&phrase), Some(Action::Sit));
        }

        #[test]
        fn normalize_agrees_with_default_vocabulary(phrase in "[a-z ]{0,24}") {
            prop_assert_eq!(
                normalize(&phrase),
                find_action(&CommandsConfig::default(), &phrase)
            );
        }
    }
}
