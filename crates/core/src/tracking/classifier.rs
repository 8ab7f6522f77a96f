//! Rule-based productivity classifier
//!
//! Order of evaluation:
//! 1. Exact app-name overrides
//! 2. Case-insensitive title patterns, first match wins
//! 3. `AMBER`
//!
//! Patterns are compiled up front, so classification itself never fails.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use signalkeeper_domain::{
    ClassifierConfig, ForegroundWindow, ProductivityState, Result, SignalKeeperError,
};
use tracing::debug;

/// App names that are always treated as focused work.
const DEFAULT_GREEN_APPS: &[&str] = &[
    "Code",
    "Visual Studio Code",
    "Xcode",
    "IntelliJ IDEA",
    "RustRover",
    "PyCharm",
    "Terminal",
    "iTerm2",
    "Alacritty",
    "WezTerm",
    "kitty",
    "Obsidian",
];

/// App names that are always treated as distraction.
const DEFAULT_RED_APPS: &[&str] = &["Steam", "TV", "Music", "Spotify", "Netflix"];

/// Built-in title patterns, evaluated after configured ones.
const DEFAULT_TITLE_RULES: &[(&str, ProductivityState)] = &[
    (
        r"youtube|netflix|twitch|reddit|twitter|x\.com|facebook|instagram|tiktok|9gag",
        ProductivityState::Red,
    ),
    (
        r"github|gitlab|bitbucket|stack ?overflow|docs\.rs|crates\.io|jira|linear|confluence|notion",
        ProductivityState::Green,
    ),
    (r"\.(rs|py|ts|tsx|js|go|java|kt|swift|c|cpp|h|md|toml)\b", ProductivityState::Green),
    (r"gmail|inbox|outlook|slack|discord|teams|whatsapp|messages", ProductivityState::Amber),
];

#[derive(Debug, Clone)]
struct TitleRule {
    regex: Regex,
    state: ProductivityState,
}

/// Pure `(app, title) -> state` mapping built from configuration.
#[derive(Debug, Clone)]
pub struct StateClassifier {
    overrides: HashMap<String, ProductivityState>,
    rules: Vec<TitleRule>,
}

impl Default for StateClassifier {
    fn default() -> Self {
        Self { overrides: default_overrides(), rules: default_rules() }
    }
}

impl StateClassifier {
    /// Classifier with no rules at all; everything is `AMBER`.
    pub fn empty() -> Self {
        Self { overrides: HashMap::new(), rules: Vec::new() }
    }

    /// Build from configuration.
    ///
    /// Configured overrides replace built-in ones for the same app, and
    /// configured title rules are checked before the built-in patterns.
    ///
    /// # Errors
    /// Returns `SignalKeeperError::Config` if any title pattern fails to
    /// compile.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        let mut classifier = if config.use_default_rules { Self::default() } else { Self::empty() };

        for (app, state) in &config.app_overrides {
            classifier.overrides.insert(app.trim().to_string(), *state);
        }

        let mut configured = Vec::with_capacity(config.title_rules.len());
        for rule in &config.title_rules {
            configured.push(TitleRule { regex: compile(&rule.pattern)?, state: rule.state });
        }
        configured.append(&mut classifier.rules);
        classifier.rules = configured;

        debug!(
            overrides = classifier.overrides.len(),
            title_rules = classifier.rules.len(),
            "Built state classifier"
        );
        Ok(classifier)
    }

    #[must_use]
    pub fn with_override(mut self, app_name: impl Into<String>, state: ProductivityState) -> Self {
        self.overrides.insert(app_name.into(), state);
        self
    }

    /// Append a title rule after the existing ones.
    ///
    /// # Errors
    /// Returns `SignalKeeperError::Config` for a pattern that does not compile.
    pub fn with_title_rule(mut self, pattern: &str, state: ProductivityState) -> Result<Self> {
        self.rules.push(TitleRule { regex: compile(pattern)?, state });
        Ok(self)
    }

    pub fn classify(&self, window: &ForegroundWindow) -> ProductivityState {
        if let Some(state) = self.overrides.get(&window.app_name) {
            return *state;
        }
        self.rules
            .iter()
            .find(|rule| rule.regex.is_match(&window.window_title))
            .map_or(ProductivityState::Amber, |rule| rule.state)
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| SignalKeeperError::Config(format!("invalid title pattern '{pattern}': {e}")))
}

fn default_overrides() -> HashMap<String, ProductivityState> {
    DEFAULT_GREEN_APPS
        .iter()
        .map(|app| ((*app).to_string(), ProductivityState::Green))
        .chain(DEFAULT_RED_APPS.iter().map(|app| ((*app).to_string(), ProductivityState::Red)))
        .collect()
}

static DEFAULT_RULES: Lazy<Vec<TitleRule>> = Lazy::new(|| {
    DEFAULT_TITLE_RULES
        .iter()
        .filter_map(|(pattern, state)| {
            compile(pattern).ok().map(|regex| TitleRule { regex, state: *state })
        })
        .collect()
});

fn default_rules() -> Vec<TitleRule> {
    DEFAULT_RULES.clone()
}
