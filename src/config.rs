use crate::{code::snippet::SnippetLanguage, commands::keyboard::KeyBinding, theme::ThemeName};
use serde::Deserialize;
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// The defaults used by every presentation.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub bindings: KeyBindingsConfig,

    #[serde(default)]
    pub snippet: SnippetConfig,
}

impl Config {
    /// Load the config from a path.
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ConfigLoadError::NotFound),
            Err(e) => return Err(e.into()),
        };
        let config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("config file not found")]
    NotFound,

    #[error("invalid configuration: {0}")]
    Invalid(#[from] serde_yaml::Error),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    /// The theme to start with.
    #[serde(default)]
    pub theme: ThemeName,

    /// The editor used to edit slides. Falls back to `$VISUAL`, then `$EDITOR`.
    pub editor: Option<String>,

    /// The file the current slide is stored in so a presentation can be resumed.
    #[serde(default = "default_position_file")]
    pub position_file: PathBuf,

    /// A max width in columns that the presentation must always be capped to.
    #[serde(default = "default_max_columns")]
    pub max_columns: u16,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            theme: Default::default(),
            editor: None,
            position_file: default_position_file(),
            max_columns: default_max_columns(),
        }
    }
}

fn default_position_file() -> PathBuf {
    PathBuf::from(".current_slide")
}

fn default_max_columns() -> u16 {
    u16::MAX
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnippetConfig {
    /// Where the output of snippets run as commands goes.
    #[serde(default)]
    pub command_output: CommandOutput,

    /// Custom snippet executors, which extend or override the built-in ones.
    #[serde(default)]
    pub custom: HashMap<SnippetLanguage, LanguageSnippetExecutionConfig>,
}

/// What to do with the output of snippets that don't have their output captured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandOutput {
    /// Throw it away.
    Discard,

    /// Let it go straight to the terminal.
    #[default]
    Terminal,
}

/// The snippet execution configuration for a specific programming language.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LanguageSnippetExecutionConfig {
    /// The filename to use for the snippet input file.
    pub filename: String,

    /// The environment variables to set before invoking every command.
    #[serde(default)]
    pub environment: HashMap<String, String>,

    /// The commands to be run when executing snippets for this programming language.
    pub commands: Vec<Vec<String>>,

    /// The marker that hides lines visually but still executes them.
    pub hidden_line_marker: Option<String>,

    /// How the output of these snippets is handled.
    #[serde(default)]
    pub mode: ExecutionMode,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// The output is captured and shown on the slide.
    #[default]
    Script,

    /// The output is not captured.
    Command,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyBindingsConfig {
    /// The keys that cause the presentation to move forwards.
    #[serde(default = "default_next_bindings")]
    pub(crate) next: Vec<KeyBinding>,

    /// The keys that cause the presentation to move backwards.
    #[serde(default = "default_previous_bindings")]
    pub(crate) previous: Vec<KeyBinding>,

    /// The key binding to jump to the first slide.
    #[serde(default = "default_first_slide_bindings")]
    pub(crate) first_slide: Vec<KeyBinding>,

    /// The key binding to jump to the last slide.
    #[serde(default = "default_last_slide_bindings")]
    pub(crate) last_slide: Vec<KeyBinding>,

    /// The key binding to run the code in the current slide or go back to its source.
    #[serde(default = "default_toggle_run_bindings")]
    pub(crate) toggle_run: Vec<KeyBinding>,

    /// The key binding to open the current slide in an editor.
    #[serde(default = "default_edit_bindings")]
    pub(crate) edit: Vec<KeyBinding>,

    /// The key binding to reload the current slide from disk.
    #[serde(default = "default_reload_bindings")]
    pub(crate) reload: Vec<KeyBinding>,

    /// The key binding to switch between the dark and light themes.
    #[serde(default = "default_toggle_theme_bindings")]
    pub(crate) toggle_theme: Vec<KeyBinding>,

    /// The key binding to close the application.
    #[serde(default = "default_exit_bindings")]
    pub(crate) exit: Vec<KeyBinding>,
}

impl Default for KeyBindingsConfig {
    fn default() -> Self {
        Self {
            next: default_next_bindings(),
            previous: default_previous_bindings(),
            first_slide: default_first_slide_bindings(),
            last_slide: default_last_slide_bindings(),
            toggle_run: default_toggle_run_bindings(),
            edit: default_edit_bindings(),
            reload: default_reload_bindings(),
            toggle_theme: default_toggle_theme_bindings(),
            exit: default_exit_bindings(),
        }
    }
}

fn make_keybindings<const N: usize>(raw_bindings: [&str; N]) -> Vec<KeyBinding> {
    let mut bindings = Vec::new();
    for binding in raw_bindings {
        bindings.push(binding.parse().expect("invalid binding"));
    }
    bindings
}

fn default_next_bindings() -> Vec<KeyBinding> {
    make_keybindings(["<page_down>", "l", "j", "<right>", "<down>", " "])
}

fn default_previous_bindings() -> Vec<KeyBinding> {
    make_keybindings(["<page_up>", "h", "k", "<left>", "<up>"])
}

fn default_first_slide_bindings() -> Vec<KeyBinding> {
    make_keybindings(["<home>", "gg"])
}

fn default_last_slide_bindings() -> Vec<KeyBinding> {
    make_keybindings(["<end>", "G"])
}

fn default_toggle_run_bindings() -> Vec<KeyBinding> {
    make_keybindings([".", "<c-e>"])
}

fn default_edit_bindings() -> Vec<KeyBinding> {
    make_keybindings(["e"])
}

fn default_reload_bindings() -> Vec<KeyBinding> {
    make_keybindings(["r", "<c-r>"])
}

fn default_toggle_theme_bindings() -> Vec<KeyBinding> {
    make_keybindings(["d"])
}

fn default_exit_bindings() -> Vec<KeyBinding> {
    make_keybindings(["q", "<c-c>"])
}
