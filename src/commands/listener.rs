use super::keyboard::{CommandKeyBindings, KeyBindingsValidationError, KeyboardListener};
use crate::config::KeyBindingsConfig;
use std::{io, time::Duration};
use strum::EnumDiscriminants;

/// Polls the keyboard for commands.
pub(crate) struct CommandListener {
    keyboard: KeyboardListener,
}

impl CommandListener {
    pub(crate) fn new(config: KeyBindingsConfig) -> Result<Self, KeyBindingsValidationError> {
        let bindings = CommandKeyBindings::try_from(config)?;
        Ok(Self { keyboard: KeyboardListener::new(bindings) })
    }

    /// A short description of the key bindings.
    pub(crate) fn footer_hints(&self) -> String {
        self.keyboard.bindings().footer_hints()
    }

    /// Try to get the next command.
    ///
    /// This attempts to get a command and returns `Ok(None)` on timeout.
    pub(crate) fn try_next_command(&mut self) -> io::Result<Option<Command>> {
        self.keyboard.poll_next_command(Duration::from_millis(100))
    }
}

/// A command.
#[derive(Clone, Debug, PartialEq, Eq, EnumDiscriminants)]
pub(crate) enum Command {
    /// Redraw the presentation.
    ///
    /// This can happen on terminal resize.
    Redraw,

    /// Move forward in the presentation.
    Next,

    /// Move backwards in the presentation.
    Previous,

    /// Go to the first slide.
    FirstSlide,

    /// Go to the last slide.
    LastSlide,

    /// Run the code in the current slide, or go back to its source.
    ToggleRun,

    /// Open the current slide in an editor.
    Edit,

    /// Read the current slide again from disk.
    Reload,

    /// Switch between the dark and light themes.
    ToggleTheme,

    /// Exit the presentation.
    Exit,
}
