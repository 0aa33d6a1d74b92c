use crate::{
    code::sandbox::ExecutionSandbox,
    commands::listener::{Command, CommandListener},
    deck::Deck,
    render::{
        RenderError,
        draw::{DisplaySurface, FooterInfo, Frame},
    },
    slide::{Slide, ToggleOutcome},
    theme::{PresentationTheme, ThemeName},
    ui::exclusive::DynAlternateScreenRunner,
};
use std::{env, io, path::Path, process};

pub(crate) struct PresenterOptions {
    /// The theme to start with.
    pub(crate) theme: ThemeName,

    /// The editor command configured by the user, if any.
    pub(crate) editor: Option<String>,

    /// The key binding hints shown in the footer.
    pub(crate) hints: String,
}

/// A slideshow presenter.
///
/// This type puts everything else together.
pub(crate) struct Presenter<S: DisplaySurface> {
    deck: Deck,
    sandbox: ExecutionSandbox,
    surface: S,
    runner: DynAlternateScreenRunner,
    theme: PresentationTheme,
    editor: Option<String>,
    hints: String,
}

impl<S: DisplaySurface> Presenter<S> {
    pub(crate) fn new(deck: Deck, sandbox: ExecutionSandbox, surface: S, options: PresenterOptions) -> Self {
        Self {
            deck,
            sandbox,
            surface,
            runner: DynAlternateScreenRunner::terminal(),
            theme: PresentationTheme::new(options.theme),
            editor: options.editor,
            hints: options.hints,
        }
    }

    #[cfg(test)]
    fn with_runner(mut self, runner: DynAlternateScreenRunner) -> Self {
        self.runner = runner;
        self
    }

    /// Run a presentation.
    pub(crate) fn present(mut self, commands: &mut CommandListener) -> Result<(), PresentationError> {
        tracing::info!("presenting {} slides", self.deck.len());
        loop {
            self.render()?;
            loop {
                let Some(command) = commands.try_next_command()? else {
                    continue;
                };
                match self.apply_command(command) {
                    CommandSideEffect::Exit => return Ok(()),
                    CommandSideEffect::Redraw => break,
                    CommandSideEffect::None => (),
                };
            }
        }
    }

    /// Draw the current slide, running it first if needed.
    pub(crate) fn render(&mut self) -> Result<(), PresentationError> {
        let context = self.surface.viewer_context()?.with_theme(self.theme.name);
        tracing::debug!("rendering slide {} in {:?} mode", self.deck.index(), self.deck.current().display_mode());
        if self.deck.current().needs_exclusive_screen() {
            if let Slide::Code(slide) = self.deck.current_mut() {
                self.runner.run(slide, &context, &self.sandbox, &mut self.surface);
            }
        }
        let payload = self.deck.current_mut().render(&context, &self.sandbox);
        let footer = FooterInfo { current_slide: self.deck.index(), total_slides: self.deck.len(), hints: &self.hints };
        self.surface.mount(&Frame { payload: &payload, theme: &self.theme, footer })?;
        Ok(())
    }

    pub(crate) fn apply_command(&mut self, command: Command) -> CommandSideEffect {
        let needs_redraw = match command {
            Command::Exit => return CommandSideEffect::Exit,
            Command::Redraw => true,
            Command::Next => self.deck.next(),
            Command::Previous => self.deck.prev(),
            Command::FirstSlide => self.deck.home(),
            Command::LastSlide => self.deck.last(),
            Command::ToggleRun => match self.deck.toggle_current() {
                ToggleOutcome::Toggled(mode) => {
                    tracing::debug!("slide {} is now in {mode:?} mode", self.deck.index());
                    true
                }
                ToggleOutcome::NotRunnable => false,
            },
            Command::Edit => self.edit_current(),
            Command::Reload => {
                self.reload_current();
                true
            }
            Command::ToggleTheme => {
                self.theme = PresentationTheme::new(self.theme.name.toggled());
                true
            }
        };
        if needs_redraw { CommandSideEffect::Redraw } else { CommandSideEffect::None }
    }

    fn reload_current(&mut self) {
        if let Err(e) = self.deck.current_mut().reload() {
            tracing::warn!("failed to reload slide {}, keeping its previous contents: {e}", self.deck.index());
        }
    }

    fn edit_current(&mut self) -> bool {
        let Some(path) = self.deck.current().identity().map(Path::to_path_buf) else {
            tracing::debug!("slide {} has no file to edit", self.deck.index());
            return false;
        };
        let editor = resolve_editor(self.editor.as_deref(), |name| env::var(name).ok());
        let mut parts = editor.split_whitespace();
        let Some(program) = parts.next() else {
            return false;
        };
        tracing::info!("editing {} with {editor}", path.display());
        self.surface.suspend();
        match process::Command::new(program).args(parts).arg(&path).status() {
            Ok(status) if !status.success() => tracing::warn!("editor exited with {status}"),
            Ok(_) => (),
            Err(e) => tracing::warn!("failed to run editor '{editor}': {e}"),
        };
        self.surface.resume();
        self.reload_current();
        true
    }
}

/// Find the editor to use, looking at the configured one and then the environment.
fn resolve_editor<F>(configured: Option<&str>, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let usable = |editor: &String| !editor.trim().is_empty();
    configured
        .map(ToString::to_string)
        .filter(usable)
        .or_else(|| lookup("VISUAL").filter(usable))
        .or_else(|| lookup("EDITOR").filter(usable))
        .unwrap_or_else(|| "vi".to_string())
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CommandSideEffect {
    Exit,
    Redraw,
    None,
}

/// An error when presenting.
#[derive(thiserror::Error, Debug)]
pub enum PresentationError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("io: {0}")]
    Io(#[from] io::Error),
}
