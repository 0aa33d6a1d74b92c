use crate::markdown::text_style::{Colors, TextStyle};
use crossterm::{
    QueueableCommand, cursor, style,
    terminal::{self},
};
use std::io::{self, Write};

#[derive(Debug, PartialEq)]
pub(crate) enum TerminalCommand<'a> {
    BeginUpdate,
    EndUpdate,
    MoveTo { column: u16, row: u16 },
    PrintText { content: &'a str, style: TextStyle },
    ClearScreen,
    SetColors(Colors),
    Flush,
}

pub(crate) trait TerminalIo {
    fn execute(&mut self, command: &TerminalCommand<'_>) -> Result<(), TerminalError>;

    /// Hand the terminal back to the user, e.g. to run a program that needs it.
    fn suspend(&mut self) {}

    /// Take the terminal back after a [TerminalIo::suspend].
    fn resume(&mut self) {}
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum TerminalError {
    #[error("io: {0}")]
    Io(#[from] io::Error),
}

/// A wrapper over the terminal write handle.
pub(crate) struct Terminal<I: TerminalWrite> {
    writer: I,
    suspended: bool,
}

impl<I: TerminalWrite> Terminal<I> {
    pub(crate) fn new(mut writer: I) -> io::Result<Self> {
        writer.init()?;
        Ok(Self { writer, suspended: false })
    }

    fn move_to(&mut self, column: u16, row: u16) -> io::Result<()> {
        self.writer.queue(cursor::MoveTo(column, row))?;
        Ok(())
    }

    fn print_text(&mut self, content: &str, style: &TextStyle) -> io::Result<()> {
        let content = style.apply(content);
        self.writer.queue(style::PrintStyledContent(content))?;
        Ok(())
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        self.writer.queue(terminal::Clear(terminal::ClearType::All))?;
        Ok(())
    }

    fn set_colors(&mut self, colors: Colors) -> io::Result<()> {
        self.writer.queue(style::ResetColor)?;
        self.writer.queue(style::SetColors(colors.into()))?;
        Ok(())
    }
}

impl<I: TerminalWrite> TerminalIo for Terminal<I> {
    fn execute(&mut self, command: &TerminalCommand<'_>) -> Result<(), TerminalError> {
        use TerminalCommand::*;
        match command {
            BeginUpdate => {
                self.writer.queue(terminal::BeginSynchronizedUpdate)?;
            }
            EndUpdate => {
                self.writer.queue(terminal::EndSynchronizedUpdate)?;
            }
            MoveTo { column, row } => self.move_to(*column, *row)?,
            PrintText { content, style } => self.print_text(content, style)?,
            ClearScreen => self.clear_screen()?,
            SetColors(colors) => self.set_colors(*colors)?,
            Flush => self.writer.flush()?,
        };
        Ok(())
    }

    fn suspend(&mut self) {
        if !self.suspended {
            self.writer.deinit();
            self.suspended = true;
        }
    }

    fn resume(&mut self) {
        if self.suspended {
            if let Err(e) = self.writer.init() {
                tracing::warn!("failed to reinitialize terminal: {e}");
            }
            self.suspended = false;
        }
    }
}

impl<I: TerminalWrite> Drop for Terminal<I> {
    fn drop(&mut self) {
        if !self.suspended {
            let _ = self.writer.queue(style::ResetColor);
            self.writer.deinit();
        }
    }
}

pub(crate) fn should_hide_cursor() -> bool {
    // WezTerm on Windows misbehaves when the cursor is hidden.
    let term = std::env::var("TERM_PROGRAM");
    let is_wezterm = term.as_ref().map(|s| s.as_str()) == Ok("WezTerm");
    !(is_windows_based_os() && is_wezterm)
}

fn is_windows_based_os() -> bool {
    let is_windows = std::env::consts::OS == "windows";
    let is_wsl = std::env::var("WSL_DISTRO_NAME").is_ok();
    is_windows || is_wsl
}

pub(crate) trait TerminalWrite: io::Write {
    fn init(&mut self) -> io::Result<()>;
    fn deinit(&mut self);
}

impl TerminalWrite for io::Stdout {
    fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        if should_hide_cursor() {
            self.queue(cursor::Hide)?;
        }
        self.queue(terminal::EnterAlternateScreen)?;
        self.flush()
    }

    fn deinit(&mut self) {
        let _ = self.queue(terminal::LeaveAlternateScreen);
        if should_hide_cursor() {
            let _ = self.queue(cursor::Show);
        }
        let _ = self.flush();
        let _ = terminal::disable_raw_mode();
    }
}
