use crate::theme::ThemeName;
use crossterm::terminal::{self, window_size};
use std::{env, io};

/// Horizontal space left empty on each side of the content.
const HORIZONTAL_MARGIN: u16 = 2;

/// Rows reserved at the bottom for the footer, including the empty row above it.
const FOOTER_ROWS: u16 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSize {
    pub rows: u16,
    pub columns: u16,
    pub width: u16,
    pub height: u16,
}

impl WindowSize {
    pub fn current() -> io::Result<Self> {
        match window_size() {
            Ok(size) if size.columns > 0 && size.rows > 0 => Ok(size.into()),
            // Some terminals don't support the ioctl used to get pixel sizes.
            _ => {
                let (columns, rows) = terminal::size()?;
                Ok(Self { rows, columns, width: 0, height: 0 })
            }
        }
    }
}

impl From<crossterm::terminal::WindowSize> for WindowSize {
    fn from(size: crossterm::terminal::WindowSize) -> Self {
        Self { rows: size.rows, columns: size.columns, width: size.width, height: size.height }
    }
}

/// The colors a terminal is able to display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum ColorCapability {
    Basic,
    Ansi256,
    TrueColor,
}

impl ColorCapability {
    pub(crate) fn detect() -> Self {
        let colorterm = env::var("COLORTERM").ok();
        let term = env::var("TERM").ok();
        Self::from_env(colorterm.as_deref(), term.as_deref())
    }

    fn from_env(colorterm: Option<&str>, term: Option<&str>) -> Self {
        if matches!(colorterm, Some("truecolor" | "24bit")) {
            Self::TrueColor
        } else if term.is_some_and(|term| term.contains("256color")) {
            Self::Ansi256
        } else {
            Self::Basic
        }
    }
}

/// Everything a slide needs to know about the place it's going to be shown in.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ViewerContext {
    /// The terminal's dimensions.
    pub(crate) window: WindowSize,

    /// The width of the area slides are drawn in.
    pub(crate) content_columns: u16,

    /// The height of the area slides are drawn in.
    pub(crate) content_rows: u16,

    pub(crate) color_capability: ColorCapability,
    pub(crate) theme: ThemeName,
}

impl ViewerContext {
    pub(crate) fn new(window: WindowSize, max_columns: u16, show_footer: bool) -> Self {
        let content_columns = window.columns.saturating_sub(HORIZONTAL_MARGIN * 2).min(max_columns).max(1);
        let footer_rows = if show_footer { FOOTER_ROWS } else { 0 };
        let content_rows = window.rows.saturating_sub(footer_rows).max(1);
        Self {
            window,
            content_columns,
            content_rows,
            color_capability: ColorCapability::Basic,
            theme: ThemeName::default(),
        }
    }

    pub(crate) fn with_color_capability(mut self, capability: ColorCapability) -> Self {
        self.color_capability = capability;
        self
    }

    pub(crate) fn with_theme(mut self, theme: ThemeName) -> Self {
        self.theme = theme;
        self
    }
}
