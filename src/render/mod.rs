pub(crate) mod draw;
pub(crate) mod payload;
pub(crate) mod properties;

use crate::terminal::printer::TerminalError;
use std::io;

/// A rendering error.
#[derive(thiserror::Error, Debug)]
pub(crate) enum RenderError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("terminal: {0}")]
    Terminal(#[from] TerminalError),
}
