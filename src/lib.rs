//! livedeck: a terminal slide deck for live-coding talks.
//!
//! This is not meant to be used as a crate!

pub(crate) mod code;
pub(crate) mod commands;
pub(crate) mod config;
pub(crate) mod deck;
pub(crate) mod launcher;
pub(crate) mod logging;
pub(crate) mod manifest;
pub(crate) mod markdown;
pub(crate) mod presenter;
pub(crate) mod render;
pub(crate) mod slide;
pub(crate) mod terminal;
pub(crate) mod theme;
pub(crate) mod ui;
pub(crate) mod utils;

pub use crate::{
    launcher::{LaunchOptions, launch},
    logging::initialize_logging,
};
