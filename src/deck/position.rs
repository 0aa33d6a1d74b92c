use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Stores the index of the slide being shown so a presentation can be resumed.
#[derive(Clone, Debug)]
pub(crate) struct PositionStore {
    path: PathBuf,
}

impl PositionStore {
    pub(crate) fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored slide index.
    pub(crate) fn load(&self) -> Result<usize, PositionError> {
        let contents = fs::read_to_string(&self.path)?;
        let contents = contents.trim();
        contents.parse().map_err(|_| PositionError::Invalid(contents.to_string()))
    }

    /// Overwrite the stored slide index.
    pub(crate) fn save(&self, index: usize) -> Result<(), PositionError> {
        fs::write(&self.path, format!("{index}\n"))?;
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub(crate) enum PositionError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("invalid slide index: '{0}'")]
    Invalid(String),
}
