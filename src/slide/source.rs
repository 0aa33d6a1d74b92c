use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// The text a slide is built from, along with the file it came from, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SourceText {
    identity: Option<PathBuf>,
    content: String,
}

impl SourceText {
    /// Load the contents of a file.
    pub(crate) fn from_path<P: Into<PathBuf>>(path: P) -> Result<Self, SourceLoadError> {
        let path = path.into();
        let content = read(&path)?;
        Ok(Self { identity: Some(path), content })
    }

    /// Use a piece of text as is.
    pub(crate) fn from_text<S: Into<String>>(text: S) -> Self {
        Self { identity: None, content: text.into() }
    }

    /// Treat `source` as a path relative to `base_dir` if such a file exists, otherwise as literal
    /// text.
    pub(crate) fn resolve(source: &str, base_dir: &Path) -> Result<Self, SourceLoadError> {
        let looks_like_path = !source.contains('\n') && !source.trim().is_empty();
        if looks_like_path {
            let path = base_dir.join(source.trim());
            if path.is_file() {
                return Self::from_path(path);
            }
        }
        Ok(Self::from_text(source))
    }

    pub(crate) fn identity(&self) -> Option<&Path> {
        self.identity.as_deref()
    }

    pub(crate) fn content(&self) -> &str {
        &self.content
    }

    /// Read the contents again from the file this came from.
    ///
    /// This is a no-op for literal text. On error, the current contents are kept.
    pub(crate) fn reload(&mut self) -> Result<(), SourceLoadError> {
        if let Some(path) = &self.identity {
            self.content = read(path)?;
        }
        Ok(())
    }
}

fn read(path: &Path) -> Result<String, SourceLoadError> {
    fs::read_to_string(path).map_err(|source| SourceLoadError { path: path.to_path_buf(), source })
}

#[derive(thiserror::Error, Debug)]
#[error("reading {path}: {source}")]
pub struct SourceLoadError {
    pub(crate) path: PathBuf,
    pub(crate) source: io::Error,
}
