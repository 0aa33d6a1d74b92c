//! The file that lists the slides in a presentation.

use crate::{
    code::snippet::SnippetLanguage,
    deck::{Deck, DeckBuildError, DeckBuilder, position::PositionStore},
    slide::{
        CodeSlide, DisplayMode, MarkdownSlide, Slide,
        func::{FuncSlide, FunctionRegistry},
        source::{SourceLoadError, SourceText},
    },
};
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// A presentation manifest.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Manifest {
    slides: Vec<SlideEntry>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
enum SlideEntry {
    Markdown {
        source: String,
    },
    Code {
        source: String,
        language: SnippetLanguage,
        #[serde(default)]
        mode: DisplayMode,
        #[serde(default)]
        exclusive: bool,
        #[serde(default = "default_wait_for_key")]
        wait_for_key: bool,
        title: Option<String>,
    },
    Dynamic {
        source: String,
        language: SnippetLanguage,
        title: Option<String>,
    },
    Function {
        name: String,
    },
}

fn default_wait_for_key() -> bool {
    true
}

impl Manifest {
    /// Load a manifest from a file.
    pub(crate) fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents =
            fs::read_to_string(path).map_err(|source| ManifestError::Reading { path: path.to_path_buf(), source })?;
        Self::parse(&contents)
    }

    pub(crate) fn parse(contents: &str) -> Result<Self, ManifestError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Build a deck out of this manifest.
    ///
    /// Slide sources are looked up relative to `base_dir`.
    pub(crate) fn build_deck(
        self,
        base_dir: &Path,
        functions: &FunctionRegistry,
        store: Option<PositionStore>,
    ) -> Result<Deck, ManifestError> {
        let mut builder = DeckBuilder::default();
        for entry in self.slides {
            builder = builder.slide(Self::build_slide(entry, base_dir, functions)?);
        }
        if let Some(store) = store {
            builder = builder.position_store(store);
        }
        Ok(builder.build()?)
    }

    fn build_slide(entry: SlideEntry, base_dir: &Path, functions: &FunctionRegistry) -> Result<Slide, ManifestError> {
        let slide = match entry {
            SlideEntry::Markdown { source } => MarkdownSlide::new(SourceText::resolve(&source, base_dir)?).into(),
            SlideEntry::Code { source, language, mode, exclusive, wait_for_key, title } => {
                CodeSlide::new(SourceText::resolve(&source, base_dir)?, language)
                    .with_mode(mode)
                    .exclusive(exclusive)
                    .wait_for_key(wait_for_key)
                    .title(title)
                    .into()
            }
            SlideEntry::Dynamic { source, language, title } => {
                CodeSlide::dynamic(SourceText::resolve(&source, base_dir)?, language).title(title).into()
            }
            SlideEntry::Function { name } => {
                let function = functions.get(&name).ok_or_else(|| ManifestError::UnknownFunction(name.clone()))?;
                FuncSlide::new(name, function).into()
            }
        };
        Ok(slide)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ManifestError {
    #[error("reading {path}: {source}")]
    Reading { path: PathBuf, source: io::Error },

    #[error("invalid manifest: {0}")]
    Invalid(#[from] serde_yaml::Error),

    #[error(transparent)]
    Source(#[from] SourceLoadError),

    #[error("unknown slide function '{0}'")]
    UnknownFunction(String),

    #[error(transparent)]
    Build(#[from] DeckBuildError),
}
