//! An ordered set of slides and the slide being shown.

pub(crate) mod position;

use crate::slide::{Slide, ToggleOutcome};
use position::PositionStore;

/// A deck of slides.
#[derive(Debug)]
pub(crate) struct Deck {
    slides: Vec<Slide>,
    cursor: usize,
    store: Option<PositionStore>,
}

impl Deck {
    pub(crate) fn len(&self) -> usize {
        self.slides.len()
    }

    /// The index of the slide being shown.
    pub(crate) fn index(&self) -> usize {
        self.cursor
    }

    pub(crate) fn current(&self) -> &Slide {
        &self.slides[self.cursor]
    }

    pub(crate) fn current_mut(&mut self) -> &mut Slide {
        &mut self.slides[self.cursor]
    }

    /// Jump forwards.
    pub(crate) fn next(&mut self) -> bool {
        self.switch_to(self.cursor.saturating_add(1))
    }

    /// Jump backwards.
    pub(crate) fn prev(&mut self) -> bool {
        self.switch_to(self.cursor.saturating_sub(1))
    }

    /// Jump to the first slide.
    pub(crate) fn home(&mut self) -> bool {
        self.switch_to(0)
    }

    /// Jump to the last slide.
    pub(crate) fn last(&mut self) -> bool {
        self.switch_to(self.slides.len() - 1)
    }

    /// Jump to a slide that was previously stored, capping it to the last one.
    pub(crate) fn go_to_saved(&mut self, index: usize) -> bool {
        self.switch_to(index)
    }

    /// Jump to whatever slide the position store points to.
    ///
    /// If there's nothing usable stored, this goes to the first slide.
    pub(crate) fn resume(&mut self) -> bool {
        let index = match &self.store {
            Some(store) => match store.load() {
                Ok(index) => index,
                Err(e) => {
                    tracing::warn!("could not load slide position from {}: {e}", store.path().display());
                    0
                }
            },
            None => 0,
        };
        self.go_to_saved(index)
    }

    /// Toggle the slide being shown between its source and its output.
    pub(crate) fn toggle_current(&mut self) -> ToggleOutcome {
        if !self.current().is_executable() {
            tracing::debug!("slide {} has nothing to run", self.cursor);
        }
        self.current_mut().toggle()
    }

    pub(crate) fn slides(&self) -> impl Iterator<Item = &Slide> {
        self.slides.iter()
    }

    fn switch_to(&mut self, index: usize) -> bool {
        let index = index.min(self.slides.len() - 1);
        if index == self.cursor {
            return false;
        }
        tracing::debug!("moving from slide {} to {index}", self.cursor);
        self.cursor = index;
        self.persist();
        true
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.save(self.cursor) {
            tracing::warn!("could not store slide position in {}: {e}", store.path().display());
        }
    }
}

/// Builds a [Deck].
#[derive(Default)]
pub(crate) struct DeckBuilder {
    slides: Vec<Slide>,
    store: Option<PositionStore>,
}

impl DeckBuilder {
    pub(crate) fn slide<S: Into<Slide>>(mut self, slide: S) -> Self {
        self.slides.push(slide.into());
        self
    }

    pub(crate) fn position_store(mut self, store: PositionStore) -> Self {
        self.store = Some(store);
        self
    }

    pub(crate) fn build(self) -> Result<Deck, DeckBuildError> {
        if self.slides.is_empty() {
            return Err(DeckBuildError::Empty);
        }
        Ok(Deck { slides: self.slides, cursor: 0, store: self.store })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DeckBuildError {
    #[error("presentation has no slides")]
    Empty,
}
