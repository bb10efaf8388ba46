//! # Document
//!
//! An open document: its state, its undo history, and whether it has unsaved changes.

use std::rc::Rc;

use crate::{
    commands::CommandError,
    config::{Preferences, ViewPreferences},
    history::{writer::HistoryWriter, History},
    renderer::Renderer,
    state::{
        document::DocumentState,
        journal::Journal,
        layout::{self, RenderRequest, View},
        page::PageTemplate,
    },
    util::GeometryError,
};

#[derive(Debug)]
pub struct Document {
    state: DocumentState,
    history: History,
    saved: bool,
}
impl Document {
    /// A one-page document shaped by the user's page preferences.
    pub fn new(preferences: &Preferences) -> Result<Self, GeometryError> {
        Ok(Self::from_state(DocumentState::new(
            preferences.page.template()?,
        )))
    }
    /// Wrap loaded pages. The document starts out saved, with no history.
    #[must_use]
    pub fn from_journal(journal: Journal, default_page: PageTemplate) -> Self {
        Self::from_state(DocumentState::from_journal(journal, default_page))
    }
    fn from_state(state: DocumentState) -> Self {
        Self {
            state,
            history: History::new(),
            saved: true,
        }
    }
    #[must_use]
    pub fn state(&self) -> &DocumentState {
        &self.state
    }
    #[must_use]
    pub fn journal(&self) -> &Journal {
        &self.state.journal
    }
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }
    /// Start an edit. Everything done through the writer is undone and redone together.
    pub fn write_with<'a>(&'a mut self, renderer: &'a mut dyn Renderer) -> HistoryWriter<'a> {
        HistoryWriter::new(&mut self.state, &mut self.history, &mut self.saved, renderer)
    }
    /// Undo the most recent edit. `Ok(false)` if there was none.
    pub fn undo(&mut self, renderer: &mut dyn Renderer) -> Result<bool, CommandError> {
        let undone = self.history.undo_group(&mut self.state, renderer)?;
        self.saved &= !undone;
        Ok(undone)
    }
    /// Redo the most recently undone edit. `Ok(false)` if there was none.
    pub fn redo(&mut self, renderer: &mut dyn Renderer) -> Result<bool, CommandError> {
        let redone = self.history.redo_group(&mut self.state, renderer)?;
        self.saved &= !redone;
        Ok(redone)
    }
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.saved
    }
    /// The document was written out as it is now.
    pub fn mark_saved(&mut self) {
        self.saved = true;
    }
    /// Forget all history, e.g. after reverting to the file on disk.
    pub fn clear_history(&mut self) {
        self.history.clear_redo();
        self.history.clear_undo();
    }
    /// Give everything a visual.
    pub fn materialize(&mut self, renderer: &mut dyn Renderer) {
        self.state.journal.materialize(renderer);
    }
    /// Release every visual.
    pub fn release_visuals(&mut self, renderer: &mut dyn Renderer) {
        self.state.journal.release_visuals(renderer);
    }
    /// Position pages for `view`, returning the canvas size.
    pub fn layout(&mut self, view: &View) -> [f64; 2] {
        layout::layout_pages(&mut self.state.journal, view)
    }
    /// See [`layout::schedule_background_renders`].
    pub fn schedule_background_renders(
        &mut self,
        view: &View,
        preferences: &ViewPreferences,
    ) -> Vec<RenderRequest> {
        layout::schedule_background_renders(&mut self.state.journal, view, preferences)
    }
    /// See [`layout::apply_rendered`].
    pub fn apply_rendered(
        &mut self,
        request: &RenderRequest,
        image: Rc<image::RgbaImage>,
        renderer: &mut dyn Renderer,
    ) -> bool {
        layout::apply_rendered(&mut self.state.journal, request, image, renderer)
    }
    /// Close the document, releasing visuals and history.
    pub fn close(mut self, renderer: &mut dyn Renderer) {
        self.release_visuals(renderer);
        self.clear_history();
        log::debug!("Closed a document of {} pages", self.state.journal.len());
    }
}
