//! # History
//!
//! Linear undo and redo stacks of [`UndoItem`]s. Entries recorded together form a group, marked with [`MultiOp`]
//! continuation flags, and are undone and redone as one.

pub mod writer;

use crate::{
    commands::{CommandConsumer, CommandError, DoUndo, UndoItem},
    renderer::Renderer,
    state::document::DocumentState,
};

bitflags::bitflags! {
    /// Continuation flags chaining an entry to its neighbors in a group.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct MultiOp : u8 {
        /// Undoing this entry continues into the one recorded before it.
        const CONT_UNDO = 0b0000_0001;
        /// Redoing this entry continues into the one recorded after it.
        const CONT_REDO = 0b0000_0010;
    }
}

#[derive(Debug, PartialEq)]
pub struct Entry {
    pub command: UndoItem,
    pub multiop: MultiOp,
}

#[derive(Debug, Default)]
pub struct History {
    /// Oldest first.
    undo: Vec<Entry>,
    /// Next to redo last.
    redo: Vec<Entry>,
}
impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Entries that can be undone, oldest first.
    #[must_use]
    pub fn undo_entries(&self) -> &[Entry] {
        &self.undo
    }
    /// Entries that can be redone, the next one to redo last.
    #[must_use]
    pub fn redo_entries(&self) -> &[Entry] {
        &self.redo
    }
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
    /// Push already-applied commands as one group, discarding everything redoable.
    pub fn record(&mut self, commands: impl IntoIterator<Item = UndoItem>) {
        let commands: Vec<_> = commands.into_iter().collect();
        if commands.is_empty() {
            return;
        }
        self.clear_redo();
        let last = commands.len() - 1;
        for (nth, command) in commands.into_iter().enumerate() {
            let mut multiop = MultiOp::empty();
            multiop.set(MultiOp::CONT_UNDO, nth != 0);
            multiop.set(MultiOp::CONT_REDO, nth != last);
            log::trace!("Recording {}, {multiop:?}", command.kind());
            self.undo.push(Entry { command, multiop });
        }
    }
    /// Drop every redoable entry, most recent first. Whatever they own goes with them.
    pub fn clear_redo(&mut self) {
        while let Some(entry) = self.redo.pop() {
            log::trace!("Discarding redo {}", entry.command.kind());
        }
    }
    /// Drop every undoable entry, most recent first.
    pub fn clear_undo(&mut self) {
        while let Some(entry) = self.undo.pop() {
            log::trace!("Discarding undo {}", entry.command.kind());
        }
    }
    /// Undo the most recent group. `Ok(false)` if there was nothing to undo.
    ///
    /// If any entry of the group is refused, the entries of the group already undone are redone, and the error
    /// is returned with both stacks as they were.
    pub fn undo_group(
        &mut self,
        state: &mut DocumentState,
        renderer: &mut dyn Renderer,
    ) -> Result<bool, CommandError> {
        if self.undo.is_empty() {
            return Ok(false);
        }
        let mut processed = 0usize;
        while let Some(mut entry) = self.undo.pop() {
            log::trace!("Undoing {}", entry.command.kind());
            if let Err(err) = state.apply(DoUndo::Undo(&mut entry.command), renderer) {
                log::warn!("Undo of {} refused: {err}", entry.command.kind());
                self.undo.push(entry);
                self.roll_back(processed, Direction::Undo, state, renderer);
                return Err(err);
            }
            let more = entry.multiop.contains(MultiOp::CONT_UNDO);
            self.redo.push(entry);
            processed += 1;
            if !more {
                break;
            }
        }
        Ok(true)
    }
    /// Redo the next group. `Ok(false)` if there was nothing to redo.
    ///
    /// Refusals are rolled back as in [`Self::undo_group`].
    pub fn redo_group(
        &mut self,
        state: &mut DocumentState,
        renderer: &mut dyn Renderer,
    ) -> Result<bool, CommandError> {
        if self.redo.is_empty() {
            return Ok(false);
        }
        let mut processed = 0usize;
        while let Some(mut entry) = self.redo.pop() {
            log::trace!("Redoing {}", entry.command.kind());
            if let Err(err) = state.apply(DoUndo::Do(&mut entry.command), renderer) {
                log::warn!("Redo of {} refused: {err}", entry.command.kind());
                self.redo.push(entry);
                self.roll_back(processed, Direction::Redo, state, renderer);
                return Err(err);
            }
            let more = entry.multiop.contains(MultiOp::CONT_REDO);
            self.undo.push(entry);
            processed += 1;
            if !more {
                break;
            }
        }
        Ok(true)
    }
    /// Reverse the last `count` entries moved by a failed group walk.
    fn roll_back(
        &mut self,
        count: usize,
        failed: Direction,
        state: &mut DocumentState,
        renderer: &mut dyn Renderer,
    ) {
        if count != 0 {
            log::warn!("Rolling back {count} entries of a partial group");
        }
        for _ in 0..count {
            let (from, to) = match failed {
                Direction::Undo => (&mut self.redo, &mut self.undo),
                Direction::Redo => (&mut self.undo, &mut self.redo),
            };
            let Some(mut entry) = from.pop() else {
                return;
            };
            let result = match failed {
                Direction::Undo => state.apply(DoUndo::Do(&mut entry.command), renderer),
                Direction::Redo => state.apply(DoUndo::Undo(&mut entry.command), renderer),
            };
            // Each of these was just applied in the other direction.
            if let Err(err) = result {
                panic!("rollback of {} failed: {err}", entry.command.kind());
            }
            to.push(entry);
        }
    }
}
impl Drop for History {
    fn drop(&mut self) {
        self.clear_redo();
        self.clear_undo();
    }
}

#[derive(Copy, Clone)]
enum Direction {
    Undo,
    Redo,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        config::PagePreferences, renderer::NullRenderer, state::page::PageID,
    };

    fn state() -> DocumentState {
        DocumentState::new(PagePreferences::default().template().unwrap())
    }
    fn resize(page: PageID, side: f64) -> UndoItem {
        UndoItem::PaperResize {
            page,
            size: [side, side],
        }
    }

    #[test]
    fn group_flags() {
        let mut history = History::new();
        let page = PageID::default();
        history.record([resize(page, 1.0), resize(page, 2.0), resize(page, 3.0)]);
        history.record([resize(page, 4.0)]);
        let flags: Vec<_> = history.undo_entries().iter().map(|entry| entry.multiop).collect();
        assert_eq!(
            flags,
            [
                MultiOp::CONT_REDO,
                MultiOp::CONT_UNDO | MultiOp::CONT_REDO,
                MultiOp::CONT_UNDO,
                MultiOp::empty(),
            ]
        );
    }
    #[test]
    fn group_undo_redo() {
        let mut state = state();
        let page = state.journal().pages()[0].id();
        let mut history = History::new();
        // Entries hold the size *not* in use; pretend the page went 612x792 -> 100 -> 200.
        history.record([resize(page, 612.0), resize(page, 100.0)]);
        state.journal.page_at_mut(0).unwrap().replace_size([200.0, 200.0], &mut NullRenderer).unwrap();

        assert_eq!(history.undo_group(&mut state, &mut NullRenderer), Ok(true));
        assert_eq!(state.journal().pages()[0].size(), [612.0, 612.0]);
        assert_eq!(history.redo_entries().len(), 2);
        assert_eq!(history.undo_group(&mut state, &mut NullRenderer), Ok(false));

        assert_eq!(history.redo_group(&mut state, &mut NullRenderer), Ok(true));
        assert_eq!(state.journal().pages()[0].size(), [200.0, 200.0]);
        assert_eq!(history.redo_group(&mut state, &mut NullRenderer), Ok(false));
    }
    #[test]
    fn failed_group_rolls_back() {
        let mut state = state();
        let page = state.journal().pages()[0].id();
        let mut history = History::new();
        history.record([resize(PageID::default(), 5.0), resize(page, 300.0)]);
        let before = state.journal().pages()[0].size();

        let result = history.undo_group(&mut state, &mut NullRenderer);
        assert_eq!(result, Err(CommandError::UnknownResource));
        assert_eq!(state.journal().pages()[0].size(), before);
        assert_eq!(history.undo_entries().len(), 2);
        assert!(!history.can_redo());
        assert_eq!(
            history.undo_entries()[1].command,
            resize(page, 300.0)
        );
    }
    #[test]
    fn new_record_discards_redo() {
        let mut state = state();
        let page = state.journal().pages()[0].id();
        let mut history = History::new();
        history.record([resize(page, 300.0)]);
        history.undo_group(&mut state, &mut NullRenderer).unwrap();
        assert!(history.can_redo());
        history.record([resize(page, 10.0)]);
        assert!(!history.can_redo());
        assert_eq!(history.redo_group(&mut state, &mut NullRenderer), Ok(false));
        history.clear_undo();
        assert!(!history.can_undo());
    }
}
