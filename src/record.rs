//! A linear undo-redo history.

mod builder;
mod display;

pub use self::builder::Builder;
pub use self::display::Display;

use crate::entry::Group;
use crate::socket::{Socket, State};
use crate::{Command, Entry, Merged, Slot};
use core::num::NonZeroUsize;
use std::collections::VecDeque;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A linear record of commands applied to a target.
///
/// The record holds the commands in the order they were applied together with
/// a cursor that separates the undone tail from the applied head. Pushing a
/// new command while the cursor is not at the end discards everything after
/// the cursor. Use [`History`](crate::History) instead if the discarded
/// commands should stay reachable.
///
/// A [`Slot`] can be connected to the record and is sent [`Signal`](crate::Signal)s
/// whenever an observable value of the record changes.
///
/// # Examples
/// ```
/// # use retrace::{Add, Record};
/// let mut target = String::new();
/// let mut record = Record::new();
/// record.push(&mut target, Add('a'));
/// record.push(&mut target, Add('b'));
/// record.undo(&mut target);
/// assert_eq!(target, "a");
/// record.push(&mut target, Add('c'));
/// assert_eq!(target, "ac");
/// // 'b' was discarded when 'c' was pushed.
/// record.undo(&mut target);
/// record.redo(&mut target);
/// assert_eq!(target, "ac");
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(bound(serialize = "C: Serialize", deserialize = "C: Deserialize<'de>"))
)]
#[derive(Clone, Debug)]
pub struct Record<C, S = ()> {
    pub(crate) entries: VecDeque<Entry<C>>,
    pub(crate) index: usize,
    pub(crate) limit: Option<NonZeroUsize>,
    pub(crate) clean: Option<usize>,
    #[cfg_attr(feature = "serde", serde(default, skip))]
    pub(crate) socket: Socket<S>,
    #[cfg_attr(feature = "serde", serde(default, skip))]
    pub(crate) open: Vec<Group<C>>,
    #[cfg_attr(feature = "serde", serde(default, skip))]
    pub(crate) replaying: bool,
}

impl<C> Record<C> {
    /// Returns a new record with no limit and no slot connected.
    pub fn new() -> Record<C> {
        Builder::new().build()
    }
}

impl<C, S> Record<C, S> {
    /// Returns a builder for a record.
    pub fn builder() -> Builder<C, S> {
        Builder::new()
    }

    /// Returns the number of committed entries in the record.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the record holds no committed entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the limit of the record, with zero meaning unbounded.
    pub fn limit(&self) -> usize {
        self.limit.map_or(0, NonZeroUsize::get)
    }

    /// Sets the limit of the record, with zero meaning unbounded.
    ///
    /// The limit can only be changed while the record is empty, and `false`
    /// is returned otherwise.
    pub fn set_limit(&mut self, limit: usize) -> bool {
        if !self.entries.is_empty() || !self.open.is_empty() {
            warn!("set_limit ignored: the record is not empty");
            return false;
        }
        self.limit = NonZeroUsize::new(limit);
        true
    }

    /// Connects a slot to the record, returning the previous slot if any.
    pub fn connect(&mut self, slot: S) -> Option<S> {
        self.socket.connect(Some(slot))
    }

    /// Disconnects the slot from the record and returns it.
    pub fn disconnect(&mut self) -> Option<S> {
        self.socket.disconnect()
    }

    /// Returns the position of the cursor in the record.
    ///
    /// The cursor sits between entries, so it ranges from zero up to and
    /// including [`len`](Record::len).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns `true` if the record can undo.
    pub fn can_undo(&self) -> bool {
        self.open.is_empty() && self.index > 0
    }

    /// Returns `true` if the record can redo.
    pub fn can_redo(&self) -> bool {
        self.open.is_empty() && self.index < self.entries.len()
    }

    /// Returns `true` if the target is in the clean state.
    pub fn is_clean(&self) -> bool {
        self.open.is_empty() && self.clean == Some(self.index)
    }

    /// Returns `true` if the target is in a dirty state.
    pub fn is_dirty(&self) -> bool {
        !self.is_clean()
    }

    /// Returns the position the target was last marked clean at, if it is
    /// still reachable.
    pub fn clean_index(&self) -> Option<usize> {
        self.clean
    }

    /// Returns `true` if a macro is currently being recorded.
    pub fn in_macro(&self) -> bool {
        !self.open.is_empty()
    }

    /// Returns an iterator over the committed entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &Entry<C>> {
        self.entries.iter()
    }
}

impl<C: Command, S> Record<C, S> {
    /// Returns the caption of the entry that an undo would revert.
    pub fn undo_caption(&self) -> Option<String> {
        self.can_undo()
            .then(|| self.entries[self.index - 1].caption())
    }

    /// Returns the caption of the entry that a redo would reapply.
    pub fn redo_caption(&self) -> Option<String> {
        self.can_redo().then(|| self.entries[self.index].caption())
    }

    pub(crate) fn state(&self) -> State {
        State {
            index: self.index,
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            is_clean: self.is_clean(),
            undo_caption: self.undo_caption(),
            redo_caption: self.redo_caption(),
        }
    }
}

impl<C: Command, S: Slot> Record<C, S> {
    /// Applies the command on the target and commits it to the record.
    ///
    /// Entries after the cursor are discarded, and a clean mark inside the
    /// discarded range is forgotten. The command is merged into the previous
    /// entry when both carry the same merge tag and the cursor is not at the
    /// clean position. While a macro is open the command becomes a child of
    /// the innermost group instead.
    ///
    /// Returns `false` only when the call is ignored because a replay is in
    /// progress.
    pub fn push(&mut self, target: &mut C::Target, mut command: C) -> bool {
        if self.replaying {
            warn!("push ignored: called while a replay is in progress");
            return false;
        }
        let was = self.state();
        command.apply(target);
        if let Some(group) = self.open.last_mut() {
            group.absorb(command);
        } else {
            self.entries.truncate(self.index);
            self.clean = self.clean.filter(|&clean| clean <= self.index);
            let at_clean = self.clean == Some(self.index);
            let merged = match self.entries.back_mut() {
                Some(last) if !at_clean && crate::mergeable(last.merge_id(), command.merge_id()) => {
                    last.merge(command)
                }
                _ => Merged::No(command),
            };
            if let Merged::No(command) = merged {
                self.entries.push_back(Entry::Command(command));
                self.index += 1;
            }
            self.enforce_limit();
        }
        was.emit_diff(self.state(), &mut self.socket);
        true
    }

    /// Reverts the entry before the cursor.
    ///
    /// Returns `false` if there is nothing to undo or a macro is open.
    pub fn undo(&mut self, target: &mut C::Target) -> bool {
        if self.in_macro() {
            warn!("undo ignored: a macro is open");
            return false;
        }
        self.index > 0 && self.go_to(target, self.index - 1)
    }

    /// Reapplies the entry after the cursor.
    ///
    /// Returns `false` if there is nothing to redo or a macro is open.
    pub fn redo(&mut self, target: &mut C::Target) -> bool {
        if self.in_macro() {
            warn!("redo ignored: a macro is open");
            return false;
        }
        self.index < self.entries.len() && self.go_to(target, self.index + 1)
    }

    /// Repeatedly undoes or redoes until the cursor is at `index`.
    ///
    /// An index past the end is clamped to the end. The connected slot
    /// receives one consolidated batch of signals for the whole walk.
    pub fn go_to(&mut self, target: &mut C::Target, index: usize) -> bool {
        if self.replaying {
            warn!("go_to ignored: called while a replay is in progress");
            return false;
        }
        if self.in_macro() {
            warn!("go_to ignored: a macro is open");
            return false;
        }
        let index = index.min(self.entries.len());
        let was = self.state();
        self.replaying = true;
        while self.index > index {
            self.entries[self.index - 1].revert(target);
            self.index -= 1;
        }
        while self.index < index {
            self.entries[self.index].apply(target);
            self.index += 1;
        }
        self.replaying = false;
        was.emit_diff(self.state(), &mut self.socket);
        true
    }

    /// Opens a macro with the given caption.
    ///
    /// Commands pushed until the matching [`end_macro`](Record::end_macro)
    /// become children of one atomic group. Macros nest; only the outermost
    /// `end_macro` commits an entry. Undo and redo are unavailable while a
    /// macro is open.
    pub fn begin_macro(&mut self, caption: impl Into<String>) {
        let was = self.state();
        if self.open.is_empty() {
            self.entries.truncate(self.index);
            self.clean = self.clean.filter(|&clean| clean <= self.index);
        }
        self.open.push(Group::new(caption.into()));
        was.emit_diff(self.state(), &mut self.socket);
    }

    /// Closes the innermost open macro.
    ///
    /// Returns `false` if no macro is open.
    pub fn end_macro(&mut self) -> bool {
        let was = self.state();
        let Some(group) = self.open.pop() else {
            warn!("end_macro ignored: no open macro");
            return false;
        };
        match self.open.last_mut() {
            Some(outer) => outer.push(Entry::Group(group)),
            None => {
                self.entries.push_back(Entry::Group(group));
                self.index += 1;
                self.enforce_limit();
            }
        }
        was.emit_diff(self.state(), &mut self.socket);
        true
    }

    /// Marks or unmarks the current position as the clean state.
    pub fn set_clean(&mut self, clean: bool) {
        let was = self.state();
        self.clean = clean.then_some(self.index);
        was.emit_diff(self.state(), &mut self.socket);
    }

    /// Removes all entries from the record without touching the target.
    pub fn clear(&mut self) {
        let was = self.state();
        let was_clean = self.is_clean();
        self.entries.clear();
        self.open.clear();
        self.index = 0;
        self.clean = was_clean.then_some(0);
        was.emit_diff(self.state(), &mut self.socket);
    }

    fn enforce_limit(&mut self) {
        if let Some(limit) = self.limit {
            while self.entries.len() > limit.get() {
                self.entries.pop_front();
                self.index -= 1;
                self.clean = self.clean.and_then(|clean| clean.checked_sub(1));
            }
        }
    }
}

impl<C: Command, S> Record<C, S> {
    /// Returns a structure for configurable formatting of the record.
    pub fn display(&self) -> Display<C, S> {
        Display::from(self)
    }
}

impl<C> Default for Record<C> {
    fn default() -> Record<C> {
        Record::new()
    }
}
