//! Module used to communicate changes in the data structures.

use core::mem;
use std::sync::mpsc::{Sender, SyncSender};

/// Slot wrapper that adds some additional functionality.
#[derive(Clone, Debug)]
pub(crate) struct Socket<S>(Option<S>);

impl<S> Socket<S> {
    pub const fn new(slot: S) -> Socket<S> {
        Socket(Some(slot))
    }

    pub fn connect(&mut self, slot: Option<S>) -> Option<S> {
        mem::replace(&mut self.0, slot)
    }

    pub fn disconnect(&mut self) -> Option<S> {
        self.0.take()
    }
}

impl<S> Default for Socket<S> {
    fn default() -> Self {
        Socket(None)
    }
}

impl<S: Slot> Socket<S> {
    pub fn emit(&mut self, signal: impl FnOnce() -> Signal) {
        if let Some(slot) = &mut self.0 {
            slot.on_emit(signal());
        }
    }

    pub fn emit_if(&mut self, cond: bool, signal: impl FnOnce() -> Signal) {
        if cond {
            self.emit(signal);
        }
    }
}

/// The `Signal` describes a state change done to the data structures.
///
/// Each signal is emitted at most once per operation, and only when the
/// observed value actually changed. See [`Slot`] for more information.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Signal {
    /// Emitted when the position in the history has changed.
    ///
    /// For a record this is the cursor, for a history the current node id.
    Index {
        /// The position before the operation.
        from: usize,
        /// The position after the operation.
        to: usize,
    },
    /// Emitted when the structures ability to undo has changed.
    Undo(bool),
    /// Emitted when the structures ability to redo has changed.
    Redo(bool),
    /// Emitted when the clean state has changed.
    Clean(bool),
    /// Emitted when the caption of the next command to undo has changed.
    UndoCaption(Option<String>),
    /// Emitted when the caption of the next command to redo has changed.
    RedoCaption(Option<String>),
}

/// Use this to handle signals emitted.
///
/// This allows you to trigger events on certain state changes, for example
/// enabling and disabling the undo and redo menu entries of an application.
///
/// # Examples
/// ```
/// # use std::sync::mpsc;
/// # use retrace::{Add, Record, Signal};
/// let (sender, receiver) = mpsc::channel();
/// let mut iter = receiver.try_iter();
///
/// let mut target = String::new();
/// let mut record = Record::builder()
///     .connect(sender)
///     .build();
///
/// record.push(&mut target, Add('a'));
/// assert_eq!(iter.next(), Some(Signal::Undo(true)));
/// assert_eq!(iter.next(), Some(Signal::Clean(false)));
/// assert_eq!(
///     iter.next(),
///     Some(Signal::UndoCaption(Some("add 'a'".into())))
/// );
/// assert_eq!(iter.next(), Some(Signal::Index { from: 0, to: 1 }));
/// assert_eq!(iter.next(), None);
/// ```
pub trait Slot {
    /// Receives a signal that describes the state change done to the
    /// data structures.
    fn on_emit(&mut self, signal: Signal);
}

impl Slot for () {
    fn on_emit(&mut self, _: Signal) {}
}

impl<F: FnMut(Signal)> Slot for F {
    fn on_emit(&mut self, signal: Signal) {
        self(signal)
    }
}

impl Slot for Sender<Signal> {
    fn on_emit(&mut self, signal: Signal) {
        self.send(signal).ok();
    }
}

impl Slot for SyncSender<Signal> {
    fn on_emit(&mut self, signal: Signal) {
        self.send(signal).ok();
    }
}

/// Snapshot of the observable values of a record or history.
///
/// Taken before an operation and compared against the state afterwards, so
/// every signal is emitted at most once per operation. The index signal is
/// emitted last and covers a whole replay walk.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct State {
    pub index: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    pub is_clean: bool,
    pub undo_caption: Option<String>,
    pub redo_caption: Option<String>,
}

impl State {
    pub fn emit_diff<S: Slot>(self, now: State, socket: &mut Socket<S>) {
        socket.emit_if(self.can_undo != now.can_undo, || Signal::Undo(now.can_undo));
        socket.emit_if(self.can_redo != now.can_redo, || Signal::Redo(now.can_redo));
        socket.emit_if(self.is_clean != now.is_clean, || Signal::Clean(now.is_clean));
        if self.undo_caption != now.undo_caption {
            socket.emit(|| Signal::UndoCaption(now.undo_caption.clone()));
        }
        if self.redo_caption != now.redo_caption {
            socket.emit(|| Signal::RedoCaption(now.redo_caption.clone()));
        }
        socket.emit_if(self.index != now.index, || Signal::Index {
            from: self.index,
            to: now.index,
        });
    }
}
