//! Provides undo-redo functionality with linear and branching histories.
//!
//! It is an implementation of the command pattern, where all modifications are
//! done by creating commands that apply the modifications and know how to
//! revert them. Two data structures are provided for tracking the commands
//! applied to a target:
//!
//! * [`Record`] keeps a linear history: pushing a new command after an undo
//!   discards the undone commands.
//! * [`History`] keeps a branching history: pushing after an undo starts a new
//!   branch and every divergent edit path stays reachable.
//!
//! # Features
//!
//! * Automatic merging of consecutive commands that share a [`MergeId`],
//!   so small changes made gradually can be undone and redone in one step.
//! * Macro recording with [`begin_macro`](Record::begin_macro) and
//!   [`end_macro`](Record::end_macro) groups multiple commands into one
//!   atomic history entry.
//! * The target can be marked as clean (saved to disk) and the structures
//!   track and signal when the clean state changes.
//! * A configurable limit caps how many commands are kept; the oldest ones
//!   are evicted once it is exceeded.
//! * State changes are communicated through [`Signal`]s sent to an optional
//!   [`Slot`].
//! * Serialization of the structures is available with the `serde` feature,
//!   and colored display output with the `colored` feature.
//!
//! # Examples
//!
//! ```
//! use retrace::{Add, Record};
//!
//! let mut target = String::new();
//! let mut record = Record::new();
//! record.push(&mut target, Add('a'));
//! record.push(&mut target, Add('b'));
//! record.push(&mut target, Add('c'));
//! assert_eq!(target, "abc");
//! record.undo(&mut target);
//! record.undo(&mut target);
//! record.undo(&mut target);
//! assert_eq!(target, "");
//! record.redo(&mut target);
//! record.redo(&mut target);
//! record.redo(&mut target);
//! assert_eq!(target, "abc");
//! ```

#![deny(missing_docs)]

mod add;
mod entry;
mod format;
mod from_fn;
pub mod history;
pub mod record;
mod socket;

pub use self::add::Add;
pub use self::entry::{Entry, Group};
pub use self::from_fn::{from_fn, FromFn};
pub use self::history::History;
pub use self::record::Record;
pub use self::socket::{Signal, Slot};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Base functionality for all commands.
///
/// A command describes one reversible mutation of its target. The engine never
/// inspects what a command does, only whether it can be merged, grouped,
/// replayed, or evicted.
///
/// # Preconditions
/// [`apply`](Command::apply) immediately followed by [`revert`](Command::revert)
/// must restore the target to its previous observable state. Commands must not
/// call back into the record or history that owns them; such reentrant calls
/// are suppressed with a diagnostic.
pub trait Command {
    /// The target type the command is applied on.
    type Target;

    /// Applies the command on the target.
    fn apply(&mut self, target: &mut Self::Target);

    /// Restores the state of the target as it was before the command
    /// was applied.
    fn revert(&mut self, target: &mut Self::Target);

    /// Returns the display text of the command.
    fn caption(&self) -> String {
        String::new()
    }

    /// Returns the merge tag used for automatic merging of commands.
    ///
    /// `None` means the command never merges, and is the default. Two
    /// consecutive commands are merge candidates only when both return the
    /// same tag.
    fn merge_id(&self) -> Option<MergeId> {
        None
    }

    /// Attempts to fold `other` into `self`.
    ///
    /// On success, applying `self` afterwards must be equivalent to applying
    /// both commands in their original order, and reverting `self` equivalent
    /// to reverting both in reverse order. The default implementation hands
    /// `other` back unchanged.
    fn merge(&mut self, other: Self) -> Merged<Self>
    where
        Self: Sized,
    {
        Merged::No(other)
    }
}

impl<C: Command + ?Sized> Command for Box<C> {
    type Target = C::Target;

    fn apply(&mut self, target: &mut Self::Target) {
        (**self).apply(target)
    }

    fn revert(&mut self, target: &mut Self::Target) {
        (**self).revert(target)
    }

    fn caption(&self) -> String {
        (**self).caption()
    }

    fn merge_id(&self) -> Option<MergeId> {
        (**self).merge_id()
    }
}

/// An opaque merge tag shared by commands that may fold into each other.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
#[derive(Copy, Clone, Debug, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub struct MergeId(pub u32);

/// The result of attempting to merge two commands.
#[derive(Debug)]
pub enum Merged<C> {
    /// The commands were merged.
    Yes,
    /// The commands were not merged, and the incoming command is handed back.
    No(C),
}

pub(crate) fn mergeable(a: Option<MergeId>, b: Option<MergeId>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}
