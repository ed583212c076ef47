//! Committed history steps.

use crate::{Command, Merged, MergeId};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One committed step in a history: a single command or a macro group.
///
/// A group is applied and reverted as one atomic unit. The structure of a
/// group can be inspected with [`child_count`](Entry::child_count) and
/// [`child`](Entry::child).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub enum Entry<C> {
    /// A single command.
    Command(C),
    /// A macro group committed as one atomic step.
    Group(Group<C>),
}

impl<C> Entry<C> {
    /// Borrows the command if this step is a single command.
    pub fn get(&self) -> Option<&C> {
        match self {
            Entry::Command(command) => Some(command),
            Entry::Group(_) => None,
        }
    }

    /// Returns the number of direct children; zero for a single command.
    pub fn child_count(&self) -> usize {
        match self {
            Entry::Command(_) => 0,
            Entry::Group(group) => group.entries.len(),
        }
    }

    /// Returns the `i`th direct child of a group.
    pub fn child(&self, i: usize) -> Option<&Entry<C>> {
        match self {
            Entry::Command(_) => None,
            Entry::Group(group) => group.entries.get(i),
        }
    }
}

impl<C: Command> Entry<C> {
    /// Returns the display text of the step.
    pub fn caption(&self) -> String {
        match self {
            Entry::Command(command) => command.caption(),
            Entry::Group(group) => group.caption.clone(),
        }
    }

    pub(crate) fn apply(&mut self, target: &mut C::Target) {
        match self {
            Entry::Command(command) => command.apply(target),
            Entry::Group(group) => group.apply(target),
        }
    }

    pub(crate) fn revert(&mut self, target: &mut C::Target) {
        match self {
            Entry::Command(command) => command.revert(target),
            Entry::Group(group) => group.revert(target),
        }
    }

    pub(crate) fn merge_id(&self) -> Option<MergeId> {
        match self {
            Entry::Command(command) => command.merge_id(),
            Entry::Group(_) => None,
        }
    }

    pub(crate) fn merge(&mut self, other: C) -> Merged<C> {
        match self {
            Entry::Command(command) => command.merge(other),
            Entry::Group(_) => Merged::No(other),
        }
    }
}

/// An ordered group of steps recorded between `begin_macro` and `end_macro`.
///
/// Applying a group runs its children in forward order, reverting it runs
/// them in reverse order.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct Group<C> {
    pub(crate) caption: String,
    pub(crate) entries: Vec<Entry<C>>,
}

impl<C> Group<C> {
    pub(crate) fn new(caption: String) -> Group<C> {
        Group {
            caption,
            entries: Vec::new(),
        }
    }

    /// Returns the display text of the group.
    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub(crate) fn push(&mut self, entry: Entry<C>) {
        self.entries.push(entry);
    }
}

impl<C: Command> Group<C> {
    pub(crate) fn apply(&mut self, target: &mut C::Target) {
        for entry in &mut self.entries {
            entry.apply(target);
        }
    }

    pub(crate) fn revert(&mut self, target: &mut C::Target) {
        for entry in self.entries.iter_mut().rev() {
            entry.revert(target);
        }
    }

    /// Adds an already applied command, merging it into the last child
    /// when the merge tags allow it.
    pub(crate) fn absorb(&mut self, command: C) {
        let command = match self.entries.last_mut() {
            Some(last) if crate::mergeable(last.merge_id(), command.merge_id()) => {
                match last.merge(command) {
                    Merged::Yes => return,
                    Merged::No(command) => command,
                }
            }
            _ => command,
        };
        self.entries.push(Entry::Command(command));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Add;

    #[test]
    fn group_applies_forward_and_reverts_in_reverse() {
        let mut target = String::new();
        let mut group = Group::new("ab".into());
        group.push(Entry::Command(Add('a')));
        group.push(Entry::Command(Add('b')));
        group.apply(&mut target);
        assert_eq!(target, "ab");
        group.revert(&mut target);
        assert_eq!(target, "");
    }

    #[test]
    fn absorb_merges_tagged_commands() {
        struct Assign {
            before: i32,
            after: i32,
        }

        impl Command for Assign {
            type Target = i32;

            fn apply(&mut self, target: &mut i32) {
                self.before = *target;
                *target = self.after;
            }

            fn revert(&mut self, target: &mut i32) {
                *target = self.before;
            }

            fn merge_id(&self) -> Option<MergeId> {
                Some(MergeId(1))
            }

            fn merge(&mut self, other: Self) -> Merged<Self> {
                self.after = other.after;
                Merged::Yes
            }
        }

        let mut target = 1;
        let mut group = Group::new("assign".into());
        let mut a = Assign { before: 0, after: 2 };
        a.apply(&mut target);
        group.absorb(a);
        let mut b = Assign { before: 0, after: 3 };
        b.apply(&mut target);
        group.absorb(b);
        assert_eq!(target, 3);
        assert_eq!(group.entries.len(), 1);
        group.revert(&mut target);
        assert_eq!(target, 1);
    }
}
