//! A branching undo-redo history.

mod builder;
mod display;

pub use self::builder::Builder;
pub use self::display::Display;

use crate::entry::Group;
use crate::socket::{Socket, State};
use crate::{Command, Entry, Merged, Slot};
use core::num::NonZeroUsize;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::warn;

/// A branching record of commands applied to a target.
///
/// Unlike a [`Record`](crate::Record), pushing a command after an undo does
/// not discard the undone entries. Instead the new command starts a sibling
/// branch, and every state the target has ever been in stays reachable
/// through [`go_to`](History::go_to).
///
/// Nodes are identified by their creation order: node zero is the empty root
/// state, and each committed entry gets the next id. Evicting the oldest
/// entry renumbers the remaining nodes down by one.
///
/// # Examples
/// ```
/// # use retrace::{Add, History};
/// let mut target = String::new();
/// let mut history = History::new();
/// history.push(&mut target, Add('a'));
/// history.push(&mut target, Add('b'));
/// history.undo(&mut target);
/// history.push(&mut target, Add('c'));
/// assert_eq!(target, "ac");
/// // The overwritten branch is still there.
/// history.go_to(&mut target, 2);
/// assert_eq!(target, "ab");
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(bound(serialize = "C: Serialize", deserialize = "C: Deserialize<'de>"))
)]
#[derive(Clone, Debug)]
pub struct History<C, S = ()> {
    pub(crate) nodes: Vec<Node<C>>,
    pub(crate) current: usize,
    pub(crate) limit: Option<NonZeroUsize>,
    pub(crate) clean: Option<usize>,
    pub(crate) branches: Vec<Vec<usize>>,
    #[cfg_attr(feature = "serde", serde(default, skip))]
    pub(crate) socket: Socket<S>,
    #[cfg_attr(feature = "serde", serde(default, skip))]
    pub(crate) open: Vec<Group<C>>,
    #[cfg_attr(feature = "serde", serde(default, skip))]
    pub(crate) replaying: bool,
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(bound(serialize = "C: Serialize", deserialize = "C: Deserialize<'de>"))
)]
#[derive(Clone, Debug)]
pub(crate) struct Node<C> {
    pub entry: Option<Entry<C>>,
    pub parent: usize,
    pub children: Vec<usize>,
    pub recent: Option<usize>,
}

impl<C> Node<C> {
    pub(crate) fn root() -> Node<C> {
        Node {
            entry: None,
            parent: 0,
            children: Vec::new(),
            recent: None,
        }
    }
}

impl<C> History<C> {
    /// Returns a new history with no limit and no slot connected.
    pub fn new() -> History<C> {
        Builder::new().build()
    }
}

impl<C, S> History<C, S> {
    /// Returns a builder for a history.
    pub fn builder() -> Builder<C, S> {
        Builder::new()
    }

    /// Returns the number of committed entries in the history.
    ///
    /// The root node is not counted.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Returns `true` if the history holds no committed entries.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Returns the limit of the history, with zero meaning unbounded.
    pub fn limit(&self) -> usize {
        self.limit.map_or(0, NonZeroUsize::get)
    }

    /// Sets the limit of the history, with zero meaning unbounded.
    ///
    /// The limit can only be changed while the history is empty, and `false`
    /// is returned otherwise.
    pub fn set_limit(&mut self, limit: usize) -> bool {
        if !self.is_empty() || !self.open.is_empty() {
            warn!("set_limit ignored: the history is not empty");
            return false;
        }
        self.limit = NonZeroUsize::new(limit);
        true
    }

    /// Connects a slot to the history, returning the previous slot if any.
    pub fn connect(&mut self, slot: S) -> Option<S> {
        self.socket.connect(Some(slot))
    }

    /// Disconnects the slot from the history and returns it.
    pub fn disconnect(&mut self) -> Option<S> {
        self.socket.disconnect()
    }

    /// Returns the id of the current node.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Returns `true` if the history can undo.
    pub fn can_undo(&self) -> bool {
        self.open.is_empty() && self.current != 0
    }

    /// Returns `true` if the history can redo.
    pub fn can_redo(&self) -> bool {
        self.open.is_empty() && self.nodes[self.current].recent.is_some()
    }

    /// Returns `true` if the target is in the clean state.
    pub fn is_clean(&self) -> bool {
        self.open.is_empty() && self.clean == Some(self.current)
    }

    /// Returns `true` if the target is in a dirty state.
    pub fn is_dirty(&self) -> bool {
        !self.is_clean()
    }

    /// Returns the node the target was last marked clean at, if it is still
    /// reachable.
    pub fn clean_node(&self) -> Option<usize> {
        self.clean
    }

    /// Returns `true` if a macro is currently being recorded.
    pub fn in_macro(&self) -> bool {
        !self.open.is_empty()
    }

    /// Returns the parent of the node, or `None` for the root.
    pub fn parent(&self, id: usize) -> Option<usize> {
        (id != 0 && id < self.nodes.len()).then(|| self.nodes[id].parent)
    }

    /// Returns the children of the node, oldest first.
    pub fn children(&self, id: usize) -> &[usize] {
        self.nodes.get(id).map_or(&[], |node| &node.children)
    }

    /// Returns the entry committed at the node, or `None` for the root.
    pub fn entry(&self, id: usize) -> Option<&Entry<C>> {
        self.nodes.get(id).and_then(|node| node.entry.as_ref())
    }

    /// Returns every root-to-leaf path through the history, as lists of node
    /// ids excluding the root.
    pub fn branches(&self) -> &[Vec<usize>] {
        &self.branches
    }

    fn entry_mut(&mut self, id: usize) -> &mut Entry<C> {
        self.nodes[id]
            .entry
            .as_mut()
            .expect("only the root has no entry")
    }

    fn path_from_root(&self, mut id: usize) -> Vec<usize> {
        let mut path = Vec::new();
        while id != 0 {
            path.push(id);
            id = self.nodes[id].parent;
        }
        path.reverse();
        path
    }

    // The history is a tree, so the path found by the breadth first search is
    // the unique simple path between the two nodes.
    fn path_between(&self, from: usize, to: usize) -> Vec<usize> {
        const UNSEEN: usize = usize::MAX;
        let mut prev = vec![UNSEEN; self.nodes.len()];
        let mut queue = VecDeque::from([from]);
        prev[from] = from;
        while let Some(id) = queue.pop_front() {
            if id == to {
                break;
            }
            let node = &self.nodes[id];
            let neighbors = node
                .children
                .iter()
                .copied()
                .chain((id != 0).then_some(node.parent));
            for next in neighbors {
                if prev[next] == UNSEEN {
                    prev[next] = id;
                    queue.push_back(next);
                }
            }
        }
        let mut path = vec![to];
        let mut id = to;
        while id != from {
            id = prev[id];
            path.push(id);
        }
        path.reverse();
        path
    }
}

impl<C: Command, S> History<C, S> {
    /// Returns the caption of the entry that an undo would revert.
    pub fn undo_caption(&self) -> Option<String> {
        self.can_undo()
            .then(|| self.nodes[self.current].entry.as_ref())
            .flatten()
            .map(Entry::caption)
    }

    /// Returns the caption of the entry that a redo would reapply.
    pub fn redo_caption(&self) -> Option<String> {
        if !self.open.is_empty() {
            return None;
        }
        self.nodes[self.current]
            .recent
            .and_then(|id| self.entry(id))
            .map(Entry::caption)
    }

    fn state(&self) -> State {
        State {
            index: self.current,
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            is_clean: self.is_clean(),
            undo_caption: self.undo_caption(),
            redo_caption: self.redo_caption(),
        }
    }
}

impl<C: Command, S: Slot> History<C, S> {
    /// Applies the command on the target and commits it to the history.
    ///
    /// When the current node already has children the new entry becomes a
    /// sibling branch, and nothing is discarded. The command is merged into
    /// the current entry when both carry the same merge tag, the current node
    /// is a leaf, and the target is not at the clean node. While a macro is
    /// open the command becomes a child of the innermost group instead.
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
            let merge_allowed = self.current != 0
                && self.clean != Some(self.current)
                && self.nodes[self.current].children.is_empty();
            let command = if merge_allowed {
                let entry = self.entry_mut(self.current);
                if crate::mergeable(entry.merge_id(), command.merge_id()) {
                    match entry.merge(command) {
                        Merged::Yes => None,
                        Merged::No(command) => Some(command),
                    }
                } else {
                    Some(command)
                }
            } else {
                Some(command)
            };
            if let Some(command) = command {
                self.commit(Entry::Command(command));
            }
        }
        was.emit_diff(self.state(), &mut self.socket);
        true
    }

    fn commit(&mut self, entry: Entry<C>) {
        let id = self.nodes.len();
        self.nodes.push(Node {
            entry: Some(entry),
            parent: self.current,
            children: Vec::new(),
            recent: None,
        });
        let parent = &mut self.nodes[self.current];
        parent.children.push(id);
        parent.recent = Some(id);
        self.current = id;
        self.record_branch(id);
        self.enforce_limit();
    }

    // A leaf extends the branch it shares its prefix with, otherwise it
    // starts a new one.
    fn record_branch(&mut self, id: usize) {
        let path = self.path_from_root(id);
        match self
            .branches
            .iter_mut()
            .find(|branch| path.starts_with(branch))
        {
            Some(branch) => *branch = path,
            None => self.branches.push(path),
        }
    }

    /// Reverts the entry at the current node and moves to its parent.
    ///
    /// Returns `false` if there is nothing to undo or a macro is open.
    pub fn undo(&mut self, target: &mut C::Target) -> bool {
        if self.in_macro() {
            warn!("undo ignored: a macro is open");
            return false;
        }
        self.current != 0 && {
            let parent = self.nodes[self.current].parent;
            self.go_to(target, parent)
        }
    }

    /// Reapplies the entry of the most recently visited child.
    ///
    /// Returns `false` if there is nothing to redo or a macro is open.
    pub fn redo(&mut self, target: &mut C::Target) -> bool {
        if self.in_macro() {
            warn!("redo ignored: a macro is open");
            return false;
        }
        match self.nodes[self.current].recent {
            Some(child) => self.go_to(target, child),
            None => false,
        }
    }

    /// Walks the target to the state at the given node.
    ///
    /// Entries on the path toward the root are reverted and entries on the
    /// path away from it are reapplied, in order. The connected slot receives
    /// one consolidated batch of signals for the whole walk.
    ///
    /// Returns `false` if the node does not exist or a macro is open.
    pub fn go_to(&mut self, target: &mut C::Target, to: usize) -> bool {
        if self.replaying {
            warn!("go_to ignored: called while a replay is in progress");
            return false;
        }
        if self.in_macro() {
            warn!("go_to ignored: a macro is open");
            return false;
        }
        if to >= self.nodes.len() {
            warn!("go_to ignored: unknown node");
            return false;
        }
        let was = self.state();
        let path = self.path_between(self.current, to);
        self.replaying = true;
        for pair in path.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if self.nodes[from].parent == to {
                self.entry_mut(from).revert(target);
                self.nodes[to].recent = Some(from);
            } else {
                self.entry_mut(to).apply(target);
                self.nodes[from].recent = Some(to);
            }
            self.current = to;
        }
        self.replaying = false;
        was.emit_diff(self.state(), &mut self.socket);
        true
    }

    /// Opens a macro with the given caption.
    ///
    /// Commands pushed until the matching [`end_macro`](History::end_macro)
    /// become children of one atomic group. Macros nest; only the outermost
    /// `end_macro` commits a node. Undo and redo are unavailable while a
    /// macro is open.
    pub fn begin_macro(&mut self, caption: impl Into<String>) {
        let was = self.state();
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
            None => self.commit(Entry::Group(group)),
        }
        was.emit_diff(self.state(), &mut self.socket);
        true
    }

    /// Marks or unmarks the current node as the clean state.
    pub fn set_clean(&mut self, clean: bool) {
        let was = self.state();
        self.clean = clean.then_some(self.current);
        was.emit_diff(self.state(), &mut self.socket);
    }

    /// Discards every branch except the path from the root to the current
    /// node, turning the history into a straight line.
    ///
    /// The kept nodes are renumbered from one in path order, and the clean
    /// mark is forgotten if it sat on a discarded branch. The target is not
    /// touched.
    pub fn flatten(&mut self) {
        let was = self.state();
        let path = self.path_from_root(self.current);
        let mut nodes = Vec::with_capacity(path.len() + 1);
        nodes.push(Node::root());
        for (i, &id) in path.iter().enumerate() {
            nodes.push(Node {
                entry: self.nodes[id].entry.take(),
                parent: i,
                children: Vec::new(),
                recent: None,
            });
        }
        for i in 0..path.len() {
            nodes[i].children = vec![i + 1];
            nodes[i].recent = Some(i + 1);
        }
        self.clean = self.clean.and_then(|clean| {
            if clean == 0 {
                Some(0)
            } else {
                path.iter().position(|&id| id == clean).map(|i| i + 1)
            }
        });
        self.current = path.len();
        self.branches = if path.is_empty() {
            Vec::new()
        } else {
            vec![(1..=path.len()).collect()]
        };
        self.nodes = nodes;
        was.emit_diff(self.state(), &mut self.socket);
    }

    /// Removes all entries from the history without touching the target.
    pub fn clear(&mut self) {
        let was = self.state();
        let was_clean = self.is_clean();
        self.nodes = vec![Node::root()];
        self.branches.clear();
        self.open.clear();
        self.current = 0;
        self.clean = was_clean.then_some(0);
        was.emit_diff(self.state(), &mut self.socket);
    }

    fn enforce_limit(&mut self) {
        if let Some(limit) = self.limit {
            while self.nodes.len() - 1 > limit.get() {
                self.evict_oldest();
            }
        }
    }

    // Node one is always the oldest entry, and its parent is always the
    // root. Its children are relinked to the root in its place and every
    // id above it shifts down by one.
    fn evict_oldest(&mut self) {
        const OLD: usize = 1;
        let children = self.nodes[OLD].children.clone();
        let recent = self.nodes[OLD].recent;
        for &child in &children {
            self.nodes[child].parent = 0;
        }
        let root = &mut self.nodes[0];
        let pos = root
            .children
            .iter()
            .position(|&child| child == OLD)
            .expect("the oldest node is a child of the root");
        root.children.splice(pos..=pos, children);
        if root.recent == Some(OLD) {
            root.recent = recent;
        }
        self.nodes.remove(OLD);
        for node in &mut self.nodes {
            if node.parent > OLD {
                node.parent -= 1;
            }
            for child in &mut node.children {
                *child -= 1;
            }
            if let Some(recent) = &mut node.recent {
                *recent -= 1;
            }
        }
        self.current = self.current.saturating_sub(1);
        self.clean = self.clean.and_then(|clean| match clean {
            0 => Some(0),
            OLD => None,
            id => Some(id - 1),
        });
        self.branches.retain_mut(|branch| {
            if branch.first() == Some(&OLD) {
                branch.remove(0);
            }
            for id in branch.iter_mut() {
                *id -= 1;
            }
            !branch.is_empty()
        });
    }
}

impl<C: Command, S> History<C, S> {
    /// Returns a structure for configurable formatting of the history.
    pub fn display(&self) -> Display<C, S> {
        Display::from(self)
    }
}

impl<C> Default for History<C> {
    fn default() -> History<C> {
        History::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Add;

    #[test]
    fn push_after_undo_starts_a_sibling_branch() {
        let mut target = String::new();
        let mut history = History::new();
        history.push(&mut target, Add('a'));
        history.push(&mut target, Add('b'));
        history.undo(&mut target);
        history.push(&mut target, Add('c'));
        assert_eq!(target, "ac");
        assert_eq!(history.current(), 3);
        assert_eq!(history.children(1), [2, 3]);
        assert_eq!(history.branches(), [vec![1, 2], vec![1, 3]]);
        assert!(history.go_to(&mut target, 2));
        assert_eq!(target, "ab");
        assert!(history.go_to(&mut target, 3));
        assert_eq!(target, "ac");
    }

    #[test]
    fn extending_a_branch_does_not_add_a_new_one() {
        let mut target = String::new();
        let mut history = History::new();
        history.push(&mut target, Add('a'));
        history.push(&mut target, Add('b'));
        assert_eq!(history.branches().len(), 1);
        history.push(&mut target, Add('c'));
        assert_eq!(history.branches(), [vec![1, 2, 3]]);
    }

    #[test]
    fn redo_follows_the_most_recent_path() {
        let mut target = String::new();
        let mut history = History::new();
        history.push(&mut target, Add('a'));
        history.undo(&mut target);
        history.push(&mut target, Add('b'));
        history.undo(&mut target);
        assert_eq!(target, "");
        // Node 2 was visited last, so redo goes there, not to node 1.
        assert!(history.redo(&mut target));
        assert_eq!(target, "b");
        history.go_to(&mut target, 1);
        history.undo(&mut target);
        assert!(history.redo(&mut target));
        assert_eq!(target, "a");
    }

    #[test]
    fn eviction_relinks_the_oldest_node_to_the_root() {
        let mut target = String::new();
        let mut history = History::new();
        assert!(history.set_limit(2));
        history.push(&mut target, Add('a'));
        history.push(&mut target, Add('b'));
        history.push(&mut target, Add('c'));
        assert_eq!(history.len(), 2);
        assert_eq!(history.current(), 2);
        assert_eq!(history.parent(1), Some(0));
        history.undo(&mut target);
        history.undo(&mut target);
        assert!(!history.can_undo());
        assert_eq!(target, "a");
        history.redo(&mut target);
        history.redo(&mut target);
        assert_eq!(target, "abc");
    }

    #[test]
    fn eviction_splices_multiple_children_into_the_root() {
        let mut target = String::new();
        let mut history = History::new();
        assert!(history.set_limit(2));
        history.push(&mut target, Add('a'));
        history.undo(&mut target);
        history.push(&mut target, Add('b'));
        history.undo(&mut target);
        history.push(&mut target, Add('c'));
        assert_eq!(history.len(), 2);
        assert_eq!(history.children(0), [1, 2]);
        assert_eq!(history.current(), 2);
        assert_eq!(target, "c");
        assert!(history.go_to(&mut target, 1));
        assert_eq!(target, "b");
    }

    #[test]
    fn eviction_forgets_an_evicted_clean_mark() {
        let mut target = String::new();
        let mut history = History::new();
        assert!(history.set_limit(2));
        history.push(&mut target, Add('a'));
        history.set_clean(true);
        history.push(&mut target, Add('b'));
        history.push(&mut target, Add('c'));
        assert_eq!(history.clean_node(), None);
    }

    #[test]
    fn flatten_keeps_only_the_current_path() {
        let mut target = String::new();
        let mut history = History::new();
        history.push(&mut target, Add('a'));
        history.push(&mut target, Add('b'));
        history.undo(&mut target);
        history.push(&mut target, Add('c'));
        assert_eq!(target, "ac");
        history.flatten();
        assert_eq!(history.len(), 2);
        assert_eq!(history.current(), 2);
        assert_eq!(history.children(1), [2]);
        assert_eq!(history.branches(), [vec![1, 2]]);
        history.undo(&mut target);
        history.undo(&mut target);
        assert_eq!(target, "");
        history.redo(&mut target);
        history.redo(&mut target);
        assert_eq!(target, "ac");
    }

    #[test]
    fn flatten_remaps_the_clean_mark_on_the_kept_path() {
        let mut target = String::new();
        let mut history = History::new();
        history.push(&mut target, Add('a'));
        history.push(&mut target, Add('b'));
        history.undo(&mut target);
        history.push(&mut target, Add('c'));
        history.set_clean(true);
        assert_eq!(history.clean_node(), Some(3));
        history.flatten();
        assert_eq!(history.clean_node(), Some(2));
        assert!(history.is_clean());
    }

    #[test]
    fn flatten_forgets_a_clean_mark_on_a_discarded_branch() {
        let mut target = String::new();
        let mut history = History::new();
        history.push(&mut target, Add('a'));
        history.set_clean(true);
        history.undo(&mut target);
        history.push(&mut target, Add('b'));
        history.flatten();
        assert_eq!(history.clean_node(), None);
    }

    #[test]
    fn macro_commits_one_node() {
        let mut target = String::new();
        let mut history = History::new();
        history.begin_macro("ab");
        history.push(&mut target, Add('a'));
        history.push(&mut target, Add('b'));
        assert!(history.end_macro());
        assert_eq!(target, "ab");
        assert_eq!(history.len(), 1);
        assert_eq!(history.entry(1).map(Entry::child_count), Some(2));
        history.undo(&mut target);
        assert_eq!(target, "");
        history.redo(&mut target);
        assert_eq!(target, "ab");
    }

    #[test]
    fn merge_is_blocked_at_the_clean_node_and_on_non_leaves() {
        use crate::{MergeId, Merged};

        #[derive(Debug)]
        struct Assign(i32, i32);

        impl Command for Assign {
            type Target = i32;

            fn apply(&mut self, target: &mut i32) {
                self.0 = *target;
                *target = self.1;
            }

            fn revert(&mut self, target: &mut i32) {
                *target = self.0;
            }

            fn merge_id(&self) -> Option<MergeId> {
                Some(MergeId(1))
            }

            fn merge(&mut self, other: Self) -> Merged<Self> {
                self.1 = other.1;
                Merged::Yes
            }
        }

        let mut target = 0;
        let mut history = History::new();
        history.push(&mut target, Assign(0, 1));
        history.push(&mut target, Assign(0, 2));
        assert_eq!(history.len(), 1);
        history.set_clean(true);
        history.push(&mut target, Assign(0, 3));
        assert_eq!(history.len(), 2);
        history.undo(&mut target);
        assert!(history.is_clean());
        // Blocked both by the clean mark and by the existing child.
        history.push(&mut target, Assign(0, 4));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn go_to_an_unknown_node_is_refused() {
        let mut target = String::new();
        let mut history = History::new();
        history.push(&mut target, Add('a'));
        assert!(!history.go_to(&mut target, 7));
        assert_eq!(history.current(), 1);
        assert_eq!(target, "a");
    }

    #[test]
    fn display_shows_all_branches() {
        let mut target = String::new();
        let mut history = History::new();
        history.push(&mut target, Add('a'));
        history.push(&mut target, Add('b'));
        history.undo(&mut target);
        history.push(&mut target, Add('c'));
        let display = history.display();
        #[cfg(feature = "colored")]
        let display = display.colored(false);
        let out = format!("{display}");
        assert!(out.contains("add 'b'"));
        assert!(out.contains("add 'c'"));
        assert!(out.contains("[HEAD]"));
    }
}
