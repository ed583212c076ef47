use super::History;
use crate::format::Format;
use crate::Command;
use core::fmt::{self, Write};

/// Configurable display formatting for a [`History`].
///
/// Branches are drawn as an indented tree with the root at the bottom, the
/// current node marked as `HEAD`, and the clean node marked as `CLEAN`.
pub struct Display<'a, C, S> {
    history: &'a History<C, S>,
    format: Format,
}

impl<C, S> Display<'_, C, S> {
    /// Show colored output, on by default.
    #[cfg(feature = "colored")]
    pub fn colored(mut self, on: bool) -> Self {
        self.format.colored = on;
        self
    }

    /// Show the position of the current node, on by default.
    pub fn head(mut self, on: bool) -> Self {
        self.format.head = on;
        self
    }

    /// Show the node the target was last marked clean at, on by default.
    pub fn clean(mut self, on: bool) -> Self {
        self.format.clean = on;
        self
    }
}

impl<C: Command, S> Display<'_, C, S> {
    fn fmt_node(&self, f: &mut fmt::Formatter, id: usize, level: usize) -> fmt::Result {
        let node = &self.history.nodes[id];
        for (i, &child) in node.children.iter().enumerate().rev() {
            self.fmt_node(f, child, level + i)?;
        }
        for i in 0..level {
            self.format.edge(f, i)?;
            f.write_char(' ')?;
        }
        self.format.mark(f, level)?;
        self.format.position(f, id)?;
        self.format.labels(
            f,
            id == self.history.current,
            self.history.clean == Some(id),
        )?;
        if let Some(entry) = &node.entry {
            self.format.caption(f, &entry.caption())?;
        }
        writeln!(f)
    }
}

impl<'a, C, S> From<&'a History<C, S>> for Display<'a, C, S> {
    fn from(history: &'a History<C, S>) -> Self {
        Display {
            history,
            format: Format::default(),
        }
    }
}

impl<C: Command, S> fmt::Display for Display<'_, C, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_node(f, 0, 0)
    }
}
