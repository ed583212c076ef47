use super::Record;
use crate::format::Format;
use crate::Command;
use core::fmt;

/// Configurable display formatting for a [`Record`].
///
/// The entries are listed newest first, with the cursor position marked as
/// `HEAD` and the clean position marked as `CLEAN`. The line numbered zero is
/// the state before any entry.
pub struct Display<'a, C, S> {
    record: &'a Record<C, S>,
    format: Format,
}

impl<C, S> Display<'_, C, S> {
    /// Show colored output, on by default.
    #[cfg(feature = "colored")]
    pub fn colored(mut self, on: bool) -> Self {
        self.format.colored = on;
        self
    }

    /// Show the position of the cursor, on by default.
    pub fn head(mut self, on: bool) -> Self {
        self.format.head = on;
        self
    }

    /// Show the position the target was last marked clean at, on by default.
    pub fn clean(mut self, on: bool) -> Self {
        self.format.clean = on;
        self
    }
}

impl<'a, C, S> From<&'a Record<C, S>> for Display<'a, C, S> {
    fn from(record: &'a Record<C, S>) -> Self {
        Display {
            record,
            format: Format::default(),
        }
    }
}

impl<C: Command, S> fmt::Display for Display<'_, C, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, entry) in self.record.entries.iter().enumerate().rev() {
            let id = i + 1;
            self.format.mark(f, 0)?;
            self.format.position(f, id)?;
            self.format
                .labels(f, id == self.record.index, self.record.clean == Some(id))?;
            self.format.caption(f, &entry.caption())?;
            writeln!(f)?;
        }
        self.format.mark(f, 0)?;
        self.format.position(f, 0)?;
        self.format
            .labels(f, self.record.index == 0, self.record.clean == Some(0))?;
        writeln!(f)
    }
}
