use crate::{Command, Merged, MergeId};
use core::fmt::{self, Debug, Formatter};
use core::mem;

/// Creates a command from an apply/revert closure pair.
///
/// This avoids writing a command type per use case when the two closures can
/// capture everything the command needs.
///
/// # Examples
/// ```
/// # use retrace::Record;
/// let mut target = String::new();
/// let mut record = Record::new();
/// record.push(
///     &mut target,
///     retrace::from_fn(|s: &mut String| s.push('a'), |s: &mut String| {
///         s.pop();
///     }),
/// );
/// assert_eq!(target, "a");
/// record.undo(&mut target);
/// assert_eq!(target, "");
/// ```
pub fn from_fn<T, A, R>(apply: A, revert: R) -> FromFn<T>
where
    T: 'static,
    A: FnMut(&mut T) + 'static,
    R: FnMut(&mut T) + 'static,
{
    FromFn {
        apply: Box::new(apply),
        revert: Box::new(revert),
        caption: String::new(),
        merge_id: None,
    }
}

/// A command made from an apply/revert closure pair.
///
/// Created by the [`from_fn`] function. Two `FromFn` commands with the same
/// merge tag merge by chaining their closures, so the merged entry replays
/// the combined effect.
pub struct FromFn<T> {
    apply: Box<dyn FnMut(&mut T)>,
    revert: Box<dyn FnMut(&mut T)>,
    caption: String,
    merge_id: Option<MergeId>,
}

impl<T> FromFn<T> {
    /// Sets the display text of the command.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    /// Sets the merge tag of the command.
    pub fn with_merge_id(mut self, id: MergeId) -> Self {
        self.merge_id = Some(id);
        self
    }
}

impl<T: 'static> Command for FromFn<T> {
    type Target = T;

    fn apply(&mut self, target: &mut T) {
        (self.apply)(target)
    }

    fn revert(&mut self, target: &mut T) {
        (self.revert)(target)
    }

    fn caption(&self) -> String {
        self.caption.clone()
    }

    fn merge_id(&self) -> Option<MergeId> {
        self.merge_id
    }

    fn merge(&mut self, other: Self) -> Merged<Self> {
        let mut first_apply = mem::replace(&mut self.apply, Box::new(|_| {}));
        let mut second_apply = other.apply;
        self.apply = Box::new(move |target| {
            first_apply(target);
            second_apply(target);
        });
        let mut first_revert = mem::replace(&mut self.revert, Box::new(|_| {}));
        let mut second_revert = other.revert;
        self.revert = Box::new(move |target| {
            second_revert(target);
            first_revert(target);
        });
        Merged::Yes
    }
}

impl<T> Debug for FromFn<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("FromFn")
            .field("caption", &self.caption)
            .field("merge_id", &self.merge_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::{from_fn, MergeId, Record};

    #[test]
    fn merged_from_fn_replays_both_closures() {
        let mut target = String::new();
        let mut record = Record::new();
        record.push(
            &mut target,
            from_fn(|s: &mut String| s.push('a'), |s: &mut String| {
                s.pop();
            })
            .with_merge_id(MergeId(7)),
        );
        record.push(
            &mut target,
            from_fn(|s: &mut String| s.push('b'), |s: &mut String| {
                s.pop();
            })
            .with_merge_id(MergeId(7)),
        );
        assert_eq!(target, "ab");
        assert_eq!(record.len(), 1);
        record.undo(&mut target);
        assert_eq!(target, "");
        record.redo(&mut target);
        assert_eq!(target, "ab");
    }
}
