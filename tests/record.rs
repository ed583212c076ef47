use proptest::prelude::*;
use retrace::{Add, Record, Signal};
use std::sync::mpsc;

const A: Add = Add('a');
const B: Add = Add('b');
const C: Add = Add('c');
const D: Add = Add('d');

#[test]
fn go_to() {
    let mut target = String::new();
    let mut record = Record::new();
    record.push(&mut target, A);
    record.push(&mut target, B);
    record.push(&mut target, C);

    record.go_to(&mut target, 0);
    assert_eq!(record.index(), 0);
    assert_eq!(target, "");
    record.go_to(&mut target, 2);
    assert_eq!(record.index(), 2);
    assert_eq!(target, "ab");
    record.go_to(&mut target, 3);
    assert_eq!(record.index(), 3);
    assert_eq!(target, "abc");
    record.go_to(&mut target, 1);
    assert_eq!(record.index(), 1);
    assert_eq!(target, "a");
}

#[test]
fn pushing_after_undo_discards_the_tail() {
    let mut target = String::new();
    let mut record = Record::new();
    record.push(&mut target, A);
    record.push(&mut target, B);
    record.push(&mut target, C);
    record.undo(&mut target);
    record.undo(&mut target);
    record.push(&mut target, D);
    assert_eq!(target, "ad");
    assert_eq!(record.len(), 2);
    assert!(!record.can_redo());
}

#[test]
fn a_discarded_clean_mark_is_forgotten() {
    let mut target = String::new();
    let mut record = Record::new();
    record.push(&mut target, A);
    record.push(&mut target, B);
    record.push(&mut target, C);
    record.set_clean(true);
    assert_eq!(record.clean_index(), Some(3));
    record.undo(&mut target);
    record.undo(&mut target);
    record.push(&mut target, D);
    assert_eq!(record.clean_index(), None);
    assert!(record.is_dirty());
}

#[test]
fn undoing_back_to_the_clean_mark_is_clean_again() {
    let mut target = String::new();
    let mut record = Record::new();
    record.push(&mut target, A);
    record.set_clean(true);
    record.push(&mut target, B);
    assert!(record.is_dirty());
    record.undo(&mut target);
    assert!(record.is_clean());
    record.redo(&mut target);
    assert!(record.is_dirty());
}

#[test]
fn signals_describe_each_observable_change_once() {
    let (sender, receiver) = mpsc::channel();
    let mut iter = receiver.try_iter();

    let mut target = String::new();
    let mut record = Record::builder().connect(sender).build();

    record.push(&mut target, A);
    assert_eq!(iter.next(), Some(Signal::Undo(true)));
    assert_eq!(iter.next(), Some(Signal::Clean(false)));
    assert_eq!(
        iter.next(),
        Some(Signal::UndoCaption(Some("add 'a'".into())))
    );
    assert_eq!(iter.next(), Some(Signal::Index { from: 0, to: 1 }));
    assert_eq!(iter.next(), None);

    record.push(&mut target, B);
    assert_eq!(
        iter.next(),
        Some(Signal::UndoCaption(Some("add 'b'".into())))
    );
    assert_eq!(iter.next(), Some(Signal::Index { from: 1, to: 2 }));
    assert_eq!(iter.next(), None);

    // One consolidated batch for the whole walk.
    record.go_to(&mut target, 0);
    assert_eq!(iter.next(), Some(Signal::Undo(false)));
    assert_eq!(iter.next(), Some(Signal::Redo(true)));
    assert_eq!(iter.next(), Some(Signal::Clean(true)));
    assert_eq!(iter.next(), Some(Signal::UndoCaption(None)));
    assert_eq!(
        iter.next(),
        Some(Signal::RedoCaption(Some("add 'a'".into())))
    );
    assert_eq!(iter.next(), Some(Signal::Index { from: 2, to: 0 }));
    assert_eq!(iter.next(), None);

    // Nothing changed, so nothing is emitted.
    record.go_to(&mut target, 0);
    assert_eq!(iter.next(), None);
}

#[test]
fn macros_replay_as_one_step() {
    let mut target = String::new();
    let mut record = Record::new();
    record.push(&mut target, A);
    record.begin_macro("bc");
    assert!(record.in_macro());
    record.push(&mut target, B);
    record.push(&mut target, C);
    assert!(record.end_macro());
    assert!(!record.in_macro());
    assert_eq!(target, "abc");
    assert_eq!(record.len(), 2);
    assert_eq!(record.undo_caption(), Some("bc".into()));
    record.undo(&mut target);
    assert_eq!(target, "a");
    record.redo(&mut target);
    assert_eq!(target, "abc");
}

proptest! {
    #[test]
    fn go_to_replays_any_prefix(chars in proptest::collection::vec(any::<char>(), 0..20)) {
        let mut target = String::new();
        let mut record = Record::new();
        for &c in &chars {
            record.push(&mut target, Add(c));
        }
        let full = target.clone();
        record.go_to(&mut target, 0);
        prop_assert_eq!(&target, "");
        record.go_to(&mut target, chars.len());
        prop_assert_eq!(target, full);
    }
}
