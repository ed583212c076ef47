use super::Record;
use crate::socket::Socket;
use core::marker::PhantomData;
use core::num::NonZeroUsize;
use std::collections::VecDeque;

/// Builder for a [`Record`].
///
/// # Examples
/// ```
/// # use retrace::{Add, Record, Signal};
/// let record = Record::<Add, _>::builder()
///     .limit(100)
///     .capacity(100)
///     .connect(|signal: Signal| println!("{signal:?}"))
///     .build();
/// ```
#[derive(Debug)]
pub struct Builder<C, S = ()> {
    capacity: usize,
    limit: Option<NonZeroUsize>,
    clean: bool,
    socket: Socket<S>,
    pd: PhantomData<C>,
}

impl<C, S> Builder<C, S> {
    /// Returns a builder for a record.
    pub fn new() -> Builder<C, S> {
        Builder {
            capacity: 0,
            limit: None,
            clean: true,
            socket: Socket::default(),
            pd: PhantomData,
        }
    }

    /// Sets the initial capacity of the record.
    pub fn capacity(mut self, capacity: usize) -> Builder<C, S> {
        self.capacity = capacity;
        self
    }

    /// Sets the limit of the record, with zero meaning unbounded.
    pub fn limit(mut self, limit: usize) -> Builder<C, S> {
        self.limit = NonZeroUsize::new(limit);
        self
    }

    /// Sets whether the target starts in the clean state, which is the
    /// default.
    pub fn clean(mut self, clean: bool) -> Builder<C, S> {
        self.clean = clean;
        self
    }

    /// Connects the slot.
    pub fn connect(mut self, slot: S) -> Builder<C, S> {
        self.socket = Socket::new(slot);
        self
    }

    /// Builds the record.
    pub fn build(self) -> Record<C, S> {
        Record {
            entries: VecDeque::with_capacity(self.capacity),
            index: 0,
            limit: self.limit,
            clean: self.clean.then_some(0),
            socket: self.socket,
            open: Vec::new(),
            replaying: false,
        }
    }
}

impl<C, S> Default for Builder<C, S> {
    fn default() -> Self {
        Builder::new()
    }
}
