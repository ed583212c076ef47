use super::{History, Node};
use crate::socket::Socket;
use core::marker::PhantomData;
use core::num::NonZeroUsize;

/// Builder for a [`History`].
///
/// # Examples
/// ```
/// # use retrace::{Add, History, Signal};
/// let history = History::<Add, _>::builder()
///     .limit(100)
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
    /// Returns a builder for a history.
    pub fn new() -> Builder<C, S> {
        Builder {
            capacity: 0,
            limit: None,
            clean: true,
            socket: Socket::default(),
            pd: PhantomData,
        }
    }

    /// Sets the initial capacity of the history.
    pub fn capacity(mut self, capacity: usize) -> Builder<C, S> {
        self.capacity = capacity;
        self
    }

    /// Sets the limit of the history, with zero meaning unbounded.
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

    /// Builds the history.
    pub fn build(self) -> History<C, S> {
        let mut nodes = Vec::with_capacity(self.capacity.saturating_add(1));
        nodes.push(Node::root());
        History {
            nodes,
            current: 0,
            limit: self.limit,
            clean: self.clean.then_some(0),
            branches: Vec::new(),
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
