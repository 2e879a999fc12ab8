//! Synchronous publish/subscribe bus with cancellation and FIFO deferral.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use arena_core::{Event, EventKind, EventPayload};
use tracing::trace;

/// Error type subscribers return. Any error is fatal for the turn.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Subscriber callback.
///
/// Receives the event being dispatched, the shared context `C`, and the queue
/// for follow-up events. Follow-ups are never dispatched inline: they run
/// after the current emission finishes, in the order they were raised.
pub type Handler<C> =
    Box<dyn FnMut(&mut Event, &mut C, &mut EventQueue) -> Result<(), HandlerError> + Send>;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Errors surfaced by [`EventBus::emit`].
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("subscriber {subscription} failed while handling {kind}")]
    Subscriber {
        kind: EventKind,
        subscription: SubscriptionId,
        #[source]
        source: HandlerError,
    },
}

/// Events raised while another emission is being dispatched.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defers an event until the active dispatch completes.
    pub fn push(&mut self, event: impl Into<Event>) {
        self.pending.push_back(event.into());
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pop_front(&mut self) -> Option<Event> {
        self.pending.pop_front()
    }

    /// Takes every pending event, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.pending.drain(..)
    }
}

struct Subscription<C> {
    id: SubscriptionId,
    handler: Handler<C>,
}

/// Typed event bus.
///
/// # Dispatch rules
///
/// - Handlers for a kind run in registration order.
/// - Once a handler cancels the event, no later handler sees that emission.
/// - Events raised by handlers go to an [`EventQueue`] and are dispatched
///   strictly FIFO after the current emission, so global order equals raise
///   order and the call stack never grows with chain length.
/// - Handler errors are not caught here; they abort the emission.
///
/// Every dispatched event, cancelled or not, is appended to the history.
pub struct EventBus<C> {
    handlers: BTreeMap<EventKind, Vec<Subscription<C>>>,
    next_id: u64,
    clock: u64,
    history: Vec<Event>,
}

impl<C> EventBus<C> {
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
            next_id: 0,
            clock: 0,
            history: Vec::new(),
        }
    }

    /// Registers `handler` for `kind`, after every existing handler of that kind.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&mut Event, &mut C, &mut EventQueue) -> Result<(), HandlerError> + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.entry(kind).or_default().push(Subscription {
            id,
            handler: Box::new(handler),
        });
        id
    }

    /// Removes a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for subscriptions in self.handlers.values_mut() {
            if let Some(index) = subscriptions.iter().position(|s| s.id == id) {
                subscriptions.remove(index);
                return true;
            }
        }
        false
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Dispatches `event`, then drains every follow-up it caused.
    ///
    /// Returns the root event as the last handler left it, so the caller can
    /// read cancellation and payload rewrites.
    pub fn emit(&mut self, event: Event, ctx: &mut C) -> Result<Event, BusError> {
        let mut queue = EventQueue::new();
        let root = self.dispatch(event, ctx, &mut queue)?;
        while let Some(next) = queue.pop_front() {
            self.dispatch(next, ctx, &mut queue)?;
        }
        Ok(root)
    }

    pub fn emit_payload(&mut self, payload: EventPayload, ctx: &mut C) -> Result<Event, BusError> {
        self.emit(Event::new(payload), ctx)
    }

    /// Emits each queued event in order as its own root emission.
    pub fn emit_all(&mut self, queue: &mut EventQueue, ctx: &mut C) -> Result<(), BusError> {
        while let Some(event) = queue.pop_front() {
            self.emit(event, ctx)?;
        }
        Ok(())
    }

    fn dispatch(
        &mut self,
        mut event: Event,
        ctx: &mut C,
        queue: &mut EventQueue,
    ) -> Result<Event, BusError> {
        self.clock += 1;
        event.stamp(self.clock);
        let kind = event.kind();

        if let Some(subscriptions) = self.handlers.get_mut(&kind) {
            for subscription in subscriptions.iter_mut() {
                trace!(
                    target: "arena::bus",
                    kind = %kind,
                    subscription = %subscription.id,
                    timestamp = event.timestamp(),
                    "dispatching"
                );
                (subscription.handler)(&mut event, ctx, queue).map_err(|source| {
                    BusError::Subscriber {
                        kind,
                        subscription: subscription.id,
                        source,
                    }
                })?;
                if event.is_cancelled() {
                    trace!(
                        target: "arena::bus",
                        kind = %kind,
                        subscription = %subscription.id,
                        "emission cancelled"
                    );
                    break;
                }
            }
        }

        self.history.push(event.clone());
        Ok(event)
    }

    /// Every dispatched event, oldest first.
    pub fn history(&self) -> &[Event] {
        &self.history
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Events dispatched after `mark` (a previous [`EventBus::history_len`]).
    pub fn history_since(&self, mark: usize) -> &[Event] {
        &self.history[mark.min(self.history.len())..]
    }

    /// Replaces the history, e.g. after restoring a snapshot. The logical
    /// clock resumes after the newest restored event.
    pub fn restore_history(&mut self, history: Vec<Event>) {
        self.clock = history.last().map_or(0, Event::timestamp);
        self.history = history;
    }
}

impl<C> Default for EventBus<C> {
    fn default() -> Self {
        Self::new()
    }
}
