//! The event bus: priority-ordered dispatch with re-entrancy safety.
//!
//! The correctness-critical contract: a listener may subscribe, unsubscribe,
//! or publish from inside its own callback. While a dispatch for kind K is
//! in flight, structural mutations to K's listener list are parked on a
//! deferred-operation queue and applied only when K's outermost dispatch
//! completes. A nested publish (any kind) is delivered depth-first, to full
//! completion, before the outer dispatch resumes.
//!
//! The bus never holds its interior borrow across a listener invocation;
//! dispatch runs over a cloned snapshot of the listener list.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;

use hashbrown::{HashMap, HashSet};
use horde_ecs::{Entity, World};

use crate::event::{EventData, EventKind, GameEvent};

/// Default bound on the debugging history ring.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Handle identifying one registered listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Listener callbacks receive the world (so gameplay reactions can mutate
/// entities), the bus (so they can publish or re-wire subscriptions
/// re-entrantly), and the event itself. An `Err` is isolated at the call
/// site and routed to the error hook, never to the publisher.
pub type ListenerFn = Rc<dyn Fn(&mut World, &EventBus, &GameEvent) -> eyre::Result<()>>;

/// Pre-dispatch middleware; returning `false` vetoes the event before any
/// listener runs.
pub type PreDispatchFn = Rc<dyn Fn(&GameEvent) -> bool>;

/// Post-dispatch middleware; observes every delivered event.
pub type PostDispatchFn = Rc<dyn Fn(&GameEvent)>;

/// Error hook; observes listener faults.
pub type ErrorHookFn = Rc<dyn Fn(&ListenerFault)>;

/// A listener error surfaced through the error hook.
pub struct ListenerFault {
    pub kind: EventKind,
    pub subscription: SubscriptionId,
    pub error: eyre::Report,
}

#[derive(Clone)]
struct ListenerEntry {
    id: SubscriptionId,
    priority: i32,
    /// Registration order, used to break priority ties.
    seq: u64,
    once: bool,
    callback: ListenerFn,
}

/// A structural mutation requested while its kind was mid-dispatch.
enum DeferredOp {
    Subscribe(EventKind, ListenerEntry),
    Unsubscribe(EventKind, SubscriptionId),
}

impl DeferredOp {
    fn kind(&self) -> EventKind {
        match self {
            Self::Subscribe(kind, _) | Self::Unsubscribe(kind, _) => *kind,
        }
    }
}

struct Inner {
    /// Listener lists, kept sorted by descending priority then seq.
    listeners: HashMap<EventKind, Vec<ListenerEntry>>,
    /// Active dispatch depth per kind (nested same-kind publishes stack).
    dispatch_depth: HashMap<EventKind, u32>,
    deferred: Vec<DeferredOp>,
    /// One-shot listeners that have fired but are not yet removed.
    spent: HashSet<SubscriptionId>,
    history: VecDeque<GameEvent>,
    history_capacity: usize,
    pre_hooks: Vec<PreDispatchFn>,
    post_hooks: Vec<PostDispatchFn>,
    error_hook: Option<ErrorHookFn>,
    next_id: u64,
    next_seq: u64,
    epoch: Instant,
    published: u64,
}

impl Inner {
    fn with_capacity(history_capacity: usize) -> Self {
        Self {
            listeners: HashMap::new(),
            dispatch_depth: HashMap::new(),
            deferred: Vec::new(),
            spent: HashSet::new(),
            history: VecDeque::new(),
            history_capacity,
            pre_hooks: Vec::new(),
            post_hooks: Vec::new(),
            error_hook: None,
            next_id: 0,
            next_seq: 0,
            epoch: Instant::now(),
            published: 0,
        }
    }

    fn is_dispatching(&self, kind: EventKind) -> bool {
        self.dispatch_depth.get(&kind).copied().unwrap_or(0) > 0
    }

    fn push_history(&mut self, event: GameEvent) {
        self.history.push_back(event);
        while self.history.len() > self.history_capacity {
            self.history.pop_front();
        }
    }

    /// True when an unsubscribe for this listener is already parked.
    fn has_pending_unsubscribe(&self, kind: EventKind, id: SubscriptionId) -> bool {
        self.deferred.iter().any(|op| {
            matches!(op, DeferredOp::Unsubscribe(k, i) if *k == kind && *i == id)
        })
    }
}

/// Insertion position preserving descending priority, registration order on
/// ties.
fn insert_sorted(entries: &mut Vec<ListenerEntry>, entry: ListenerEntry) {
    let at = entries.partition_point(|existing| {
        existing.priority > entry.priority
            || (existing.priority == entry.priority && existing.seq < entry.seq)
    });
    entries.insert(at, entry);
}

/// Cloneable handle to the bus.
///
/// Single-threaded by design: the whole simulation core runs inside one tick
/// call, so the interior is `Rc<RefCell>` rather than a lock.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<RefCell<Inner>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by `subscribe`; detaches the listener on `unsubscribe`.
pub struct Subscription {
    bus: EventBus,
    kind: EventKind,
    id: SubscriptionId,
}

impl Subscription {
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    /// Remove the listener. Removing one that is already gone is a no-op.
    pub fn unsubscribe(self) {
        self.bus.unsubscribe(self.kind, self.id);
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_history_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    #[must_use]
    pub fn with_history_capacity(capacity: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner::with_capacity(capacity))),
        }
    }

    /// Milliseconds elapsed since the bus was created; the event timestamp
    /// clock.
    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.inner.borrow().epoch.elapsed().as_secs_f64() * 1000.0
    }

    // ==================== Registration ====================

    /// Register a listener for one event kind.
    ///
    /// Within a kind, listeners fire in descending priority order; equal
    /// priorities preserve registration order. Subscribing while that kind
    /// is mid-dispatch takes effect once the dispatch completes.
    pub fn subscribe<F>(&self, kind: EventKind, priority: i32, callback: F) -> Subscription
    where
        F: Fn(&mut World, &EventBus, &GameEvent) -> eyre::Result<()> + 'static,
    {
        self.subscribe_entry(kind, priority, false, Rc::new(callback))
    }

    /// As [`subscribe`](Self::subscribe), but the listener is removed
    /// automatically after its first invocation.
    pub fn subscribe_once<F>(&self, kind: EventKind, priority: i32, callback: F) -> Subscription
    where
        F: Fn(&mut World, &EventBus, &GameEvent) -> eyre::Result<()> + 'static,
    {
        self.subscribe_entry(kind, priority, true, Rc::new(callback))
    }

    fn subscribe_entry(
        &self,
        kind: EventKind,
        priority: i32,
        once: bool,
        callback: ListenerFn,
    ) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        let seq = inner.next_seq;
        inner.next_seq += 1;

        let entry = ListenerEntry {
            id,
            priority,
            seq,
            once,
            callback,
        };

        if inner.is_dispatching(kind) {
            inner.deferred.push(DeferredOp::Subscribe(kind, entry));
        } else {
            insert_sorted(inner.listeners.entry(kind).or_default(), entry);
        }

        Subscription {
            bus: self.clone(),
            kind,
            id,
        }
    }

    /// Remove a listener by id. Unknown ids are a no-op. Unsubscribing while
    /// the kind is mid-dispatch is deferred symmetrically to subscribe.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriptionId) {
        let mut inner = self.inner.borrow_mut();
        if inner.is_dispatching(kind) {
            inner.deferred.push(DeferredOp::Unsubscribe(kind, id));
        } else if let Some(entries) = inner.listeners.get_mut(&kind) {
            entries.retain(|entry| entry.id != id);
        }
    }

    // ==================== Middleware ====================

    /// Install a pre-dispatch hook; returning `false` cancels the event
    /// before any listener runs (it is still recorded in history).
    pub fn add_pre_hook<F>(&self, hook: F)
    where
        F: Fn(&GameEvent) -> bool + 'static,
    {
        self.inner.borrow_mut().pre_hooks.push(Rc::new(hook));
    }

    /// Install a post-dispatch hook observing every delivered event.
    pub fn add_post_hook<F>(&self, hook: F)
    where
        F: Fn(&GameEvent) + 'static,
    {
        self.inner.borrow_mut().post_hooks.push(Rc::new(hook));
    }

    /// Install the hook that observes listener faults.
    pub fn set_error_hook<F>(&self, hook: F)
    where
        F: Fn(&ListenerFault) + 'static,
    {
        self.inner.borrow_mut().error_hook = Some(Rc::new(hook));
    }

    // ==================== Publishing ====================

    /// Convenience wrapper stamping the timestamp.
    pub fn publish_with(&self, world: &mut World, data: EventData, source: Option<Entity>) {
        let event = GameEvent {
            timestamp_ms: self.now_ms(),
            source,
            data,
        };
        self.publish(world, event);
    }

    /// Dispatch an event to its kind's listeners, highest priority first.
    ///
    /// Listener errors are isolated per listener: reported via the error
    /// hook and `tracing::error!`, with every remaining listener still
    /// running. A nested publish from inside a listener is delivered fully
    /// (depth-first) before control returns here.
    pub fn publish(&self, world: &mut World, event: GameEvent) {
        let kind = event.kind();

        let (pre_hooks, post_hooks, error_hook) = {
            let mut inner = self.inner.borrow_mut();
            inner.push_history(event);
            inner.published += 1;
            (
                inner.pre_hooks.clone(),
                inner.post_hooks.clone(),
                inner.error_hook.clone(),
            )
        };

        for hook in &pre_hooks {
            if !hook(&event) {
                tracing::debug!(kind = %kind, "event vetoed by middleware");
                return;
            }
        }

        // Snapshot under a short borrow, then release before any callback.
        let snapshot: Vec<(SubscriptionId, bool, ListenerFn)> = {
            let mut inner = self.inner.borrow_mut();
            *inner.dispatch_depth.entry(kind).or_insert(0) += 1;
            let inner = &*inner;
            inner.listeners.get(&kind).map_or_else(Vec::new, |entries| {
                entries
                    .iter()
                    .filter(|entry| {
                        !inner.spent.contains(&entry.id)
                            && !inner.has_pending_unsubscribe(kind, entry.id)
                    })
                    .map(|entry| (entry.id, entry.once, entry.callback.clone()))
                    .collect()
            })
        };

        for (id, once, callback) in snapshot {
            if once {
                // Mark spent before invoking so a nested same-kind publish
                // from inside the callback cannot fire it a second time.
                // Structural removal still waits for dispatch completion.
                let mut inner = self.inner.borrow_mut();
                if !inner.spent.insert(id) {
                    continue; // already fired in a nested dispatch
                }
                drop(inner);
            }

            if let Err(error) = callback(world, self, &event) {
                tracing::error!(kind = %kind, subscription = id.raw(), %error, "listener failed");
                if let Some(hook) = &error_hook {
                    hook(&ListenerFault {
                        kind,
                        subscription: id,
                        error,
                    });
                }
            }
        }

        self.finish_dispatch(kind);

        for hook in &post_hooks {
            hook(&event);
        }
    }

    /// Close out one dispatch level; at the outermost level, sweep spent
    /// one-shots and apply the deferred structural mutations for this kind.
    fn finish_dispatch(&self, kind: EventKind) {
        let mut inner = self.inner.borrow_mut();
        let Some(depth) = inner.dispatch_depth.get_mut(&kind) else {
            return;
        };
        *depth -= 1;
        if *depth > 0 {
            return;
        }
        inner.dispatch_depth.remove(&kind);

        let Inner {
            listeners,
            deferred,
            spent,
            ..
        } = &mut *inner;

        if let Some(entries) = listeners.get_mut(&kind) {
            entries.retain(|entry| !spent.remove(&entry.id));
        }

        let mut index = 0;
        while index < deferred.len() {
            if deferred[index].kind() != kind {
                index += 1;
                continue;
            }
            match deferred.remove(index) {
                DeferredOp::Subscribe(_, entry) => {
                    insert_sorted(listeners.entry(kind).or_default(), entry);
                }
                DeferredOp::Unsubscribe(_, id) => {
                    if let Some(entries) = listeners.get_mut(&kind) {
                        entries.retain(|entry| entry.id != id);
                    }
                    // A deferred one-shot marker may outlive its entry.
                    spent.remove(&id);
                }
            }
        }
    }

    // ==================== Introspection ====================

    /// Number of listeners currently attached for one kind.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.inner
            .borrow()
            .listeners
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Number of listeners across all kinds.
    #[must_use]
    pub fn total_listeners(&self) -> usize {
        self.inner.borrow().listeners.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn has_listeners(&self, kind: EventKind) -> bool {
        self.listener_count(kind) > 0
    }

    /// Copy of the bounded dispatch history, oldest first. Debug/replay aid,
    /// not part of the delivery guarantee.
    #[must_use]
    pub fn history(&self) -> Vec<GameEvent> {
        self.inner.borrow().history.iter().copied().collect()
    }

    /// Total events ever published (vetoed ones included).
    #[must_use]
    pub fn published_count(&self) -> u64 {
        self.inner.borrow().published
    }
}

impl core::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("EventBus")
            .field("kinds", &inner.listeners.len())
            .field("history", &inner.history.len())
            .field("published", &inner.published)
            .finish_non_exhaustive()
    }
}
