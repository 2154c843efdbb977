//! Horde event bus - decoupled communication between behavior units and
//! external collaborators.
//!
//! # Key Concepts
//!
//! - **Event**: an immutable-by-convention fact with a closed kind and a
//!   strongly shaped payload
//! - **Listener**: a prioritized callback on one kind; within a kind,
//!   delivery is strictly descending priority, registration order on ties
//! - **Re-entrancy**: listeners may subscribe, unsubscribe, and publish from
//!   inside their own callbacks; structural changes to a kind mid-dispatch
//!   are parked on a deferred-operation queue, nested publishes run
//!   depth-first
//! - **Middleware**: pre-dispatch veto hooks, post-dispatch observers, and
//!   an error hook for listener faults
//!
//! Delivery ordering is guaranteed only within a single kind's listener
//! list; events are fire-and-forget.

mod bus;
mod event;

pub use bus::{
    DEFAULT_HISTORY_CAPACITY, ErrorHookFn, EventBus, ListenerFault, ListenerFn, PostDispatchFn,
    PreDispatchFn, Subscription, SubscriptionId,
};
pub use event::{CollisionContact, EventData, EventKind, GameEvent, ParseEventError};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        CollisionContact, EventBus, EventData, EventKind, GameEvent, Subscription, SubscriptionId,
    };
}
