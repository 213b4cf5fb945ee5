//! Real-time Module
//!
//! Building blocks the collaboration coordinator composes:
//!
//! - **`registry`** - room → sessions map and presence transitions
//! - **`broadcast`** - per-session outboxes and room fan-out
//! - **`presence`** - `user-online` / `user-offline` / snapshots
//! - **`typing`** - typing state with expiry
//! - **`sequencer`** - per-room ordering of persistence and fan-out
//!
//! All shared maps sit behind `std::sync` locks that are never held across
//! an `.await`.

pub mod registry;
pub mod broadcast;
pub mod presence;
pub mod typing;
pub mod sequencer;

pub use registry::{JoinTransition, LeaveTransition, RoomRegistry, RoomView, SessionId};
pub use broadcast::{BroadcastBus, Inbox, Outbox};
pub use presence::PresenceTracker;
pub use typing::{ExpiredTyping, TypingTracker};
pub use sequencer::{RoomSequencers, RoomTurn};
