//! Periodic sweep scheduling
//!
//! A single [`SweepActor`](scheduler::SweepActor) owns the sweep timer and
//! runs sweeps one after another, so two sweeps never overlap. It is
//! controlled through a cloneable [`SweepHandle`](scheduler::SweepHandle).
//!
//! ```text
//! ticker ──┐
//!          ├──→ SweepActor ──→ SweepRunner::sweep_all
//! commands ┘        │
//!  (SweepNow,       └──→ StatusStore::cleanup_history (retention ticker)
//!   UpdateInterval,
//!   Shutdown)
//! ```

pub mod messages;
pub mod scheduler;

pub use messages::SweepCommand;
pub use scheduler::{RetentionPolicy, SweepActor, SweepHandle};
