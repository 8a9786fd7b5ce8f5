//! Shared-state primitives used by the server.
//!
//! - **`registry`**: a mutex-guarded map whose operations demand a guard
//!   acquired from that same registry, so callers hold the lock across
//!   multi-step check-then-act sequences.
//! - **`queue`**: an unbounded FIFO used to hand console lines from workers
//!   to the control loop.

pub mod queue;
pub mod registry;

pub use queue::Queue;
pub use registry::{Registry, RegistryGuard};
