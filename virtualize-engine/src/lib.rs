//! Observer wiring and lifecycle for the `virtualize` crate.
//!
//! `virtualize` holds the measurement and anchoring algorithms. This crate connects them to a
//! platform's observers:
//!
//! - a visibility watcher that throttles sentinel intersections into host notifications
//! - a reactivity watcher that re-anchors after item resizes and subtree mutations
//! - a per-handle observer bundle and the [`Virtualize`] facade owning all of them
//!
//! Time is adapter-driven (`tick` / `animation_frame`), which keeps the engine deterministic.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod bundle;
mod engine;
mod error;
mod host;
mod observe;
mod reactivity;
mod scheduler;
mod visibility;

#[cfg(test)]
mod tests;

pub use engine::Virtualize;
pub use error::{Result, VirtualizeError};
pub use host::{HostHandle, SentinelVisible, VirtualizeHost};
pub use observe::{IntersectionEntry, Observe, Watch};
