//! Shared building blocks for the rdelta crates
//!
//! Everything in here is part of the persisted wire contract in one way or
//! another: the algorithm names handed out by [`registry`] end up inside
//! signature and delta files, so an implementation registered under a name
//! must keep producing the same bytes forever.

pub mod buf;
pub mod checksum;
pub mod hash;
pub mod progress;
pub mod registry;
pub mod wire;
