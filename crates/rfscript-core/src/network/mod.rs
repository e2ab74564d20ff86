//! Network module - one multi-port S-parameter dataset over frequency
//!
//! Every operation returns a fresh `Network`; nothing is mutated in place.
//! Operations that only make sense for certain port counts return
//! `Result<Network, DropReason>` so the collection layer can record why a
//! member was omitted.

mod core;
mod derived;
mod elements;
mod operators;

pub use self::core::Network;
pub use elements::{Lumped, Topology};
