//! Directory, review, and forum backend.
//!
//! A single-node REST service where users list businesses, rate and review
//! them, and publish forum articles with comments; administrators moderate
//! submitted content through a shared pending/approved/rejected state
//! machine. Company ratings are derived values, recomputed from the approved
//! review set inside the transaction of every review mutation.
//!
//! Layout follows the hexagonal split: [`domain`] holds entities, invariants,
//! and ports; [`inbound::http`] the REST adapter; [`outbound`] the Diesel,
//! in-memory, and filesystem adapters; [`server`] the wiring.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;

pub use doc::ApiDoc;
