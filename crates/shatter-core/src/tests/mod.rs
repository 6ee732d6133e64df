//! Crate-level tests.
//!
//! - `helpers.rs`: a recording [`ClassContext`](crate::classes::ClassContext)
//!   used by the class unit tests
//! - `integration.rs`: whole-session tests driven through [`Game`](crate::game::Game)
//! - `properties.rs`: proptest invariants

pub mod helpers;
mod properties;
