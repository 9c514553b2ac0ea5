//! Test-only adapters that live inside the domain crate for convenience.
//!
//! These are intended purely for unit testing and local demos. Real adapters
//! (system DNS, PNG rendering) live in separate crates under `adapters/`.

pub mod stub;
