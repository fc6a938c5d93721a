//! Shared data model for the Tinker prompt playground.
//!
//! Pure data and serde only; the store and client crates build on these types.

pub mod chunk;
pub mod ids;
pub mod params;
pub mod types;

pub use chunk::*;
pub use ids::*;
pub use params::*;
pub use types::*;
