//! Playground Instance Store: immutable snapshots, pure transitions, and an
//! observable store wrapper that publishes snapshot replacements atomically.

pub mod catalog;
pub mod defaults;
pub mod state;
pub mod store;
pub mod transitions;

pub use catalog::*;
pub use defaults::*;
pub use state::*;
pub use store::*;
pub use transitions::*;
