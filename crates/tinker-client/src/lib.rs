//! Consumer-side plumbing for the playground: backend seam, request building,
//! streamed-response accumulation, and the run driver.

pub mod abort;
pub mod accumulator;
pub mod backend;
pub mod errors;
pub mod request;
pub mod runner;

pub use abort::*;
pub use accumulator::*;
pub use backend::*;
pub use errors::*;
pub use request::*;
pub use runner::*;
