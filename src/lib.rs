pub mod instruction;
pub mod tape;
pub mod engine;
pub mod runner;
pub mod render;
pub mod error;

pub use engine::{Engine, RunOutcome, Step};
pub use error::{Error, Result};
