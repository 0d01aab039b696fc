pub use crate::errors::HarnessError;

pub mod cli;
pub mod discovery;
pub mod engine;
pub mod errors;
pub mod executor;
pub mod golden;
pub mod harness;
pub mod output;
pub mod reporter;
