pub mod auditor;
pub mod cli;
pub mod commands;
pub mod environment;
pub mod errors;
pub mod locators;
pub mod logger;
pub mod objects;
pub mod remote;
pub mod utils;
pub mod verifier;

pub use auditor::{CancellationToken, ChainAuditor, RunState, SyncPolicy};
pub use errors::VerifierError;

#[cfg(test)]
mod testing;
