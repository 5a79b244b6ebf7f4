//! Access pipeline
//!
//! Runs a protected resource request through its stages in strict order:
//! authenticate the token, decode the payload, check expiration and context
//! binding, locate the file, dispatch it. Requests without a token are
//! reported as [`AccessOutcome::NotInvolved`].

mod access;
mod stage;

pub use access::{AccessPipeline, AccessPipelineBuilder};
pub use stage::{AccessOutcome, PipelineStage};
