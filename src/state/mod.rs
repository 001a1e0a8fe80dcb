//! State module for tracking resolution and batch progress
//!
//! # Components
//!
//! - `ResolvePhase`: phases of the redirect resolution state machine
//! - `ErrorKind`: why a record failed during the fetch phase
//! - `BatchStatus`: where a batch stands relative to the checkpoint

mod batch_status;
mod error_kind;
mod resolve_phase;

// Re-export main types
pub use batch_status::BatchStatus;
pub use error_kind::ErrorKind;
pub use resolve_phase::ResolvePhase;
