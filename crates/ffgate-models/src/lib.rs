//! Shared data models for the ffgate media gateway.
//!
//! This crate provides Serde-serializable types for:
//! - Pipeline descriptors (job kind, arity, engine option vectors)
//! - Input files and their semantic roles
//! - Job identifiers and lifecycle states
//! - Time-span formatting and parsing

pub mod descriptor;
pub mod input;
pub mod job;
pub mod role;
pub mod timestamp;

// Re-export common types
pub use descriptor::{Arity, JobKind, PipelineDescriptor};
pub use input::InputFile;
pub use job::{JobId, JobState, TransitionError};
pub use role::{MediaRole, ParseRoleError};
pub use timestamp::{format_time, parse_time, TimestampError};
