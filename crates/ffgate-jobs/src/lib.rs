//! Job orchestration engine.
//!
//! Given a [`PipelineDescriptor`](ffgate_models::PipelineDescriptor) and an
//! ordered list of inputs, the [`Coordinator`] validates arity, dispatches to
//! the matching strategy and guarantees that every transient file created on
//! the way is released, whatever the outcome.
//!
//! - [`registry`]: built-in descriptors keyed by endpoint id
//! - [`janitor`]: ownership and idempotent release of transient paths
//! - [`fanout`]: index-addressed fan-out/fan-in with a first-error latch
//! - [`strategies`]: one module per job kind
//! - [`schedule`] and [`timestamps`]: pure numeric helpers
//! - [`intake`]: concurrent URL fetching into a collecting job

pub mod classify;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod fanout;
pub mod intake;
pub mod janitor;
pub mod logging;
pub mod registry;
pub mod schedule;
pub mod strategies;
pub mod timestamps;

pub use classify::{classify, resolve_roles, ResolvedRoles};
pub use config::{CoordinatorConfig, IntakeConfig};
pub use coordinator::{Coordinator, Job, JobOutcome};
pub use error::{JobError, JobResult, ReceivedFile};
pub use fanout::{join_indexed, FanOut};
pub use intake::{UrlInput, UrlIntake};
pub use janitor::{Artifact, DeliveryOutcome, Janitor};
pub use logging::JobLogger;
pub use registry::PipelineRegistry;
pub use schedule::FadeSchedule;
pub use timestamps::{build_report, TimestampEntry, TimestampPrecision, TimestampReport};
