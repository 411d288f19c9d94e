//! Core domain models for the Gantry CD operations service.
//!
//! Provides the typed representations of pipeline jobs, artifact locations,
//! and configuration versions shared by the cloud adapters and the HTTP
//! handlers, together with the error taxonomy and a clock abstraction for
//! deterministic tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod approval;
pub mod error;
pub mod models;
pub mod time;

pub use approval::{
    ApprovalNotification, ChangeSetTarget, ParameterDelta, PendingApproval, StackParameter,
};
pub use error::{GantryError, Result};
pub use models::{ArtifactLocation, ConfigVersion, JobFailureDetails, PipelineJobEvent};
pub use time::{Clock, RealClock, TestClock};
