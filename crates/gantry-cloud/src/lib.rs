//! External service adapters for the Gantry CD operations service.
//!
//! The artifact storage service and the pipeline orchestrator are external
//! collaborators invoked through their published APIs. This crate puts a
//! trait seam in front of each so handler logic can be exercised against
//! deterministic in-memory mocks, with the AWS SDK implementations used in
//! production.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod change_set;
pub mod notifier;
pub mod object_store;
pub mod pipeline;

pub use change_set::{CloudFormationInspector, StackInspector};
pub use notifier::{MessageRelay, SnsMessageRelay};
pub use object_store::{ObjectStore, S3ObjectStore};
pub use pipeline::{CodePipelineService, PipelineService};
