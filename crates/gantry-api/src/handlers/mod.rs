//! HTTP request handlers for the Gantry API.
//!
//! Handlers are grouped by the event they serve:
//! - `commands` - slash-command router (signature check + dispatch)
//! - `rollback` - configuration version listing for rollback selection
//! - `release` - CD pipeline execution trigger
//! - `promote` - pipeline-job artifact promotion
//! - `approval` - manual-approval notification relay
//! - `health` - liveness probes
//!
//! Every handler is a pure function of its single request plus the
//! read-only application state: no state survives an invocation, and each
//! external service call is attempted exactly once.

pub mod approval;
pub mod commands;
pub mod health;
pub mod promote;
pub mod release;
pub mod rollback;

pub use approval::approval_notification;
pub use commands::slash_command;
pub use health::{health_check, liveness_check};
pub use promote::promote_artifact;
