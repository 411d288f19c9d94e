//! Pipeline orchestrator seam: job result reporting and execution start.
//!
//! A job is terminated by reporting success or failure exactly once. No
//! call is retried; the caller decides what a reporting failure means for
//! its own response.

use std::{future::Future, pin::Pin};

use aws_sdk_codepipeline::types::{FailureDetails, FailureType};
use gantry_core::{error::Result, GantryError, JobFailureDetails};
use tracing::debug;

/// Orchestrator operations required by the promotion and release handlers.
pub trait PipelineService: Send + Sync + 'static {
    /// Reports a job as succeeded. Carries no payload beyond the job id.
    fn report_job_success(
        &self,
        job_id: String,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Reports a job as failed with the given failure details.
    fn report_job_failure(
        &self,
        job_id: String,
        details: JobFailureDetails,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Starts an execution of the named pipeline.
    ///
    /// Returns the execution id when the orchestrator provides one.
    fn start_execution(
        &self,
        pipeline_name: String,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + '_>>;
}

/// Production orchestrator adapter backed by the CodePipeline API.
#[derive(Debug, Clone)]
pub struct CodePipelineService {
    client: aws_sdk_codepipeline::Client,
}

impl CodePipelineService {
    /// Creates a new adapter around a configured CodePipeline client.
    pub fn new(client: aws_sdk_codepipeline::Client) -> Self {
        Self { client }
    }
}

impl PipelineService for CodePipelineService {
    fn report_job_success(
        &self,
        job_id: String,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let client = self.client.clone();
        Box::pin(async move {
            debug!(job_id = %job_id, "reporting job success");
            client
                .put_job_success_result()
                .job_id(job_id)
                .send()
                .await
                .map_err(|e| GantryError::report_result_failed(e.to_string()))?;
            Ok(())
        })
    }

    fn report_job_failure(
        &self,
        job_id: String,
        details: JobFailureDetails,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let client = self.client.clone();
        Box::pin(async move {
            debug!(job_id = %job_id, "reporting job failure");
            let failure_details = FailureDetails::builder()
                .message(details.message)
                .r#type(FailureType::from(details.failure_type.as_str()))
                .external_execution_id(details.external_execution_id)
                .build()
                .map_err(|e| GantryError::report_result_failed(e.to_string()))?;

            client
                .put_job_failure_result()
                .job_id(job_id)
                .failure_details(failure_details)
                .send()
                .await
                .map_err(|e| GantryError::report_result_failed(e.to_string()))?;
            Ok(())
        })
    }

    fn start_execution(
        &self,
        pipeline_name: String,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + '_>> {
        let client = self.client.clone();
        Box::pin(async move {
            let output = client
                .start_pipeline_execution()
                .name(pipeline_name)
                .send()
                .await
                .map_err(|e| GantryError::start_execution_failed(e.to_string()))?;

            Ok(output.pipeline_execution_id().map(str::to_string))
        })
    }
}

pub mod mock {
    //! In-memory orchestrator for testing handler logic.

    use std::sync::Arc;

    use tokio::sync::RwLock;

    use super::{GantryError, JobFailureDetails, PipelineService, Result};
    use std::{future::Future, pin::Pin};

    /// Mock orchestrator recording every report and execution start.
    ///
    /// Injected errors persist across calls so repeated identical requests
    /// observe identical behavior.
    #[derive(Debug, Default)]
    pub struct MockPipelineService {
        started: Arc<RwLock<Vec<String>>>,
        successes: Arc<RwLock<Vec<String>>>,
        failures: Arc<RwLock<Vec<(String, JobFailureDetails)>>>,
        start_error: Arc<RwLock<Option<String>>>,
        report_error: Arc<RwLock<Option<String>>>,
    }

    impl MockPipelineService {
        /// Creates an empty mock orchestrator.
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every subsequent execution start fail with the message.
        pub async fn inject_start_error(&self, message: impl Into<String>) {
            *self.start_error.write().await = Some(message.into());
        }

        /// Makes every subsequent result report fail with the message.
        pub async fn inject_report_error(&self, message: impl Into<String>) {
            *self.report_error.write().await = Some(message.into());
        }

        /// Pipeline names whose executions were started, in order.
        pub async fn started_pipelines(&self) -> Vec<String> {
            self.started.read().await.clone()
        }

        /// Job ids reported as succeeded, in order.
        pub async fn reported_successes(&self) -> Vec<String> {
            self.successes.read().await.clone()
        }

        /// Job ids and details reported as failed, in order.
        pub async fn reported_failures(&self) -> Vec<(String, JobFailureDetails)> {
            self.failures.read().await.clone()
        }
    }

    impl PipelineService for MockPipelineService {
        fn report_job_success(
            &self,
            job_id: String,
        ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
            let successes = self.successes.clone();
            let report_error = self.report_error.clone();
            Box::pin(async move {
                if let Some(message) = report_error.read().await.clone() {
                    return Err(GantryError::report_result_failed(message));
                }
                successes.write().await.push(job_id);
                Ok(())
            })
        }

        fn report_job_failure(
            &self,
            job_id: String,
            details: JobFailureDetails,
        ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
            let failures = self.failures.clone();
            let report_error = self.report_error.clone();
            Box::pin(async move {
                if let Some(message) = report_error.read().await.clone() {
                    return Err(GantryError::report_result_failed(message));
                }
                failures.write().await.push((job_id, details));
                Ok(())
            })
        }

        fn start_execution(
            &self,
            pipeline_name: String,
        ) -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + '_>> {
            let started = self.started.clone();
            let start_error = self.start_error.clone();
            Box::pin(async move {
                if let Some(message) = start_error.read().await.clone() {
                    return Err(GantryError::start_execution_failed(message));
                }
                started.write().await.push(pipeline_name);
                Ok(Some("exec-mock-1".to_string()))
            })
        }
    }
}
