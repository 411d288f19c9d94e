//! Stack inspection seam: deployed-stack and change-set parameters.
//!
//! Production uses the CloudFormation API. Both lookups are single-attempt;
//! a failure is terminal for the invocation that issued it.

use std::{future::Future, pin::Pin};

use gantry_core::{error::Result, GantryError, StackParameter};
use tracing::debug;

/// Lookups required by the approval-notification handler.
pub trait StackInspector: Send + Sync + 'static {
    /// Parameters of the currently deployed stack.
    fn stack_parameters(
        &self,
        stack_name: String,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StackParameter>>> + Send + '_>>;

    /// Parameters the named change set would apply to the stack.
    fn change_set_parameters(
        &self,
        stack_name: String,
        change_set_name: String,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StackParameter>>> + Send + '_>>;
}

/// Production inspector backed by the CloudFormation API.
#[derive(Debug, Clone)]
pub struct CloudFormationInspector {
    client: aws_sdk_cloudformation::Client,
}

impl CloudFormationInspector {
    /// Creates a new adapter around a configured CloudFormation client.
    pub fn new(client: aws_sdk_cloudformation::Client) -> Self {
        Self { client }
    }
}

fn collect_parameters(
    parameters: &[aws_sdk_cloudformation::types::Parameter],
) -> Vec<StackParameter> {
    parameters
        .iter()
        .filter_map(|p| {
            let key = p.parameter_key()?;
            let value = p.parameter_value()?;
            Some(StackParameter::new(key, value))
        })
        .collect()
}

impl StackInspector for CloudFormationInspector {
    fn stack_parameters(
        &self,
        stack_name: String,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StackParameter>>> + Send + '_>> {
        let client = self.client.clone();
        Box::pin(async move {
            debug!(stack = %stack_name, "describing deployed stack");
            let output = client
                .describe_stacks()
                .stack_name(&stack_name)
                .send()
                .await
                .map_err(|e| GantryError::inspect_stack_failed(e.to_string()))?;

            let stack = output.stacks().first().ok_or_else(|| {
                GantryError::inspect_stack_failed(format!("stack {stack_name} not found"))
            })?;

            Ok(collect_parameters(stack.parameters()))
        })
    }

    fn change_set_parameters(
        &self,
        stack_name: String,
        change_set_name: String,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StackParameter>>> + Send + '_>> {
        let client = self.client.clone();
        Box::pin(async move {
            debug!(stack = %stack_name, change_set = %change_set_name, "describing change set");
            let output = client
                .describe_change_set()
                .stack_name(stack_name)
                .change_set_name(change_set_name)
                .send()
                .await
                .map_err(|e| GantryError::inspect_stack_failed(e.to_string()))?;

            Ok(collect_parameters(output.parameters()))
        })
    }
}

pub mod mock {
    //! In-memory stack inspector for testing handler logic.

    use std::sync::Arc;

    use tokio::sync::RwLock;

    use super::{GantryError, Result, StackInspector, StackParameter};
    use std::{future::Future, pin::Pin};

    /// Mock inspector with configurable parameter sets and injectable
    /// failures.
    ///
    /// Injected errors persist across calls so repeated identical requests
    /// observe identical behavior.
    #[derive(Debug, Default)]
    pub struct MockStackInspector {
        stack: Arc<RwLock<Vec<StackParameter>>>,
        change_set: Arc<RwLock<Vec<StackParameter>>>,
        error: Arc<RwLock<Option<String>>>,
    }

    impl MockStackInspector {
        /// Creates an empty mock inspector.
        pub fn new() -> Self {
            Self::default()
        }

        /// Replaces the deployed-stack parameters.
        pub async fn set_stack_parameters(&self, parameters: Vec<StackParameter>) {
            *self.stack.write().await = parameters;
        }

        /// Replaces the change-set parameters.
        pub async fn set_change_set_parameters(&self, parameters: Vec<StackParameter>) {
            *self.change_set.write().await = parameters;
        }

        /// Makes every subsequent lookup fail with the given message.
        pub async fn inject_error(&self, message: impl Into<String>) {
            *self.error.write().await = Some(message.into());
        }
    }

    impl StackInspector for MockStackInspector {
        fn stack_parameters(
            &self,
            _stack_name: String,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<StackParameter>>> + Send + '_>> {
            let stack = self.stack.clone();
            let error = self.error.clone();
            Box::pin(async move {
                if let Some(message) = error.read().await.clone() {
                    return Err(GantryError::inspect_stack_failed(message));
                }
                Ok(stack.read().await.clone())
            })
        }

        fn change_set_parameters(
            &self,
            _stack_name: String,
            _change_set_name: String,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<StackParameter>>> + Send + '_>> {
            let change_set = self.change_set.clone();
            let error = self.error.clone();
            Box::pin(async move {
                if let Some(message) = error.read().await.clone() {
                    return Err(GantryError::inspect_stack_failed(message));
                }
                Ok(change_set.read().await.clone())
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use gantry_core::StackParameter;

    use super::{mock::MockStackInspector, StackInspector};

    #[tokio::test]
    async fn mock_serves_configured_parameter_sets() {
        let inspector = MockStackInspector::new();
        inspector.set_stack_parameters(vec![StackParameter::new("Env", "staging")]).await;
        inspector
            .set_change_set_parameters(vec![StackParameter::new("Env", "production")])
            .await;

        let stack = inspector.stack_parameters("infra".to_string()).await.unwrap();
        let change_set = inspector
            .change_set_parameters("infra".to_string(), "cs-1".to_string())
            .await
            .unwrap();

        assert_eq!(stack, vec![StackParameter::new("Env", "staging")]);
        assert_eq!(change_set, vec![StackParameter::new("Env", "production")]);
    }

    #[tokio::test]
    async fn mock_error_is_persistent() {
        let inspector = MockStackInspector::new();
        inspector.inject_error("access denied").await;

        assert!(inspector.stack_parameters("infra".to_string()).await.is_err());
        assert!(inspector
            .change_set_parameters("infra".to_string(), "cs-1".to_string())
            .await
            .is_err());
    }
}
