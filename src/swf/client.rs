//! SWF Client (§4.11, boundary): speaks the service's JSON 1.0 RPC protocol
//! over HTTP. Request signing is out of scope here (see `DESIGN.md`); the
//! endpoint is expected to sit behind something that handles SigV4, e.g. a
//! local signing proxy.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::TransportError;
use crate::swf::types::{
    DecisionTask, DeprecateWorkflowTypeRequest, PollForDecisionTaskRequest,
    RegisterActivityTypeRequest, RegisterWorkflowTypeRequest, RespondDecisionTaskCompletedRequest,
    StartWorkflowExecutionRequest, StartWorkflowExecutionResponse,
};

/// The operations this decider needs from Amazon SWF.
///
/// Mirrors the service's JSON RPC surface, one method per action, so a test
/// double can be swapped in without touching caller code.
#[async_trait]
pub trait SwfClient: Send + Sync {
    async fn poll_for_decision_task(
        &self,
        request: &PollForDecisionTaskRequest,
    ) -> Result<DecisionTask, TransportError>;

    async fn respond_decision_task_completed(
        &self,
        request: &RespondDecisionTaskCompletedRequest,
    ) -> Result<(), TransportError>;

    async fn register_workflow_type(
        &self,
        request: &RegisterWorkflowTypeRequest,
    ) -> Result<(), TransportError>;

    async fn register_activity_type(
        &self,
        request: &RegisterActivityTypeRequest,
    ) -> Result<(), TransportError>;

    async fn deprecate_workflow_type(
        &self,
        request: &DeprecateWorkflowTypeRequest,
    ) -> Result<(), TransportError>;

    async fn start_workflow_execution(
        &self,
        request: &StartWorkflowExecutionRequest,
    ) -> Result<StartWorkflowExecutionResponse, TransportError>;
}

/// The SWF error response body's `__type` field, used to distinguish
/// `TypeAlreadyExistsFault` (treated as success by the Registrar) from
/// other faults.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    kind: Option<String>,
    message: Option<String>,
}

pub struct HttpSwfClient {
    endpoint: String,
    client: Client,
}

impl HttpSwfClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(crate::decider::SOCKET_TIMEOUT_FLOOR)
            .build()
            .expect("reqwest client configuration is valid");
        HttpSwfClient {
            endpoint: endpoint.into(),
            client,
        }
    }

    /// Issue one `X-Amz-Target`-dispatched JSON 1.0 RPC call.
    async fn call<Req: Serialize + Sync, Resp: serde::de::DeserializeOwned>(
        &self,
        action: &'static str,
        body: &Req,
    ) -> Result<Resp, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/x-amz-json-1.0")
            .header("X-Amz-Target", format!("SimpleWorkflowService.{action}"))
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                operation: action,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body: ErrorBody = response.json().await.unwrap_or(ErrorBody {
                kind: None,
                message: None,
            });
            return Err(TransportError::Request {
                operation: action,
                message: format!(
                    "{status}: {} ({})",
                    body.message.unwrap_or_default(),
                    body.kind.unwrap_or_default()
                ),
            });
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::UnexpectedResponse {
                operation: action,
                message: e.to_string(),
            })
    }

    /// As [`Self::call`], but a `200 OK` with an empty body is the expected
    /// success response (register/respond/deprecate all return nothing).
    async fn call_unit<Req: Serialize + Sync>(
        &self,
        action: &'static str,
        body: &Req,
    ) -> Result<(), TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/x-amz-json-1.0")
            .header("X-Amz-Target", format!("SimpleWorkflowService.{action}"))
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                operation: action,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body: ErrorBody = response.json().await.unwrap_or(ErrorBody {
                kind: None,
                message: None,
            });
            let kind = body.kind.unwrap_or_default();
            if kind.ends_with("TypeAlreadyExistsFault") {
                return Ok(());
            }
            return Err(TransportError::Request {
                operation: action,
                message: format!("{status}: {} ({kind})", body.message.unwrap_or_default()),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SwfClient for HttpSwfClient {
    async fn poll_for_decision_task(
        &self,
        request: &PollForDecisionTaskRequest,
    ) -> Result<DecisionTask, TransportError> {
        self.call("PollForDecisionTask", request).await
    }

    async fn respond_decision_task_completed(
        &self,
        request: &RespondDecisionTaskCompletedRequest,
    ) -> Result<(), TransportError> {
        self.call_unit("RespondDecisionTaskCompleted", request).await
    }

    async fn register_workflow_type(
        &self,
        request: &RegisterWorkflowTypeRequest,
    ) -> Result<(), TransportError> {
        self.call_unit("RegisterWorkflowType", request).await
    }

    async fn register_activity_type(
        &self,
        request: &RegisterActivityTypeRequest,
    ) -> Result<(), TransportError> {
        self.call_unit("RegisterActivityType", request).await
    }

    async fn deprecate_workflow_type(
        &self,
        request: &DeprecateWorkflowTypeRequest,
    ) -> Result<(), TransportError> {
        self.call_unit("DeprecateWorkflowType", request).await
    }

    async fn start_workflow_execution(
        &self,
        request: &StartWorkflowExecutionRequest,
    ) -> Result<StartWorkflowExecutionResponse, TransportError> {
        self.call("StartWorkflowExecution", request).await
    }
}
