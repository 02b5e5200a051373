//! Decider Loop (§4.7): long-polls SWF for decision tasks, reduces history,
//! runs the Decision Builder, and posts the resulting decisions back.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::builder;
use crate::error::{DeciderError, SeddyError};
use crate::history::History;
use crate::spec::WorkflowSet;
use crate::swf::client::SwfClient;
use crate::swf::types::{
    DecisionTask, PollForDecisionTaskRequest, RespondDecisionTaskCompletedRequest, TaskListSpec,
};

/// Floor on RPC idle timeout: SWF's long-poll itself may take up to ~60s,
/// so anything talking to it needs headroom past that (§4.7).
pub const SOCKET_TIMEOUT_FLOOR: Duration = Duration::from_secs(70);

pub struct Decider<C> {
    client: Arc<C>,
    domain: String,
    task_list: String,
    identity: String,
    workflows: WorkflowSet,
}

impl<C: SwfClient> Decider<C> {
    pub fn new(
        client: Arc<C>,
        domain: String,
        task_list: String,
        identity: String,
        workflows: WorkflowSet,
    ) -> Self {
        Decider {
            client,
            domain,
            task_list,
            identity,
            workflows,
        }
    }

    /// Run until `shutdown` fires. Any in-flight decision task is finished
    /// before this returns (§4.7): the poll itself is abandoned on
    /// shutdown, but once a task token is in hand we always respond.
    ///
    /// A `TransportError` is retried with exponential backoff rather than
    /// propagated; a `DeciderError` or unrecoverable `BuilderError` stops
    /// the loop (§7).
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), SeddyError> {
        info!(domain = %self.domain, task_list = %self.task_list, identity = %self.identity, "starting decider loop");
        let mut backoff = Backoff::new();
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("shutdown requested, stopping decider loop");
                    return Ok(());
                }
                result = self.poll_and_decide() => {
                    match result {
                        Ok(()) => backoff.reset(),
                        Err(err @ SeddyError::Transport(_)) => {
                            warn!(error = %err, delay = ?backoff.peek(), "transport error, retrying");
                            tokio::time::sleep(backoff.next_delay()).await;
                        }
                        Err(err) => {
                            error!(error = %err, "decision task processing failed");
                            return Err(err);
                        }
                    }
                }
            }
        }
    }

    /// One iteration: long-poll, page through history, build decisions,
    /// respond. Returns `Ok(())` with nothing done on an empty poll.
    async fn poll_and_decide(&self) -> Result<(), SeddyError> {
        let Some(task) = self.poll_full_task().await? else {
            return Ok(());
        };

        let graph = self
            .workflows
            .get(&task.workflow_type.name, &task.workflow_type.version)
            .ok_or_else(|| SeddyError::UnsupportedWorkflow {
                name: task.workflow_type.name.clone(),
                version: task.workflow_type.version.clone(),
            });

        let task_token = task.task_token.clone().ok_or_else(|| {
            SeddyError::Decider(DeciderError::ProtocolViolation(
                "PollForDecisionTask returned no taskToken".to_string(),
            ))
        })?;

        let decisions = match graph {
            Ok(graph) => {
                let history = History::reduce(&task)?;
                match builder::build(graph, &history, &self.identity) {
                    Ok(decisions) => decisions,
                    // A decider-level failure (bad permissions, a malformed
                    // or protocol-violating history) is this decider's
                    // problem, not the workflow's — stop the loop (§4.5 step 2).
                    Err(err @ crate::error::BuilderError::Decider(_)) => return Err(err.into()),
                    Err(err) => {
                        warn!(error = %err, "decision builder failed, failing the workflow");
                        vec![crate::decision::Decision::fail_workflow_execution(
                            "deciderError".to_string(),
                            Some(err.to_string()),
                        )]
                    }
                }
            }
            Err(SeddyError::UnsupportedWorkflow { name, version }) => {
                warn!(%name, %version, "decision task for an unregistered workflow");
                vec![crate::decision::Decision::fail_workflow_execution(
                    "deciderError".to_string(),
                    Some(format!("workflow {name} version {version} is not registered")),
                )]
            }
            Err(err) => return Err(err),
        };

        debug!(decisions = decisions.len(), "responding to decision task");
        self.client
            .respond_decision_task_completed(&RespondDecisionTaskCompletedRequest {
                task_token,
                decisions,
            })
            .await?;
        Ok(())
    }

    /// Long-poll once, then page through `nextPageToken` until the full
    /// event history for this decision task has been assembled.
    async fn poll_full_task(&self) -> Result<Option<DecisionTask>, SeddyError> {
        let mut request = PollForDecisionTaskRequest {
            domain: self.domain.clone(),
            task_list: TaskListSpec { name: self.task_list.clone() },
            identity: self.identity.clone(),
            next_page_token: None,
        };

        let mut task = self.client.poll_for_decision_task(&request).await?;
        if task.task_token.is_none() {
            return Ok(None);
        }

        while let Some(next_page_token) = task.next_page_token.take() {
            request.next_page_token = Some(next_page_token);
            let mut page = self.client.poll_for_decision_task(&request).await?;
            task.events.append(&mut page.events);
            task.next_page_token = page.next_page_token;
        }

        Ok(Some(task))
    }
}

/// Exponential backoff for retried transport errors, capped at 30s.
struct Backoff {
    delay: Duration,
}

const BACKOFF_INITIAL: Duration = Duration::from_secs(1);
const BACKOFF_MAX: Duration = Duration::from_secs(30);

impl Backoff {
    fn new() -> Self {
        Backoff { delay: BACKOFF_INITIAL }
    }

    fn peek(&self) -> Duration {
        self.delay
    }

    fn next_delay(&mut self) -> Duration {
        let delay = self.delay;
        self.delay = (self.delay * 2).min(BACKOFF_MAX);
        delay
    }

    fn reset(&mut self) {
        self.delay = BACKOFF_INITIAL;
    }
}

/// Generate this decider's identity as `FQDN + "-" + short-uuid` (§4.7).
pub fn generate_identity() -> String {
    let host = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "localhost".to_string());
    let short_uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("{host}-{}", &short_uuid[..8])
}
