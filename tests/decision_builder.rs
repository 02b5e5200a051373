//! End-to-end scenarios: a four-task workflow `foo -> {bar,yay} -> tin`,
//! decided pass by pass exactly as a real execution's history would
//! accumulate.

use std::collections::HashSet;

use serde_json::json;

use seddy::dag::TaskGraph;
use seddy::decision::Decision;
use seddy::history::History;
use seddy::spec::model::{RawWorkflow, Task, TaskInput, TimeoutSpec, TypeId};
use seddy::swf::types::{
    ActivityTaskCompletedAttrs, ActivityTaskFailedAttrs, ActivityTaskScheduledAttrs,
    ActivityTaskTimedOutAttrs, DecisionFailedAttrs, DecisionFailureCause, DecisionTask,
    DecisionTaskCompletedAttrs, DecisionTaskStartedAttrs, Event, EventType, ScheduledEventRefAttrs,
    TimeoutType, WorkflowExecutionStartedAttrs,
};

const IDENTITY: &str = "decider-under-test";

fn type_id(name: &str) -> TypeId {
    TypeId { name: name.to_string(), version: "1.0".to_string() }
}

fn graph() -> TaskGraph {
    let tasks = vec![
        Task {
            id: "foo".to_string(),
            activity_type: type_id("foo-activity"),
            input: Some(TaskInput::WorkflowInput { path: "$".into(), default: None }),
            heartbeat: Some(TimeoutSpec::Seconds(60)),
            timeout: Some(TimeoutSpec::Seconds(86400)),
            task_list: Some("eggs".to_string()),
            priority: Some(1),
            dependencies: HashSet::new(),
            skip_if: None,
        },
        Task {
            id: "bar".to_string(),
            activity_type: type_id("bar-activity"),
            input: None,
            heartbeat: None,
            timeout: None,
            task_list: None,
            priority: None,
            dependencies: ["foo".to_string()].into_iter().collect(),
            skip_if: None,
        },
        Task {
            id: "yay".to_string(),
            activity_type: type_id("yay-activity"),
            input: None,
            heartbeat: None,
            timeout: None,
            task_list: None,
            priority: None,
            dependencies: ["foo".to_string()].into_iter().collect(),
            skip_if: None,
        },
        Task {
            id: "tin".to_string(),
            activity_type: type_id("tin-activity"),
            input: None,
            heartbeat: None,
            timeout: None,
            task_list: None,
            priority: None,
            dependencies: ["bar".to_string(), "yay".to_string()].into_iter().collect(),
            skip_if: None,
        },
    ];
    TaskGraph::build(RawWorkflow {
        spec_type: "dag".to_string(),
        name: "demo".to_string(),
        version: "1.0".to_string(),
        description: None,
        registration: None,
        tasks,
    })
    .unwrap()
}

fn blank_event(id: u64, event_type: EventType) -> Event {
    Event {
        id,
        event_type,
        workflow_execution_started: None,
        activity_task_scheduled: None,
        activity_task_started: None,
        activity_task_completed: None,
        activity_task_failed: None,
        activity_task_timed_out: None,
        decision_task_started: None,
        decision_task_completed: None,
        decision_task_timed_out: None,
        record_marker_failed: None,
        schedule_activity_task_failed: None,
        request_cancel_activity_task_failed: None,
        start_timer_failed: None,
        cancel_timer_failed: None,
        start_child_workflow_execution_failed: None,
        signal_external_workflow_execution_failed: None,
        request_cancel_external_workflow_execution_failed: None,
        cancel_workflow_execution_failed: None,
        complete_workflow_execution_failed: None,
        continue_as_new_workflow_execution_failed: None,
        fail_workflow_execution_failed: None,
    }
}

/// Accumulates history across decision passes the way a real execution
/// would, handing back one reduced `History` per `decide()` call.
struct HistoryBuilder {
    events: Vec<Event>,
    next_id: u64,
    last_started_event_id: Option<u64>,
}

impl HistoryBuilder {
    fn with_start(input: serde_json::Value) -> Self {
        let mut hb = HistoryBuilder { events: Vec::new(), next_id: 1, last_started_event_id: None };
        let mut start = blank_event(0, EventType::WorkflowExecutionStarted);
        start.workflow_execution_started =
            Some(WorkflowExecutionStartedAttrs { input: Some(input.to_string()) });
        hb.push(start);
        hb
    }

    fn push(&mut self, mut event: Event) -> u64 {
        let id = self.next_id;
        event.id = id;
        self.next_id += 1;
        self.events.push(event);
        id
    }

    fn schedule(&mut self, activity_id: &str, activity_type: &str) -> u64 {
        let mut e = blank_event(0, EventType::ActivityTaskScheduled);
        e.activity_task_scheduled = Some(ActivityTaskScheduledAttrs {
            activity_id: activity_id.to_string(),
            activity_type: type_id(activity_type),
        });
        self.push(e)
    }

    fn start(&mut self, scheduled_event_id: u64) -> u64 {
        let mut e = blank_event(0, EventType::ActivityTaskStarted);
        e.activity_task_started = Some(ScheduledEventRefAttrs { scheduled_event_id });
        self.push(e)
    }

    fn complete(&mut self, scheduled_event_id: u64, result: Option<&str>) -> u64 {
        let mut e = blank_event(0, EventType::ActivityTaskCompleted);
        e.activity_task_completed = Some(ActivityTaskCompletedAttrs {
            scheduled_event_id,
            result: result.map(str::to_string),
        });
        self.push(e)
    }

    fn fail(&mut self, scheduled_event_id: u64) -> u64 {
        let mut e = blank_event(0, EventType::ActivityTaskFailed);
        e.activity_task_failed = Some(ActivityTaskFailedAttrs {
            scheduled_event_id,
            reason: Some("boom".into()),
            details: None,
        });
        self.push(e)
    }

    fn timed_out(&mut self, scheduled_event_id: u64, timeout_type: TimeoutType) -> u64 {
        let mut e = blank_event(0, EventType::ActivityTaskTimedOut);
        e.activity_task_timed_out = Some(ActivityTaskTimedOutAttrs { scheduled_event_id, timeout_type });
        self.push(e)
    }

    /// Append a fresh `DecisionTaskScheduled`/`Started` pair and return the
    /// resulting `DecisionTask` plus the id of its `DecisionTaskStarted`
    /// event (for tests that need to reference it from a later rejection).
    fn decide(&mut self, identity: &str) -> (DecisionTask, u64) {
        let previous_started = self.last_started_event_id;
        self.push(blank_event(0, EventType::DecisionTaskScheduled));
        let mut started = blank_event(0, EventType::DecisionTaskStarted);
        started.decision_task_started =
            Some(DecisionTaskStartedAttrs { identity: Some(identity.to_string()) });
        let started_id = self.push(started);
        self.last_started_event_id = Some(started_id);

        let task = DecisionTask {
            task_token: Some("token".to_string()),
            workflow_type: type_id("demo"),
            events: self.events.clone(),
            started_event_id: started_id,
            previous_started_event_id: previous_started,
            next_page_token: None,
        };
        (task, started_id)
    }
}

fn run(hb: &mut HistoryBuilder) -> Vec<Decision> {
    let (task, _) = hb.decide(IDENTITY);
    let g = graph();
    let history = History::reduce(&task).unwrap();
    seddy::builder::build(&g, &history, IDENTITY).unwrap()
}

#[test]
fn workflow_start_schedules_foo() {
    let mut hb = HistoryBuilder::with_start(json!({"spam": [42], "eggs": null}));
    let decisions = run(&mut hb);

    assert_eq!(decisions.len(), 1);
    match &decisions[0] {
        Decision::ScheduleActivityTask { attributes } => {
            assert_eq!(attributes.activity_id, "foo");
            assert_eq!(attributes.heartbeat_timeout.as_deref(), Some("60"));
            assert_eq!(attributes.schedule_to_close_timeout.as_deref(), Some("86400"));
            assert_eq!(attributes.task_list.as_ref().unwrap().name, "eggs");
            assert_eq!(attributes.task_priority.as_deref(), Some("1"));
            let input: serde_json::Value =
                serde_json::from_str(attributes.input.as_ref().unwrap()).unwrap();
            assert_eq!(input, json!({"spam": [42], "eggs": null}));
        }
        other => panic!("expected ScheduleActivityTask, got {other:?}"),
    }
}

#[test]
fn foo_completes_schedules_bar_then_yay() {
    let mut hb = HistoryBuilder::with_start(json!({"spam": [42], "eggs": null}));
    let _ = run(&mut hb);

    let scheduled = hb.schedule("foo", "foo-activity");
    hb.start(scheduled);
    hb.complete(scheduled, Some("3"));
    let decisions = run(&mut hb);

    assert_eq!(decisions.len(), 2);
    let ids: Vec<&str> = decisions
        .iter()
        .map(|d| match d {
            Decision::ScheduleActivityTask { attributes } => attributes.activity_id.as_str(),
            _ => panic!("expected ScheduleActivityTask"),
        })
        .collect();
    assert_eq!(ids, vec!["bar", "yay"]);
}

#[test]
fn bar_and_yay_complete_schedules_tin() {
    let mut hb = HistoryBuilder::with_start(json!({"spam": [42], "eggs": null}));
    let _ = run(&mut hb);
    let foo_sched = hb.schedule("foo", "foo-activity");
    hb.start(foo_sched);
    hb.complete(foo_sched, Some("3"));
    let _ = run(&mut hb);

    let bar_sched = hb.schedule("bar", "bar-activity");
    let yay_sched = hb.schedule("yay", "yay-activity");
    hb.start(bar_sched);
    hb.complete(bar_sched, Some(r#"{"a":9,"b":"red"}"#));
    hb.start(yay_sched);
    hb.complete(yay_sched, Some("5"));
    let decisions = run(&mut hb);

    assert_eq!(decisions.len(), 1);
    match &decisions[0] {
        Decision::ScheduleActivityTask { attributes } => assert_eq!(attributes.activity_id, "tin"),
        other => panic!("expected ScheduleActivityTask, got {other:?}"),
    }
}

#[test]
fn tin_completes_workflow_completes_with_result() {
    let mut hb = HistoryBuilder::with_start(json!({"spam": [42], "eggs": null}));
    let _ = run(&mut hb);
    let foo_sched = hb.schedule("foo", "foo-activity");
    hb.start(foo_sched);
    hb.complete(foo_sched, Some("3"));
    let _ = run(&mut hb);
    let bar_sched = hb.schedule("bar", "bar-activity");
    let yay_sched = hb.schedule("yay", "yay-activity");
    hb.start(bar_sched);
    hb.complete(bar_sched, Some(r#"{"a":9,"b":"red"}"#));
    hb.start(yay_sched);
    hb.complete(yay_sched, Some("5"));
    let _ = run(&mut hb);

    let tin_sched = hb.schedule("tin", "tin-activity");
    hb.start(tin_sched);
    hb.complete(tin_sched, None);
    let decisions = run(&mut hb);

    assert_eq!(decisions.len(), 1);
    match &decisions[0] {
        Decision::CompleteWorkflowExecution { attributes } => {
            let result: serde_json::Value =
                serde_json::from_str(attributes.result.as_ref().unwrap()).unwrap();
            assert_eq!(result, json!({"foo": 3, "bar": {"a": 9, "b": "red"}, "yay": 5}));
        }
        other => panic!("expected CompleteWorkflowExecution, got {other:?}"),
    }
}

#[test]
fn foo_fails_fails_the_workflow() {
    let mut hb = HistoryBuilder::with_start(json!({"spam": [42], "eggs": null}));
    let _ = run(&mut hb);
    let foo_sched = hb.schedule("foo", "foo-activity");
    hb.start(foo_sched);
    hb.fail(foo_sched);
    let decisions = run(&mut hb);

    assert_eq!(decisions.len(), 1);
    match &decisions[0] {
        Decision::FailWorkflowExecution { attributes } => {
            assert_eq!(attributes.details.as_deref(), Some("1 activities failed"));
        }
        other => panic!("expected FailWorkflowExecution, got {other:?}"),
    }
}

#[test]
fn heartbeat_timeout_counts_as_activity_failure() {
    let mut hb = HistoryBuilder::with_start(json!({"spam": [42], "eggs": null}));
    let _ = run(&mut hb);
    let foo_sched = hb.schedule("foo", "foo-activity");
    hb.start(foo_sched);
    hb.timed_out(foo_sched, TimeoutType::Heartbeat);
    let decisions = run(&mut hb);

    match &decisions[0] {
        Decision::FailWorkflowExecution { attributes } => {
            assert_eq!(attributes.details.as_deref(), Some("1 activities failed"));
        }
        other => panic!("expected FailWorkflowExecution, got {other:?}"),
    }
}

#[test]
fn schedule_to_start_timeout_counts_as_timeout() {
    let mut hb = HistoryBuilder::with_start(json!({"spam": [42], "eggs": null}));
    let _ = run(&mut hb);
    let foo_sched = hb.schedule("foo", "foo-activity");
    hb.timed_out(foo_sched, TimeoutType::ScheduleToStart);
    let decisions = run(&mut hb);

    match &decisions[0] {
        Decision::FailWorkflowExecution { attributes } => {
            assert_eq!(attributes.details.as_deref(), Some("1 actions timed-out"));
        }
        other => panic!("expected FailWorkflowExecution, got {other:?}"),
    }
}

#[test]
fn cancel_requested_preempts_everything() {
    let mut hb = HistoryBuilder::with_start(json!({"spam": [42], "eggs": null}));
    let _ = run(&mut hb);
    let foo_sched = hb.schedule("foo", "foo-activity");
    hb.start(foo_sched);
    hb.push(blank_event(0, EventType::WorkflowExecutionCancelRequested));
    let decisions = run(&mut hb);

    assert_eq!(decisions.len(), 1);
    assert!(matches!(decisions[0], Decision::CancelWorkflowExecution { .. }));
}

#[test]
fn permission_denied_by_this_decider_is_fatal() {
    let mut hb = HistoryBuilder::with_start(json!({"spam": [42], "eggs": null}));
    let _ = run(&mut hb);

    hb.schedule("foo", "foo-activity");

    // A DecisionTaskCompleted pointing back at this decider's own
    // DecisionTaskStarted event, whose ScheduleActivityTask was rejected.
    let started_id = hb.last_started_event_id.unwrap();
    let mut completed = blank_event(0, EventType::DecisionTaskCompleted);
    completed.decision_task_completed = Some(DecisionTaskCompletedAttrs {
        scheduled_event_id: started_id - 1,
        started_event_id: started_id,
    });
    let completed_id = hb.push(completed);

    let mut rejected = blank_event(0, EventType::ScheduleActivityTaskFailed);
    rejected.schedule_activity_task_failed = Some(DecisionFailedAttrs {
        cause: DecisionFailureCause::OperationNotPermitted,
        decision_task_completed_event_id: completed_id,
    });
    hb.push(rejected);

    let (task, _) = hb.decide(IDENTITY);
    let g = graph();
    let history = History::reduce(&task).unwrap();
    let err = seddy::builder::build(&g, &history, IDENTITY).unwrap_err();
    assert!(matches!(
        err,
        seddy::error::BuilderError::Decider(seddy::error::DeciderError::PermissionDenied { .. })
    ));
}

#[test]
fn rejected_complete_is_retried() {
    let mut hb = HistoryBuilder::with_start(json!({"spam": [42], "eggs": null}));
    let _ = run(&mut hb);
    let foo_sched = hb.schedule("foo", "foo-activity");
    hb.start(foo_sched);
    hb.complete(foo_sched, Some("3"));
    let _ = run(&mut hb);
    let bar_sched = hb.schedule("bar", "bar-activity");
    let yay_sched = hb.schedule("yay", "yay-activity");
    hb.start(bar_sched);
    hb.complete(bar_sched, Some(r#"{"a":9,"b":"red"}"#));
    hb.start(yay_sched);
    hb.complete(yay_sched, Some("5"));
    let _ = run(&mut hb);
    let tin_sched = hb.schedule("tin", "tin-activity");
    hb.start(tin_sched);
    hb.complete(tin_sched, None);
    let _ = run(&mut hb);

    let started_id = hb.last_started_event_id.unwrap();
    let mut completed_decision = blank_event(0, EventType::DecisionTaskCompleted);
    completed_decision.decision_task_completed = Some(DecisionTaskCompletedAttrs {
        scheduled_event_id: started_id - 1,
        started_event_id: started_id,
    });
    let completed_id = hb.push(completed_decision);

    let mut rejected = blank_event(0, EventType::CompleteWorkflowExecutionFailed);
    rejected.complete_workflow_execution_failed = Some(DecisionFailedAttrs {
        cause: DecisionFailureCause::UnhandledDecision,
        decision_task_completed_event_id: completed_id,
    });
    hb.push(rejected);

    let decisions = run(&mut hb);
    assert_eq!(decisions.len(), 1);
    assert!(matches!(decisions[0], Decision::CompleteWorkflowExecution { .. }));
}
