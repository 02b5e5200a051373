//! History Reducer (§4.4): turns one `PollForDecisionTask` response into the
//! per-task view the Decision Builder consumes.

use std::collections::HashMap;

use crate::error::DeciderError;
use crate::swf::types::{DecisionTask, Event, EventType};

/// The reduced view of one execution's history, as of the decision task
/// currently being decided.
#[derive(Debug)]
pub struct History<'a> {
    events_by_id: HashMap<u64, &'a Event>,
    /// `ActivityTaskScheduled` events, keyed by their own event id.
    scheduled: HashMap<u64, &'a Event>,
    /// Every event relevant to a task, keyed by activity id (== task id),
    /// in the order they occurred.
    task_events: HashMap<String, Vec<&'a Event>>,
    /// Events since the last decision task this decider observed, ending
    /// with this decision task's own `DecisionTaskScheduled`/`Started` pair.
    new_events: Vec<&'a Event>,
}

impl<'a> History<'a> {
    /// Reduce a polled decision task's full event list.
    pub fn reduce(task: &'a DecisionTask) -> Result<Self, DeciderError> {
        let events = &task.events;

        let mut events_by_id = HashMap::with_capacity(events.len());
        for event in events {
            events_by_id.insert(event.id, event);
        }

        let mut scheduled = HashMap::new();
        for event in events {
            if event.event_type == EventType::ActivityTaskScheduled {
                scheduled.insert(event.id, event);
            }
        }

        let mut task_events: HashMap<String, Vec<&Event>> = HashMap::new();
        for event in events {
            let Some(scheduled_id) = event.scheduled_event_id() else {
                continue;
            };
            let Some(scheduled_event) = scheduled.get(&scheduled_id) else {
                return Err(DeciderError::MalformedHistory(format!(
                    "event {} refers to scheduledEventId {scheduled_id}, which is not an \
                     ActivityTaskScheduled event",
                    event.id
                )));
            };
            let Some(attrs) = &scheduled_event.activity_task_scheduled else {
                return Err(DeciderError::MalformedHistory(format!(
                    "scheduled event {scheduled_id} is missing its attributes"
                )));
            };
            task_events.entry(attrs.activity_id.clone()).or_default().push(event);
        }
        // The ActivityTaskScheduled event itself belongs to its task's history too.
        for &event in scheduled.values() {
            let Some(attrs) = &event.activity_task_scheduled else {
                continue;
            };
            task_events.entry(attrs.activity_id.clone()).or_default().push(event);
        }
        for bucket in task_events.values_mut() {
            bucket.sort_by_key(|e| e.id);
        }

        let previous_started = task.previous_started_event_id.unwrap_or(0);
        let new_events: Vec<&Event> = events
            .iter()
            .filter(|e| e.id > previous_started && e.id <= task.started_event_id)
            .collect();

        let [.., scheduled_event, started_event] = new_events.as_slice() else {
            return Err(DeciderError::ProtocolViolation(
                "decision task's new-events slice has fewer than two events".to_string(),
            ));
        };
        if scheduled_event.event_type != EventType::DecisionTaskScheduled
            || started_event.event_type != EventType::DecisionTaskStarted
        {
            return Err(DeciderError::ProtocolViolation(format!(
                "expected the new-events slice to end with DecisionTaskScheduled, \
                 DecisionTaskStarted; got {:?}, {:?}",
                scheduled_event.event_type, started_event.event_type
            )));
        }

        Ok(History {
            events_by_id,
            scheduled,
            task_events,
            new_events,
        })
    }

    pub fn event(&self, id: u64) -> Option<&Event> {
        self.events_by_id.get(&id).copied()
    }

    /// The `activityId` of the `ActivityTaskScheduled` event with this id.
    pub fn scheduled_activity_id(&self, scheduled_event_id: u64) -> Option<&str> {
        self.scheduled
            .get(&scheduled_event_id)
            .and_then(|e| e.activity_task_scheduled.as_ref())
            .map(|a| a.activity_id.as_str())
    }

    /// Events relevant to `task_id`, in chronological order. Empty if the
    /// task has never been scheduled.
    pub fn task_events(&self, task_id: &str) -> &[&Event] {
        self.task_events
            .get(task_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `task_id` has ever had a `ScheduleActivityTask` decision
    /// accepted for it (i.e. an `ActivityTaskScheduled` event exists).
    pub fn is_scheduled(&self, task_id: &str) -> bool {
        self.task_events(task_id)
            .iter()
            .any(|e| e.event_type == EventType::ActivityTaskScheduled)
    }

    /// Events new since the last decision task this decider processed,
    /// ending with this decision task's own Scheduled/Started pair.
    pub fn new_events(&self) -> &[&Event] {
        &self.new_events
    }

    /// `true` if a `WorkflowExecutionCancelRequested` event has ever been
    /// recorded (§4.5 step 1).
    pub fn cancel_requested(&self) -> bool {
        self.events_by_id
            .values()
            .any(|e| e.event_type == EventType::WorkflowExecutionCancelRequested)
    }

    /// All `…Failed` decision-rejection events recorded across the whole
    /// history, most recent last — used by the rescue and fatal-permission
    /// checks (§4.5 steps 2-3, §4.6).
    pub fn decision_failures(&self) -> Vec<&'a Event> {
        let mut events: Vec<&Event> = self
            .events_by_id
            .values()
            .copied()
            .filter(|e| e.decision_failed_attrs().is_some())
            .collect();
        events.sort_by_key(|e| e.id);
        events
    }

    /// The `identity` that submitted the decision completed by
    /// `decision_task_completed_event_id`, by walking
    /// DecisionTaskCompleted -> startedEventId -> DecisionTaskStarted (§4.5
    /// step 2, §6). `None` if the chain is broken.
    pub fn decider_identity_for_decision(
        &self,
        decision_task_completed_event_id: u64,
    ) -> Option<&str> {
        let completed = self.event(decision_task_completed_event_id)?;
        let completed_attrs = completed.decision_task_completed.as_ref()?;
        let started = self.event(completed_attrs.started_event_id)?;
        started.decision_task_started.as_ref()?.identity.as_deref()
    }

    /// The parsed input the workflow execution started with, if the
    /// `WorkflowExecutionStarted` event carried one.
    pub fn workflow_input(&self) -> Option<&str> {
        self.events_by_id.values().find_map(|e| {
            e.workflow_execution_started
                .as_ref()
                .and_then(|a| a.input.as_deref())
        })
    }
}
