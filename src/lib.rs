//! # seddy
//!
//! A DAG workflow decider for Amazon Simple Workflow Service.
//!
//! A workflow specification (§ [`spec`]) describes a directed acyclic graph
//! of activity tasks, how each task's input is materialized from the
//! execution's input and its dependencies' results, and optional
//! `skip_if` conditions. The [`decider`] module polls SWF for decision
//! tasks, reduces each task's event history (§ [`history`]) and runs the
//! [`builder`] state machine to decide what to schedule, complete, fail,
//! or cancel next.
//!
//! ```text
//! spec::load_file ─▶ dag::TaskGraph ─▶ decider::Decider::run
//!                                          │
//!                                          ▼
//!                          history::History::reduce ─▶ builder::build
//! ```

pub mod builder;
pub mod condition;
pub mod config;
pub mod dag;
pub mod decider;
pub mod decision;
pub mod error;
pub mod history;
pub mod input;
pub mod launcher;
pub mod path;
pub mod registrar;
pub mod spec;
pub mod swf;

pub use error::{FixSuggestion, SeddyError};
