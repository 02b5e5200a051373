//! Workflow specification types and the Spec Loader boundary (§3, §4.8, §6).

pub mod loader;
pub mod model;

pub use loader::{load_file, WorkflowSet};
pub use model::{Condition, RawWorkflow, SpecDocument, Task, TaskInput, TimeoutSpec, TypeId};
