//! # Task abstractions.
//!
//! This module provides the task-related types:
//! - [`Task`] - leaf or composite unit of work with lifecycle callbacks
//! - [`TaskKind`] - closed set of variants (leaf / serial / parallel)
//! - [`Timeout`] - per-task timeout policy with a "never" sentinel
//! - [`TaskId`], [`IdGenerator`] - task identity
//! - [`CallContext`] - passed to `on_call`, used to report completion
//! - [`Completion`] - future over a task's terminal outcome

mod completion;
mod context;
mod id;
mod task;

pub use completion::Completion;
pub use context::CallContext;
pub use id::{IdGenerator, TaskId};
pub use task::{Task, TaskKind, Timeout};

pub(crate) use task::State;
