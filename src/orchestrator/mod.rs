//! Application-level orchestration.
//!
//! This module owns the upload/generate workflow, the view capability it drives,
//! and post-result processing such as headless exports. UI/CLI layers call into
//! this module to keep responsibilities separated.

mod controller;
mod post_process;
pub(crate) mod view;

pub(crate) use controller::{run_controller, UiCommand};
pub use controller::{Outcome, Workflow};
pub(crate) use post_process::process_results;
