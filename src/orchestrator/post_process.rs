//! Post-result processing for headless runs.
//!
//! Handles the file exports requested on the command line once a seating
//! result is available.

use super::controller::Workflow;
use super::view::View;
use crate::cli::Cli;
use crate::export;

/// Result of post-result processing, ready for presentation layers.
pub(crate) struct ProcessedRun {
    pub export_messages: Vec<String>,
    pub failed: bool,
}

/// Run the exports requested by `args` against the workflow's current results.
pub(crate) fn process_results<V: View>(args: &Cli, workflow: &mut Workflow<V>) -> ProcessedRun {
    let mut export_messages = Vec::new();
    let mut failed = false;

    if let Some(target) = args.export_xlsx.as_ref() {
        // The workflow reports the outcome through its view. Nothing to
        // export is not a failure.
        let has_results = workflow.results().is_some();
        if workflow.export(target.as_deref()).is_none() && has_results {
            failed = true;
        }
    }

    if let Some(path) = args.export_json.as_deref() {
        match workflow.results() {
            Some(records) => match export::write_json(path, records) {
                Ok(()) => export_messages.push(format!("Exported JSON: {}", path.display())),
                Err(e) => {
                    failed = true;
                    export_messages.push(format!("Export JSON failed: {e:#}"));
                }
            },
            None => export_messages.push("No seating data to export as JSON".to_string()),
        }
    }

    ProcessedRun {
        export_messages,
        failed,
    }
}
