use crate::model::ClientConfig;
use crate::orchestrator::view::{OutputLine, TextView};
use crate::orchestrator::{self, Outcome, Workflow};
use crate::transport::HttpTransport;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "exam-seating-cli",
    version,
    about = "Upload a student roster, pick departments and generate exam seating"
)]
pub struct Cli {
    /// Base URL of the seating service
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    pub base_url: String,

    /// Roster spreadsheet (.xls or .xlsx) to upload
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Department to seat (repeatable); defaults to every uploaded department
    #[arg(long = "department", short = 'd')]
    pub departments: Vec<String>,

    /// Number of classrooms
    #[arg(long, default_value = "3")]
    pub classrooms: String,

    /// Students per classroom
    #[arg(long, default_value = "30")]
    pub students_per_class: String,

    /// Print the seating as JSON and exit (no TUI)
    #[arg(long, conflicts_with = "text")]
    pub json: bool,

    /// Print the seating as text tables and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Export the seating to an .xlsx file (default: exam_seating_arrangement.xlsx in Downloads)
    #[arg(long, num_args = 0..=1, value_name = "PATH")]
    pub export_xlsx: Option<Option<PathBuf>>,

    /// Export the raw seating records as JSON
    #[arg(long, value_name = "PATH")]
    pub export_json: Option<PathBuf>,

    /// Largest roster accepted for upload, in bytes
    #[arg(long, default_value_t = 5 * 1024 * 1024)]
    pub max_upload_bytes: u64,

    /// Write logs to this file while the TUI is running
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn is_headless(&self) -> bool {
        self.json || self.text || cfg!(not(feature = "tui"))
    }
}

pub async fn run(args: Cli) -> Result<()> {
    if !args.is_headless() {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args).await;
        }
    }

    run_headless(args).await
}

/// Build a `ClientConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> ClientConfig {
    ClientConfig {
        base_url: args.base_url.clone(),
        user_agent: format!("exam-seating-cli/{}", env!("CARGO_PKG_VERSION")),
        max_upload_bytes: args.max_upload_bytes,
        export_dir: crate::export::default_export_dir(),
    }
}

/// Upload, generate, print and export in one pass.
async fn run_headless(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let transport = HttpTransport::new(&cfg).context("build HTTP client")?;
    let (out_tx, out_handle) = spawn_output_writer();

    let view = TextView::new(out_tx.clone(), !args.json);
    let mut workflow = Workflow::new(view, cfg.max_upload_bytes, cfg.export_dir.clone());

    let res = drive_headless(&args, &transport, &mut workflow, &out_tx).await;

    drop(workflow);
    drop(out_tx);
    let _ = out_handle.await;
    res
}

async fn drive_headless(
    args: &Cli,
    transport: &HttpTransport,
    workflow: &mut Workflow<TextView>,
    out_tx: &mpsc::UnboundedSender<OutputLine>,
) -> Result<()> {
    if let Outcome::Failed(e) = workflow
        .submit_upload(transport, args.file.as_deref())
        .await
    {
        return Err(anyhow::anyhow!("upload failed: {e}"));
    }

    if !args.departments.is_empty() {
        let unknown = workflow.select_only(&args.departments);
        for name in unknown {
            let _ = out_tx.send(OutputLine::Stderr(format!(
                "Warning: department '{name}' was not in the uploaded roster"
            )));
        }
    }

    match workflow
        .submit_generate_checked(transport, &args.classrooms, &args.students_per_class)
        .await
    {
        Outcome::Failed(e) => return Err(anyhow::anyhow!("seating generation failed: {e}")),
        Outcome::Completed if args.json => {
            if let Some(records) = workflow.results() {
                let out = serde_json::to_string_pretty(records)?;
                let _ = out_tx.send(OutputLine::Stdout(out));
            }
        }
        Outcome::NoData if args.json => {
            let _ = out_tx.send(OutputLine::Stdout("[]".to_string()));
        }
        _ => {}
    }

    let processed = orchestrator::process_results(args, workflow);
    for msg in processed.export_messages {
        let _ = out_tx.send(OutputLine::Stderr(msg));
    }
    if processed.failed {
        return Err(anyhow::anyhow!("export failed"));
    }
    Ok(())
}
