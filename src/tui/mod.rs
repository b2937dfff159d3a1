mod export;
mod help;
mod state;

use crate::cli::{build_config, Cli};
use crate::model::Action;
use crate::orchestrator::view::{ChannelView, ViewUpdate};
use crate::orchestrator::{self, UiCommand, Workflow};
use crate::render::ResultsPanel;
use crate::transport::HttpTransport;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Terminal,
};
use state::{Focus, KeyOutcome, UiState};
use std::sync::Arc;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let transport = Arc::new(HttpTransport::new(&cfg).context("build HTTP client")?);

    // Unbounded channels keep the controller from ever waiting on the UI.
    let (update_tx, update_rx) = mpsc::unbounded_channel::<ViewUpdate>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let workflow = Workflow::new(
        ChannelView::new(update_tx),
        cfg.max_upload_bytes,
        cfg.export_dir.clone(),
    );

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_args = args.clone();
    let ui_handle = std::thread::spawn(move || run_threaded(ui_args, update_rx, cmd_tx));

    let res = orchestrator::run_controller(transport, workflow, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
pub fn run_threaded(
    args: Cli,
    mut update_rx: UnboundedReceiver<ViewUpdate>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState is owned by the UI thread only; no cross-thread mutation.
    let mut state = UiState {
        file: args
            .file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        classrooms: args.classrooms.clone(),
        students_per_class: args.students_per_class.clone(),
        ..Default::default()
    };
    if args.file.is_some() {
        let _ = cmd_tx.send(UiCommand::Upload(args.file.clone()));
    }

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    let res = loop {
        while let Ok(update) = update_rx.try_recv() {
            state.apply(update);
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match state.on_key(k.modifiers, k.code) {
                    Some(KeyOutcome::Quit) => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                    Some(KeyOutcome::CopyResults) => export::copy_results(&mut state),
                    Some(KeyOutcome::Send(cmd)) => {
                        state.info.clear();
                        if cmd_tx.send(cmd).is_err() {
                            break Err(anyhow::anyhow!("controller stopped"));
                        }
                    }
                    None => {}
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::raw("Stage: "),
        Span::styled(state.stage.as_str(), Style::default().fg(Color::Yellow)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("exam-seating-cli"),
    );
    f.render_widget(header, chunks[0]);

    if state.show_help {
        help::draw_help(chunks[1], f);
    } else {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(38), Constraint::Percentage(62)])
            .split(chunks[1]);
        draw_controls(body[0], f, state);
        draw_results(body[1], f, state);
    }

    let footer = if state.info.is_empty() {
        Line::from(Span::styled(
            "u upload  g generate  e export  y copy  tab inputs  ? help  q quit",
            Style::default().fg(Color::Gray),
        ))
    } else {
        Line::from(state.info.clone())
    };
    f.render_widget(Paragraph::new(footer), chunks[2]);
}

fn input_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let value_style = if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default()
    };
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        Span::styled(format!("{label:<20}"), Style::default().fg(Color::Gray)),
        Span::styled(format!("{value}{cursor}"), value_style),
    ])
}

fn trigger_span(state: &UiState, key: char, action: Action) -> Span<'static> {
    let trigger = state.triggers.get(action);
    if trigger.enabled {
        Span::styled(
            format!("[{key}] {}", trigger.label),
            Style::default().fg(Color::Magenta),
        )
    } else {
        Span::styled(trigger.label, Style::default().fg(Color::DarkGray))
    }
}

fn draw_controls(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(5),
            Constraint::Min(0),
        ])
        .split(area);

    let inputs = Paragraph::new(vec![
        input_line("Roster file:", &state.file, state.focus == Focus::File),
        input_line(
            "Classrooms:",
            &state.classrooms,
            state.focus == Focus::Classrooms,
        ),
        input_line(
            "Students per class:",
            &state.students_per_class,
            state.focus == Focus::StudentsPerClass,
        ),
        Line::from(vec![
            trigger_span(state, 'u', Action::Upload),
            Span::raw("   "),
            trigger_span(state, 'g', Action::Generate),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL).title("Inputs"));
    f.render_widget(inputs, rows[0]);

    let upload_status = Paragraph::new(state::status_lines(
        state.upload_status.as_ref(),
        "",
        rows[1].width,
    ))
    .block(Block::default().borders(Borders::ALL).title("Upload status"));
    f.render_widget(upload_status, rows[1]);

    let items: Vec<ListItem> = state
        .departments
        .iter()
        .map(|(dept, checked)| {
            let mark = if *checked { "[x]" } else { "[ ]" };
            ListItem::new(format!("{mark} {dept}"))
        })
        .collect();
    let title = if state.departments.is_empty() {
        "Departments (upload a roster)"
    } else {
        "Departments"
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    let mut list_state = ListState::default();
    if !state.departments.is_empty() && state.focus == Focus::Departments {
        list_state.select(Some(state.dept_cursor));
    }
    f.render_stateful_widget(list, rows[2], &mut list_state);
}

fn draw_results(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let status = Paragraph::new(state::status_lines(
        state.results_status.as_ref(),
        "Error: ",
        rows[0].width,
    ))
    .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, rows[0]);

    let lines: Vec<Line> = match state.results.as_ref() {
        None => Vec::new(),
        Some(panel) => results_lines(panel),
    };
    let title = match state.results.as_ref() {
        Some(ResultsPanel::Seating(report)) => {
            format!("Seating ({} records, e to export)", report.export_records)
        }
        _ => "Seating".to_string(),
    };
    let p = Paragraph::new(lines)
        .scroll((state.results_scroll, 0))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(p, rows[1]);
}

fn results_lines(panel: &ResultsPanel) -> Vec<Line<'static>> {
    let headers: Vec<String> = match panel {
        ResultsPanel::Seating(report) => report
            .rooms
            .iter()
            .map(|r| crate::text_summary::room_header(&r.title))
            .collect(),
        ResultsPanel::NoData => Vec::new(),
    };
    crate::text_summary::build_text_summary(panel)
        .lines
        .into_iter()
        .map(|line| {
            if headers.contains(&line) {
                Line::from(Span::styled(
                    line,
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(line)
            }
        })
        .collect()
}
