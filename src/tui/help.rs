use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const KEYBINDS: &[(&str, &str)] = &[
    ("q / Ctrl-C", "Quit"),
    ("u", "Upload the roster file"),
    ("g", "Generate seating"),
    ("e", "Export seating to .xlsx"),
    ("y", "Copy seating tables to clipboard"),
    ("space", "Toggle department under cursor"),
    ("a", "Select all / none"),
    ("↑/↓ or j/k", "Move in department list"),
    ("PgUp/PgDn", "Scroll results"),
    ("tab", "Cycle inputs (file, classrooms, students)"),
    ("enter", "Submit the focused input"),
    ("esc", "Back to department list"),
    ("?", "Show this help"),
];

pub fn draw_help(area: Rect, f: &mut Frame) {
    let mut lines = vec![Line::from("Keybinds:")];
    for (key, what) in KEYBINDS {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{key:<12}"), Style::default().fg(Color::Magenta)),
            Span::raw(*what),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(Color::Gray),
    )));

    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
