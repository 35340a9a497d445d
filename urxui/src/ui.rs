//! Terminal rendering of the panel.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::intent::Field;
use crate::keymap::JOG_KEYS;
use crate::panel::Panel;

pub fn ui(f: &mut Frame, panel: &Panel, releases: bool) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Connection panel
            Constraint::Min(11),   // Data panels
            Constraint::Length(9), // Help panel
            Constraint::Length(1), // Status line
        ])
        .split(f.area());

    render_connection_panel(f, main_chunks[0], panel);

    let data_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(45), // Telemetry
            Constraint::Percentage(20), // Outputs
            Constraint::Percentage(35), // Jog parameters
        ])
        .split(main_chunks[1]);

    render_telemetry(f, data_chunks[0], panel);
    render_outputs(f, data_chunks[1], panel);
    render_jog_parameters(f, data_chunks[2], panel);
    render_help_panel(f, main_chunks[2], releases);
    render_status_line(f, main_chunks[3], panel);
}

fn label(text: &str) -> Span<'_> {
    Span::styled(text, Style::default().fg(Color::Cyan))
}

fn field_line<'a>(panel: &'a Panel, field: Field, width: usize) -> Line<'a> {
    let editing = panel.editing == Some(field);
    let value_style = if editing {
        Style::default().fg(Color::Black).bg(Color::Yellow)
    } else {
        Style::default()
    };
    let mut spans = vec![
        label(field.label()),
        Span::raw(" ".repeat(width.saturating_sub(field.label().len()) + 1)),
        Span::styled(panel.text(field), value_style),
    ];
    if editing {
        spans.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
    }
    Line::from(spans)
}

fn render_connection_panel(f: &mut Frame, area: Rect, panel: &Panel) {
    let (state, color) = match &panel.connected {
        Some(endpoint) => (format!("Connected to {}", endpoint), Color::Green),
        None => ("Not connected".to_string(), Color::Red),
    };
    let jog = panel
        .active_jog()
        .map(|b| b.to_string())
        .unwrap_or_else(|| "None".to_string());

    let lines = vec![
        field_line(panel, Field::Endpoint, 9),
        field_line(panel, Field::Csys, 9),
        Line::from(vec![
            label("Link      "),
            Span::styled(state, Style::default().fg(color)),
        ]),
        Line::from(vec![
            label("Frame     "),
            Span::styled(
                if panel.settings.tool_frame { "Tool" } else { "Base" },
                Style::default().fg(Color::Yellow),
            ),
            label("   Active Jog: "),
            Span::styled(jog, Style::default().fg(Color::Magenta)),
        ]),
    ];

    let block = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(panel.title()));
    f.render_widget(block, area);
}

fn render_telemetry(f: &mut Frame, area: Rect, panel: &Panel) {
    let bold = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let no_data = |s: &str| if s.is_empty() { "No data".to_string() } else { s.to_string() };

    let lines = vec![
        Line::from(vec![label("Running: "), Span::raw(panel.fields.running().to_string())]),
        Line::from(""),
        Line::from(Span::styled("Pose", bold)),
        Line::from(format!("  {}", no_data(panel.fields.pose()))),
        Line::from(""),
        Line::from(Span::styled("Joints", bold)),
        Line::from(format!("  {}", no_data(panel.fields.joints()))),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Robot Data")
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(paragraph, area);
}

fn render_outputs(f: &mut Frame, area: Rect, panel: &Panel) {
    let lines: Vec<Line> = panel
        .outputs
        .iter()
        .enumerate()
        .map(|(i, on)| {
            let (mark, color) = if *on { ("[x]", Color::Green) } else { ("[ ]", Color::DarkGray) };
            Line::from(vec![
                Span::styled(format!("{} ", i + 1), Style::default().fg(Color::Cyan)),
                Span::styled(mark, Style::default().fg(color)),
                Span::raw(format!(" DO{}", i)),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Outputs")
            .border_style(Style::default().fg(Color::Green)),
    );
    f.render_widget(paragraph, area);
}

fn render_jog_parameters(f: &mut Frame, area: Rect, panel: &Panel) {
    let lines: Vec<Line> = Field::ALL
        .iter()
        .filter(|field| !field.has_history())
        .map(|field| field_line(panel, *field, 10))
        .collect();

    let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Jog"));
    f.render_widget(paragraph, area);
}

fn render_help_panel(f: &mut Frame, area: Rect, releases: bool) {
    let plus: String = JOG_KEYS.iter().map(|(p, _)| *p).collect();
    let minus: String = JOG_KEYS.iter().map(|(_, m)| *m).collect();

    let help_text = vec![
        Line::from(Span::styled("Motion Controls:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(format!("  {}=+X..+RZ  {}=-X..-RZ  Shift=joints J0..J5  Space=Stop  m=Tool/Base", plus, minus)),
        Line::from(Span::styled("Connection & I/O:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  c=Connect  x=Disconnect  v=Apply csys  1-8=Toggle output"),
        Line::from("  Tab=Edit fields  Esc=Done  Up/Down=History  Enter=Connect/Apply"),
        Line::from("  Ctrl-C/F10=Quit"),
        Line::from(Span::styled(
            if releases {
                "Tap a direction key to step, hold it to jog"
            } else {
                "Each direction key press moves one step"
            },
            Style::default().fg(Color::Yellow),
        )),
    ];

    let help_block = Paragraph::new(help_text).block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help_block, area);
}

fn render_status_line(f: &mut Frame, area: Rect, panel: &Panel) {
    if let Some(status) = panel.status() {
        let line = Paragraph::new(status).style(Style::default().fg(Color::Black).bg(Color::Red));
        f.render_widget(line, area);
    }
}
