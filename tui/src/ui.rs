use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use squiggles_core::{Severity, SettingsStore};

use crate::app_state::App;

/// Render the settings panel and status bar. Returns the indicator's area.
pub fn draw<S: SettingsStore>(f: &mut Frame, app: &App<S>) -> Rect {
    let size = f.size();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(size);

    draw_body(f, app, rows[0]);
    let indicator_area = draw_status_bar(f, app, rows[1]);

    if let Some(error) = app.error() {
        draw_error(f, error, centered_rect(60, 40, size));
    }

    indicator_area
}

fn draw_body<S: SettingsStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(format!("Settings: {}", app.settings_path().display())));
    lines.push(Line::from(""));
    lines.push(Line::from("Squiggle types:".bold()));
    for severity in Severity::ALL {
        let action = if app.targets().contains(&severity) {
            "hide"
        } else {
            "leave alone"
        };
        lines.push(Line::from(format!("  • {:<8} {action}", severity.name())));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(format!("Squiggles are {}.", app.indicator().state())));
    lines.push(Line::from(""));
    lines.push(Line::from("t/Enter: toggle   r: re-read settings   q: quit".dim()));
    lines.push(Line::from("Clicking the indicator also toggles.".dim()));

    let block = Block::default().title("Invisible Squiggles").borders(Borders::ALL);
    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .alignment(Alignment::Left);

    f.render_widget(paragraph, area);
}

fn draw_status_bar<S: SettingsStore>(f: &mut Frame, app: &App<S>, area: Rect) -> Rect {
    let indicator = app.indicator();
    let width = indicator.text().chars().count() as u16 + 2;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(width)])
        .split(area);

    // No hover in a terminal, so the tooltip fills the bar when idle.
    let left = match app.message() {
        Some(message) => Line::from(format!(" {message}")),
        None => Line::styled(
            format!(" {}", indicator.tooltip()),
            Style::default().add_modifier(Modifier::DIM),
        ),
    };
    f.render_widget(Paragraph::new(left), columns[0]);

    let label = Paragraph::new(indicator.text())
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_widget(label, columns[1]);

    columns[1]
}

fn draw_error(f: &mut Frame, error: &str, area: Rect) {
    let text = Text::from(vec![
        Line::from(error),
        Line::from(""),
        Line::from("Press Esc to dismiss.".dim()),
    ]);
    let block = Block::default().title("Error".red().bold()).borders(Borders::ALL);
    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
