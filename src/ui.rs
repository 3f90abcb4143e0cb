use crate::app::{get_help_content, App, Status};
use crate::github::RepositoryRecord;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Length(3), // Search input
            Constraint::Min(0),    // Results
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    draw_title_bar(f, chunks[0], app);

    if app.needs_setup() {
        draw_setup_message(f, chunks[1].union(chunks[2]));
    } else {
        draw_search_input(f, chunks[1], app);
        draw_results(f, chunks[2], app);
    }

    draw_status_bar(f, chunks[3], app);

    if app.show_help {
        draw_help_popup(f);
    }
}

fn draw_title_bar(f: &mut Frame, area: Rect, app: &App) {
    let orgs = app.settings.organizations.join(", ");
    let title = Line::from(vec![
        Span::styled(" reposcout ", Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(truncate(&orgs, 60), Style::default().fg(Color::Cyan)),
    ]);

    f.render_widget(Paragraph::new(title), area);
}

fn draw_setup_message(f: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "No organizations configured",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Add the organizations to search, then start reposcout again:"),
        Line::from(""),
        Line::from(Span::styled(
            "  reposcout configure --org <name> [--org <name>...] [--token <token>]",
            Style::default().fg(Color::Cyan),
        )),
    ];

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_search_input(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Search ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::DarkGray)),
        Span::raw(app.query()),
    ]))
    .block(block);
    f.render_widget(input, area);

    if !app.show_help {
        f.set_cursor_position(Position::new(cursor_x(inner, app.query()), inner.y));
    }
}

// After the "> " prompt, pinned to the last column on long queries
fn cursor_x(inner: Rect, query: &str) -> u16 {
    let typed = u16::try_from(query.chars().count()).unwrap_or(u16::MAX);
    inner
        .x
        .saturating_add(2)
        .saturating_add(typed)
        .min(inner.right().saturating_sub(1))
}

fn draw_results(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let repos = app.filtered_repos();
    if repos.is_empty() {
        let message = match app.status {
            Status::Loading => "",
            _ => "No repositories found",
        };
        let empty = Paragraph::new(message).style(Style::default().fg(Color::DarkGray));
        f.render_widget(empty, inner);
        return;
    }

    let widths = [
        Constraint::Length(3),  // Shortcut
        Constraint::Length(28), // Repository
        Constraint::Length(36), // org/name
        Constraint::Min(10),    // Description
    ];

    let rows: Vec<Row> = repos
        .iter()
        .enumerate()
        .map(|(idx, repo)| {
            Row::new(vec![
                Cell::from(format_shortcut(idx)),
                Cell::from(Span::styled(
                    truncate(&repo.name, 27),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Cell::from(format_full_name(repo)),
                Cell::from(format_description(repo)),
            ])
        })
        .collect();

    let table = Table::new(rows, widths)
        .row_highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = TableState::default().with_selected(app.selected_index());
    f.render_stateful_widget(table, inner, &mut state);
}

fn format_shortcut(idx: usize) -> Span<'static> {
    if idx < 9 {
        Span::styled(format!("{}", idx + 1), Style::default().fg(Color::Cyan))
    } else {
        Span::raw("")
    }
}

fn format_full_name(repo: &RepositoryRecord) -> Span<'static> {
    let display = format!("{}/{}", repo.org, repo.name);
    Span::styled(truncate(&display, 35), Style::default().fg(Color::Blue))
}

fn format_description(repo: &RepositoryRecord) -> Span<'static> {
    match &repo.description {
        Some(desc) => Span::styled(truncate(desc, 80), Style::default().fg(Color::Gray)),
        None => Span::raw(""),
    }
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(24)])
        .split(area);

    let status = if let Some(notice) = app.notice() {
        Span::styled(notice.to_string(), Style::default().fg(Color::Green))
    } else {
        match &app.status {
            Status::Error(msg) => Span::styled(msg.clone(), Style::default().fg(Color::Red)),
            Status::Loading => Span::styled(app.status.text().to_string(), Style::default().fg(Color::Yellow)),
            Status::Idle => Span::styled(get_status_bar_text(app), Style::default().fg(Color::DarkGray)),
        }
    };
    f.render_widget(Paragraph::new(status), chunks[0]);

    let count = Paragraph::new(app.count_text())
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Right);
    f.render_widget(count, chunks[1]);
}

fn get_status_bar_text(app: &App) -> String {
    if app.needs_setup() {
        "Esc: quit".to_string()
    } else {
        "↑/↓: nav │ 1-9: jump │ Enter: open │ Tab: copy clone │ ^R: reload │ F1: help │ Esc: quit".to_string()
    }
}

fn draw_help_popup(f: &mut Frame) {
    let area = centered_rect(60, 70, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let lines: Vec<Line> = get_help_content()
        .iter()
        .map(|entry| format_help_line(entry))
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn format_help_line(entry: &str) -> Line<'static> {
    let parts: Vec<&str> = entry.split('|').collect();
    match parts.as_slice() {
        ["HEADER", title] => Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        [key, desc, color] => {
            let key_style = Style::default().fg(parse_color(color)).add_modifier(Modifier::BOLD);
            Line::from(vec![
                Span::styled(format!("  {:<12}", key), key_style),
                Span::raw(desc.to_string()),
            ])
        }
        _ => Line::from(""),
    }
}

fn parse_color(name: &str) -> Color {
    match name {
        "cyan" => Color::Cyan,
        "magenta" => Color::Magenta,
        "yellow" => Color::Yellow,
        "green" => Color::Green,
        "red" => Color::Red,
        "blue" => Color::Blue,
        _ => Color::White,
    }
}

// Utility functions
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
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
