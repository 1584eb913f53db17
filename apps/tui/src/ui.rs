use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, RowState, View};

pub fn draw(f: &mut Frame, app: &App) {
    match app.view {
        View::Login => draw_login(f, app),
        View::Tasks => draw_tasks(f, app),
    }
}

fn draw_login(f: &mut Frame, app: &App) {
    let mut lines = vec![
        Line::from("Not signed in."),
        Line::from(""),
        Line::from("t - paste an access token"),
        Line::from("q - quit"),
    ];
    if let Some(notice) = &app.notice {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let para = Paragraph::new(lines).block(
        Block::default()
            .title("TaskNest - sign in")
            .borders(Borders::ALL),
    );
    f.render_widget(para, f.area());
}

fn draw_tasks(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Min(1), Constraint::Length(2)])
        .split(f.area());

    let block = Block::default()
        .title(format!("Your tasks ({})", app.tasks.len()))
        .borders(Borders::ALL);

    if app.loading {
        f.render_widget(Paragraph::new("Loading tasks...").block(block), chunks[0]);
    } else if app.tasks.is_empty() {
        // Empty state doubles as the call to action
        let para =
            Paragraph::new("No tasks found - press 'a' to add your first task").block(block);
        f.render_widget(para, chunks[0]);
    } else {
        let items: Vec<ListItem> = app
            .tasks
            .iter()
            .enumerate()
            .map(|(i, task)| {
                let marker = if i == app.selected { "> " } else { "  " };
                let mut spans = vec![
                    Span::raw(format!("{}[{}] ", marker, i + 1)),
                    Span::styled(task.description.clone(), Style::default().fg(Color::White)),
                    Span::raw(format!("  {}", due_date_label(task.due_date.as_ref()))),
                ];
                match app.row_state(&task.id) {
                    RowState::PendingEdit(date) => spans.push(Span::styled(
                        format!("  (unsaved: {})", format_due_date(&date)),
                        Style::default().fg(Color::Yellow),
                    )),
                    RowState::Saving(_) => spans.push(Span::styled(
                        "  (saving...)",
                        Style::default().fg(Color::Cyan),
                    )),
                    RowState::Idle => {}
                }

                let mut item = ListItem::new(Line::from(spans));
                if i == app.selected {
                    item = item.style(Style::default().add_modifier(Modifier::BOLD));
                }
                item
            })
            .collect();

        f.render_widget(List::new(items).block(block), chunks[0]);
    }

    let mut footer = vec![Line::from(
        "a add | e pick due date | s save | d delete | r refresh | q quit",
    )];
    if let Some(notice) = &app.notice {
        footer.push(Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    f.render_widget(Paragraph::new(footer), chunks[1]);
}

/// Human-readable due date, e.g. "March 1, 2025 10:00 AM"
pub fn format_due_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y %-I:%M %p").to_string()
}

fn due_date_label(due_date: Option<&DateTime<Utc>>) -> String {
    match due_date {
        Some(date) => format!("Due: {}", format_due_date(date)),
        None => "No due date set".to_string(),
    }
}
