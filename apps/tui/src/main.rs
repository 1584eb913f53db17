mod api;
mod app;
mod session;
mod ui;

use std::io;

use chrono::{DateTime, Utc};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use api::ApiClient;
use app::{parse_due_date, App, View};
use session::Session;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut session = Session::load();
    let api = ApiClient::from_env();
    let mut app = App::new(session.is_logged_in());

    let result = run_app(&mut terminal, &mut app, &api, &mut session);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("{:?}", err);
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    api: &ApiClient,
    session: &mut Session,
) -> io::Result<()> {
    if session.is_logged_in() {
        refresh(terminal, app, api, session)?;
    }

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            match app.view {
                View::Login => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Char('t') => {
                        if let Some(token) = prompt("Paste your access token") {
                            if !token.is_empty() {
                                app.log_in(session, token);
                                refresh(terminal, app, api, session)?;
                            }
                        }
                    }
                    _ => {}
                },
                View::Tasks => {
                    if handle_tasks_key(key.code, terminal, app, api, session)? {
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Returns true when the user asked to quit
fn handle_tasks_key<B: Backend>(
    code: KeyCode,
    terminal: &mut Terminal<B>,
    app: &mut App,
    api: &ApiClient,
    session: &mut Session,
) -> io::Result<bool> {
    match code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Up => app.select_prev(),
        KeyCode::Down => app.select_next(),
        KeyCode::Char('r') => refresh(terminal, app, api, session)?,
        KeyCode::Char('a') => {
            // Add a new task
            if let Some(description) = prompt("Task description") {
                if description.is_empty() {
                    app.set_notice("Description cannot be empty".to_string());
                } else {
                    let due_input =
                        prompt("Due date (optional, YYYY-MM-DD HH:MM)").unwrap_or_default();
                    if due_input.is_empty() {
                        create(terminal, app, api, session, &description, None)?;
                    } else {
                        match parse_due_date(&due_input) {
                            Some(date) => {
                                create(terminal, app, api, session, &description, Some(date))?
                            }
                            None => app.set_notice(format!("Unrecognized date: {}", due_input)),
                        }
                    }
                }
            }
        }
        KeyCode::Char('d') => {
            // Delete, then re-fetch rather than removing locally
            if let Some(task) = app.selected_task().cloned() {
                match api.delete_task(session, &task.id) {
                    Ok(()) => refresh(terminal, app, api, session)?,
                    Err(err) => app.apply_mutation_error(session, err),
                }
            }
        }
        KeyCode::Char('e') => {
            // Pick a due date for the selected row; stays local until saved
            if let Some(task) = app.selected_task().cloned() {
                if let Some(input) = prompt("Due date (YYYY-MM-DD HH:MM)") {
                    if !input.is_empty() {
                        match parse_due_date(&input) {
                            Some(date) => app.set_pending_due_date(&task.id, date),
                            None => app.set_notice(format!("Unrecognized date: {}", input)),
                        }
                    }
                }
            }
        }
        KeyCode::Char('s') => {
            // Persist the pending due date together with the current description
            if let Some(task) = app.selected_task().cloned() {
                if let Some(date) = app.begin_save(&task.id) {
                    match api.update_task(session, &task.id, &task.description, Some(date)) {
                        Ok(_) => {
                            app.save_succeeded(&task.id);
                            refresh(terminal, app, api, session)?;
                        }
                        Err(err) => {
                            app.save_failed(&task.id);
                            app.apply_mutation_error(session, err);
                        }
                    }
                }
            }
        }
        _ => {}
    }
    Ok(false)
}

fn create<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    api: &ApiClient,
    session: &mut Session,
    description: &str,
    due_date: Option<DateTime<Utc>>,
) -> io::Result<()> {
    match api.create_task(session, description, due_date) {
        Ok(_) => refresh(terminal, app, api, session)?,
        Err(err) => app.apply_mutation_error(session, err),
    }
    Ok(())
}

/// Re-fetch the list, drawing a loading frame while the request is in flight
fn refresh<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    api: &ApiClient,
    session: &mut Session,
) -> io::Result<()> {
    app.loading = true;
    terminal.draw(|f| ui::draw(f, app))?;

    let result = api.list_tasks(session);
    app.apply_fetch(session, result);
    Ok(())
}

fn prompt(message: &str) -> Option<String> {
    disable_raw_mode().ok();
    println!("{}", message);
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_ok() {
        enable_raw_mode().ok();
        Some(input.trim().to_string())
    } else {
        enable_raw_mode().ok();
        None
    }
}
