//! Keyboard event handling.

use crate::app::{App, AppState, InputMode, SecurityFocus, View};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;
use sweeprs_core::Status;

/// Handle a key event. Returns true if the app should quit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.state = AppState::Quit;
        return true;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_key(app, key),
        InputMode::Search => handle_search_key(app, key),
        InputMode::Confirm => handle_confirm_key(app, key),
        InputMode::Help => {
            app.input_mode = InputMode::Normal;
            false
        }
    }
}

/// Status bound to a digit key.
fn status_for(c: char) -> Option<Status> {
    match c {
        '1' => Some(Status::Keep),
        '2' => Some(Status::Delete),
        '3' => Some(Status::Review),
        _ => None,
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => return app.request_quit(),
        KeyCode::Tab => {
            app.view = app.view.next();
            return false;
        }
        KeyCode::Char('?') => {
            app.input_mode = InputMode::Help;
            return false;
        }
        KeyCode::Char('e') => {
            app.export();
            return false;
        }
        _ => {}
    }

    match app.view {
        View::Review => handle_review_key(app, key),
        View::Security => handle_security_key(app, key),
        View::Generator => handle_generator_key(app, key),
    }
    false
}

fn handle_review_key(app: &mut App, key: KeyEvent) {
    // Ctrl+P or / to filter
    if key.code == KeyCode::Char('p') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.start_search();
        return;
    }

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('h') | KeyCode::Left => app.collapse_current(),
        KeyCode::Char('l') | KeyCode::Right => app.expand_current(),
        KeyCode::Enter => app.toggle_current(),
        KeyCode::Char('/') => app.start_search(),
        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('p') => app.toggle_reveal(Instant::now()),
        KeyCode::Char('y') => app.yank(),
        KeyCode::Char(c) => {
            if let Some(status) = status_for(c) {
                app.mark_current(status);
            }
        }
        KeyCode::Esc => {
            if !app.filter.is_empty() {
                app.exit_search();
            }
        }
        _ => {}
    }
}

fn handle_security_key(app: &mut App, key: KeyEvent) {
    match app.security_focus {
        SecurityFocus::Clusters => match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.cluster_down(),
            KeyCode::Char('k') | KeyCode::Up => app.cluster_up(),
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Enter => app.focus_security_entries(),
            // Keep All / Delete All
            KeyCode::Char('1') => app.mark_current_cluster(Status::Keep),
            KeyCode::Char('2') => app.mark_current_cluster(Status::Delete),
            _ => {}
        },
        SecurityFocus::Entries => match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.security_down(),
            KeyCode::Char('k') | KeyCode::Up => app.security_up(),
            KeyCode::Char('h') | KeyCode::Left | KeyCode::Esc => app.focus_security_clusters(),
            KeyCode::Char('p') => app.toggle_reveal(Instant::now()),
            KeyCode::Char('y') => app.yank(),
            KeyCode::Char(c) => {
                if let Some(status) = status_for(c) {
                    app.mark_security_entry(status);
                }
            }
            _ => {}
        },
    }
}

fn handle_generator_key(app: &mut App, key: KeyEvent) {
    let options = &mut app.config.generator;
    match key.code {
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Char('-') => options.shorten(),
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Char('+') => options.lengthen(),
        KeyCode::Char('1') => options.uppercase = !options.uppercase,
        KeyCode::Char('2') => options.lowercase = !options.lowercase,
        KeyCode::Char('3') => options.digits = !options.digits,
        KeyCode::Char('4') => options.symbols = !options.symbols,
        KeyCode::Char('g') | KeyCode::Enter => {
            app.regenerate();
            return;
        }
        KeyCode::Char('y') => {
            app.yank();
            return;
        }
        _ => return,
    }
    app.status_message = None;
}

fn handle_search_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => app.exit_search(),
        KeyCode::Enter => app.accept_search(),
        KeyCode::Char(c) => {
            app.filter.push(c);
            app.update_filter();
        }
        KeyCode::Backspace => {
            app.filter.pop();
            app.update_filter();
        }
        _ => {}
    }
    false
}

fn handle_confirm_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => app.confirm_pending(),
        KeyCode::Char('n') | KeyCode::Esc => app.cancel_pending(),
        _ => {}
    }
    false
}
