//! Key bindings

use crate::controller::Command;
use crate::form::FormInput;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Fixed part of the help footer; the auto reload entry depends on the mode
pub const HELP: &[(&str, &str)] = &[
    ("↑↓", "select"),
    ("w", "write"),
    ("r", "reload"),
    ("+", "add"),
    ("d", "duplicate"),
    ("-", "remove"),
    ("e", "edit"),
    ("^K/^J", "line up/down"),
    ("q", "quit"),
];

pub fn table_command(key: KeyEvent) -> Option<Command> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let cmd = match key.code {
        KeyCode::Char('c') if ctrl => Command::Quit,
        KeyCode::Char('l') if ctrl => Command::DisableAutoRefresh,
        KeyCode::Char('k') if ctrl => Command::MoveUp,
        KeyCode::Char('j') if ctrl => Command::MoveDown,
        KeyCode::Up | KeyCode::Char('k') => Command::CursorUp,
        KeyCode::Down | KeyCode::Char('j') => Command::CursorDown,
        KeyCode::Char('w') => Command::Write,
        KeyCode::Char('r') => Command::Refresh,
        KeyCode::Char('l') => Command::EnableAutoRefresh,
        KeyCode::Char('+') => Command::Add,
        KeyCode::Char('d') => Command::Duplicate,
        KeyCode::Char('-') => Command::Remove,
        KeyCode::Char('e') => Command::Edit,
        KeyCode::Char('q') => Command::Quit,
        _ => return None,
    };
    Some(cmd)
}

pub fn form_input(key: KeyEvent) -> Option<FormInput> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let input = match key.code {
        KeyCode::Char('c') if ctrl => FormInput::Cancel,
        KeyCode::Char(_) if ctrl => return None,
        KeyCode::Tab | KeyCode::Down => FormInput::Next,
        KeyCode::BackTab | KeyCode::Up => FormInput::Prev,
        KeyCode::Left => FormInput::Left,
        KeyCode::Right => FormInput::Right,
        KeyCode::Backspace => FormInput::Backspace,
        KeyCode::Enter => FormInput::Confirm,
        KeyCode::Esc => FormInput::Cancel,
        KeyCode::Char(c) => FormInput::Char(c),
        _ => return None,
    };
    Some(input)
}
