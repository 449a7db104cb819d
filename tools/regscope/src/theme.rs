//! Render styles
//!
//! Passed explicitly into every draw call.

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub title: Style,
    pub header: Style,
    pub selected: Style,
    pub error: Style,
    pub status: Style,
    pub badge: Style,
    pub help: Style,
    pub popup_border: Style,
    pub field_label: Style,
    pub field_focus: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            header: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            selected: Style::default().add_modifier(Modifier::REVERSED),
            error: Style::default().fg(Color::Red),
            status: Style::default().fg(Color::Gray),
            badge: Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
            help: Style::default().fg(Color::DarkGray),
            popup_border: Style::default().fg(Color::Cyan),
            field_label: Style::default().fg(Color::Gray),
            field_focus: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        }
    }
}

impl Theme {
    /// No colours, for terminals with `NO_COLOR` set
    pub fn monochrome() -> Self {
        Self {
            title: Style::default().add_modifier(Modifier::BOLD),
            header: Style::default().add_modifier(Modifier::BOLD),
            selected: Style::default().add_modifier(Modifier::REVERSED),
            error: Style::default().add_modifier(Modifier::ITALIC),
            status: Style::default(),
            badge: Style::default().add_modifier(Modifier::REVERSED),
            help: Style::default(),
            popup_border: Style::default(),
            field_label: Style::default(),
            field_focus: Style::default().add_modifier(Modifier::UNDERLINED),
        }
    }
}
