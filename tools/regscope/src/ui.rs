//! Rendering
//!
//! Layout: title bar, datapoint table, status line, help footer. An open
//! form is drawn as a centred popup over the table.

use crate::controller::{Mode, TableController};
use crate::form::{FieldKind, Form};
use crate::keymap::HELP;
use crate::scheduler::RefreshScheduler;
use crate::theme::Theme;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState};
use ratatui::Frame;
use regscope_link::ProtocolBridge;

const COLUMNS: [&str; 7] = [
    "#",
    "Server ID",
    "Address",
    "Flags",
    "Name",
    "Description",
    "Value",
];

/// Draw the table screen
pub fn draw<B, S>(f: &mut Frame, title: &str, ctl: &TableController<B, S>, theme: &Theme)
where
    B: ProtocolBridge,
    S: RefreshScheduler,
{
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(format!(" {title}"), theme.title))),
        chunks[0],
    );
    draw_table(f, chunks[1], ctl, theme);
    draw_status(f, chunks[2], ctl, theme);
    draw_help(f, chunks[3], ctl.mode(), theme);

    if let Some(modal) = ctl.modal() {
        draw_form(f, &modal.form, theme);
    }
}

fn draw_table<B, S>(f: &mut Frame, area: Rect, ctl: &TableController<B, S>, theme: &Theme)
where
    B: ProtocolBridge,
    S: RefreshScheduler,
{
    let header = Row::new(COLUMNS).style(theme.header).height(1);

    let rows: Vec<Row> = ctl
        .store()
        .iter()
        .enumerate()
        .map(|(i, dp)| {
            let [idx, slave, addr, flags, name, description, value] = dp.row(i + 1);
            let value_cell = if dp.err.is_some() {
                Cell::from(value).style(theme.error)
            } else {
                Cell::from(value)
            };
            Row::new(vec![
                Cell::from(idx),
                Cell::from(slave),
                Cell::from(addr),
                Cell::from(flags),
                Cell::from(name),
                Cell::from(description),
                value_cell,
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(6),
        Constraint::Percentage(20),
        Constraint::Percentage(30),
        Constraint::Min(12),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " Datapoints ({}) ",
            ctl.store().len()
        )))
        .row_highlight_style(theme.selected);

    let mut state = TableState::default().with_selected(ctl.cursor());
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_status<B, S>(f: &mut Frame, area: Rect, ctl: &TableController<B, S>, theme: &Theme)
where
    B: ProtocolBridge,
    S: RefreshScheduler,
{
    let mut spans = Vec::new();
    if ctl.mode() == Mode::AutoRefreshing {
        spans.push(Span::styled(
            format!(" Auto Reloading #{} ", ctl.cycles()),
            theme.badge,
        ));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled(ctl.status().to_string(), theme.status));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help(f: &mut Frame, area: Rect, mode: Mode, theme: &Theme) {
    let auto = match mode {
        Mode::Idle => ("l", "auto reload"),
        Mode::AutoRefreshing => ("^L", "stop auto reload"),
    };
    let text = HELP
        .iter()
        .copied()
        .take(3)
        .chain(std::iter::once(auto))
        .chain(HELP.iter().copied().skip(3))
        .map(|(key, what)| format!("{key} {what}"))
        .collect::<Vec<_>>()
        .join(" · ");
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(format!(" {text}"), theme.help))),
        area,
    );
}

/// Draw the connection settings screen
pub fn draw_connection(f: &mut Frame, form: &Form, message: Option<&str>, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(f.area());

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(" regscope", theme.title))),
        chunks[0],
    );
    if let Some(message) = message {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(format!(" {message}"), theme.error))),
            chunks[1],
        );
    }
    draw_form(f, form, theme);
}

/// Draw a form as a centred popup
pub fn draw_form(f: &mut Frame, form: &Form, theme: &Theme) {
    let label_width = form
        .fields()
        .iter()
        .map(|field| field.label.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<Line> = form
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, field)| !field.hidden)
        .map(|(i, field)| {
            let focused = i == form.focus();
            let value = match field.kind {
                FieldKind::Select { .. } => format!("‹ {} ›", field.display()),
                _ if focused => format!("{}_", field.display()),
                _ => field.display().to_string(),
            };
            let label_style = if field.error.is_some() {
                theme.error
            } else {
                theme.field_label
            };
            Line::from(vec![
                Span::styled(
                    format!("{:>width$}: ", field.label, width = label_width),
                    label_style,
                ),
                Span::styled(value, if focused { theme.field_focus } else { theme.status }),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(match form.error_message() {
        Some(message) => Line::from(Span::styled(message, theme.error)),
        None => Line::from(Span::styled(
            "Enter confirm · Esc cancel · Tab next · ←→ choose",
            theme.help,
        )),
    });

    let height = lines.len() as u16 + 2;
    let area = centered(f.area(), 70, height);
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.popup_border)
                .title(format!(" {} ", form.title)),
        ),
        area,
    );
}

/// Rect of `percent_x` width and fixed height centred in `area`
fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = (area.width * percent_x / 100).max(20).min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::controller::Command;
    use crate::dialogs;
    use crate::scheduler::ManualScheduler;
    use errors::LinkError;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use regscope_link::{ConnectionConfig, MockBridge};
    use regscope_model::{DataType, Datapoint, DatapointStore, Scaling, Value};

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn controller() -> TableController<MockBridge, ManualScheduler> {
        let mut volts = Datapoint::new(1, "Voltage", 0, DataType::UInt16);
        volts.unit = "V".into();
        volts.scaling = Some(Scaling::new("0", "100", "-10", "10"));
        let amps = Datapoint::new(1, "Current", 1, DataType::UInt16);
        let store: DatapointStore = vec![volts, amps].into();

        let mut bridge = MockBridge::new();
        bridge.set_value(0, Value::U16(50));
        bridge.fail(1, LinkError::Timeout(1000));
        TableController::new(store, bridge, ManualScheduler::new())
    }

    #[test]
    fn test_table_screen() {
        let mut ctl = controller();
        ctl.refresh_all();

        let mut terminal = Terminal::new(TestBackend::new(120, 12)).unwrap();
        terminal
            .draw(|f| draw(f, "tcp://localhost:502", &ctl, &Theme::default()))
            .unwrap();
        let text = screen(&terminal);

        assert!(text.contains("tcp://localhost:502"));
        assert!(text.contains("Server ID"));
        assert!(text.contains("0.00V"));
        assert!(text.contains("timeout after 1000 ms"));
        assert!(text.contains("l auto reload"));
        assert!(!text.contains("Auto Reloading"));
    }

    #[test]
    fn test_rows_numbered_from_one() {
        let ctl = controller();
        let mut terminal = Terminal::new(TestBackend::new(120, 12)).unwrap();
        terminal
            .draw(|f| draw(f, "regscope", &ctl, &Theme::default()))
            .unwrap();
        let buffer = terminal.backend().buffer();

        // title, border, header, then the rows
        assert_eq!(buffer[(1, 3)].symbol(), "1");
        assert_eq!(buffer[(1, 4)].symbol(), "2");
    }

    #[test]
    fn test_auto_reload_badge_and_help() {
        let mut ctl = controller();
        ctl.handle(Command::EnableAutoRefresh);

        let mut terminal = Terminal::new(TestBackend::new(140, 12)).unwrap();
        terminal
            .draw(|f| draw(f, "regscope", &ctl, &Theme::monochrome()))
            .unwrap();
        let text = screen(&terminal);

        assert!(text.contains("Auto Reloading"));
        assert!(text.contains("stop auto reload"));
    }

    #[test]
    fn test_modal_popup() {
        let mut ctl = controller();
        ctl.handle(Command::Edit);

        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal
            .draw(|f| draw(f, "regscope", &ctl, &Theme::default()))
            .unwrap();
        let text = screen(&terminal);

        assert!(text.contains("Edit datapoint"));
        assert!(text.contains("Input Min"));
        assert!(text.contains("Voltage"));
    }

    #[test]
    fn test_connection_screen() {
        let form = dialogs::connection_form(&ConnectionConfig::default());
        let mut terminal = Terminal::new(TestBackend::new(80, 16)).unwrap();
        terminal
            .draw(|f| draw_connection(f, &form, Some("Connection refused"), &Theme::default()))
            .unwrap();
        let text = screen(&terminal);

        assert!(text.contains("Modbus connection"));
        assert!(text.contains("localhost:502"));
        assert!(text.contains("Connection refused"));
        assert!(!text.contains("Baudrate"));
    }

    #[test]
    fn test_form_error_in_footer() {
        let mut form = dialogs::connection_form(&ConnectionConfig::default());
        form.set_text(dialogs::CFG_ADDRESS, "  ");
        assert!(dialogs::connection_from_form(&mut form).is_err());

        let mut terminal = Terminal::new(TestBackend::new(80, 16)).unwrap();
        terminal
            .draw(|f| draw_connection(f, &form, None, &Theme::default()))
            .unwrap();
        let text = screen(&terminal);

        assert!(text.contains("Address: value required"));
        assert!(!text.contains("Enter confirm"));
    }

    #[test]
    fn test_centered_fits() {
        let area = Rect::new(0, 0, 10, 5);
        let rect = centered(area, 70, 20);
        assert!(rect.width <= 10 && rect.height <= 5);
    }
}
