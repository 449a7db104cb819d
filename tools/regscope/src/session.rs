//! Terminal session and event loops

use crate::controller::{Flow, TableController};
use crate::dialogs;
use crate::form::FormEvent;
use crate::keymap;
use crate::scheduler::RefreshScheduler;
use crate::theme::Theme;
use crate::ui;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use regscope_link::{ConnectionConfig, ProtocolBridge};
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::debug;

/// Longest wait for input before the loop re-checks the refresh tick
const INPUT_POLL: Duration = Duration::from_millis(250);

/// Raw mode plus alternate screen, restored on [`TerminalSession::leave`] or drop
pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl TerminalSession {
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        stdout
            .execute(EnterAlternateScreen)
            .context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("Failed to create terminal")?;
        Ok(Self {
            terminal,
            active: true,
        })
    }

    pub fn leave(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        disable_raw_mode().context("Failed to disable raw mode")?;
        self.terminal
            .backend_mut()
            .execute(LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        self.terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }

    /// Show the connection form until it is submitted (`Some`) or cancelled
    pub fn prompt_connection(
        &mut self,
        cfg: &ConnectionConfig,
        message: Option<&str>,
        theme: &Theme,
    ) -> Result<Option<ConnectionConfig>> {
        let mut form = dialogs::connection_form(cfg);

        loop {
            self.terminal
                .draw(|f| ui::draw_connection(f, &form, message, theme))?;

            let Some(key) = read_key(None)? else {
                continue;
            };
            let Some(input) = keymap::form_input(key) else {
                continue;
            };
            match form.handle(input) {
                FormEvent::Submit => match dialogs::connection_from_form(&mut form) {
                    Ok(cfg) => return Ok(Some(cfg)),
                    Err((_, err)) => debug!("Connection form: {}", err),
                },
                FormEvent::Cancel => return Ok(None),
                FormEvent::Edited(index) => dialogs::connection_form_edited(&mut form, index),
                FormEvent::None => {},
            }
        }
    }

    /// Drive the table until the operator quits
    pub fn run_table<B, S>(
        &mut self,
        title: &str,
        ctl: &mut TableController<B, S>,
        theme: &Theme,
    ) -> Result<()>
    where
        B: ProtocolBridge,
        S: RefreshScheduler,
    {
        loop {
            ctl.poll_tick();
            self.terminal.draw(|f| ui::draw(f, title, ctl, theme))?;

            let wait = match ctl.scheduler().time_until_due() {
                Some(due) if ctl.modal().is_none() => due.min(INPUT_POLL),
                _ => INPUT_POLL,
            };
            let Some(key) = read_key(Some(wait))? else {
                continue;
            };

            if ctl.modal().is_some() {
                if let Some(input) = keymap::form_input(key) {
                    ctl.handle_form_input(input);
                }
            } else if let Some(cmd) = keymap::table_command(key) {
                if ctl.handle(cmd) == Flow::Quit {
                    return Ok(());
                }
            }
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(e) = self.leave() {
            debug!("Terminal restore: {}", e);
        }
    }
}

/// Next key press, waiting at most `timeout` (forever when `None`)
fn read_key(timeout: Option<Duration>) -> Result<Option<KeyEvent>> {
    if let Some(timeout) = timeout {
        if !event::poll(timeout).context("Failed to poll events")? {
            return Ok(None);
        }
    }
    match event::read().context("Failed to read event")? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
        _ => Ok(None),
    }
}
