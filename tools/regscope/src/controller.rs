//! Table controller
//!
//! Owns the datapoint store and the protocol bridge for the whole session and
//! turns commands and refresh ticks into store mutations and bridge calls.
//!
//! Top-level mode is either [`Mode::Idle`] or [`Mode::AutoRefreshing`]. A
//! modal form (write, edit, add, duplicate) can open over either mode and
//! leaves it untouched. While a form is open, table commands are ignored and
//! refresh ticks are held back; a tick that fell due in the meantime is
//! delivered on the first poll after the form closes.
//!
//! Everything runs on the caller's thread. Each bridge call blocks, a refresh
//! pass always visits every datapoint, and the next tick is only armed after a
//! pass has finished and only if auto refresh is still on.

use crate::dialogs;
use crate::form::{Form, FormEvent, FormInput};
use crate::scheduler::RefreshScheduler;
use errors::{RegscopeError, ValidationError};
use regscope_link::ProtocolBridge;
use regscope_model::{Datapoint, DatapointStore};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Delay between the end of one auto refresh pass and the next
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Table-level commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CursorUp,
    CursorDown,
    Write,
    Refresh,
    EnableAutoRefresh,
    DisableAutoRefresh,
    Add,
    Duplicate,
    Remove,
    Edit,
    MoveUp,
    MoveDown,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    AutoRefreshing,
}

/// What a confirmed modal form applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    Write { index: usize },
    Edit { index: usize },
    Add,
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub kind: ModalKind,
    pub form: Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct TableController<B, S> {
    store: DatapointStore,
    bridge: B,
    scheduler: S,
    interval: Duration,
    mode: Mode,
    modal: Option<Modal>,
    cursor: Option<usize>,
    /// Server id of the most recently confirmed edit, seeds Add
    last_edited_slave: Option<u8>,
    status: String,
    cycles: u64,
}

impl<B: ProtocolBridge, S: RefreshScheduler> TableController<B, S> {
    pub fn new(store: DatapointStore, bridge: B, scheduler: S) -> Self {
        let cursor = if store.is_empty() { None } else { Some(0) };
        Self {
            store,
            bridge,
            scheduler,
            interval: REFRESH_INTERVAL,
            mode: Mode::Idle,
            modal: None,
            cursor,
            last_edited_slave: None,
            status: String::new(),
            cycles: 0,
        }
    }

    pub fn store(&self) -> &DatapointStore {
        &self.store
    }

    #[cfg(test)]
    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    #[cfg(test)]
    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    #[cfg(test)]
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    #[cfg(test)]
    pub fn modal_mut(&mut self) -> Option<&mut Modal> {
        self.modal.as_mut()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Completed tick-driven refresh passes
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Hand the store back for persistence and the bridge back for closing
    pub fn into_parts(self) -> (DatapointStore, B) {
        (self.store, self.bridge)
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    fn selected(&self) -> Option<(usize, &Datapoint)> {
        let index = self.cursor?;
        self.store.get(index).map(|dp| (index, dp))
    }

    // ========================================================================
    // Commands
    // ========================================================================

    pub fn handle(&mut self, cmd: Command) -> Flow {
        if self.modal.is_some() {
            debug!("Ignoring {:?} while a dialog is open", cmd);
            return Flow::Continue;
        }
        debug!("Command: {:?}", cmd);

        match cmd {
            Command::Quit => return Flow::Quit,
            Command::CursorUp => self.cursor_up(),
            Command::CursorDown => self.cursor_down(),
            Command::Refresh => self.refresh_all(),
            Command::EnableAutoRefresh => self.enable_auto_refresh(),
            Command::DisableAutoRefresh => self.disable_auto_refresh(),
            Command::Add => self.open_add(),
            Command::Edit => self.open_selected(|index| ModalKind::Edit { index }),
            Command::Duplicate => self.open_selected(|_| ModalKind::Duplicate),
            Command::Write => self.open_write(),
            Command::Remove => self.remove_selected(),
            Command::MoveUp => self.move_selected(true),
            Command::MoveDown => self.move_selected(false),
        }
        Flow::Continue
    }

    fn cursor_up(&mut self) {
        if let Some(index) = self.cursor {
            self.cursor = Some(index.saturating_sub(1));
        }
    }

    fn cursor_down(&mut self) {
        if let Some(index) = self.cursor {
            self.cursor = Some((index + 1).min(self.store.len().saturating_sub(1)));
        }
    }

    /// Read every datapoint in store order
    ///
    /// Each entry gets the outcome of its own read; a failure never stops
    /// the pass.
    pub fn refresh_all(&mut self) {
        let mut failed = 0usize;
        for dp in self.store.iter_mut() {
            match self.bridge.read_point(dp) {
                Ok(value) => dp.record_success(value),
                Err(e) => {
                    debug!("Read failed: {} unit={} addr={} - {}", dp.name, dp.slave_id, dp.addr, e);
                    dp.record_failure(e);
                    failed += 1;
                },
            }
        }

        if failed > 0 {
            warn!("Refresh: {}/{} reads failed", failed, self.store.len());
        } else {
            debug!("Refresh: {} datapoints", self.store.len());
        }
        self.set_status(format!(
            "Reloaded {} datapoints, {} failed",
            self.store.len(),
            failed
        ));
    }

    fn enable_auto_refresh(&mut self) {
        if self.mode == Mode::AutoRefreshing {
            return;
        }
        info!("Auto refresh on ({} ms)", self.interval.as_millis());
        self.mode = Mode::AutoRefreshing;
        self.refresh_all();
        self.scheduler.schedule(self.interval);
    }

    fn disable_auto_refresh(&mut self) {
        if self.mode == Mode::Idle {
            return;
        }
        self.scheduler.cancel();
        self.mode = Mode::Idle;
        info!("Auto refresh off after {} cycles", self.cycles);
        self.set_status("Auto reload stopped");
    }

    /// Run one auto refresh cycle if its tick has fallen due
    ///
    /// Returns true when a pass ran. Held back while a form is open.
    pub fn poll_tick(&mut self) -> bool {
        if self.modal.is_some() || self.mode != Mode::AutoRefreshing {
            return false;
        }
        if !self.scheduler.take_due() {
            return false;
        }

        self.refresh_all();
        self.cycles += 1;
        if self.mode == Mode::AutoRefreshing {
            self.scheduler.schedule(self.interval);
        }
        true
    }

    fn remove_selected(&mut self) {
        let Some((index, dp)) = self.selected() else {
            return;
        };
        info!("Remove #{} {}", index, dp.name);
        self.cursor = self.store.remove(index);
    }

    fn move_selected(&mut self, up: bool) {
        let Some(index) = self.cursor else {
            return;
        };
        let moved = if up {
            self.store.move_up(index)
        } else {
            self.store.move_down(index)
        };
        self.cursor = Some(moved);
    }

    // ========================================================================
    // Modal forms
    // ========================================================================

    fn open_add(&mut self) {
        let slave_id = self.store.inherited_slave_id(self.last_edited_slave);
        let form = dialogs::datapoint_form("Add datapoint", &Datapoint::blank(slave_id));
        self.modal = Some(Modal {
            kind: ModalKind::Add,
            form,
        });
    }

    fn open_selected(&mut self, kind: impl FnOnce(usize) -> ModalKind) {
        let Some((index, dp)) = self.selected() else {
            return;
        };
        let kind = kind(index);
        let title = match kind {
            ModalKind::Duplicate => "Duplicate datapoint",
            _ => "Edit datapoint",
        };
        let form = dialogs::datapoint_form(title, dp);
        self.modal = Some(Modal { kind, form });
    }

    fn open_write(&mut self) {
        let Some((index, dp)) = self.selected() else {
            return;
        };
        let form = dialogs::write_form(dp);
        self.modal = Some(Modal {
            kind: ModalKind::Write { index },
            form,
        });
    }

    /// Feed a key to the open form
    pub fn handle_form_input(&mut self, input: FormInput) {
        let Some(modal) = self.modal.as_mut() else {
            return;
        };
        match modal.form.handle(input) {
            FormEvent::Submit => self.confirm_modal(),
            FormEvent::Cancel => self.cancel_modal(),
            FormEvent::Edited(_) | FormEvent::None => {},
        }
    }

    /// Apply the open form; an invalid form stays open with the error shown
    pub fn confirm_modal(&mut self) {
        let Some(mut modal) = self.modal.take() else {
            return;
        };
        let result = match modal.kind {
            ModalKind::Write { index } => self.confirm_write(index, &mut modal.form),
            kind => self.confirm_editor(kind, &mut modal.form),
        };
        if let Err(err) = result {
            debug!("{}", RegscopeError::validation(modal.form.title.as_str(), err));
            self.modal = Some(modal);
        }
    }

    /// Close the open form without touching the store or the link
    pub fn cancel_modal(&mut self) {
        if let Some(modal) = self.modal.take() {
            debug!("{}: {}", modal.form.title, RegscopeError::Cancelled);
        }
    }

    fn confirm_write(&mut self, index: usize, form: &mut Form) -> Result<(), ValidationError> {
        let Some(dp) = self.store.get(index) else {
            return Ok(());
        };
        let value = dialogs::value_from_form(form, dp.kind())?;
        let result = self.bridge.write_point(dp, &value);

        let Some(dp) = self.store.get_mut(index) else {
            return Ok(());
        };
        match result {
            Ok(()) => {
                info!("Write {} unit={} addr={} = {}", dp.name, dp.slave_id, dp.addr, value);
                dp.record_success(value);
                self.status = format!("Wrote {} to {}", value, dp.name);
            },
            Err(e) => {
                warn!("Write failed: {} addr={} - {}", dp.name, dp.addr, e);
                self.status = format!("Write to {} failed: {}", dp.name, e);
                dp.record_failure(e);
            },
        }
        Ok(())
    }

    fn confirm_editor(&mut self, kind: ModalKind, form: &mut Form) -> Result<(), ValidationError> {
        let dp = dialogs::datapoint_from_form(form).map_err(|(_, err)| err)?;

        match kind {
            ModalKind::Edit { index } => {
                info!("Edit #{} {}", index, dp.name);
                self.last_edited_slave = Some(dp.slave_id);
                self.store.replace(index, dp);
            },
            ModalKind::Add | ModalKind::Duplicate => {
                info!("{:?} {} addr={}", kind, dp.name, dp.addr);
                self.store.push(dp);
                if self.cursor.is_none() {
                    self.cursor = Some(0);
                }
            },
            ModalKind::Write { .. } => {},
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::dialogs::{DP_ADDRESS, DP_MAX_IN, DP_MIN_IN, DP_NAME, DP_SERVER_ID};
    use crate::scheduler::ManualScheduler;
    use errors::LinkError;
    use regscope_link::{BridgeCall, MockBridge};
    use regscope_model::{DataType, Flag, Scaling, Value};
    use tracing_test::traced_test;

    type TestController = TableController<MockBridge, ManualScheduler>;

    fn datapoint(slave_id: u8, name: &str, addr: u16) -> Datapoint {
        let mut dp = Datapoint::new(slave_id, name, addr, DataType::UInt16);
        dp.flag = Flag::ReadWrite;
        dp
    }

    fn controller(n: u16) -> TestController {
        let store: DatapointStore = (0..n)
            .map(|i| datapoint(1, &format!("dp{i}"), i * 10))
            .collect::<Vec<_>>()
            .into();
        TableController::new(store, MockBridge::new(), ManualScheduler::new())
    }

    fn names(ctl: &TestController) -> Vec<String> {
        ctl.store().iter().map(|dp| dp.name.clone()).collect()
    }

    fn submit(ctl: &mut TestController) {
        ctl.handle_form_input(FormInput::Confirm);
    }

    // ------------------------------------------------------------------
    // Refresh
    // ------------------------------------------------------------------

    #[test]
    fn test_refresh_isolates_failures() {
        let mut ctl = controller(3);
        ctl.bridge_mut().set_value(0, Value::U16(11));
        ctl.bridge_mut().set_value(10, Value::U16(22));
        ctl.bridge_mut().set_value(20, Value::U16(33));
        ctl.bridge_mut().fail(10, LinkError::Exception("Illegal data address".into()));

        ctl.handle(Command::Refresh);

        let dps = ctl.store().as_slice();
        assert_eq!(dps[0].value, Some(Value::U16(11)));
        assert_eq!(dps[0].err, None);
        assert_eq!(dps[1].value, None);
        assert!(matches!(dps[1].err, Some(LinkError::Exception(_))));
        assert_eq!(dps[2].value, Some(Value::U16(33)));
        assert_eq!(dps[2].err, None);
        assert_eq!(ctl.bridge().read_count(), 3);
    }

    #[test]
    fn test_refresh_overwrites_previous_outcome() {
        let mut ctl = controller(1);
        ctl.bridge_mut().fail(0, LinkError::Timeout(1000));
        ctl.refresh_all();
        assert_eq!(ctl.store().as_slice()[0].err, Some(LinkError::Timeout(1000)));

        ctl.bridge_mut().clear_failure(0);
        ctl.bridge_mut().set_value(0, Value::U16(5));
        ctl.refresh_all();
        assert_eq!(ctl.store().as_slice()[0].err, None);
        assert_eq!(ctl.store().as_slice()[0].value, Some(Value::U16(5)));
    }

    #[test]
    fn test_refresh_selects_unit_per_datapoint() {
        let store: DatapointStore = vec![datapoint(3, "a", 0), datapoint(9, "b", 1)].into();
        let mut ctl = TableController::new(store, MockBridge::new(), ManualScheduler::new());
        ctl.refresh_all();

        let units: Vec<u8> = ctl
            .bridge()
            .calls()
            .iter()
            .filter_map(|c| match c {
                BridgeCall::Read { unit, .. } => Some(*unit),
                _ => None,
            })
            .collect();
        assert_eq!(units, vec![3, 9]);
    }

    // ------------------------------------------------------------------
    // Auto refresh
    // ------------------------------------------------------------------

    #[test]
    fn test_enable_refreshes_immediately_and_schedules() {
        let mut ctl = controller(2);
        ctl.handle(Command::EnableAutoRefresh);

        assert_eq!(ctl.mode(), Mode::AutoRefreshing);
        assert_eq!(ctl.bridge().read_count(), 2);
        assert_eq!(ctl.scheduler().history, vec![REFRESH_INTERVAL]);
        assert!(!ctl.poll_tick());
    }

    #[test]
    fn test_disable_after_two_cycles_stops_reads() {
        let mut ctl = controller(3);
        ctl.handle(Command::EnableAutoRefresh);
        let initial = ctl.bridge().read_count();

        for _ in 0..2 {
            assert!(ctl.scheduler_mut().fire());
            assert!(ctl.poll_tick());
        }
        assert_eq!(ctl.cycles(), 2);
        assert_eq!(ctl.bridge().read_count(), initial + 2 * 3);

        ctl.handle(Command::DisableAutoRefresh);
        assert_eq!(ctl.mode(), Mode::Idle);
        assert!(!ctl.scheduler().is_scheduled());

        // nothing pending, nothing fires, no third cycle
        assert!(!ctl.scheduler_mut().fire());
        assert!(!ctl.poll_tick());
        assert_eq!(ctl.bridge().read_count(), initial + 2 * 3);
        assert_eq!(ctl.cycles(), 2);
    }

    #[test]
    fn test_tick_held_while_modal_open() {
        let mut ctl = controller(1);
        ctl.handle(Command::EnableAutoRefresh);
        ctl.handle(Command::Edit);
        assert!(ctl.modal().is_some());

        assert!(ctl.scheduler_mut().fire());
        assert!(!ctl.poll_tick());
        assert_eq!(ctl.bridge().read_count(), 1);

        ctl.handle_form_input(FormInput::Cancel);
        assert_eq!(ctl.mode(), Mode::AutoRefreshing);
        assert!(ctl.poll_tick());
        assert_eq!(ctl.bridge().read_count(), 2);
    }

    // ------------------------------------------------------------------
    // List editing
    // ------------------------------------------------------------------

    #[test]
    fn test_add_then_remove_restores_store() {
        let mut ctl = controller(3);
        let before = ctl.store().clone();

        ctl.handle(Command::Add);
        ctl.modal_mut().unwrap().form.set_text(DP_NAME, "extra");
        submit(&mut ctl);
        assert!(ctl.modal().is_none());
        assert_eq!(ctl.store().len(), 4);
        assert_eq!(ctl.store().get(3).unwrap().value, None);

        for _ in 0..3 {
            ctl.handle(Command::CursorDown);
        }
        assert_eq!(ctl.cursor(), Some(3));
        ctl.handle(Command::Remove);

        assert_eq!(ctl.store(), &before);
        assert_eq!(ctl.cursor(), Some(2));
    }

    #[test]
    fn test_add_inherits_slave_id() {
        let mut ctl = TableController::new(
            DatapointStore::new(),
            MockBridge::new(),
            ManualScheduler::new(),
        );
        ctl.handle(Command::Add);
        assert_eq!(ctl.modal().unwrap().form.text(DP_SERVER_ID), "0");
        ctl.modal_mut().unwrap().form.set_text(DP_SERVER_ID, "4");
        submit(&mut ctl);
        assert_eq!(ctl.cursor(), Some(0));

        // falls back to the first entry
        ctl.handle(Command::Add);
        assert_eq!(ctl.modal().unwrap().form.text(DP_SERVER_ID), "4");
        ctl.modal_mut().unwrap().form.set_text(DP_SERVER_ID, "6");
        submit(&mut ctl);

        // an edit makes that entry the source
        ctl.handle(Command::CursorDown);
        ctl.handle(Command::Edit);
        ctl.modal_mut().unwrap().form.set_text(DP_SERVER_ID, "9");
        submit(&mut ctl);

        ctl.handle(Command::Add);
        assert_eq!(ctl.modal().unwrap().form.text(DP_SERVER_ID), "9");
    }

    #[test]
    fn test_add_inherits_edited_slave_after_remove() {
        let mut ctl = controller(2);

        ctl.handle(Command::CursorDown);
        ctl.handle(Command::Edit);
        ctl.modal_mut().unwrap().form.set_text(DP_SERVER_ID, "9");
        submit(&mut ctl);
        assert_eq!(ctl.store().get(1).unwrap().slave_id, 9);

        ctl.handle(Command::Remove);
        assert_eq!(ctl.store().len(), 1);
        ctl.handle(Command::MoveUp);

        ctl.handle(Command::Add);
        assert_eq!(ctl.modal().unwrap().form.text(DP_SERVER_ID), "9");
    }

    #[test]
    fn test_add_cancel_leaves_store() {
        let mut ctl = controller(2);
        let before = ctl.store().clone();
        ctl.handle(Command::Add);
        ctl.handle_form_input(FormInput::Cancel);
        assert_eq!(ctl.store(), &before);
        assert!(ctl.modal().is_none());
    }

    #[test]
    fn test_edit_cancel_restores_entry() {
        let mut ctl = controller(2);
        ctl.bridge_mut().set_value(0, Value::U16(17));
        ctl.refresh_all();
        let before = ctl.store().clone();

        ctl.handle(Command::Edit);
        let form = &mut ctl.modal_mut().unwrap().form;
        form.set_text(DP_NAME, "renamed");
        form.set_text(DP_ADDRESS, "999");
        ctl.handle_form_input(FormInput::Cancel);

        assert_eq!(ctl.store(), &before);
    }

    #[test]
    fn test_edit_confirm_replaces_in_place() {
        let mut ctl = controller(3);
        ctl.handle(Command::CursorDown);
        ctl.handle(Command::Edit);
        ctl.modal_mut().unwrap().form.set_text(DP_NAME, "renamed");
        submit(&mut ctl);

        assert_eq!(names(&ctl), vec!["dp0", "renamed", "dp2"]);
        assert_eq!(ctl.store().get(1).unwrap().addr, 10);
    }

    #[test]
    fn test_editor_validation_keeps_modal_open() {
        let mut ctl = controller(1);
        let before = ctl.store().clone();
        ctl.handle(Command::Edit);
        let form = &mut ctl.modal_mut().unwrap().form;
        form.set_text(DP_MIN_IN, "7");
        form.set_text(DP_MAX_IN, "7");
        submit(&mut ctl);

        let modal = ctl.modal().unwrap();
        assert_eq!(modal.form.focus(), DP_MAX_IN);
        assert_eq!(
            modal.form.fields()[DP_MAX_IN].error,
            Some(ValidationError::ZeroWidthRange)
        );
        assert_eq!(ctl.store(), &before);

        // commands are suspended until the form closes
        ctl.handle(Command::Remove);
        assert_eq!(ctl.store().len(), 1);
    }

    #[test]
    fn test_duplicate_clears_reading() {
        let mut ctl = controller(1);
        {
            let dp = ctl.store.get_mut(0).unwrap();
            dp.unit = "V".into();
            dp.scaling = Some(Scaling::new("0", "100", "0", "10"));
            dp.record_success(Value::U16(17));
        }

        ctl.handle(Command::Duplicate);
        submit(&mut ctl);

        let original = ctl.store().get(0).unwrap();
        let copy = ctl.store().get(1).unwrap();
        assert_eq!(copy.name, original.name);
        assert_eq!(copy.addr, original.addr);
        assert_eq!(copy.data_type, original.data_type);
        assert_eq!(copy.flag, original.flag);
        assert_eq!(copy.unit, original.unit);
        assert_eq!(copy.scaling, original.scaling);
        assert_eq!(copy.value, None);
        assert_eq!(copy.err, None);
        assert_eq!(original.value, Some(Value::U16(17)));
    }

    #[test]
    fn test_duplicate_cancel_appends_nothing() {
        let mut ctl = controller(2);
        ctl.handle(Command::Duplicate);
        ctl.handle_form_input(FormInput::Cancel);
        assert_eq!(ctl.store().len(), 2);
    }

    #[test]
    fn test_remove_clamps_cursor() {
        let mut ctl = controller(2);
        ctl.handle(Command::CursorDown);
        ctl.handle(Command::Remove);
        assert_eq!(ctl.cursor(), Some(0));
        ctl.handle(Command::Remove);
        assert_eq!(ctl.cursor(), None);
        assert!(ctl.store().is_empty());

        // selection commands are no-ops on an empty store
        for cmd in [Command::Remove, Command::Edit, Command::Duplicate, Command::Write] {
            ctl.handle(cmd);
            assert!(ctl.modal().is_none());
        }
        assert_eq!(ctl.cursor(), None);
    }

    #[test]
    fn test_move_boundaries_are_noops() {
        let mut ctl = controller(3);
        ctl.handle(Command::MoveUp);
        assert_eq!(ctl.cursor(), Some(0));
        assert_eq!(names(&ctl), vec!["dp0", "dp1", "dp2"]);

        ctl.handle(Command::CursorDown);
        ctl.handle(Command::CursorDown);
        ctl.handle(Command::MoveDown);
        assert_eq!(ctl.cursor(), Some(2));
        assert_eq!(names(&ctl), vec!["dp0", "dp1", "dp2"]);
    }

    #[test]
    fn test_move_cursor_follows_entry() {
        let mut ctl = controller(3);
        ctl.handle(Command::MoveDown);
        assert_eq!(ctl.cursor(), Some(1));
        assert_eq!(names(&ctl), vec!["dp1", "dp0", "dp2"]);
        ctl.handle(Command::MoveDown);
        ctl.handle(Command::MoveUp);
        assert_eq!(ctl.cursor(), Some(1));
        assert_eq!(names(&ctl), vec!["dp1", "dp0", "dp2"]);
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut ctl = controller(2);
        ctl.handle(Command::CursorUp);
        assert_eq!(ctl.cursor(), Some(0));
        for _ in 0..5 {
            ctl.handle(Command::CursorDown);
        }
        assert_eq!(ctl.cursor(), Some(1));
    }

    // ------------------------------------------------------------------
    // Write
    // ------------------------------------------------------------------

    #[test]
    fn test_write_updates_value_immediately() {
        let mut ctl = controller(1);
        ctl.handle(Command::Write);
        assert_eq!(ctl.modal().unwrap().form.text(0), "1");
        ctl.modal_mut().unwrap().form.set_text(0, "1234");
        submit(&mut ctl);

        assert!(ctl.modal().is_none());
        assert_eq!(ctl.store().get(0).unwrap().value, Some(Value::U16(1234)));
        assert_eq!(ctl.bridge().writes().len(), 1);
        assert_eq!(ctl.bridge().read_count(), 0);
    }

    #[test]
    fn test_write_failure_sets_err() {
        let mut ctl = controller(1);
        ctl.bridge_mut().set_value(0, Value::U16(3));
        ctl.refresh_all();
        ctl.bridge_mut().fail(0, LinkError::Exception("Illegal data value".into()));

        ctl.handle(Command::Write);
        assert_eq!(ctl.modal().unwrap().form.text(0), "3");
        submit(&mut ctl);

        let dp = ctl.store().get(0).unwrap();
        assert_eq!(dp.value, None);
        assert!(matches!(dp.err, Some(LinkError::Exception(_))));
    }

    #[test]
    fn test_write_invalid_text_keeps_prompt_open() {
        let mut ctl = controller(1);
        ctl.handle(Command::Write);
        ctl.modal_mut().unwrap().form.set_text(0, "-5");
        submit(&mut ctl);

        assert!(ctl.modal().is_some());
        assert!(ctl.bridge().writes().is_empty());
    }

    #[test]
    fn test_write_cancel_sends_nothing() {
        let mut ctl = controller(1);
        let before = ctl.store().clone();
        ctl.handle(Command::Write);
        ctl.handle_form_input(FormInput::Cancel);

        assert!(ctl.bridge().calls().is_empty());
        assert_eq!(ctl.store(), &before);
    }

    #[test]
    fn test_write_read_only_register_is_refused() {
        let mut ctl = controller(1);
        ctl.store.get_mut(0).unwrap().flag = Flag::Read;

        ctl.handle(Command::Write);
        submit(&mut ctl);

        assert!(ctl.bridge().calls().is_empty());
        assert_eq!(
            ctl.store().get(0).unwrap().err,
            Some(LinkError::ReadOnlyRegister { addr: 0 })
        );
    }

    // ------------------------------------------------------------------
    // Modes
    // ------------------------------------------------------------------

    #[test]
    fn test_modal_preserves_mode() {
        let mut ctl = controller(1);
        ctl.handle(Command::EnableAutoRefresh);
        ctl.handle(Command::Write);
        ctl.modal_mut().unwrap().form.set_text(0, "8");
        submit(&mut ctl);
        assert_eq!(ctl.mode(), Mode::AutoRefreshing);

        ctl.handle(Command::DisableAutoRefresh);
        ctl.handle(Command::Add);
        ctl.handle_form_input(FormInput::Cancel);
        assert_eq!(ctl.mode(), Mode::Idle);
    }

    #[test]
    fn test_quit() {
        let mut ctl = controller(0);
        assert_eq!(ctl.handle(Command::Refresh), Flow::Continue);
        assert_eq!(ctl.handle(Command::Quit), Flow::Quit);
    }

    #[traced_test]
    #[test]
    fn test_failures_are_logged() {
        let mut ctl = controller(2);
        ctl.bridge_mut().fail(10, LinkError::Timeout(1000));
        ctl.refresh_all();

        assert!(logs_contain("Refresh: 1/2 reads failed"));
        assert!(logs_contain("timeout after 1000 ms"));
    }
}
