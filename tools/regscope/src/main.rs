//! regscope - interactive Modbus datapoint table
//!
//! Connects to one Modbus endpoint, shows a table of named datapoints with
//! their scaled live values, and persists the table between runs.

mod controller;
mod dialogs;
mod form;
mod keymap;
mod logging;
mod persistence;
mod scheduler;
mod session;
mod theme;
mod ui;

use anyhow::Result;
use clap::Parser;
use controller::TableController;
use errors::{RegscopeError, RegscopeErrorTrait, RegscopeResult};
use persistence::Document;
use regscope_link::{ConnectionConfig, ModbusLink, Parity, ProtocolBridge, Transport};
use regscope_model::{Datapoint, DatapointStore};
use scheduler::TickScheduler;
use session::TerminalSession;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use theme::Theme;
use tracing::{debug, error, info, warn, Level};

#[derive(Parser, Debug)]
#[command(name = "regscope")]
#[command(about = "Interactive Modbus datapoint table", long_about = None)]
#[command(version)]
struct Cli {
    /// Session document holding connection settings and datapoints
    #[arg(long, env = "REGSCOPE_DB", default_value = "~/.regscope")]
    db: String,

    /// Transport: tcp, rtu, rtuovertcp, rtuoverudp
    #[arg(long, env = "REGSCOPE_TRANSPORT")]
    transport: Option<String>,

    /// host:port, or the serial device for rtu
    #[arg(long, env = "REGSCOPE_ADDRESS")]
    address: Option<String>,

    /// RTU baud rate [stored default: 19200]
    #[arg(long)]
    baudrate: Option<u32>,

    /// RTU data bits, 5-8 [stored default: 8]
    #[arg(long)]
    databits: Option<u8>,

    /// RTU parity: E, N or O [stored default: E]
    #[arg(long)]
    parity: Option<String>,

    /// RTU stop bits, 1-2 [stored default: 1]
    #[arg(long)]
    stopbits: Option<u8>,

    /// Per-request I/O timeout
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,

    /// Log file directory
    #[arg(long, env = "REGSCOPE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    /// Overlay command line values on the stored connection settings
    fn apply(&self, cfg: &mut ConnectionConfig) -> RegscopeResult<()> {
        if let Some(transport) = &self.transport {
            cfg.transport = Transport::from_str(transport)?;
        }
        if let Some(address) = &self.address {
            cfg.address = address.clone();
        }
        if let Some(baudrate) = self.baudrate {
            cfg.baudrate = baudrate;
        }
        if let Some(databits) = self.databits {
            cfg.databits = databits;
        }
        if let Some(parity) = &self.parity {
            cfg.parity = Parity::from_str(parity)?;
        }
        if let Some(stopbits) = self.stopbits {
            cfg.stopbits = stopbits;
        }
        Ok(())
    }

    fn theme(&self) -> Theme {
        if self.no_color || std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            Theme::monochrome()
        } else {
            Theme::default()
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_dir = cli.log_dir.clone().unwrap_or_else(logging::default_log_dir);
    let _guard = logging::init_logging(&log_dir, cli.verbose)?;

    let db_path = persistence::expand_home(&cli.db);
    let doc = persistence::load(&db_path);

    let mut config = doc.modbus;
    if let Err(e) = cli.apply(&mut config) {
        log_error("Startup parameters", &e);
        return Err(e.into());
    }

    let theme = cli.theme();
    let timeout = Duration::from_millis(cli.timeout_ms);

    let mut session = TerminalSession::enter()?;
    let outcome = run(&mut session, &db_path, config, doc.datapoints, timeout, &theme);
    session.leave()?;
    outcome
}

/// Connect, drive the table, then persist
fn run(
    session: &mut TerminalSession,
    db_path: &Path,
    mut config: ConnectionConfig,
    datapoints: Vec<Datapoint>,
    timeout: Duration,
    theme: &Theme,
) -> Result<()> {
    let mut message: Option<String> = None;

    let link = loop {
        let Some(candidate) = session.prompt_connection(&config, message.as_deref(), theme)?
        else {
            info!("Connection prompt cancelled, exiting");
            return Ok(());
        };
        config = candidate;

        match ModbusLink::open(&config, timeout) {
            Ok(link) => break link,
            Err(e) => {
                log_error("Connect", &e);
                if e.is_fatal() {
                    return Err(e.into());
                }
                message = Some(e.to_string());
            },
        }
    };

    let title = format!("regscope  {}", link.endpoint());
    let store = DatapointStore::from(datapoints);
    let mut ctl = TableController::new(store, link, TickScheduler::new());
    ctl.refresh_all();

    let outcome = session.run_table(&title, &mut ctl, theme);

    let (store, mut link) = ctl.into_parts();
    link.close();

    let doc = Document {
        modbus: config,
        datapoints: store.into_vec(),
    };
    if let Err(e) = persistence::save(db_path, &doc) {
        log_error(&format!("Save {}", db_path.display()), &e);
        outcome?;
        return Err(e.into());
    }
    outcome
}

/// Log at the level the error's category calls for, tagged with its code
fn log_error(context: &str, e: &RegscopeError) {
    let code = e.error_code();
    match e.log_level() {
        Level::ERROR => error!("{} [{}]: {}", context, code, e),
        Level::WARN => warn!("{} [{}]: {}", context, code, e),
        Level::INFO => info!("{} [{}]: {}", context, code, e),
        _ => debug!("{} [{}]: {}", context, code, e),
    }
}
