use anyhow::{Context, Result};
use auto_clicker::{
    App, Call, Config, EnigoDriver, Envelope, HotkeyBinding, Notification, NotifyChrome, Outbound,
    ProfileStore, Request, SettingsFile,
};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Hotkey-driven mouse auto-clicker speaking JSON lines on stdin/stdout.
#[derive(Parser, Debug)]
#[command(name = "autoclick", version, about)]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Profile database (overrides config)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Settings document (overrides config)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Start/stop hotkey, e.g. "f9" or "ctrl+alt+c" (overrides config)
    #[arg(long)]
    hotkey: Option<String>,

    /// Do not register the global hotkey
    #[arg(long)]
    no_hotkey: bool,

    /// Let the hotkey click with the saved settings without a UI
    #[arg(long)]
    standalone: bool,

    /// Write the effective configuration to this file and exit
    #[arg(long)]
    save_config: Option<String>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    init_tracing(config.verbose);

    if let Some(path) = &args.save_config {
        config.save_to_file(path)?;
        eprintln!("{} {}", "Configuration written to".green(), path);
        return Ok(());
    }

    let store = ProfileStore::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    let settings = SettingsFile::open_or_create(&config.settings_path)
        .with_context(|| format!("failed to prepare {}", config.settings_path.display()))?;
    debug!("Settings document at {}", settings.path().display());
    let driver = EnigoDriver::new().context("failed to initialise mouse input")?;

    let (note_tx, note_rx) = mpsc::unbounded_channel::<Notification>();
    let (out_tx, out_rx) = mpsc::unbounded_channel::<Outbound>();
    let (call_tx, call_rx) = mpsc::channel::<Call>(32);

    let mut app = App::new(
        driver,
        NotifyChrome::new(note_tx.clone()),
        store,
        settings,
        note_tx,
        &config,
    );

    if args.no_hotkey {
        info!("Global hotkey disabled");
    } else {
        match HotkeyBinding::new(&config.toggle_hotkey) {
            Ok(binding) => app.attach_hotkey(binding),
            Err(e) => warn!("Global hotkey unavailable: {}", e),
        }
    }

    eprintln!(
        "{} database={} settings={}",
        "🖱️  autoclick ready".bold(),
        config.database_path.display(),
        config.settings_path.display()
    );

    let writer = tokio::spawn(write_outbound(out_rx));
    let forwarder = tokio::spawn(forward_notifications(note_rx, out_tx.clone()));
    // Only the reader holds a strong sender, so stdin EOF ends the app loop.
    tokio::spawn(close_on_ctrl_c(call_tx.downgrade()));
    let reader = tokio::spawn(read_requests(call_tx, out_tx));

    app.run(call_rx).await;

    reader.abort();
    let _ = forwarder.await;
    let _ = writer.await;

    // The blocking stdin reader would otherwise hold the runtime open.
    std::process::exit(0);
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(path) = &args.database {
        config.database_path = path.clone();
    }
    if let Some(path) = &args.settings {
        config.settings_path = path.clone();
    }
    if let Some(hotkey) = &args.hotkey {
        config.toggle_hotkey = hotkey.clone();
    }
    config.standalone |= args.standalone;
    config.verbose |= args.verbose;

    config.validate()?;
    Ok(config)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn read_requests(calls: mpsc::Sender<Call>, out: mpsc::UnboundedSender<Outbound>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Envelope { seq, request } = match serde_json::from_str(line) {
            Ok(envelope) => envelope,
            Err(e) => {
                let _ = out.send(Outbound::Error {
                    seq: None,
                    error: format!("invalid request: {}", e),
                });
                continue;
            }
        };

        let (call, reply) = Call::new(request);
        if calls.send(call).await.is_err() {
            break;
        }

        let out = out.clone();
        tokio::spawn(async move {
            let outbound = match reply.await {
                Ok(Ok(result)) => Outbound::Reply { seq, result },
                Ok(Err(e)) => Outbound::Error {
                    seq,
                    error: e.to_string(),
                },
                Err(_) => return,
            };
            let _ = out.send(outbound);
        });
    }
    debug!("stdin closed");
}

async fn forward_notifications(
    mut notes: mpsc::UnboundedReceiver<Notification>,
    out: mpsc::UnboundedSender<Outbound>,
) {
    while let Some(note) = notes.recv().await {
        if out.send(Outbound::Event(note)).is_err() {
            break;
        }
    }
}

async fn write_outbound(mut out: mpsc::UnboundedReceiver<Outbound>) {
    let mut stdout = tokio::io::stdout();

    while let Some(message) = out.recv().await {
        let mut line = match serde_json::to_string(&message) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to encode {:?}: {}", message, e);
                continue;
            }
        };
        line.push('\n');
        if let Err(e) = stdout.write_all(line.as_bytes()).await {
            error!("Failed to write stdout: {}", e);
            break;
        }
        let _ = stdout.flush().await;
    }
}

async fn close_on_ctrl_c(calls: mpsc::WeakSender<Call>) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    let Some(calls) = calls.upgrade() else {
        return;
    };
    info!("Interrupted, closing");
    let (call, _reply) = Call::new(Request::WindowClose);
    let _ = calls.send(call).await;
}
