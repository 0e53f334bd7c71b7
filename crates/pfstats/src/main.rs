// # pfstats - Party Finder Stats
//
// A thin command-line host around `pfstats-core`. It plays the part of the
// game client: it asks the coordinator for each player's line and prints
// what comes back through the host queue.
//
// The binary is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing tracing and the runtime
// 3. Wiring the HTTP services into a coordinator
// 4. Draining the host queue and printing one line per player
//
// ## Configuration
//
// - `PFSTATS_PLAYERS`: Comma-separated player names (required)
// - `PFSTATS_MODE`: Dungeon mode label; anything containing "master" is master mode (default: Catacombs)
// - `PFSTATS_FLOOR`: Floor number 1-7 (default: 7)
// - `PFSTATS_IDENTITY_URL`: Identity service base URL
// - `PFSTATS_STATS_URL`: Statistics service base URL
// - `PFSTATS_USER_AGENT`: User-Agent header sent with every request
// - `PFSTATS_LOG_LEVEL`: trace, debug, info, warn or error (default: info)
//
// ## Example
//
// ```bash
// export PFSTATS_PLAYERS=Steve,Alex
// export PFSTATS_MODE="Master Mode"
// export PFSTATS_FLOOR=7
//
// pfstats
// ```

use anyhow::Result;
use pfstats_core::{
    ContextSlot, DungeonContext, EndpointConfig, LookupCoordinator, LookupEvent, PfStatsConfig,
    QueuedExecutor,
};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Every player was looked up (failures included)
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum PfStatsExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<PfStatsExitCode> for ExitCode {
    fn from(code: PfStatsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    players: Vec<String>,
    mode: String,
    floor: i64,
    endpoints: EndpointConfig,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let mut endpoints = EndpointConfig::default();
        if let Ok(url) = env::var("PFSTATS_IDENTITY_URL") {
            endpoints.identity_url = url;
        }
        if let Ok(url) = env::var("PFSTATS_STATS_URL") {
            endpoints.stats_url = url;
        }
        if let Ok(user_agent) = env::var("PFSTATS_USER_AGENT") {
            endpoints.user_agent = user_agent;
        }

        let floor = match env::var("PFSTATS_FLOOR") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PFSTATS_FLOOR must be a number. Got: {}", raw))?,
            Err(_) => 7,
        };

        Ok(Self {
            players: env::var("PFSTATS_PLAYERS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            mode: env::var("PFSTATS_MODE").unwrap_or_else(|_| "Catacombs".to_string()),
            floor,
            endpoints,
            log_level: env::var("PFSTATS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.players.is_empty() {
            anyhow::bail!(
                "PFSTATS_PLAYERS must contain at least one player. \
                Set it via: export PFSTATS_PLAYERS=Steve,Alex"
            );
        }

        DungeonContext::from_label(&self.mode, self.floor)
            .map_err(|e| anyhow::anyhow!("PFSTATS_FLOOR: {}", e))?;

        self.endpoints.validate()?;

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "PFSTATS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    fn log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return PfStatsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return PfStatsExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level())
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return PfStatsExitCode::ConfigError.into();
    }

    info!("Looking up {} player(s)", config.players.len());

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return PfStatsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run(config).await {
            Ok(()) => PfStatsExitCode::Success,
            Err(e) => {
                error!("Lookup error: {}", e);
                PfStatsExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Look up every configured player and print their lines in order
async fn run(config: Config) -> Result<()> {
    let resolver = pfstats_http::resolver_from_config(&config.endpoints)?;
    let (executor, mut queue) = QueuedExecutor::new();

    let pfstats_config = PfStatsConfig {
        endpoints: config.endpoints.clone(),
        ..PfStatsConfig::default()
    };
    let (coordinator, events) =
        LookupCoordinator::new(Box::new(resolver), Arc::new(executor), pfstats_config)?;

    let context = DungeonContext::from_label(&config.mode, config.floor)?;
    let slot = Arc::new(ContextSlot::new());
    slot.set(context);
    coordinator.register_clear_listener(slot.clone());
    info!("Context: {:?} floor {}", context.mode(), context.floor());

    let event_log = tokio::spawn(log_events(events));

    // Each callback reports back with the index of its player
    let (line_tx, mut line_rx) = mpsc::unbounded_channel();
    for (index, player) in config.players.iter().enumerate() {
        let line_tx = line_tx.clone();
        coordinator.fetch(player, &config.mode, config.floor, move |line| {
            let _ = line_tx.send((index, line));
        });
    }
    drop(line_tx);

    for _ in 0..config.players.len() {
        if !queue.run_next().await {
            anyhow::bail!("host queue closed before every lookup completed");
        }
    }

    let mut lines = vec![None; config.players.len()];
    while let Ok((index, line)) = line_rx.try_recv() {
        lines[index] = line;
    }

    let failure_marker = coordinator.display().failure_marker.clone();
    for (player, line) in config.players.iter().zip(lines) {
        println!("{}{}", player, line.unwrap_or_else(|| failure_marker.clone()));
    }

    // End of session, the way a closing party finder screen ends one
    coordinator.clear();
    debug!("Context after clear: {:?}", slot.get());

    drop(coordinator);
    if let Err(e) = event_log.await {
        error!("Event logger failed: {}", e);
    }

    Ok(())
}

/// Log coordinator events until the coordinator is gone
async fn log_events(events: mpsc::Receiver<LookupEvent>) {
    let mut stream = ReceiverStream::new(events);
    while let Some(event) = stream.next().await {
        match event {
            LookupEvent::ResolutionFailed { player, reason } => {
                debug!(player = %player, "Lookup event: failed ({})", reason)
            }
            event => debug!("Lookup event: {:?}", event),
        }
    }
}
