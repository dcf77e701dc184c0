use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mediaplayer_core::engine::select_platform;
use mediaplayer_core::{
    logging, DefaultFullScreenStrategy, EngineFactory, EventListenerAdapter, FactoryConfig,
    HostTraits, PlayerEvent, PlayerId, StubEngine,
};
use serde::Serialize;
use tokio_stream::StreamExt;

#[derive(Parser, Debug)]
#[command(
    name = "mediaplayer_cli",
    about = "Inspect host detection and drive a player on the bundled engine"
)]
struct Cli {
    /// Factory configuration file (JSON); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log engine and player activity to stderr
    #[arg(long, short)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the detected host and the player variant it maps to
    Probe,
    /// Play a media item on the bundled engine and print its events as JSON lines
    Demo {
        #[arg(long, default_value = "file:///demo/clip.mp4")]
        mrl: String,
        /// Simulated media length
        #[arg(long, default_value_t = 3_000)]
        length_ms: i64,
        /// Time updates emitted over the run
        #[arg(long, default_value_t = 3)]
        ticks: u32,
        /// Delay between time updates
        #[arg(long, default_value_t = 50)]
        tick_ms: u64,
        /// Give up if the run has not finished after this long
        #[arg(long, default_value_t = 10_000)]
        timeout_ms: u64,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    if cli.verbose {
        logging::init_logging();
    }
    let config = cli
        .config
        .map(FactoryConfig::load_from_file)
        .unwrap_or_default();

    match cli.command {
        Commands::Probe => run_probe(),
        Commands::Demo {
            mrl,
            length_ms,
            ticks,
            tick_ms,
            timeout_ms,
        } => run_demo(
            &config,
            &mrl,
            length_ms,
            ticks,
            Duration::from_millis(tick_ms),
            Duration::from_millis(timeout_ms),
        ),
    }
}

fn run_probe() -> Result<ExitCode> {
    let host = HostTraits::current();
    let report = ProbeReport {
        os: host.os,
        unix_like: host.unix_like,
        windows_like: host.windows_like,
        mac_like: host.mac_like,
        variant: select_platform(host).map(|p| p.as_str()),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.variant.is_none() {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::from(0))
}

fn run_demo(
    config: &FactoryConfig,
    mrl: &str,
    length_ms: i64,
    ticks: u32,
    tick_interval: Duration,
    timeout: Duration,
) -> Result<ExitCode> {
    let engine = Arc::new(StubEngine::new().with_playback(length_ms, ticks, tick_interval));
    let factory = EngineFactory::from_config(engine.clone(), config)
        .context("starting the bundled engine")?;
    let player = factory
        .new_player(Arc::new(DefaultFullScreenStrategy::new()))
        .context("creating a player for this host")?;

    player.add_listener(Arc::new(EventListenerAdapter::new().on_finished(|id| {
        log::info!("[mediaplayer_cli] {} finished", id);
    })))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("building the event runtime")?;

    let id = player.id();
    let mut events = player.event_stream()?;
    if !player.play_media(mrl)? {
        bail!("engine refused to open {}", mrl);
    }

    let finished = runtime.block_on(async {
        let watch = async {
            while let Some(item) = events.next().await {
                match item {
                    Ok(event) => {
                        print_event(id, &event)?;
                        if event == PlayerEvent::Finished {
                            return Ok::<bool, anyhow::Error>(true);
                        }
                    }
                    Err(lagged) => log::warn!("[mediaplayer_cli] {}", lagged),
                }
            }
            Ok(false)
        };
        match tokio::time::timeout(timeout, watch).await {
            Ok(result) => result,
            Err(_) => Ok(false),
        }
    })?;

    player.release();
    factory.release();
    engine.wait_idle();

    if finished {
        Ok(ExitCode::from(0))
    } else {
        eprintln!("playback did not finish within {:?}", timeout);
        Ok(ExitCode::from(2))
    }
}

fn print_event(player: PlayerId, event: &PlayerEvent) -> Result<()> {
    let line = EventLine {
        player: player.0,
        event,
    };
    println!("{}", serde_json::to_string(&line)?);
    Ok(())
}

#[derive(Serialize)]
struct ProbeReport {
    os: &'static str,
    unix_like: bool,
    windows_like: bool,
    mac_like: bool,
    variant: Option<&'static str>,
}

#[derive(Serialize)]
struct EventLine<'a> {
    player: u64,
    event: &'a PlayerEvent,
}
