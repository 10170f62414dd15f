use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use ranges::{
    Edge, PlaybackClock, PlaybackHost, RangeId, RangesConfig, RangesSession, TrackGeometry,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "ranges-cli")]
#[command(about = "Headless driver for the range registry and collision engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON config with a media duration and range descriptors
    #[arg(short, long, global = true, default_value = "ranges.json")]
    config: PathBuf,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the validated registry
    Show,

    /// Resolve and commit a whole-range move
    MoveBody {
        /// Range index in config order
        #[arg(short, long)]
        range: usize,

        /// Proposed start position in seconds
        #[arg(long)]
        to: f64,
    },

    /// Resolve and commit a single-edge move
    MoveEdge {
        /// Range index in config order
        #[arg(short, long)]
        range: usize,

        /// Which edge to move
        #[arg(long, value_enum)]
        edge: EdgeArg,

        /// Proposed edge position in seconds
        #[arg(long)]
        to: f64,
    },

    /// Seek to the next range after a playback position
    Next {
        /// Playback position in seconds
        #[arg(long)]
        at: f64,
    },

    /// Seek to the previous range before a playback position
    Prev {
        /// Playback position in seconds
        #[arg(long)]
        at: f64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum EdgeArg {
    Start,
    End,
}

impl From<EdgeArg> for Edge {
    fn from(edge: EdgeArg) -> Self {
        match edge {
            EdgeArg::Start => Edge::Start,
            EdgeArg::End => Edge::End,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let raw = std::fs::read_to_string(&cli.config)
        .with_context(|| format!("read config {:?}", cli.config))?;
    let config = RangesConfig::from_json(&raw).context("parse config")?;
    let duration = config.duration.unwrap_or(f64::NAN);

    // the track geometry is irrelevant headlessly; moves are given in seconds
    let track = TrackGeometry::new(0.0, 1000.0, 0.0);
    let (mut session, _events) =
        RangesSession::with_config(PlaybackClock::new(duration), track, &config);
    info!(ranges = session.registry().len(), duration, "registry loaded");

    match cli.command {
        Commands::Show => show_command(&session),
        Commands::MoveBody { range, to } => {
            let id = range_at(&session, range)?;
            let span = session.move_body_to(id, to)?;
            println!("{id}  ->  {:.3}..{:.3}", span.start, span.end);
            Ok(())
        }
        Commands::MoveEdge { range, edge, to } => {
            let id = range_at(&session, range)?;
            let corrected = session.move_edge_to(id, edge.into(), to)?;
            let span = session
                .registry()
                .get(&id)
                .map(|r| r.span)
                .context("range vanished after move")?;
            println!(
                "{id}  ->  {:.3}..{:.3} (edge settled at {corrected:.3})",
                span.start, span.end
            );
            Ok(())
        }
        Commands::Next { at } => {
            session.player_mut().seek(at);
            match session.next() {
                Some(id) => print_landing(&session, id),
                None => println!("no range after {at:.3}s"),
            }
            Ok(())
        }
        Commands::Prev { at } => {
            session.player_mut().seek(at);
            match session.previous() {
                Some(id) => print_landing(&session, id),
                None => println!("no range before {at:.3}s"),
            }
            Ok(())
        }
    }
}

fn show_command(session: &RangesSession<PlaybackClock>) -> Result<()> {
    if session.registry().is_empty() {
        println!("registry is empty");
        return Ok(());
    }
    for (idx, range) in session.ranges().enumerate() {
        println!(
            "[{idx}] {:>8.3}..{:<8.3}  {}  {}{}",
            range.span.start,
            range.span.end,
            range.id,
            range.name,
            if range.editable { " (editable)" } else { "" },
        );
    }
    Ok(())
}

fn range_at(session: &RangesSession<PlaybackClock>, index: usize) -> Result<RangeId> {
    session
        .registry()
        .ids()
        .get(index)
        .copied()
        .with_context(|| format!("no range at index {index}"))
}

fn print_landing(session: &RangesSession<PlaybackClock>, id: RangeId) {
    let name = session
        .registry()
        .get(&id)
        .map(|r| r.name.clone())
        .unwrap_or_default();
    println!(
        "{id}  {name}  (seeked to {:.3}s)",
        session.player().current_time()
    );
}
