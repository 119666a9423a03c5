use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use eventfinder_cli::commands::geocode::{handle_geocode, handle_reverse, GeocodeArgs, ReverseArgs};
use eventfinder_cli::commands::history::{handle_history, HistoryCommand};
use eventfinder_cli::commands::index::{handle_index, IndexArgs};
use eventfinder_cli::commands::locate::{handle_locate, LocateArgs};
use eventfinder_cli::commands::map::{handle_map, MapArgs};
use eventfinder_cli::commands::route::{handle_route, RouteArgs};
use eventfinder_cli::commands::search::{handle_search, SearchArgs};
use eventfinder_cli::commands::suggest::{handle_suggest, SuggestCommand};
use eventfinder_cli::commands::CommandContext;
use eventfinder_cli::logging::{init_logging, LoggingConfig};
use eventfinder_cli::output::OutputFormat;
use eventfinder_lib::AppConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Find events: search, places, directions and CMS indexing")]
struct Cli {
    /// Output format for command results.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Override the directory holding the location history.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search events by keyword, location, date and type.
    Search(SearchArgs),
    /// Autocomplete suggestions for the keyword or location box.
    Suggest {
        #[command(subcommand)]
        kind: SuggestCommand,
    },
    /// Resolve a place name to coordinates.
    Geocode(GeocodeArgs),
    /// Describe a position as a place name.
    Reverse(ReverseArgs),
    /// Resolve the current position into a place label.
    Locate(LocateArgs),
    /// Driving directions to a position in the United Kingdom.
    Route(RouteArgs),
    /// Cluster search results for the map and optionally select a marker.
    Map(MapArgs),
    /// Manage saved locations.
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },
    /// Publish CMS events to the search index.
    Index(IndexArgs),
}

fn main() -> Result<()> {
    init_logging(&LoggingConfig::from_env());
    let cli = Cli::parse();

    let app = AppConfig::from_env().context("failed to read settings")?;
    let ctx = CommandContext {
        format: cli.format,
        data_dir: cli.data_dir.or(app.data_dir),
        origin: app.origin,
    };

    match &cli.command {
        Command::Search(args) => handle_search(&ctx, args),
        Command::Suggest { kind } => handle_suggest(&ctx, kind),
        Command::Geocode(args) => handle_geocode(&ctx, args),
        Command::Reverse(args) => handle_reverse(&ctx, args),
        Command::Locate(args) => handle_locate(&ctx, args),
        Command::Route(args) => handle_route(&ctx, args),
        Command::Map(args) => handle_map(&ctx, args),
        Command::History { action } => handle_history(&ctx, action),
        Command::Index(args) => handle_index(&ctx, args),
    }
}
