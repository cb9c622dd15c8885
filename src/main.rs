//! Command-line front end for the artist search.
//!
//! ```text
//! artist-search daft punk           one-shot search
//! artist-search --interactive       one search per line read from stdin
//! artist-search --json radiohead    tracks as JSON on stdout
//! ```
//!
//! Progress and error messages go to stderr; results go to stdout.

use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use artist_search::config::{load_or_default, validation::validate_config, ConfigError};
use artist_search::{ArtistSearch, SearchError, TrackRecord};

#[derive(Parser)]
#[command(name = "artist-search")]
#[command(about = "Search an artist's top tracks on the music catalog", long_about = None)]
struct Cli {
    /// Artist name; multiple words are joined with spaces
    #[arg(required_unless_present = "interactive")]
    query: Vec<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read one query per line from stdin
    #[arg(short, long)]
    interactive: bool,

    /// Number of top tracks to request
    #[arg(short, long)]
    limit: Option<u32>,

    /// Print tracks as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut config = load_or_default(cli.config.as_deref())?;
    if let Some(limit) = cli.limit {
        config.api.track_limit = limit;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    artist_search::observability::logging::init(&config.observability)?;

    tracing::debug!(
        base_url = %config.api.base_url,
        track_limit = config.api.track_limit,
        request_timeout_ms = config.timeouts.request_ms,
        "Configuration loaded"
    );

    let mut search = ArtistSearch::new(&config)?;

    if cli.interactive {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        prompt();
        while let Some(line) = lines.next_line().await? {
            if !line.trim().is_empty() {
                run_search(&mut search, &line, cli.json).await?;
            }
            prompt();
        }
        return Ok(());
    }

    let query = cli.query.join(" ");
    if !run_search(&mut search, &query, cli.json).await? {
        std::process::exit(1);
    }
    Ok(())
}

/// Run one search and render its outcome. Returns false if it failed.
async fn run_search(search: &mut ArtistSearch, query: &str, json: bool) -> Result<bool, Box<dyn Error>> {
    eprintln!("Loading...");

    match search.execute(query).await {
        Ok(tracks) => {
            render_tracks(&tracks, json)?;
            Ok(true)
        }
        Err(e) => {
            tracing::debug!(error = %e, kind = e.kind(), "Search failed");
            eprintln!("{}", error_message(&e));
            Ok(false)
        }
    }
}

fn render_tracks(tracks: &[TrackRecord], json: bool) -> Result<(), Box<dyn Error>> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(tracks)?)?;
        return Ok(());
    }

    if tracks.is_empty() {
        writeln!(out, "No results found.")?;
        return Ok(());
    }

    for (i, track) in tracks.iter().enumerate() {
        writeln!(out, "{:>3}. {} - {}", i + 1, track.title, track.artist.name)?;
        writeln!(out, "     cover:   {}", track.album.cover_medium)?;
        if track.preview.is_empty() {
            writeln!(out, "     preview: (none)")?;
        } else {
            writeln!(out, "     preview: {}", track.preview)?;
        }
    }
    Ok(())
}

fn error_message(err: &SearchError) -> String {
    match err {
        SearchError::CircuitOpen { remaining_secs } => format!(
            "The music service is temporarily unavailable. Try again in {} seconds.",
            remaining_secs
        ),
        SearchError::NotFound(query) => format!("No artist found for \"{}\".", query),
        SearchError::Timeout(_) => "The music service took too long to answer.".to_string(),
        SearchError::Connection(_) => "Could not reach the music service.".to_string(),
        SearchError::RemoteApi { message, .. } => {
            format!("The music service returned an error: {}", message)
        }
        SearchError::InvalidQuery(_) => "Type an artist name to search.".to_string(),
    }
}

fn prompt() {
    eprint!("> ");
    let _ = std::io::stderr().flush();
}
