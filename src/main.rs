use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::sync::oneshot;

use gmusic_rs::{ClientConfig, Credentials, Dispatcher, FixtureRemote, Session, Track, logging};

#[derive(Parser)]
#[command(name = "gmusic-rs", about = "Browse a music library through the cached client")]
struct Cli {
    /// JSON document describing the remote library
    #[arg(long)]
    fixture: PathBuf,

    #[arg(long, env = "GMUSIC_EMAIL")]
    email: String,

    #[arg(long, env = "GMUSIC_PASSWORD")]
    password: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every track in the library
    Library,
    /// List playlists and their tracks
    Playlists,
    /// Search tracks and artists
    Search { query: String },
    /// Create a station seeded from a library track
    Station { track_id: String },
    /// Resolve the stream URL of a library track
    StreamUrl { track_id: String },
    /// Add the first search hit that is not yet in the library
    Add { query: String },
    /// Remove a track from the library
    Remove { track_id: String },
}

type Reply<T> = Box<dyn FnOnce(gmusic_rs::Result<T>, ()) + Send>;

/// Start an async session call and wait for its callback.
async fn call<T: Send + 'static>(start: impl FnOnce(Reply<T>)) -> Result<T> {
    let (tx, rx) = oneshot::channel();
    start(Box::new(move |result, ()| {
        let _ = tx.send(result);
    }));
    Ok(rx.await.context("callback was never invoked")??)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;

    let _log_guard = match logging::init_logging(&config.log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("=== gmusic-rs starting ===");

    let remote = Arc::new(FixtureRemote::from_path(&cli.fixture)?);
    let session = Session::new(remote, config.clone(), Dispatcher::current()?);

    let _auth_subscription = session
        .events()
        .auth_state_changed
        .subscribe(|authenticated| tracing::info!(authenticated, "Auth state observed"));

    let credentials = Credentials {
        email: cli.email,
        password: cli.password,
        device_id: config.device_id.clone(),
    };
    let logged_in = call(|reply| session.login_async(credentials, reply, ())).await?;
    if !logged_in {
        bail!("login rejected by the remote service");
    }

    let result = run(&session, cli.command).await;
    if let Err(e) = &result {
        tracing::error!(error = ?e, "Command failed");
    }

    tracing::info!("gmusic-rs shutting down");
    result
}

async fn run(session: &Arc<Session>, command: Command) -> Result<()> {
    match command {
        Command::Library => {
            let tracks = call(|reply| session.get_all_tracks_async(reply, ())).await?;
            for (index, track) in tracks.iter().enumerate() {
                println!("{:>4}. {} [{}]", index + 1, track, format_duration(track.duration_ms));
            }
        }
        Command::Playlists => {
            let playlists = call(|reply| session.get_all_user_playlist_contents_async(reply, ())).await?;
            for playlist in playlists.iter() {
                println!("{} ({} tracks)", playlist.name, playlist.tracks.len());
                for track in &playlist.tracks {
                    println!("    {}", track);
                }
                for track_id in playlist.unresolved() {
                    println!("    ! unresolved entry {}", track_id);
                }
            }
        }
        Command::Search { query } => {
            let results = call(|reply| session.search_async(query, reply, ())).await?;
            println!("Tracks:");
            for track in results.get_tracks() {
                println!("    {}", track);
            }
            println!("Artists:");
            for artist in results.get_artists() {
                println!("    {} ({})", artist.name, artist.id());
            }
        }
        Command::Station { track_id } => {
            let track = library_track(session, &track_id).await?;
            let station = call(|reply| session.create_station_async(track, reply, ())).await?;
            println!("Station {}", station.id());
            for track in station.get_tracks()? {
                println!("    {}", track);
            }
        }
        Command::StreamUrl { track_id } => {
            let track = library_track(session, &track_id).await?;
            let (tx, rx) = oneshot::channel();
            session.get_track_stream_url_async(track, move |result, track| {
                let _ = tx.send((result, track));
            });
            let (url, track) = rx.await.context("callback was never invoked")?;
            println!("{} -> {}", track, url?);
        }
        Command::Add { query } => {
            call(|reply| session.get_all_tracks_async(reply, ())).await?;
            let results = call(|reply| session.search_async(query, reply, ())).await?;
            let Some(track) = results
                .get_tracks()
                .iter()
                .find(|track| !session.is_in_my_library(track))
                .cloned()
            else {
                bail!("no search hit outside the library");
            };
            let changed = call(|reply| session.add_to_my_library_async(track.clone(), reply, ())).await?;
            println!("{} {}", if changed { "Added" } else { "Unchanged:" }, track);
        }
        Command::Remove { track_id } => {
            let track = library_track(session, &track_id).await?;
            let changed = call(|reply| session.remove_from_my_library_async(track.clone(), reply, ())).await?;
            println!("{} {}", if changed { "Removed" } else { "Unchanged:" }, track);
        }
    }
    Ok(())
}

async fn library_track(session: &Arc<Session>, track_id: &str) -> Result<Track> {
    call(|reply| session.get_all_tracks_async(reply, ())).await?;
    session
        .get_track_by_id(track_id)
        .with_context(|| format!("track {} is not in the library", track_id))
}

fn format_duration(millis: u64) -> String {
    let seconds = millis / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
