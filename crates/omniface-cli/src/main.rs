use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use omniface_core::{CameraId, Mode};
use omniface_link::{CatalogClient, WsConnector};
use omniface_live::{SessionPhase, SessionRegistry, StreamSession, ViewPreferences};
use std::sync::Arc;
use std::time::Duration;

mod config;
mod report;

use config::Config;

#[derive(Parser)]
#[command(name = "omniface", about = "Omniface live recognition client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List cameras the backend can stream from
    Cameras {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Watch the live recognition stream of one camera
    Watch {
        /// Camera index
        #[arg(short, long, default_value_t = 0)]
        cam: u32,
        /// Recognition mode: normal, asistencia or salida
        #[arg(short, long, default_value = "normal")]
        mode: Mode,
        /// Stop after this many seconds (default: until Ctrl-C)
        #[arg(short, long)]
        seconds: Option<u64>,
    },
    /// Show or edit the remembered multi-camera view
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
    /// Reconnect every camera of the remembered view
    Resume {
        /// Stop after this many seconds (default: until Ctrl-C)
        #[arg(short, long)]
        seconds: Option<u64>,
    },
}

#[derive(Subcommand)]
enum PrefsAction {
    /// Print the saved view
    Show,
    /// Update the saved view
    Set {
        /// Number of camera slots (1-3)
        #[arg(long)]
        count: Option<usize>,
        #[arg(long)]
        mode: Option<Mode>,
        /// Camera per slot, comma separated (e.g. 0,2)
        #[arg(long, value_delimiter = ',')]
        cams: Vec<u32>,
        /// Slot shown in the mini preview
        #[arg(long)]
        preview: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Cameras { json } => list_cameras(&config, json).await,
        Commands::Watch { cam, mode, seconds } => {
            watch(&config, CameraId(cam), mode, seconds).await
        }
        Commands::Prefs { action } => prefs(&config, action),
        Commands::Resume { seconds } => resume(&config, seconds).await,
    }
}

fn registry(config: &Config) -> SessionRegistry {
    SessionRegistry::new(
        config.endpoint(),
        Arc::new(WsConnector),
        config.session_options(),
    )
}

async fn list_cameras(config: &Config, json: bool) -> Result<()> {
    let mut client = CatalogClient::new(config.endpoint(), config.http_timeout())?;
    if let Some(token) = omniface_link::normalize_token(config.token()) {
        client = client.with_token(token);
    }
    let cameras = client
        .list_cameras()
        .await
        .with_context(|| format!("fetching cameras from {}", config.endpoint().host()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&cameras)?);
    } else if cameras.is_empty() {
        println!("No cameras available");
    } else {
        for camera in cameras {
            println!("{}\t{}", camera.id, camera.name);
        }
    }
    Ok(())
}

/// Resolves after `seconds`, or never.
async fn deadline(seconds: Option<u64>) {
    match seconds {
        Some(s) => tokio::time::sleep(Duration::from_secs(s)).await,
        None => std::future::pending().await,
    }
}

fn is_finished(session: &StreamSession) -> bool {
    matches!(session.phase(), SessionPhase::Idle | SessionPhase::Errored)
        && !session.state().connected
}

async fn watch(config: &Config, camera: CameraId, mode: Mode, seconds: Option<u64>) -> Result<()> {
    let registry = registry(config);
    let session = registry.get_or_create(camera);
    let mut updates = session.subscribe();
    session.connect(mode, config.token());

    if session.phase() == SessionPhase::Idle {
        let err = session.state().error.unwrap_or_default();
        bail!("camera {camera}: {err}");
    }

    let stop = deadline(seconds);
    tokio::pin!(stop);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = &mut stop => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                println!("{}", report::describe(camera, session.phase(), &state));
                if is_finished(&session) {
                    break;
                }
            }
        }
    }

    let last = session.state();
    session.stop();
    match last.error {
        Some(err) if !last.connected => bail!("camera {camera}: {err}"),
        _ => Ok(()),
    }
}

fn prefs(config: &Config, action: PrefsAction) -> Result<()> {
    let path = &config.prefs_path;
    let mut prefs = ViewPreferences::load(path)
        .with_context(|| format!("loading {}", path.display()))?;

    match action {
        PrefsAction::Show => {
            print!("{}", toml::to_string_pretty(&prefs)?);
        }
        PrefsAction::Set {
            count,
            mode,
            cams,
            preview,
        } => {
            if let Some(count) = count {
                prefs.set_camera_count(count);
            }
            if let Some(mode) = mode {
                prefs.mode = mode;
            }
            for (slot, cam) in cams.into_iter().enumerate() {
                prefs.select(slot, CameraId(cam))?;
            }
            if let Some(slot) = preview {
                prefs.set_preview(slot)?;
            }
            prefs
                .save(path)
                .with_context(|| format!("saving {}", path.display()))?;
            println!(
                "Saved: {} camera(s) {:?}, mode {}",
                prefs.camera_count,
                prefs.selected_cameras().iter().map(|c| c.0).collect::<Vec<_>>(),
                prefs.mode
            );
        }
    }
    Ok(())
}

async fn resume(config: &Config, seconds: Option<u64>) -> Result<()> {
    let path = &config.prefs_path;
    let prefs = ViewPreferences::load(path)
        .with_context(|| format!("loading {}", path.display()))?;

    let registry = registry(config);
    let sessions = registry.resume(&prefs, config.token());
    if let Some(preview) = prefs.preview_camera() {
        tracing::info!(camera = %preview, "preview camera");
    }

    let stop = deadline(seconds);
    tokio::pin!(stop);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut tick = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = &mut stop => break,
            _ = tick.tick() => {
                for session in &sessions {
                    println!(
                        "{}",
                        report::describe(session.camera(), session.phase(), &session.state())
                    );
                }
                if sessions.iter().all(is_finished) {
                    break;
                }
            }
        }
    }

    registry.stop_all();
    Ok(())
}
