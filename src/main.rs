//! Mediapick CLI application entry point
//!
//! Drives a media selection session from a script of steps, with stand-in
//! collaborators for the gallery, camera and cropper.
//!
//! # Usage
//!
//! ```bash
//! # Pick two items, crop the second and confirm
//! mediapick run pick:a.jpg,b.jpg crop:2 confirm
//!
//! # Limit the selection and pre-select an item
//! mediapick run -t 3 -p seed.jpg check:a.jpg capture confirm
//!
//! # Leave the camera open, save the session, finish it later
//! mediapick run --name trip check:a.jpg open-capture suspend
//! mediapick run --resume trip captured:cam.jpg confirm
//!
//! # Machine-readable output
//! mediapick --json run pick:a.jpg confirm
//! ```
//!
//! # Configuration
//!
//! Defaults are read from `~/.config/mediapick/config.toml` on Linux (see
//! `mediapick settings path`) and `MEDIAPICK_*` environment variables.
//! Suspended sessions are kept in the data directory unless `state_dir` is set.

use mediapick::{
    MediapickError,
    cli::{Cli, Commands},
    commands,
    config::PickerSettings,
    logging,
    output::{BufferedWriter, OutputWriter, StdoutWriter},
    session::SessionStore,
};
use std::time::Duration;
use tracing::error;

type Result<T> = std::result::Result<T, MediapickError>;

/// How long to wait for another mediapick process to release the store
const STORE_LOCK_TIMEOUT: Duration = Duration::from_secs(2);

fn main() {
    let cli = Cli::parse_args();
    logging::init_logging(cli.verbose);

    if let Err(err) = run(&cli) {
        error!(target = "mediapick", error = %err, "command failed");
        StdoutWriter::new().error(&err.to_string());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let settings = PickerSettings::load()?;

    // A JSON run prints one document at the end; its messages are discarded.
    let stdout = StdoutWriter::quiet(cli.quiet);
    let buffered = BufferedWriter::new();
    let output: &dyn OutputWriter = if cli.json { &buffered } else { &stdout };

    match &cli.command {
        Commands::Run(args) => {
            let store = open_store(&settings)?;
            let summary = commands::run(args, &settings, &store, output, cli.quiet)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        }
        Commands::Settings { command } => {
            commands::settings(command, &settings, &stdout, cli.json)?;
        }
        Commands::Sessions { command } => {
            let store = open_store(&settings)?;
            commands::sessions(&store, command, &stdout, cli.quiet, cli.json)?;
        }
    }

    Ok(())
}

fn open_store(settings: &PickerSettings) -> Result<SessionStore> {
    let dir = settings.state_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(SessionStore::reopen(&dir, STORE_LOCK_TIMEOUT)?)
}
