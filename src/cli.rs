//! Command-line interface definitions and parsing
//!
//! The binary drives a selection session from a script of steps, standing in
//! for a UI: each step is one intent the presentation layer would send.
//!
//! # Commands
//!
//! - **run**: start (or resume) a session and play a script of steps
//! - **settings**: show, locate or initialise the settings file
//! - **sessions**: list or drop suspended sessions
//!
//! # Steps
//!
//! | Step               | Intent                                            |
//! |--------------------|---------------------------------------------------|
//! | `pick:a.jpg,b.gif` | merge a picking pass                              |
//! | `check:a.jpg`      | select one item                                   |
//! | `uncheck:a.jpg`    | deselect one item                                 |
//! | `folder:1`         | show folder 1 in the grid (0 is all media)        |
//! | `capture`          | take a photo with the stand-in camera             |
//! | `cancel-capture`   | open the camera and back out                      |
//! | `open-capture`     | open the camera and leave it pending              |
//! | `captured:x.jpg`   | finish a pending capture with `x.jpg`             |
//! | `crop:2`           | crop the 2nd selected item                        |
//! | `cancel-crop:2`    | open the cropper on the 2nd item and back out     |
//! | `open-crop:2`      | open the cropper and leave it pending             |
//! | `cropped:x.jpg`    | finish a pending crop with `x.jpg`                |
//! | `preview`          | preview the selection and keep it                 |
//! | `preview:3`        | preview the grid from its 3rd item                |
//! | `cancel-preview`   | open the preview and back out                     |
//! | `open-preview[:3]` | open the preview and leave it pending             |
//! | `previewed:a,b`    | finish a pending preview with `a,b` selected      |
//! | `preview-confirm:a`| finish a pending preview and confirm              |
//! | `back`             | cancel the pending sub-flow, or abort             |
//! | `confirm`          | finish with the selection                         |
//! | `abort`            | finish with no selection                          |
//! | `suspend`          | save the session and stop                         |
//!
//! # Examples
//!
//! ```
//! use clap::Parser;
//! use mediapick::cli::{Cli, Commands, Step};
//!
//! let cli = Cli::parse_from(["mediapick", "run", "--threshold", "2", "check:a.jpg", "confirm"]);
//! match cli.command {
//!     Commands::Run(args) => {
//!         assert_eq!(args.threshold, Some(2));
//!         assert_eq!(args.steps.last(), Some(&Step::Confirm));
//!     }
//!     _ => unreachable!(),
//! }
//! ```

use crate::config::PickerOverrides;
use clap::{Args, Parser, Subcommand};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing a script step
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("Unknown step: {0}")]
    UnknownStep(String),

    #[error("Step '{step}' needs a value, e.g. {example}")]
    MissingValue {
        step: &'static str,
        example: &'static str,
    },

    #[error("Step '{step}' does not take a value")]
    UnexpectedValue { step: &'static str },

    #[error("Invalid position '{0}': positions start at 1")]
    InvalidPosition(String),

    #[error("Invalid folder '{0}': expected a number, 0 for all media")]
    InvalidFolder(String),
}

/// One scripted intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Pick(Vec<String>),
    Check(String),
    Uncheck(String),
    /// Folder index; 0 is all media
    Folder(usize),
    Capture,
    CancelCapture,
    OpenCapture,
    Captured(String),
    /// 1-based position in the selection
    Crop(usize),
    CancelCrop(usize),
    OpenCrop(usize),
    Cropped(String),
    /// Preview the selection, or the grid from a 1-based position
    Preview(Option<usize>),
    CancelPreview,
    OpenPreview(Option<usize>),
    /// Finish a pending preview with these items selected
    Previewed(Vec<String>),
    PreviewConfirmed(Vec<String>),
    Back,
    Confirm,
    Abort,
    Suspend,
}

impl Step {
    /// Whether the script stops after this step
    #[must_use]
    pub const fn ends_script(&self) -> bool {
        matches!(self, Self::Suspend)
    }
}

impl FromStr for Step {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = match s.split_once(':') {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (s.trim(), None),
        };

        match name {
            "pick" => required(value, "pick", "pick:a.jpg,b.jpg").map(|v| Self::Pick(list(v))),
            "check" => required(value, "check", "check:a.jpg").map(|v| Self::Check(v.into())),
            "uncheck" => {
                required(value, "uncheck", "uncheck:a.jpg").map(|v| Self::Uncheck(v.into()))
            }
            "captured" => {
                required(value, "captured", "captured:cam.jpg").map(|v| Self::Captured(v.into()))
            }
            "cropped" => {
                required(value, "cropped", "cropped:a_crop.jpg").map(|v| Self::Cropped(v.into()))
            }
            "folder" => {
                let value = required(value, "folder", "folder:1")?;
                value
                    .parse()
                    .map(Self::Folder)
                    .map_err(|_| ScriptError::InvalidFolder(value.to_string()))
            }
            "preview" => optional_position(value, "preview").map(Self::Preview),
            "open-preview" => optional_position(value, "open-preview").map(Self::OpenPreview),
            "cancel-preview" => bare(value, "cancel-preview", Self::CancelPreview),
            "previewed" => Ok(Self::Previewed(value.map(list).unwrap_or_default())),
            "preview-confirm" => Ok(Self::PreviewConfirmed(value.map(list).unwrap_or_default())),
            "crop" => position(value, "crop").map(Self::Crop),
            "cancel-crop" => position(value, "cancel-crop").map(Self::CancelCrop),
            "open-crop" => position(value, "open-crop").map(Self::OpenCrop),
            "capture" => bare(value, "capture", Self::Capture),
            "cancel-capture" => bare(value, "cancel-capture", Self::CancelCapture),
            "open-capture" => bare(value, "open-capture", Self::OpenCapture),
            "back" => bare(value, "back", Self::Back),
            "confirm" => bare(value, "confirm", Self::Confirm),
            "abort" => bare(value, "abort", Self::Abort),
            "suspend" => bare(value, "suspend", Self::Suspend),
            _ => Err(ScriptError::UnknownStep(s.to_string())),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pick(items) => write!(f, "pick:{}", items.join(",")),
            Self::Check(item) => write!(f, "check:{item}"),
            Self::Uncheck(item) => write!(f, "uncheck:{item}"),
            Self::Folder(n) => write!(f, "folder:{n}"),
            Self::Capture => f.write_str("capture"),
            Self::CancelCapture => f.write_str("cancel-capture"),
            Self::OpenCapture => f.write_str("open-capture"),
            Self::Captured(item) => write!(f, "captured:{item}"),
            Self::Crop(n) => write!(f, "crop:{n}"),
            Self::CancelCrop(n) => write!(f, "cancel-crop:{n}"),
            Self::OpenCrop(n) => write!(f, "open-crop:{n}"),
            Self::Cropped(item) => write!(f, "cropped:{item}"),
            Self::Preview(None) => f.write_str("preview"),
            Self::Preview(Some(n)) => write!(f, "preview:{n}"),
            Self::CancelPreview => f.write_str("cancel-preview"),
            Self::OpenPreview(None) => f.write_str("open-preview"),
            Self::OpenPreview(Some(n)) => write!(f, "open-preview:{n}"),
            Self::Previewed(items) => write!(f, "previewed:{}", items.join(",")),
            Self::PreviewConfirmed(items) => write!(f, "preview-confirm:{}", items.join(",")),
            Self::Back => f.write_str("back"),
            Self::Confirm => f.write_str("confirm"),
            Self::Abort => f.write_str("abort"),
            Self::Suspend => f.write_str("suspend"),
        }
    }
}

fn required<'a>(
    value: Option<&'a str>,
    step: &'static str,
    example: &'static str,
) -> Result<&'a str, ScriptError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ScriptError::MissingValue { step, example }),
    }
}

fn list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect()
}

fn bare(value: Option<&str>, step: &'static str, parsed: Step) -> Result<Step, ScriptError> {
    match value {
        None => Ok(parsed),
        Some(_) => Err(ScriptError::UnexpectedValue { step }),
    }
}

fn position(value: Option<&str>, step: &'static str) -> Result<usize, ScriptError> {
    let value = required(value, step, "crop:1")?;
    match value.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(ScriptError::InvalidPosition(value.to_string())),
    }
}

fn optional_position(value: Option<&str>, step: &'static str) -> Result<Option<usize>, ScriptError> {
    match value {
        None => Ok(None),
        Some(_) => position(value, step).map(Some),
    }
}

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "mediapick")]
#[command(about = "Pick, capture and crop media into one ordered selection", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long = "json", global = true)]
    pub json: bool,
}

impl Cli {
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a scripted selection session
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Manage the settings file
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// Manage suspended sessions
    Sessions {
        #[command(subcommand)]
        command: SessionsCommands,
    },
}

/// Arguments for `run`
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Steps to play, in order
    #[arg(value_name = "STEP")]
    pub steps: Vec<Step>,

    /// Maximum number of items (overrides settings)
    #[arg(short = 't', long = "threshold", value_name = "N")]
    pub threshold: Option<usize>,

    /// Grid columns (overrides settings)
    #[arg(long = "span-count", value_name = "N")]
    pub span_count: Option<usize>,

    /// Allow GIFs (overrides settings)
    #[arg(long = "gif", overrides_with = "no_gif")]
    pub gif: bool,

    #[arg(long = "no-gif", hide = true)]
    pub no_gif: bool,

    /// Allow videos (overrides settings)
    #[arg(long = "video", overrides_with = "no_video")]
    pub video: bool,

    #[arg(long = "no-video", hide = true)]
    pub no_video: bool,

    /// Disable the camera for this run
    #[arg(long = "no-capture")]
    pub no_capture: bool,

    /// Disable cropping for this run
    #[arg(long = "no-crop")]
    pub no_crop: bool,

    /// Items selected before the session starts
    #[arg(short = 'p', long = "picked", value_name = "LOCATOR", value_delimiter = ',')]
    pub picked: Vec<String>,

    /// Items shown in the grid
    #[arg(short = 'l', long = "library", value_name = "LOCATOR", value_delimiter = ',')]
    pub library: Vec<String>,

    /// Resume a suspended session instead of starting a new one
    #[arg(long = "resume", value_name = "NAME", conflicts_with_all = ["threshold", "picked"])]
    pub resume: Option<String>,

    /// Name to save under when the script suspends
    #[arg(long = "name", value_name = "NAME", default_value = "default")]
    pub name: String,
}

impl RunArgs {
    /// Overrides to apply on top of the settings-derived config
    ///
    /// Only flags that were given produce an override. Capture and crop can
    /// only be switched off here; their parameters come from settings.
    #[must_use]
    pub fn overrides(&self) -> PickerOverrides {
        PickerOverrides {
            threshold: self.threshold,
            span_count: self.span_count,
            pick_gif: flag(self.gif, self.no_gif),
            pick_video: flag(self.video, self.no_video),
            capture: self.no_capture.then_some(None),
            crop: self.no_crop.then_some(None),
            ..PickerOverrides::default()
        }
    }
}

const fn flag(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

/// Settings subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommands {
    /// Print the effective settings
    Show,
    /// Print the settings file location
    Path,
    /// Write a settings file with defaults
    Init {
        /// Overwrite an existing file
        #[arg(short = 'f', long = "force")]
        force: bool,
    },
}

/// Sessions subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SessionsCommands {
    /// List suspended sessions
    #[command(visible_alias = "ls")]
    List,
    /// Drop a suspended session
    #[command(visible_alias = "rm")]
    Drop {
        #[arg(value_name = "NAME")]
        name: String,
    },
}
