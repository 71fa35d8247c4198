use std::ffi::OsString;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use thiserror::Error;

use podtrace_render::DEFAULT_MESSAGE_WIDTH;

/// Smallest message column that still leaves room for the ellipsis
const MIN_MESSAGE_WIDTH: usize = 4;

/// Podtrace - render a per-pod timeline from kubelet structured logs read on stdin
#[derive(Parser, Debug)]
#[command(name = "podtrace")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The pod to analyze the logs for (prefix of the pod name)
    #[arg(long)]
    pub pod: Option<String>,

    /// Stop log analyzing after seeing a deletion of the pod
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub stop_after_deletion: Option<bool>,

    /// When to color the DIFF and SYSTEM columns
    #[arg(long, value_enum)]
    pub color: Option<ColorMode>,

    /// Maximum width of the MESSAGE column
    #[arg(long, value_name = "CHARS")]
    pub message_width: Option<usize>,

    /// TOML file providing defaults for the options above
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Long options also accepted with a single dash, as in `-pod nginx`
const SINGLE_DASH_LONG: [&str; 6] = [
    "pod",
    "stop-after-deletion",
    "color",
    "message-width",
    "config",
    "verbose",
];

/// Rewrite single-dash long options to their `--` form so Go-style flag
/// syntax keeps working. Arguments after a bare `--` are left alone.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut options_done = false;
    args.into_iter()
        .map(|arg| {
            let arg = arg.into();
            if options_done {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                options_done = true;
                return arg;
            }
            match text.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') => {
                    let name = rest.split_once('=').map_or(rest, |(name, _)| name);
                    if SINGLE_DASH_LONG.contains(&name) {
                        OsString::from(format!("-{text}"))
                    } else {
                        arg
                    }
                }
                _ => arg,
            }
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Color only when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn enabled(self) -> bool {
        match self {
            Self::Auto => std::io::stdout().is_terminal(),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

/// Contents of the optional config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub pod: Option<String>,
    pub stop_after_deletion: Option<bool>,
    pub color: Option<ColorMode>,
    pub message_width: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Effective settings after merging the config file and the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub pod: String,
    pub stop_after_deletion: bool,
    pub color: ColorMode,
    pub message_width: usize,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("No pod provided")]
    MissingPod,

    #[error("Message width must be at least 4, got {0}")]
    MessageWidth(usize),
}

pub fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    merge(cli, file)
}

/// Apply CLI overrides on top of the file config and validate the result
fn merge(cli: &Cli, file: FileConfig) -> Result<Config, ConfigError> {
    let pod = cli
        .pod
        .clone()
        .or(file.pod)
        .filter(|pod| !pod.is_empty())
        .ok_or(ConfigError::MissingPod)?;

    let message_width = cli
        .message_width
        .or(file.message_width)
        .unwrap_or(DEFAULT_MESSAGE_WIDTH);
    if message_width < MIN_MESSAGE_WIDTH {
        return Err(ConfigError::MessageWidth(message_width));
    }

    Ok(Config {
        pod,
        stop_after_deletion: cli
            .stop_after_deletion
            .or(file.stop_after_deletion)
            .unwrap_or(false),
        color: cli.color.or(file.color).unwrap_or_default(),
        message_width,
    })
}
