use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "dubdesk")]
#[command(version)]
#[command(about = "Submit videos for dubbing and track their processing status")]
#[command(propagate_version = true)]
pub struct Args {
    /// Use a built-in demo backend instead of the HTTP API
    #[arg(long, global = true)]
    pub offline: bool,

    /// Backend base URL (overrides DUBDESK_API_BASE_URL)
    #[arg(long, global = true)]
    pub api_base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch and show the job list
    List {
        #[arg(long, value_enum, default_value = "table")]
        output: OutputFormat,
    },

    /// Show one job in detail
    Show {
        /// Job ID
        id: String,

        #[arg(long, value_enum, default_value = "table")]
        output: OutputFormat,
    },

    /// Upload a video and create a new job
    Submit(SubmitArgs),

    /// Keep the job list on screen and refresh it periodically
    Watch {
        /// Refresh interval in seconds (defaults to DUBDESK_POLL_INTERVAL_SECS)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Show or change the color theme
    Theme {
        #[arg(value_enum)]
        action: Option<ThemeAction>,
    },

    /// Refresh once and print client-side metrics
    Stats,
}

#[derive(Parser, Debug)]
pub struct SubmitArgs {
    /// Job title
    #[arg(long)]
    pub title: String,

    /// Source language code (en, ko, ja)
    #[arg(long, default_value = "en")]
    pub source: String,

    /// Target language code (en, ko, ja)
    #[arg(long, default_value = "en")]
    pub target: String,

    /// Path to the video file
    #[arg(long)]
    pub video: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeAction {
    Light,
    Dark,
    Toggle,
}
