//! aura CLI - Download and trim online media with yt-dlp and ffmpeg.

use anyhow::Result;
use aura_lib::prelude::*;
use clap::{CommandFactory, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

mod commands;
mod display;

#[derive(Parser)]
#[command(name = "aura")]
#[command(about = "Download and trim online media with yt-dlp and ffmpeg", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(long, global = true)]
    quiet: bool,

    /// Downloader program
    #[arg(long, env = "AURA_YT_DLP", global = true)]
    yt_dlp: Option<PathBuf>,

    /// Transcoder program used for trimming
    #[arg(long, env = "AURA_FFMPEG", global = true)]
    ffmpeg: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a video, audio track or playlist
    Download {
        /// Media URL
        url: String,

        /// Extract audio only (mp3)
        #[arg(long)]
        audio: bool,

        /// Download every entry of a playlist URL
        #[arg(long)]
        playlist: bool,

        /// Destination directory. Defaults to your Downloads folder.
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Maximum video quality (max, 1080p, 720p, ...)
        #[arg(short, long, default_value = "max")]
        quality: String,

        /// Keep media from this timestamp (SS, MM:SS or HH:MM:SS)
        #[arg(long, requires = "trim_end")]
        trim_start: Option<String>,

        /// Keep media up to this timestamp
        #[arg(long, requires = "trim_start")]
        trim_end: Option<String>,

        /// Remove SponsorBlock segments
        #[arg(long)]
        sponsorblock: bool,

        /// Append raw tool output to download_log.txt in the destination
        #[arg(long)]
        log_to_file: bool,
    },

    /// Show metadata for a URL without downloading
    Info {
        /// Media URL
        url: String,

        /// Print the metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the HTTP API used by the desktop UI
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:5000")]
        addr: SocketAddr,

        /// Destination used when a request has no save_path
        #[arg(long)]
        default_dir: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn tool_config(yt_dlp: Option<PathBuf>, ffmpeg: Option<PathBuf>) -> ToolConfig {
    let mut config = ToolConfig::default();
    if let Some(program) = yt_dlp {
        config.downloader = ToolCommand::new(program);
    }
    if let Some(program) = ffmpeg {
        config.transcoder = ToolCommand::new(program);
    }
    config.resolved()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = tool_config(cli.yt_dlp, cli.ffmpeg);

    match command {
        Commands::Download {
            url,
            audio,
            playlist,
            output_dir,
            quality,
            trim_start,
            trim_end,
            sponsorblock,
            log_to_file,
        } => {
            let payload = RequestPayload {
                url: Some(url),
                mode: Some(if audio { Mode::Audio } else { Mode::Video }.to_string()),
                scope: Some(if playlist { Scope::Playlist } else { Scope::Single }.to_string()),
                save_path: output_dir.map(|dir| dir.to_string_lossy().into_owned()),
                quality: Some(quality),
                trim_start,
                trim_end,
                sponsorblock,
                log_to_file,
            };
            commands::download::download(config, payload, cli.quiet).await
        }
        Commands::Info { url, json } => commands::info::show_info(config, &url, json).await,
        Commands::Serve { addr, default_dir } => {
            commands::serve::serve(config, addr, default_dir).await
        }
    }
}
