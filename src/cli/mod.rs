use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "video2mp3",
    about = "video2mp3 - Convert uploaded videos and web-video URLs into MP3 audio over HTTP",
    version,
    long_about = "A small HTTP service that accepts a video upload or a web-video URL, converts it to MP3 with ffmpeg and returns the audio file. URLs are resolved with yt-dlp."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind to
        #[arg(long, value_name = "HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "PORT", value_name = "PORT")]
        port: Option<u16>,

        /// Directory holding the uploads/ and output/ staging directories
        #[arg(long, env = "VIDEO2MP3_DATA_DIR", value_name = "DIR")]
        data_dir: Option<PathBuf>,

        /// Path to the ffmpeg executable
        #[arg(long, env = "FFMPEG_PATH", value_name = "PATH")]
        ffmpeg_path: Option<String>,

        /// Path to the yt-dlp executable
        #[arg(long, env = "YT_DLP_PATH", value_name = "PATH")]
        yt_dlp_path: Option<String>,
    },

    /// Check that the external tools are installed
    Check,

    /// Inspect the configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}
