use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory names created below the data directory
pub const UPLOADS_DIR_NAME: &str = "uploads";
pub const OUTPUT_DIR_NAME: &str = "output";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,

    /// Staging directories
    pub storage: StorageConfig,

    /// External executables
    pub tools: ToolsConfig,

    /// Request limits
    pub limits: LimitsConfig,

    /// Log output settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory for uploads/ and output/ (defaults to the executable's directory)
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// ffmpeg executable
    pub ffmpeg_path: String,

    /// yt-dlp executable
    pub yt_dlp_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest accepted upload body in bytes
    pub max_upload_bytes: usize,

    /// Maximum conversions running at the same time
    pub max_concurrent_jobs: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable ones
    pub json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            yt_dlp_path: "yt-dlp".to_string(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 512 * 1024 * 1024,
            max_concurrent_jobs: 4,
        }
    }
}

impl Config {
    /// Load configuration from file or fall back to defaults.
    ///
    /// Also returns the file that was read, if any.
    pub fn load() -> Result<(Self, Option<PathBuf>)> {
        match Self::config_path() {
            Some(config_path) => {
                let config = Self::from_file(&config_path)?;
                Ok((config, Some(config_path)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    /// Read and validate one configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Find an existing configuration file
    fn config_path() -> Option<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join("video2mp3").join("config.yaml"))
            .filter(|path| path.exists())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.tools.ffmpeg_path.trim().is_empty() {
            anyhow::bail!("ffmpeg path must not be empty");
        }

        if self.tools.yt_dlp_path.trim().is_empty() {
            anyhow::bail!("yt-dlp path must not be empty");
        }

        if self.limits.max_upload_bytes == 0 {
            anyhow::bail!("max_upload_bytes must be greater than zero");
        }

        if self.limits.max_concurrent_jobs == 0 {
            anyhow::bail!("max_concurrent_jobs must be greater than zero");
        }

        Ok(())
    }

    /// Base directory holding the staging directories
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage.data_dir {
            return Ok(dir.clone());
        }

        let exe = std::env::current_exe()
            .context("Could not determine executable location")?;

        exe.parent()
            .map(|dir| dir.to_path_buf())
            .context("Executable has no parent directory")
    }

    pub fn uploads_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(UPLOADS_DIR_NAME))
    }

    pub fn output_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(OUTPUT_DIR_NAME))
    }

    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Listen Address: {}", self.bind_address());
        match self.data_dir() {
            Ok(dir) => println!("  Data Directory: {}", dir.display()),
            Err(e) => println!("  Data Directory: <unavailable: {}>", e),
        }
        println!("  ffmpeg: {}", self.tools.ffmpeg_path);
        println!("  yt-dlp: {}", self.tools.yt_dlp_path);
        println!(
            "  Max Upload: {}",
            crate::utils::format_file_size(self.limits.max_upload_bytes as u64)
        );
        println!("  Max Concurrent Jobs: {}", self.limits.max_concurrent_jobs);
        println!("  JSON Logs: {}", self.logging.json);
    }
}
