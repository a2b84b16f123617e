use anyhow::Result;
use url::Url;

/// Validate a URL and return the parsed form
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url)
        .map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed)
}

/// Format file size in human-readable format
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f = bytes as f64;
    let unit_index = (bytes_f.log10() / THRESHOLD.log10()).floor() as usize;
    let unit_index = unit_index.min(UNITS.len() - 1);

    let size = bytes_f / THRESHOLD.powi(unit_index as i32);

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Turn a media title into a download filename.
///
/// Every character outside `[a-z0-9]` (case-insensitive) becomes `_`, the
/// result is lower-cased and `.mp3` is appended, so the name is safe both on
/// disk and inside a `Content-Disposition` header.
pub fn sanitize_title(title: &str) -> String {
    let mut name: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();

    name.push_str(".mp3");
    name
}

/// Check if the current environment has required tools
pub async fn check_dependencies(ffmpeg_path: &str, yt_dlp_path: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(ffmpeg_path, "-version").await {
        missing.push(format!("{} - required for every conversion", ffmpeg_path));
    }

    if !check_command_available(yt_dlp_path, "--version").await {
        missing.push(format!("{} - required for URL conversions", yt_dlp_path));
    }

    missing
}

/// Check if a command can be executed
pub async fn check_command_available(command: &str, version_flag: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg(version_flag)
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
