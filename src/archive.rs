use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

const SLUG_MAX_CHARS: usize = 50;

/// Everything needed to reproduce one archived test run.
pub struct ArchiveArtifacts<'a> {
    pub config_name: &'a str,
    pub description: &'a str,
    pub backend_url: &'a str,
    pub frontend_url: &'a str,
    pub api_response: &'a Value,
    pub success: bool,
    pub stock_count: usize,
}

/// `YYYY-MM-DD_HHMMSS_<slug>` folder under the archive root.
pub fn create_archive_folder(
    root: &Path,
    description: &str,
    now: DateTime<Local>,
) -> Result<PathBuf> {
    let folder_name = format!("{}_{}", now.format("%Y-%m-%d_%H%M%S"), slug(description));
    let path = root.join(folder_name);
    fs::create_dir_all(&path)
        .with_context(|| format!("failed to create archive folder {}", path.display()))?;
    Ok(path)
}

fn slug(description: &str) -> String {
    description
        .to_lowercase()
        .chars()
        .map(|ch| if ch == ' ' { '-' } else { ch })
        .take(SLUG_MAX_CHARS)
        .collect()
}

pub fn frontend_result_url(frontend_url: &str, config_name: &str) -> String {
    format!(
        "{}/portfolio-backtest?config={}",
        frontend_url.trim_end_matches('/'),
        config_name
    )
}

pub fn curl_command(backend_url: &str, config_name: &str) -> String {
    format!(
        "curl -X POST {}/api/backtest/portfolio/config \\\n  -H \"Content-Type: application/json\" \\\n  -d '{{\"configFile\": \"{}\"}}'",
        backend_url.trim_end_matches('/'),
        config_name
    )
}

/// Write the full artifact set: README, frontend URL, reproducible curl
/// script, raw API response, and execution metadata.
pub fn save_artifacts(
    archive_path: &Path,
    artifacts: &ArchiveArtifacts<'_>,
    now: DateTime<Local>,
) -> Result<()> {
    let frontend_url = frontend_result_url(artifacts.frontend_url, artifacts.config_name);
    let curl = curl_command(artifacts.backend_url, artifacts.config_name);

    let readme = format!(
        "# Portfolio Backtest Test Archive\n\n\
         **Test Description**: {}\n\
         **Config File**: {}\n\
         **Timestamp**: {}\n\
         **Status**: {}\n\n\
         ## Quick Access\n\n\
         **Frontend URL**:\n{}\n\n\
         **API Endpoint**:\nPOST {}/api/backtest/portfolio/config\n\n\
         ## Files in This Archive\n\n\
         - `README.md` - This file\n\
         - `frontend-url.txt` - Direct link to view results\n\
         - `curl-command.sh` - Reproducible API command\n\
         - `api-response.json` - Complete API response\n\
         - `metadata.json` - Test execution metadata\n\n\
         ## Reproduction Steps\n\n\
         1. Ensure the backend server is running\n\
         2. Run the curl command: `bash curl-command.sh`\n\
         3. Or visit the frontend URL to view results interactively\n",
        artifacts.description,
        artifacts.config_name,
        now.format("%Y-%m-%d %H:%M:%S"),
        if artifacts.success { "Success" } else { "Failed" },
        frontend_url,
        artifacts.backend_url.trim_end_matches('/'),
    );
    write_file(archive_path, "README.md", &readme)?;

    write_file(archive_path, "frontend-url.txt", &format!("{}\n", frontend_url))?;

    let curl_script = format!(
        "#!/bin/bash\n# Portfolio Backtest API Command\n# Generated: {}\n\n{}\n",
        now.format("%Y-%m-%d %H:%M:%S"),
        curl
    );
    let curl_path = write_file(archive_path, "curl-command.sh", &curl_script)?;
    make_executable(&curl_path)?;

    write_file(
        archive_path,
        "api-response.json",
        &serde_json::to_string_pretty(artifacts.api_response)?,
    )?;

    let metadata = json!({
        "testType": "portfolio",
        "description": artifacts.description,
        "configFile": artifacts.config_name,
        "timestamp": now.to_rfc3339(),
        "success": artifacts.success,
        "frontendUrl": frontend_url,
        "apiUrl": format!(
            "{}/api/backtest/portfolio/config",
            artifacts.backend_url.trim_end_matches('/')
        ),
        "stockCount": artifacts.stock_count,
    });
    write_file(
        archive_path,
        "metadata.json",
        &serde_json::to_string_pretty(&metadata)?,
    )?;

    Ok(())
}

fn write_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut permissions = fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?
        .permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions)
        .with_context(|| format!("failed to chmod {}", path.display()))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
