//! Command line and environment configuration for the server binary.

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use thiserror::Error;

/// Which transport carries the JSON-RPC frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransportKind {
    /// Newline-delimited JSON over stdin/stdout
    Stdio,
    /// HTTP with Server-Sent Events
    Sse,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "open_wearables_mcp")]
#[command(version, about = "MCP server exposing Open Wearables health data")]
pub struct Args {
    /// Transport to serve on
    #[arg(long, env = "MCP_TRANSPORT", value_enum, default_value_t = TransportKind::Stdio)]
    pub transport: TransportKind,

    /// Address to bind for the SSE transport
    #[arg(long, env = "MCP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind for the SSE transport
    #[arg(long, env = "MCP_PORT", default_value_t = 8001)]
    pub port: u16,

    /// Directory relative paths are resolved against when no .env file is loaded
    #[arg(long, env = "DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Explicit .env file to load
    #[arg(long, env = "MCP_ENV_FILE")]
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load env file {path}: {source}")]
    EnvFile {
        path: String,
        #[source]
        source: dotenv::Error,
    },

    #[error("Failed to determine working directory: {0}")]
    CurrentDir(#[from] std::io::Error),
}

/// Load a `.env` file without overriding variables already set.
///
/// With an explicit path the file must exist. Otherwise the usual lookup in
/// the working directory and its parents is used and a missing file is fine.
/// Returns the path of the file that was loaded.
pub fn load_env_file(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    match explicit {
        Some(path) => {
            dotenv::from_path(path).map_err(|source| ConfigError::EnvFile {
                path: path.display().to_string(),
                source,
            })?;
            Ok(Some(path.to_path_buf()))
        }
        None => match dotenv::dotenv() {
            Ok(path) => Ok(Some(path)),
            Err(e) if e.not_found() => Ok(None),
            Err(source) => Err(ConfigError::EnvFile {
                path: ".env".to_string(),
                source,
            }),
        },
    }
}

/// Directory that relative paths are anchored to: the loaded env file's
/// directory, else the data dir, else the working directory
pub fn resolve_base_dir(env_file: Option<&Path>, data_dir: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let cwd = std::env::current_dir()?;
    let absolute = |path: &Path| if path.is_absolute() { path.to_path_buf() } else { cwd.join(path) };

    let base = match (env_file.and_then(Path::parent), data_dir) {
        (Some(dir), _) if !dir.as_os_str().is_empty() => absolute(dir),
        (Some(_), _) => cwd.clone(),
        (None, Some(dir)) => absolute(dir),
        (None, None) => cwd.clone(),
    };
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["open_wearables_mcp"]).unwrap();
        assert_eq!(args.transport, TransportKind::Stdio);
        assert_eq!(args.host, "0.0.0.0");
        assert_eq!(args.port, 8001);
    }

    #[test]
    fn test_sse_flags() {
        let args = Args::try_parse_from(["open_wearables_mcp", "--transport", "sse", "--port", "9100"]).unwrap();
        assert_eq!(args.transport, TransportKind::Sse);
        assert_eq!(args.port, 9100);

        assert!(Args::try_parse_from(["open_wearables_mcp", "--transport", "websocket"]).is_err());
    }

    #[test]
    fn test_base_dir_prefers_env_file_directory() {
        let base = resolve_base_dir(
            Some(Path::new("/srv/wearables/.env")),
            Some(Path::new("/var/data")),
        )
        .unwrap();
        assert_eq!(base, PathBuf::from("/srv/wearables"));

        let base = resolve_base_dir(None, Some(Path::new("/var/data"))).unwrap();
        assert_eq!(base, PathBuf::from("/var/data"));

        let base = resolve_base_dir(None, None).unwrap();
        assert_eq!(base, std::env::current_dir().unwrap());
    }

    #[test]
    fn test_env_file_does_not_override_existing_values() {
        let dir = std::env::temp_dir().join(format!("ow_env_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(".env");
        std::fs::write(&path, "OW_TEST_PRESET=from_file\nOW_TEST_FRESH=from_file\n").unwrap();

        std::env::set_var("OW_TEST_PRESET", "from_env");
        let loaded = load_env_file(Some(&path)).unwrap();

        assert_eq!(loaded.as_deref(), Some(path.as_path()));
        assert_eq!(std::env::var("OW_TEST_PRESET").unwrap(), "from_env");
        assert_eq!(std::env::var("OW_TEST_FRESH").unwrap(), "from_file");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_explicit_env_file_is_an_error() {
        let err = load_env_file(Some(Path::new("/definitely/not/here/.env"))).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile { .. }));
    }
}
