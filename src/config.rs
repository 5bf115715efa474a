use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

const DEFAULT_HTTP_BIND: &str = "127.0.0.1:8000";
const DEFAULT_MAX_BODY_BYTES: usize = 256 * 1024;
const MIN_MAX_BODY_BYTES: usize = 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub http_bind_address: SocketAddr,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_bind_address: DEFAULT_HTTP_BIND.parse().expect("default bind address valid"),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Resolves the effective configuration: CLI flags win over config-file
    /// values, which win over built-in defaults.
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            http_bind: cli_http_bind,
            max_body_bytes: cli_max_body_bytes,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            http_bind: file_http_bind,
            max_body_bytes: file_max_body_bytes,
        } = file_config;

        let http_bind_address = cli_http_bind.or(file_http_bind).unwrap_or_else(|| {
            DEFAULT_HTTP_BIND
                .parse()
                .expect("default bind address valid")
        });

        let max_body_bytes = cli_max_body_bytes
            .or(file_max_body_bytes)
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);

        anyhow::ensure!(
            max_body_bytes >= MIN_MAX_BODY_BYTES,
            "request body limit must be at least {} bytes, got {}",
            MIN_MAX_BODY_BYTES,
            max_body_bytes
        );

        Ok(Self {
            http_bind_address,
            max_body_bytes,
        })
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(name = "receipt-points", about = "Receipt points HTTP service", version)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "RECEIPT_POINTS_HTTP_BIND",
        value_name = "ADDR",
        help = "Address the HTTP server binds to"
    )]
    pub http_bind: Option<SocketAddr>,

    #[arg(
        long,
        env = "RECEIPT_POINTS_MAX_BODY_BYTES",
        value_name = "BYTES",
        help = "Maximum accepted request body size",
        value_parser = clap::value_parser!(usize)
    )]
    pub max_body_bytes: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    http_bind: Option<SocketAddr>,
    max_body_bytes: Option<usize>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
