//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::SocketAddr,
    num::{NonZeroU64, NonZeroUsize},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::{domain::types::Theme, infra::pdf::DEFAULT_SEARCH_PATHS};

mod cli;

pub use cli::{
    BatchArgs, CliArgs, Command, ConvertArgs, LoggingOverrides, PdfOverrides, ServeArgs,
    ServeOverrides,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "mdpress";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_PDF_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub render: RenderSettings,
    pub pdf: PdfSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub max_upload_bytes: NonZeroUsize,
    pub sanitize: bool,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub default_theme: Theme,
}

/// Where to look for `wkhtmltopdf` and how long an export may take.
#[derive(Debug, Clone)]
pub struct PdfSettings {
    pub binary: Option<PathBuf>,
    pub search_paths: Vec<PathBuf>,
    pub search_path_env: bool,
    pub timeout: Duration,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("MDPRESS").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match &cli.command {
        Command::Convert(args) => {
            raw.apply_logging_overrides(&args.logging);
            raw.apply_pdf_overrides(&args.pdf);
        }
        Command::Batch(args) => raw.apply_logging_overrides(&args.logging),
        Command::Serve(args) => raw.apply_serve_overrides(&args.overrides),
    }

    Settings::from_raw(raw)
}

pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    render: RawRenderSettings,
    pdf: RawPdfSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(limit) = overrides.max_upload_bytes {
            self.server.max_upload_bytes = Some(limit);
        }
        if let Some(sanitize) = overrides.sanitize {
            self.server.sanitize = Some(sanitize);
        }
        if let Some(theme) = overrides.default_theme.as_ref() {
            self.render.default_theme = Some(theme.clone());
        }
        if let Some(seconds) = overrides.pdf_timeout_seconds {
            self.pdf.timeout_seconds = Some(seconds);
        }

        self.apply_logging_overrides(&overrides.logging);
        self.apply_pdf_overrides(&overrides.pdf);
    }

    fn apply_logging_overrides(&mut self, overrides: &LoggingOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }

    fn apply_pdf_overrides(&mut self, overrides: &PdfOverrides) {
        if let Some(binary) = overrides.binary.as_ref() {
            self.pdf.binary = Some(binary.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            render,
            pdf,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            render: build_render_settings(render)?,
            pdf: build_pdf_settings(pdf)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let max_upload_value = server
        .max_upload_bytes
        .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
    let max_upload_bytes = NonZeroU64::new(max_upload_value)
        .ok_or_else(|| LoadError::invalid("server.max_upload_bytes", "must be greater than zero"))
        .and_then(|value| {
            NonZeroUsize::try_from(value).map_err(|_| {
                LoadError::invalid(
                    "server.max_upload_bytes",
                    "value exceeds supported range for usize",
                )
            })
        })?;

    Ok(ServerSettings {
        addr,
        max_upload_bytes,
        sanitize: server.sanitize.unwrap_or(true),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_render_settings(render: RawRenderSettings) -> Result<RenderSettings, LoadError> {
    let default_theme = render
        .default_theme
        .as_deref()
        .map(|id| Theme::from_id(id.trim()))
        .unwrap_or_default();

    Ok(RenderSettings { default_theme })
}

fn build_pdf_settings(pdf: RawPdfSettings) -> Result<PdfSettings, LoadError> {
    let binary = pdf.binary.filter(|path| !path.as_os_str().is_empty());

    let search_paths = pdf
        .search_paths
        .unwrap_or_else(|| DEFAULT_SEARCH_PATHS.iter().map(PathBuf::from).collect());

    let timeout_seconds = pdf.timeout_seconds.unwrap_or(DEFAULT_PDF_TIMEOUT_SECS);
    if timeout_seconds == 0 {
        return Err(LoadError::invalid(
            "pdf.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(PdfSettings {
        binary,
        search_paths,
        search_path_env: pdf.search_path_env.unwrap_or(true),
        timeout: Duration::from_secs(timeout_seconds),
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    max_upload_bytes: Option<u64>,
    sanitize: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRenderSettings {
    default_theme: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPdfSettings {
    binary: Option<PathBuf>,
    search_paths: Option<Vec<PathBuf>>,
    search_path_env: Option<bool>,
    timeout_seconds: Option<u64>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}
