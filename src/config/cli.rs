use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the mdpress binary.
#[derive(Debug, Parser)]
#[command(
    name = "mdpress",
    version,
    about = "Convert Markdown into themed HTML or PDF"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "MDPRESS_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Convert a single Markdown file.
    Convert(ConvertArgs),
    /// Convert every Markdown file found under the given paths to HTML.
    Batch(BatchArgs),
    /// Run the conversion web service.
    Serve(Box<ServeArgs>),
}

#[derive(Debug, Args, Clone)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub logging: LoggingOverrides,

    #[command(flatten)]
    pub pdf: PdfOverrides,

    /// Markdown file to convert.
    #[arg(value_name = "INPUT", value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Destination file; defaults to INPUT with the format's extension.
    #[arg(value_name = "OUTPUT", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Theme identifier (light|dark); defaults to `render.default_theme`.
    #[arg(short, long, value_name = "THEME")]
    pub theme: Option<String>,

    /// Output format (html|pdf).
    #[arg(short, long, value_name = "FORMAT", default_value = "html")]
    pub format: String,

    /// Print the HTML document to stdout instead of writing a file.
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    pub preview: bool,

    /// Strip scripts and unsafe markup from the rendered fragment.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub sanitize: bool,
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    #[command(flatten)]
    pub logging: LoggingOverrides,

    /// Markdown files or directories searched recursively for `.md` files.
    #[arg(value_name = "INPUT", required = true, num_args = 1.., value_hint = ValueHint::AnyPath)]
    pub inputs: Vec<PathBuf>,

    /// Directory receiving the converted documents.
    #[arg(
        short,
        long = "output-dir",
        value_name = "DIR",
        default_value = "output",
        value_hint = ValueHint::DirPath
    )]
    pub output_dir: PathBuf,

    /// Theme identifier (light|dark); defaults to `render.default_theme`.
    #[arg(short, long, value_name = "THEME")]
    pub theme: Option<String>,

    /// Strip scripts and unsafe markup from rendered fragments.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub sanitize: bool,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct LoggingOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct PdfOverrides {
    /// Override the wkhtmltopdf executable; skips the install-location probe.
    #[arg(long = "pdf-binary", value_name = "PATH", value_hint = ValueHint::ExecutablePath)]
    pub binary: Option<PathBuf>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub logging: LoggingOverrides,

    #[command(flatten)]
    pub pdf: PdfOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the maximum accepted upload size in bytes.
    #[arg(long = "server-max-upload-bytes", value_name = "BYTES")]
    pub max_upload_bytes: Option<u64>,

    /// Toggle sanitization of rendered fragments.
    #[arg(
        long = "sanitize",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub sanitize: Option<bool>,

    /// Override the default theme for requests that name none.
    #[arg(long = "render-default-theme", value_name = "THEME")]
    pub default_theme: Option<String>,

    /// Override how long a PDF export may run before the request fails.
    #[arg(long = "pdf-timeout-seconds", value_name = "SECONDS")]
    pub pdf_timeout_seconds: Option<u64>,
}
