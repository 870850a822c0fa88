//! `wkhtmltopdf` invocation.
//!
//! The exporter stages the document in a temporary `.html` file, runs the
//! tool with the page options and collects the PDF from its stdout. The
//! staged file is removed when the handle drops, whatever the outcome.

use std::{
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
    process::{Command, Stdio},
    time::{Duration, Instant},
};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::PdfSettings;

pub const TOOL_NAME: &str = "wkhtmltopdf";

pub const INSTALL_INSTRUCTIONS: &str = r"wkhtmltopdf is required for PDF generation.

Installation:

Windows:
1. Download from: https://wkhtmltopdf.org/downloads.html
2. Install to default location: C:\Program Files\wkhtmltopdf\
3. Add to PATH: C:\Program Files\wkhtmltopdf\bin\

macOS:
brew install wkhtmltopdf

Linux (Ubuntu/Debian):
sudo apt-get install wkhtmltopdf

Linux (CentOS/RHEL):
sudo yum install wkhtmltopdf

After installation, restart your terminal and try again.";

/// Install locations probed before the process search path.
pub const DEFAULT_SEARCH_PATHS: [&str; 4] = [
    r"C:\Program Files\wkhtmltopdf\bin\wkhtmltopdf.exe",
    r"C:\Program Files (x86)\wkhtmltopdf\bin\wkhtmltopdf.exe",
    "/usr/local/bin/wkhtmltopdf",
    "/usr/bin/wkhtmltopdf",
];

#[derive(Debug, Error)]
pub enum PdfExportError {
    #[error("wkhtmltopdf could not be located")]
    Unavailable,
    #[error("failed to stage HTML for wkhtmltopdf: {0}")]
    Stage(#[source] io::Error),
    #[error("failed to launch `{}`: {source}", .binary.display())]
    Spawn {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("wkhtmltopdf exited with status {exit_code:?}: {stderr}")]
    Tool {
        exit_code: Option<i32>,
        stderr: String,
    },
    #[error("wkhtmltopdf produced no output")]
    EmptyOutput,
}

/// Resolves the `wkhtmltopdf` executable. Built once from settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolLocator {
    explicit: Option<PathBuf>,
    candidates: Vec<PathBuf>,
    search_env_path: bool,
}

impl ToolLocator {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self {
            explicit: None,
            candidates,
            search_env_path: true,
        }
    }

    /// An explicit binary is authoritative: when set, nothing else is probed.
    pub fn with_explicit(mut self, binary: Option<PathBuf>) -> Self {
        self.explicit = binary;
        self
    }

    pub fn search_env_path(mut self, enabled: bool) -> Self {
        self.search_env_path = enabled;
        self
    }

    pub fn locate(&self) -> Option<PathBuf> {
        if let Some(binary) = &self.explicit {
            if binary.is_file() {
                return Some(binary.clone());
            }
            return which::which(binary).ok();
        }

        if let Some(found) = self.candidates.iter().find(|path| path.is_file()) {
            return Some(found.clone());
        }

        if self.search_env_path {
            return which::which(TOOL_NAME).ok();
        }

        None
    }
}

impl Default for ToolLocator {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_PATHS.iter().map(PathBuf::from).collect())
    }
}

impl From<&PdfSettings> for ToolLocator {
    fn from(settings: &PdfSettings) -> Self {
        Self::new(settings.search_paths.clone())
            .with_explicit(settings.binary.clone())
            .search_env_path(settings.search_path_env)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    fn as_arg(self) -> &'static str {
        match self {
            Orientation::Portrait => "Portrait",
            Orientation::Landscape => "Landscape",
        }
    }
}

/// Page setup handed to `wkhtmltopdf`.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    pub page_size: &'static str,
    pub orientation: Orientation,
    pub dpi: u32,
    pub margin_mm: u32,
    pub zoom: f32,
    pub javascript_delay: Duration,
    pub enable_local_file_access: bool,
    pub ignore_load_errors: bool,
    pub ignore_media_load_errors: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            page_size: "A4",
            orientation: Orientation::Portrait,
            dpi: 300,
            margin_mm: 20,
            zoom: 1.0,
            javascript_delay: Duration::from_millis(1000),
            enable_local_file_access: true,
            ignore_load_errors: true,
            ignore_media_load_errors: true,
        }
    }
}

impl PdfOptions {
    fn arguments(&self, page: &Path) -> Vec<String> {
        let margin = format!("{}mm", self.margin_mm);
        let mut args = vec![
            "--quiet".to_string(),
            "--dpi".to_string(),
            self.dpi.to_string(),
            "--orientation".to_string(),
            self.orientation.as_arg().to_string(),
            "--page-size".to_string(),
            self.page_size.to_string(),
        ];
        for side in ["top", "bottom", "left", "right"] {
            args.push(format!("--margin-{side}"));
            args.push(margin.clone());
        }

        args.push("page".to_string());
        args.push(page.display().to_string());
        if self.enable_local_file_access {
            args.push("--enable-local-file-access".to_string());
        }
        if self.ignore_load_errors {
            args.push("--load-error-handling".to_string());
            args.push("ignore".to_string());
        }
        if self.ignore_media_load_errors {
            args.push("--load-media-error-handling".to_string());
            args.push("ignore".to_string());
        }
        args.push("--zoom".to_string());
        args.push(format!("{:.1}", self.zoom));
        args.push("--javascript-delay".to_string());
        args.push(self.javascript_delay.as_millis().to_string());

        // Write the PDF to stdout.
        args.push("-".to_string());
        args
    }
}

#[derive(Debug, Clone)]
pub struct PdfExporter {
    locator: ToolLocator,
    options: PdfOptions,
    staging_dir: Option<PathBuf>,
}

impl PdfExporter {
    pub fn new(locator: ToolLocator) -> Self {
        Self {
            locator,
            options: PdfOptions::default(),
            staging_dir: None,
        }
    }

    pub fn with_options(mut self, options: PdfOptions) -> Self {
        self.options = options;
        self
    }

    /// Stage documents under `dir` instead of the system temp directory.
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    pub fn options(&self) -> &PdfOptions {
        &self.options
    }

    pub fn locate(&self) -> Option<PathBuf> {
        self.locator.locate()
    }

    pub fn is_available(&self) -> bool {
        self.locate().is_some()
    }

    pub fn export(&self, document: &str) -> Result<Vec<u8>, PdfExportError> {
        let started_at = Instant::now();
        let Some(binary) = self.locate() else {
            warn!(
                target = "infra::pdf",
                op = "pdf::export",
                result = "error",
                error_code = "tool_unavailable",
                "wkhtmltopdf could not be located"
            );
            return Err(PdfExportError::Unavailable);
        };

        let staged = self.stage(document)?;
        let args = self.options.arguments(staged.path());

        let cli_started_at = Instant::now();
        let output = Command::new(&binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|err| {
                warn!(
                    target = "infra::pdf",
                    op = "pdf::export",
                    result = "error",
                    elapsed_ms = started_at.elapsed().as_millis() as u64,
                    binary = %binary.display(),
                    error_code = "spawn_cli",
                    error = %err,
                    "Failed to spawn wkhtmltopdf"
                );
                if err.kind() == ErrorKind::NotFound {
                    PdfExportError::Unavailable
                } else {
                    PdfExportError::Spawn {
                        binary: binary.clone(),
                        source: err,
                    }
                }
            })?;

        if !output.status.success() {
            let exit_code = output.status.code();
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(
                target = "infra::pdf",
                op = "pdf::export",
                result = "error",
                elapsed_ms = started_at.elapsed().as_millis() as u64,
                cli_elapsed_ms = cli_started_at.elapsed().as_millis() as u64,
                exit_code = exit_code.map(i64::from).unwrap_or(-1),
                error_code = "wkhtmltopdf",
                stderr = %stderr,
                "wkhtmltopdf invocation failed"
            );
            return Err(PdfExportError::Tool { exit_code, stderr });
        }

        if output.stdout.is_empty() {
            warn!(
                target = "infra::pdf",
                op = "pdf::export",
                result = "error",
                elapsed_ms = started_at.elapsed().as_millis() as u64,
                error_code = "empty_output",
                "wkhtmltopdf exited cleanly without output"
            );
            return Err(PdfExportError::EmptyOutput);
        }

        info!(
            target = "infra::pdf",
            op = "pdf::export",
            result = "ok",
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            cli_elapsed_ms = cli_started_at.elapsed().as_millis() as u64,
            binary = %binary.display(),
            pdf_bytes = output.stdout.len(),
            "PDF rendered via wkhtmltopdf"
        );

        Ok(output.stdout)
    }

    fn stage(&self, document: &str) -> Result<NamedTempFile, PdfExportError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("mdpress-").suffix(".html");
        let mut file = match &self.staging_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(PdfExportError::Stage)?;

        file.write_all(document.as_bytes())
            .map_err(PdfExportError::Stage)?;
        file.flush().map_err(PdfExportError::Stage)?;
        Ok(file)
    }
}
