use std::{collections::HashMap, io::Write, path::PathBuf, process, sync::Arc};

use mdpress::{
    application::{
        error::{AppError, ConversionError},
        pipeline::{ConversionPipeline, ConversionRequest},
        render::{FragmentSanitizer, render_service},
    },
    config::{self, BatchArgs, ConvertArgs, Settings},
    domain::types::{OutputFormat, Theme},
    infra::{
        error::InfraError,
        files,
        http::{self, HttpState},
        pdf::{PdfExporter, ToolLocator},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if let Some(hint) = error.hint() {
        eprintln!("{hint}");
    }

    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli().map_err(|err| {
        InfraError::configuration(format!("failed to load configuration: {err}"))
    })?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match cli_args.command {
        config::Command::Convert(args) => run_convert(&settings, args),
        config::Command::Batch(args) => run_batch(&settings, args),
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

fn build_pipeline(settings: &Settings, sanitize: bool) -> ConversionPipeline {
    let exporter = PdfExporter::new(ToolLocator::from(&settings.pdf));
    let pipeline = ConversionPipeline::new(render_service(), exporter);
    if sanitize {
        pipeline.with_sanitizer(FragmentSanitizer::new())
    } else {
        pipeline
    }
}

fn resolve_theme_id(settings: &Settings, requested: Option<&str>) -> &'static str {
    match requested {
        Some(id) => Theme::from_id(id).as_str(),
        None => settings.render.default_theme.as_str(),
    }
}

fn run_convert(settings: &Settings, args: ConvertArgs) -> Result<(), AppError> {
    let pipeline = build_pipeline(settings, args.sanitize);
    let format = args
        .format
        .parse::<OutputFormat>()
        .map_err(ConversionError::from)?;

    if format == OutputFormat::Pdf && !args.preview && !pipeline.exporter().is_available() {
        return Err(ConversionError::ToolUnavailable.into());
    }

    let markup = files::read_markup(&args.input)?;
    let theme_id = resolve_theme_id(settings, args.theme.as_deref());

    if args.preview {
        let request =
            ConversionRequest::with_format(markup, Theme::from_id(theme_id), OutputFormat::Html)?;
        let document = pipeline.render_html(request.markup(), theme_id)?;
        print_preview(document.as_str()).map_err(InfraError::from)?;
        return Ok(());
    }

    let request = ConversionRequest::with_format(markup, Theme::from_id(theme_id), format)?;
    let output = pipeline.convert(&request)?;
    let output_path = args
        .output
        .unwrap_or_else(|| files::default_output_path(&args.input, format));
    let bytes = output.into_bytes();
    files::write_output(&output_path, &bytes)?;

    info!(
        target = "mdpress::convert",
        input = %args.input.display(),
        output = %output_path.display(),
        format = format.as_str(),
        theme = theme_id,
        bytes = bytes.len(),
        "Conversion finished"
    );
    println!(
        "Successfully converted '{}' to '{}'",
        args.input.display(),
        output_path.display()
    );
    Ok(())
}

fn print_preview(document: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "=== HTML Preview ===")?;
    writeln!(stdout, "{document}")?;
    writeln!(stdout, "=== End Preview ===")?;
    stdout.flush()
}

fn run_batch(settings: &Settings, args: BatchArgs) -> Result<(), AppError> {
    let pipeline = build_pipeline(settings, args.sanitize);
    let theme_id = resolve_theme_id(settings, args.theme.as_deref());
    let inputs = files::collect_inputs(&args.inputs)?;
    if inputs.is_empty() {
        return Err(AppError::validation("no Markdown files found in the given inputs"));
    }

    let mut failed = 0usize;
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::with_capacity(inputs.len());
    let mut items: Vec<((PathBuf, PathBuf), Vec<u8>)> = Vec::with_capacity(inputs.len());
    for input in inputs {
        let output_path = files::batch_output_path(&args.output_dir, &input);
        if let Some(first) = claimed.get(&output_path) {
            failed += 1;
            println!(
                "FAILED {}: output '{}' is already written by '{}'",
                input.path.display(),
                output_path.display(),
                first.display()
            );
            continue;
        }
        match files::read_markup(&input.path) {
            Ok(markup) => {
                claimed.insert(output_path.clone(), input.path.clone());
                items.push(((input.path, output_path), markup));
            }
            Err(err) => {
                failed += 1;
                println!("FAILED {}: {err}", input.path.display());
            }
        }
    }

    let total = failed + items.len();
    for outcome in pipeline.render_many(items, theme_id) {
        let (input, output_path) = outcome.identifier;
        let written = outcome.result.and_then(|document| {
            files::write_output(&output_path, document.as_bytes()).map(|()| output_path)
        });
        match written {
            Ok(output_path) => println!("OK {} -> {}", input.display(), output_path.display()),
            Err(err) => {
                failed += 1;
                warn!(
                    target = "mdpress::batch",
                    input = %input.display(),
                    category = err.category(),
                    error = %err,
                    "Batch item failed"
                );
                println!("FAILED {}: {err}", input.display());
            }
        }
    }

    println!("Converted {} of {total} files", total - failed);
    if failed > 0 {
        return Err(AppError::BatchIncomplete { failed, total });
    }
    Ok(())
}

async fn run_serve(settings: Settings) -> Result<(), AppError> {
    let pipeline = Arc::new(build_pipeline(&settings, settings.server.sanitize));
    if !pipeline.exporter().is_available() {
        warn!(
            target = "mdpress::serve",
            "wkhtmltopdf not found; PDF downloads will fail until it is installed"
        );
    }

    let state = HttpState::new(pipeline, &settings);
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;
    info!(
        target = "mdpress::serve",
        addr = %settings.server.addr,
        sanitize = settings.server.sanitize,
        pdf_timeout_secs = settings.pdf.timeout.as_secs(),
        "Listening"
    );

    axum::serve(listener, router)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))
}
