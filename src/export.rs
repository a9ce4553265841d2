use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::Command;

use anyhow::Context as _;

use crate::cli::{ExportArgs, ExportFormat};
use crate::formats::StructuredDocument;
use crate::output::write_output;
use crate::render;

const DEFAULT_PDF_ENGINES: [&str; 2] = ["weasyprint", "tectonic"];

pub fn run(args: ExportArgs) -> anyhow::Result<()> {
    if Path::new(&args.out).exists() && !args.force {
        anyhow::bail!("export output already exists: {}", args.out);
    }

    let document = read_document(&args.input)?;
    tracing::info!(
        format = ?args.format,
        input = %args.input,
        out = %args.out,
        "export"
    );

    match args.format {
        ExportFormat::Md => write_output(
            &args.out,
            render::to_markdown(&document)?.as_bytes(),
            args.force,
        )?,
        ExportFormat::Html => {
            write_output(&args.out, render::to_html(&document).as_bytes(), args.force)?
        }
        ExportFormat::Csv => {
            write_output(&args.out, render::to_csv(&document).as_bytes(), args.force)?
        }
        ExportFormat::Json => write_output(
            &args.out,
            render::to_json(&document)?.as_bytes(),
            args.force,
        )?,
        ExportFormat::Pdf => export_pdf_via_pandoc(&args, &document)?,
    }

    Ok(())
}

pub fn read_document(path: &str) -> anyhow::Result<StructuredDocument> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("read document: {path}"))?;
    serde_json::from_str(&contents).with_context(|| format!("parse document json: {path}"))
}

fn export_pdf_via_pandoc(args: &ExportArgs, document: &StructuredDocument) -> anyhow::Result<()> {
    if let Some(parent) = Path::new(&args.out).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create export output dir: {}", parent.display()))?;
    }

    let markdown = tempfile::Builder::new()
        .prefix("siteinsight-")
        .suffix(".md")
        .tempfile()
        .context("create markdown temp file")?;
    std::fs::write(markdown.path(), render::to_markdown(document)?)
        .with_context(|| format!("write markdown: {}", markdown.path().display()))?;

    let engines = match args.pdf_engine.as_deref() {
        Some(engine) => vec![engine],
        None => DEFAULT_PDF_ENGINES.to_vec(),
    };

    let mut last_failure: Option<anyhow::Error> = None;
    for engine in engines {
        tracing::info!(
            format = "pdf",
            pdf_engine = engine,
            pandoc = %args.pandoc,
            out = %args.out,
            "export via pandoc"
        );

        let pandoc_args = build_pandoc_args(markdown.path(), &args.out, engine, &document.title);
        let output = match Command::new(&args.pandoc).args(&pandoc_args).output() {
            Ok(output) => output,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                anyhow::bail!("pandoc not found: {} (install pandoc or pass --pandoc)", args.pandoc);
            }
            Err(err) => return Err(err).with_context(|| format!("run pandoc: {}", args.pandoc)),
        };
        if output.status.success() {
            return Ok(());
        }

        last_failure = Some(anyhow::anyhow!(
            "pandoc failed with pdf_engine={engine} ({}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        ));
    }

    match last_failure {
        Some(err) => Err(err),
        None => anyhow::bail!("export pdf failed: no pdf engine candidates"),
    }
}

fn build_pandoc_args(input: &Path, out: &str, pdf_engine: &str, title: &str) -> Vec<OsString> {
    vec![
        input.as_os_str().to_owned(),
        OsString::from("-o"),
        OsString::from(out),
        OsString::from("--from"),
        OsString::from("markdown"),
        OsString::from("--to"),
        OsString::from("pdf"),
        OsString::from("--pdf-engine"),
        OsString::from(pdf_engine),
        OsString::from("--metadata"),
        OsString::from(format!("title={title}")),
    ]
}
