use std::io::Read as _;
use std::path::Path;

use anyhow::Context as _;
use chrono::Utc;
use url::Url;
use uuid::Uuid;

use crate::cli::{GenerateArgs, StructureArgs};
use crate::formats::{GenerationRequest, SiteAnalysis, StoredDocument, StructuredDocument};
use crate::llm::{self, EngineOptions};
use crate::output::emit;
use crate::prompt::build_prompt;
use crate::render;
use crate::store::{DocumentStore as _, LocalFsDocumentStore};
use crate::structure::structure;

pub fn run_structure(args: StructureArgs) -> anyhow::Result<()> {
    let raw = read_input(&args.input)?;
    let document = structure(&raw, &args.content_type);
    log_document(&document);

    let json = render::to_json(&document)?;
    emit(args.out.as_deref(), &json, args.force)
}

pub async fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let analysis = read_analysis(Path::new(&args.analysis))
        .with_context(|| format!("read site analysis: {}", args.analysis))?;

    let prompt = build_prompt(&analysis, &args.content_type, &args.tone);
    let options = EngineOptions {
        engine: args.engine,
        content_type: args.content_type.clone(),
        tone: args.tone.clone(),
        command: args.command.clone(),
        command_args: args.command_args.clone(),
        retries: args.retries,
    };

    tracing::info!(
        url = %analysis.url,
        content_type = %args.content_type,
        engine = args.engine.as_str(),
        "generate"
    );
    let raw = llm::generate_text(&options, &analysis, &prompt)
        .await
        .context("generate text")?;

    let document = structure(&raw, &args.content_type);
    log_document(&document);

    if let Some(dir) = args.store.as_deref() {
        let stored = StoredDocument {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            request: GenerationRequest {
                url: analysis.url.clone(),
                content_type: args.content_type.clone(),
                tone: args.tone.clone(),
                engine: args.engine.as_str().to_owned(),
            },
            document: document.clone(),
        };
        LocalFsDocumentStore::new(dir)
            .put(&stored)
            .await
            .context("save document")?;
        tracing::info!(id = %stored.id, store = dir, "saved document");
    }

    let json = render::to_json(&document)?;
    emit(args.out.as_deref(), &json, args.force)
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("read stdin")?;
        return Ok(raw);
    }
    std::fs::read_to_string(input).with_context(|| format!("read input: {input}"))
}

pub fn read_analysis(path: &Path) -> anyhow::Result<SiteAnalysis> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read file: {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    let analysis: SiteAnalysis = if is_yaml {
        serde_yaml::from_str(&contents).context("parse site analysis yaml")?
    } else {
        serde_json::from_str(&contents).context("parse site analysis json")?
    };

    validate_analysis(&analysis)?;
    Ok(analysis)
}

fn validate_analysis(analysis: &SiteAnalysis) -> anyhow::Result<()> {
    let url = Url::parse(analysis.url.trim())
        .with_context(|| format!("parse site url: {}", analysis.url))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("site url must be http/https: {}", analysis.url);
    }

    for (label, score) in analysis.scores.entries() {
        if score > 100 {
            anyhow::bail!("{label} score must be within 0..=100: {score}");
        }
    }
    Ok(())
}

fn log_document(document: &StructuredDocument) {
    tracing::info!(
        content_type = %document.metadata.content_type,
        sections = document.sections.len(),
        key_points = document.key_points.len(),
        word_count = document.metadata.word_count,
        used_fallback = document.metadata.used_fallback,
        "structured content"
    );
}
