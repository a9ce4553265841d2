use std::io::Write as _;
use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::Context as _;

use crate::cli::LlmEngine;
use crate::content_type::profile_for;
use crate::formats::SiteAnalysis;
use crate::openai::{self, OpenAiConfig};
use crate::prompt::Prompt;

const HTTP_TIMEOUT: Duration = Duration::from_secs(300);
const RETRY_BACKOFF: Duration = Duration::from_millis(500);
const LOW_SCORE: u8 = 60;

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub engine: LlmEngine,
    pub content_type: String,
    pub tone: String,
    pub command: Option<String>,
    pub command_args: Vec<String>,
    pub retries: usize,
}

/// Produces raw generated text for the prompt with the selected engine.
pub async fn generate_text(
    options: &EngineOptions,
    analysis: &SiteAnalysis,
    prompt: &Prompt,
) -> anyhow::Result<String> {
    let text = match options.engine {
        LlmEngine::Noop => draft_from_analysis(analysis, &options.content_type),
        LlmEngine::Command => {
            let options = options.clone();
            let prompt = prompt.clone();
            tokio::task::spawn_blocking(move || generate_via_command(&options, &prompt))
                .await
                .context("join generation command task")??
        }
        LlmEngine::Openai => generate_via_openai(prompt, options.retries).await?,
    };

    if text.trim().is_empty() {
        anyhow::bail!("generation output is empty");
    }
    Ok(text)
}

fn generate_via_command(options: &EngineOptions, prompt: &Prompt) -> anyhow::Result<String> {
    let Some(program) = options.command.as_deref() else {
        anyhow::bail!("missing --command (required when --engine=command)");
    };

    tracing::info!(engine = "command", command = program, "generate content");

    let mut child = Command::new(program)
        .args(&options.command_args)
        .env("SITEINSIGHT_CONTENT_TYPE", &options.content_type)
        .env("SITEINSIGHT_TONE", &options.tone)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .with_context(|| format!("spawn generation command: {program}"))?;

    {
        let mut stdin = child.stdin.take().context("open generation command stdin")?;
        stdin
            .write_all(prompt.combined().as_bytes())
            .context("write generation command stdin")?;
    }

    let output = child
        .wait_with_output()
        .context("wait generation command")?;
    if !output.status.success() {
        anyhow::bail!("generation command failed: {program} ({})", output.status);
    }

    String::from_utf8(output.stdout).context("generation command stdout is not valid UTF-8")
}

async fn generate_via_openai(prompt: &Prompt, retries: usize) -> anyhow::Result<String> {
    let config = OpenAiConfig::from_env().context("load openai config")?;
    let client = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("build http client")?;

    tracing::info!(
        engine = "openai",
        model = %config.model,
        endpoint = %config.responses_endpoint(),
        "generate content"
    );

    let attempts = retries.saturating_add(1);
    let mut last_failure: Option<anyhow::Error> = None;
    for attempt in 1..=attempts {
        match openai::responses_text(&client, &config, &prompt.instructions, &prompt.input).await {
            Ok(text) => return Ok(text),
            Err(err) => {
                tracing::warn!(
                    engine = "openai",
                    attempt = attempt,
                    attempts = attempts,
                    error = %format!("{err:#}"),
                    "generation attempt failed"
                );
                last_failure = Some(err);
            }
        }
        if attempt < attempts {
            let backoff = RETRY_BACKOFF.saturating_mul(u32::try_from(attempt).unwrap_or(u32::MAX));
            tokio::time::sleep(backoff).await;
        }
    }

    match last_failure {
        Some(err) => Err(err.context(format!("call OpenAI ({attempts} attempts)"))),
        None => anyhow::bail!("call OpenAI: no attempts were made"),
    }
}

/// Offline Markdown draft built only from the analysis facts.
pub fn draft_from_analysis(analysis: &SiteAnalysis, content_type: &str) -> String {
    let profile = profile_for(content_type);
    let subject = analysis
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(analysis.url.as_str());
    let scores = analysis.scores.entries();

    let mut blocks = vec![format!("# {}: {subject}", profile.report_title)];
    for (idx, title) in profile.section_titles.iter().enumerate() {
        blocks.push(format!("## {title}"));
        let body = match idx {
            0 => overview_paragraph(analysis, &scores),
            1 => score_bullets(&scores),
            2 => finding_bullets(&analysis.findings),
            _ => priority_paragraph(&scores),
        };
        blocks.push(body);
    }
    blocks.push(closing_paragraph(analysis, &scores));

    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

fn overview_paragraph(analysis: &SiteAnalysis, scores: &[(&str, u8)]) -> String {
    let mut paragraph = format!(
        "This report reviews {} across {} measured areas.",
        analysis.url,
        scores.len()
    );
    if let Some(provider) = analysis.hosting_provider.as_deref() {
        paragraph.push_str(&format!(" The site is hosted by {provider}."));
    }
    if let Some(carbon) = analysis.carbon_grams_per_view {
        paragraph.push_str(&format!(
            " Each page view emits about {carbon:.2} g of CO2e."
        ));
    }
    paragraph
}

fn score_bullets(scores: &[(&str, u8)]) -> String {
    if scores.is_empty() {
        return "No scores were recorded for this analysis.".to_owned();
    }
    scores
        .iter()
        .map(|(label, score)| format!("- {label} score: {score} out of 100"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn finding_bullets(findings: &[String]) -> String {
    let findings = findings
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .map(|f| format!("- {f}"))
        .collect::<Vec<_>>();
    if findings.is_empty() {
        return "No specific findings were recorded for this analysis.".to_owned();
    }
    findings.join("\n")
}

fn priority_paragraph(scores: &[(&str, u8)]) -> String {
    let weak = scores
        .iter()
        .filter(|(_, score)| *score < LOW_SCORE)
        .map(|(label, _)| label.to_lowercase())
        .collect::<Vec<_>>();
    if weak.is_empty() {
        return "All measured areas are in good shape, so the focus should stay on keeping them there.".to_owned();
    }
    format!(
        "It is important to prioritize {} because those areas scored below {LOW_SCORE}.",
        weak.join(" and ")
    )
}

fn closing_paragraph(analysis: &SiteAnalysis, scores: &[(&str, u8)]) -> String {
    if scores.is_empty() {
        return format!(
            "In summary, {} needs a complete scan before firm recommendations can be made.",
            analysis.url
        );
    }
    let total = scores.iter().map(|(_, s)| u32::from(*s)).sum::<u32>();
    let average = total / u32::try_from(scores.len()).unwrap_or(1).max(1);
    format!(
        "In summary, {} averages {average} out of 100 across the measured areas.",
        analysis.url
    )
}
