use std::fmt::Write as _;

use crate::content_type::profile_for;
use crate::formats::SiteAnalysis;

pub const ANALYSIS_BEGIN: &str = "BEGIN_SITE_ANALYSIS";
pub const ANALYSIS_END: &str = "END_SITE_ANALYSIS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub instructions: String,
    pub input: String,
}

impl Prompt {
    /// Single-text form for engines that only take one input stream.
    pub fn combined(&self) -> String {
        format!("{}\n\n{}", self.instructions.trim_end(), self.input)
    }
}

pub fn build_prompt(analysis: &SiteAnalysis, content_type: &str, tone: &str) -> Prompt {
    let profile = profile_for(content_type);
    let section_titles = profile
        .section_titles
        .iter()
        .map(|t| format!("  - ## {t}"))
        .collect::<Vec<_>>()
        .join("\n");

    let instructions = format!(
        "You are a web consultant writing for website owners.\n\
\n\
Task: Write a {report_title} (content type: {content_type}) about the website described below.\n\
\n\
Tone: {tone}\n\
\n\
Hard rules:\n\
- Use ONLY the facts in the site analysis. Do not invent numbers.\n\
- Start with a single `#` title line.\n\
- Use these `##` section headings, in this order:\n\
{section_titles}\n\
- Put the most important recommendations in `-` bullet lists.\n\
- Separate paragraphs with a blank line.\n\
- End with a short paragraph that starts with \"In summary\".\n\
\n\
Output:\n\
- Output ONLY the Markdown document.\n",
        report_title = profile.report_title,
        content_type = content_type.trim(),
        tone = tone.trim(),
        section_titles = section_titles,
    );

    Prompt {
        instructions,
        input: format!(
            "{ANALYSIS_BEGIN}\n{}{ANALYSIS_END}\n",
            render_analysis(analysis)
        ),
    }
}

/// Plain-text rendering of the analysis, one fact per line.
pub fn render_analysis(analysis: &SiteAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "URL: {}", analysis.url);
    if let Some(title) = analysis.title.as_deref() {
        let _ = writeln!(out, "Page title: {title}");
    }
    for (label, score) in analysis.scores.entries() {
        let _ = writeln!(out, "{label} score: {score}/100");
    }
    if let Some(carbon) = analysis.carbon_grams_per_view {
        let _ = writeln!(out, "Carbon per page view: {carbon:.2} g CO2e");
    }
    if let Some(provider) = analysis.hosting_provider.as_deref() {
        let _ = writeln!(out, "Hosting provider: {provider}");
    }
    if !analysis.findings.is_empty() {
        let _ = writeln!(out, "Findings:");
        for finding in &analysis.findings {
            let _ = writeln!(out, "- {}", finding.trim());
        }
    }
    out
}
