//! Turns free-form generated text into a [`StructuredDocument`].
//!
//! Structuring never fails: text that cannot be segmented, and any internal
//! fault while segmenting, yields a degraded document with the same shape and
//! `metadata.used_fallback` set.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::classify::{self, ListTag};
use crate::content_type::{ContentProfile, profile_for};
use crate::formats::{DocumentMetadata, Section, StructuredDocument};

pub const SUMMARY_MAX_CHARS: usize = 150;
const SUMMARY_WORD_BUDGET: usize = 147;
const SUMMARY_PARAGRAPHS: usize = 3;

pub const KEY_POINTS_MAX: usize = 8;
pub const KEY_POINT_MAX_CHARS: usize = 100;
const KEY_POINT_TRUNCATED_CHARS: usize = 97;
const KEY_POINT_MIN_CHARS: usize = 10;
const KEY_POINT_FALLBACK_PARAGRAPHS: usize = 5;

const WORDS_PER_MINUTE: usize = 200;
const ELLIPSIS: &str = "...";

const CONCLUSION_MARKERS: [&str; 6] = [
    "conclusion",
    "summary",
    "finally",
    "in summary",
    "to conclude",
    "overall",
];

pub const GENERIC_CONCLUSION: &str = "This analysis provides comprehensive insights and recommendations based on the evaluated data and criteria.";
pub const FALLBACK_SECTION_TITLE: &str = "Analysis";
const FALLBACK_KEY_POINTS: [&str; 2] = [
    "Comprehensive analysis completed for the submitted content",
    "Recommendations are based on the evaluated data and criteria",
];

static PARAGRAPH_BREAK: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| Regex::new(r"\n\s*\n"));
/// A terminator run only ends a sentence when whitespace or the end of text follows.
static SENTENCE_END: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"[.!?]+(?:\s+|$)"));
static KEY_POINT_KEYWORD: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(r"(?i)\b(important|key|significant|critical|essential|crucial|vital)\b")
});

fn pattern(lazy: &'static Lazy<Result<Regex, regex::Error>>) -> anyhow::Result<&'static Regex> {
    lazy.as_ref()
        .map_err(|err| anyhow::anyhow!("compile text pattern: {err}"))
}

pub fn structure(raw_content: &str, content_type: &str) -> StructuredDocument {
    let trimmed = raw_content.trim();

    match try_structure(trimmed, content_type) {
        Ok(Some(document)) => document,
        Ok(None) => {
            tracing::debug!(content_type, "no paragraphs in content; using fallback document");
            fallback_document(trimmed, content_type)
        }
        Err(err) => {
            tracing::warn!(
                content_type,
                error = %format!("{err:#}"),
                "structuring failed; using fallback document"
            );
            fallback_document(trimmed, content_type)
        }
    }
}

fn try_structure(trimmed: &str, content_type: &str) -> anyhow::Result<Option<StructuredDocument>> {
    let paragraphs = split_paragraphs(trimmed)?;
    let Some(first) = paragraphs.first() else {
        return Ok(None);
    };
    let profile = profile_for(content_type);

    let sections = match segment_sections(&paragraphs, profile) {
        sections if sections.is_empty() => vec![Section {
            title: FALLBACK_SECTION_TITLE.to_owned(),
            content: paragraphs.join("\n\n"),
        }],
        sections => sections,
    };

    Ok(Some(StructuredDocument {
        title: extract_title(first, profile)?,
        summary: summarize(&paragraphs),
        key_points: extract_key_points(&paragraphs)?,
        sections,
        conclusion: derive_conclusion(&paragraphs),
        metadata: metadata(trimmed, content_type, false),
    }))
}

fn split_paragraphs(text: &str) -> anyhow::Result<Vec<&str>> {
    Ok(pattern(&PARAGRAPH_BREAK)?
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect())
}

fn extract_title(first_paragraph: &str, profile: &ContentProfile) -> anyhow::Result<String> {
    let labelled = first_paragraph
        .lines()
        .find_map(classify::heading)
        .or_else(|| first_paragraph.lines().find_map(classify::colon_label));
    if let Some(label) = labelled {
        return Ok(label.to_owned());
    }

    Ok(leading_sentence(first_paragraph)?
        .unwrap_or_else(|| profile.report_title.to_owned()))
}

/// `Uppercase start ... [.!?]` at the very beginning of the paragraph.
fn leading_sentence(paragraph: &str) -> anyhow::Result<Option<String>> {
    if !paragraph.chars().next().is_some_and(char::is_uppercase) {
        return Ok(None);
    }
    let Some(end) = pattern(&SENTENCE_END)?.find(paragraph) else {
        return Ok(None);
    };
    let terminated = &paragraph[..end.start() + end.as_str().trim_end().len()];
    Ok(Some(collapse_whitespace(terminated)))
}

/// Sentences of `text`, each keeping its terminators.
fn sentences(text: &str) -> anyhow::Result<Vec<&str>> {
    let mut found = Vec::new();
    let mut start = 0;
    for end in pattern(&SENTENCE_END)?.find_iter(text) {
        found.push(text[start..end.end()].trim());
        start = end.end();
    }
    found.push(text[start..].trim());
    found.retain(|s| !s.is_empty());
    Ok(found)
}

fn summarize(paragraphs: &[&str]) -> String {
    let joined = paragraphs
        .iter()
        .take(SUMMARY_PARAGRAPHS)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    if joined.chars().count() <= SUMMARY_MAX_CHARS {
        return joined;
    }

    let mut summary = String::new();
    let mut summary_chars = 0usize;
    for word in joined.split_whitespace() {
        let word_chars = word.chars().count();
        let next_chars = if summary.is_empty() {
            word_chars
        } else {
            summary_chars + 1 + word_chars
        };
        if next_chars > SUMMARY_WORD_BUDGET {
            break;
        }
        if !summary.is_empty() {
            summary.push(' ');
        }
        summary.push_str(word);
        summary_chars = next_chars;
    }
    summary.push_str(ELLIPSIS);
    summary
}

fn extract_key_points(paragraphs: &[&str]) -> anyhow::Result<Vec<String>> {
    let keyword = pattern(&KEY_POINT_KEYWORD)?;

    let mut found: Vec<String> = Vec::new();
    for paragraph in paragraphs {
        let items = paragraph
            .lines()
            .filter_map(classify::list_item)
            .collect::<Vec<_>>();
        found.extend(
            items
                .iter()
                .filter(|item| matches!(item, ListTag::Bullet(_)))
                .map(|item| item.text().to_owned()),
        );
        found.extend(
            items
                .iter()
                .filter(|item| matches!(item, ListTag::Numbered(_)))
                .map(|item| item.text().to_owned()),
        );

        let prose = prose_lines(paragraph);
        found.extend(
            sentences(&prose)?
                .into_iter()
                .filter(|s| keyword.is_match(s))
                .map(str::to_owned),
        );
    }

    if found.is_empty() {
        tracing::debug!("no explicit key points; using first sentences");
        for paragraph in paragraphs.iter().take(KEY_POINT_FALLBACK_PARAGRAPHS) {
            let prose = prose_lines(paragraph);
            if let Some(first) = sentences(&prose)?.first() {
                found.push((*first).to_owned());
            }
        }
    }

    Ok(finalize_key_points(found))
}

/// Lines that are neither list items nor headings, joined into one line.
fn prose_lines(paragraph: &str) -> String {
    paragraph
        .lines()
        .filter(|line| classify::list_item(line).is_none() && classify::heading(line).is_none())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn finalize_key_points(candidates: Vec<String>) -> Vec<String> {
    let mut points: Vec<String> = Vec::new();
    for candidate in candidates {
        if points.len() == KEY_POINTS_MAX {
            break;
        }
        let point = collapse_whitespace(&candidate);
        if point.chars().count() <= KEY_POINT_MIN_CHARS {
            continue;
        }
        let point = truncate_with_ellipsis(&point, KEY_POINT_MAX_CHARS, KEY_POINT_TRUNCATED_CHARS);
        if !points.contains(&point) {
            points.push(point);
        }
    }
    points
}

/// Left fold over paragraphs; the open section is flushed by [`SectionFold::finish`].
#[derive(Debug, Default)]
struct SectionFold {
    closed: Vec<Section>,
    open: Option<Section>,
}

impl SectionFold {
    fn step(mut self, paragraph: &str, profile: &ContentProfile) -> Self {
        match classify::header(paragraph) {
            Some(tag) => {
                self.closed.extend(self.open.take());
                let title = tag.title().to_owned();
                let content = paragraph
                    .trim()
                    .split_once('\n')
                    .map(|(_, rest)| rest.trim().to_owned())
                    .unwrap_or_default();
                self.open = Some(Section { title, content });
            }
            None => {
                let index = self.closed.len();
                let section = self.open.get_or_insert_with(|| Section {
                    title: profile.section_title(index),
                    content: String::new(),
                });
                if !section.content.is_empty() {
                    section.content.push_str("\n\n");
                }
                section.content.push_str(paragraph);
            }
        }
        self
    }

    fn finish(mut self) -> Vec<Section> {
        self.closed.extend(self.open.take());
        self.closed
    }
}

fn segment_sections(paragraphs: &[&str], profile: &ContentProfile) -> Vec<Section> {
    paragraphs
        .iter()
        .fold(SectionFold::default(), |fold, paragraph| {
            fold.step(paragraph, profile)
        })
        .finish()
}

fn derive_conclusion(paragraphs: &[&str]) -> String {
    let Some(last) = paragraphs.last() else {
        return GENERIC_CONCLUSION.to_owned();
    };
    let lowered = last.to_lowercase();
    if CONCLUSION_MARKERS.iter().any(|m| lowered.contains(m)) {
        (*last).to_owned()
    } else {
        GENERIC_CONCLUSION.to_owned()
    }
}

fn metadata(trimmed: &str, content_type: &str, used_fallback: bool) -> DocumentMetadata {
    let word_count = trimmed.split_whitespace().count();
    DocumentMetadata {
        word_count,
        reading_time_minutes: word_count.div_ceil(WORDS_PER_MINUTE),
        content_type: content_type.to_owned(),
        generated_at: Utc::now(),
        used_fallback,
    }
}

fn fallback_document(trimmed: &str, content_type: &str) -> StructuredDocument {
    StructuredDocument {
        title: fallback_title(content_type),
        summary: truncate_with_ellipsis(trimmed, SUMMARY_MAX_CHARS, SUMMARY_WORD_BUDGET),
        key_points: FALLBACK_KEY_POINTS.iter().map(|p| (*p).to_owned()).collect(),
        sections: vec![Section {
            title: FALLBACK_SECTION_TITLE.to_owned(),
            content: trimmed.to_owned(),
        }],
        conclusion: GENERIC_CONCLUSION.to_owned(),
        metadata: metadata(trimmed, content_type, true),
    }
}

fn fallback_title(content_type: &str) -> String {
    let mut chars = content_type.trim().chars();
    match chars.next() {
        Some(first) => format!("{}{} Analysis", first.to_uppercase(), chars.as_str()),
        None => "Content Analysis".to_owned(),
    }
}

fn truncate_with_ellipsis(text: &str, max_chars: usize, keep_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let mut out = text.chars().take(keep_chars).collect::<String>();
    out.push_str(ELLIPSIS);
    out
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
