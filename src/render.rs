use anyhow::Context as _;
use pulldown_cmark::{Event, Options, Parser};
use serde::Serialize;

use crate::formats::StructuredDocument;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FrontMatter<'a> {
    title: &'a str,
    content_type: &'a str,
    generated_at: String,
    word_count: usize,
    reading_time_minutes: usize,
    used_fallback: bool,
}

pub fn to_json(doc: &StructuredDocument) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(doc).context("serialize document json")?;
    json.push('\n');
    Ok(json)
}

/// Markdown with YAML front matter carrying the metadata.
pub fn to_markdown(doc: &StructuredDocument) -> anyhow::Result<String> {
    let front = FrontMatter {
        title: &doc.title,
        content_type: &doc.metadata.content_type,
        generated_at: doc.metadata.generated_at.to_rfc3339(),
        word_count: doc.metadata.word_count,
        reading_time_minutes: doc.metadata.reading_time_minutes,
        used_fallback: doc.metadata.used_fallback,
    };
    let yaml = serde_yaml::to_string(&front).context("serialize front matter")?;
    Ok(format!("---\n{yaml}---\n\n{}", markdown_body(doc)))
}

fn markdown_body(doc: &StructuredDocument) -> String {
    let mut blocks = vec![format!("# {}", doc.title)];
    if !doc.summary.trim().is_empty() {
        blocks.push(doc.summary.clone());
    }
    if !doc.key_points.is_empty() {
        blocks.push("## Key Points".to_owned());
        blocks.push(
            doc.key_points
                .iter()
                .map(|p| format!("- {p}"))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }
    for section in &doc.sections {
        blocks.push(format!("## {}", section.title));
        if !section.content.trim().is_empty() {
            blocks.push(section.content.clone());
        }
    }
    blocks.push("## Conclusion".to_owned());
    blocks.push(doc.conclusion.clone());

    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

pub fn to_html(doc: &StructuredDocument) -> String {
    let body = markdown_body(doc);
    // Raw HTML in generated text is shown as text, never passed through.
    let parser = Parser::new_ext(&body, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            event => event,
        });
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{html}</body>\n</html>\n",
        escape_html(&doc.title)
    )
}

pub fn to_csv(doc: &StructuredDocument) -> String {
    let mut rows = vec![["kind", "title", "content"].map(str::to_owned)];
    rows.push(["title".to_owned(), doc.title.clone(), String::new()]);
    rows.push(["summary".to_owned(), String::new(), doc.summary.clone()]);
    for point in &doc.key_points {
        rows.push(["key_point".to_owned(), String::new(), point.clone()]);
    }
    for section in &doc.sections {
        rows.push([
            "section".to_owned(),
            section.title.clone(),
            section.content.clone(),
        ]);
    }
    rows.push(["conclusion".to_owned(), String::new(), doc.conclusion.clone()]);

    rows.iter()
        .map(|row| {
            let mut line = row.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(",");
            line.push('\n');
            line
        })
        .collect()
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
