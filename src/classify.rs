//! Line and paragraph classification for generated text.
//!
//! Each predicate inspects a single line and either tags it or declines. The
//! order in which they are tried lives in [`header`] and [`list_item`].

const TITLE_CASE_MAX_CHARS: usize = 60;
const BULLET_MARKERS: [char; 3] = ['•', '-', '*'];
const ROMAN_DIGITS: &str = "IVXLCDM";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderTag<'a> {
    /// `## Recommendations`
    Heading(&'a str),
    /// `1. Introduction`
    Numbered(&'a str),
    /// `IV. Findings`
    Roman(&'a str),
    /// `Key Findings:`
    TitleCase(&'a str),
}

impl<'a> HeaderTag<'a> {
    pub fn title(&self) -> &'a str {
        match self {
            Self::Heading(title)
            | Self::Numbered(title)
            | Self::Roman(title)
            | Self::TitleCase(title) => title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListTag<'a> {
    Bullet(&'a str),
    Numbered(&'a str),
}

impl<'a> ListTag<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            Self::Bullet(text) | Self::Numbered(text) => text,
        }
    }
}

type HeaderPredicate = for<'a> fn(&'a str) -> Option<HeaderTag<'a>>;

/// Predicates that only apply to single-line paragraphs, in priority order.
const SINGLE_LINE_HEADERS: [HeaderPredicate; 3] = [numbered_section, roman_section, title_case];

/// Tags a paragraph as a section header.
///
/// A Markdown heading on the first line always wins; the remaining shapes only
/// count when the paragraph is a single line.
pub fn header(paragraph: &str) -> Option<HeaderTag<'_>> {
    let paragraph = paragraph.trim();
    let mut lines = paragraph.lines();
    let first = lines.next()?;

    if let Some(title) = heading(first) {
        return Some(HeaderTag::Heading(title));
    }
    if lines.next().is_some() {
        return None;
    }

    SINGLE_LINE_HEADERS
        .iter()
        .find_map(|predicate| predicate(first))
}

pub fn list_item(line: &str) -> Option<ListTag<'_>> {
    bullet(line)
        .map(ListTag::Bullet)
        .or_else(|| numbered_item(line).map(ListTag::Numbered))
}

/// Text of a Markdown ATX heading (`#` through `######` style, any depth).
pub fn heading(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let rest = trimmed.trim_start_matches('#');
    if rest.len() == trimmed.len() {
        return None;
    }
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let title = strip_trailing_colon(rest.trim().trim_end_matches('#').trim());
    (!title.is_empty()).then_some(title)
}

/// Text before the colon of a line such as `Key findings:`.
pub fn colon_label(line: &str) -> Option<&str> {
    let label = line.trim().strip_suffix(':')?.trim();
    (!label.is_empty()).then_some(label)
}

pub fn bullet(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let marker = trimmed.chars().next()?;
    if !BULLET_MARKERS.contains(&marker) {
        return None;
    }

    let rest = &trimmed[marker.len_utf8()..];
    // `-`/`*` need a space so rules (`---`) and emphasis (`**bold**`) are left alone.
    if marker != '•' && !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let text = rest.trim();
    (!text.is_empty()).then_some(text)
}

pub fn numbered_item(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    after_enumerator(&trimmed[digits..])
}

fn numbered_section(line: &str) -> Option<HeaderTag<'_>> {
    let text = numbered_item(line)?;
    starts_uppercase(text).then(|| HeaderTag::Numbered(strip_trailing_colon(text)))
}

fn roman_section(line: &str) -> Option<HeaderTag<'_>> {
    let trimmed = line.trim();
    let numeral = trimmed
        .chars()
        .take_while(|c| ROMAN_DIGITS.contains(*c))
        .count();
    if numeral == 0 {
        return None;
    }

    let text = after_enumerator(&trimmed[numeral..])?;
    starts_uppercase(text).then(|| HeaderTag::Roman(strip_trailing_colon(text)))
}

fn title_case(line: &str) -> Option<HeaderTag<'_>> {
    let trimmed = line.trim();
    if trimmed.chars().count() >= TITLE_CASE_MAX_CHARS
        || trimmed.contains('.')
        || !starts_uppercase(trimmed)
    {
        return None;
    }

    let title = strip_trailing_colon(trimmed);
    (!title.is_empty()).then_some(HeaderTag::TitleCase(title))
}

/// Expects `. Text` after a numeral and returns `Text`.
fn after_enumerator(rest: &str) -> Option<&str> {
    let rest = rest.strip_prefix('.')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = rest.trim();
    (!text.is_empty()).then_some(text)
}

fn starts_uppercase(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_uppercase)
}

fn strip_trailing_colon(text: &str) -> &str {
    text.strip_suffix(':').map_or(text, str::trim_end)
}
