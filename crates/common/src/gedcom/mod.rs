//! GEDCOM text handling
//!
//! Records are stored as raw GEDCOM blobs. This module splits a blob into
//! its level-1 facts and answers the small set of questions the record
//! layer asks of them: tag, value, pointer target, nested values.

mod fact;

pub use fact::Fact;

use regex_lite::Regex;
use std::sync::OnceLock;

/// Characters allowed in an xref, without the surrounding `@`.
pub const XREF_PATTERN: &str = "[A-Za-z0-9:_.-]+";

fn xref_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!("^{}$", XREF_PATTERN)).expect("valid xref pattern"))
}

fn pointer_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!("^@({})@$", XREF_PATTERN)).expect("valid pointer pattern")
    })
}

fn embedded_pointer_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?m)^\d+ ([A-Z0-9_]+) @({})@$", XREF_PATTERN))
            .expect("valid embedded pointer pattern")
    })
}

/// Is `value` a bare xref such as `I123`?
pub fn is_valid_xref(value: &str) -> bool {
    xref_regex().is_match(value)
}

/// The xref inside a pointer value such as `@I123@`.
pub fn pointer_target(value: &str) -> Option<&str> {
    pointer_regex()
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// One parsed line: `LEVEL [@XREF@ ]TAG[ VALUE]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GedcomLine<'a> {
    pub level: u8,
    pub xref: Option<&'a str>,
    pub tag: &'a str,
    pub value: &'a str,
}

impl<'a> GedcomLine<'a> {
    /// Parse a single line, returning `None` for anything malformed.
    pub fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim_end_matches('\r');
        let (level, rest) = line.split_once(' ')?;
        let level = level.parse::<u8>().ok()?;

        let (xref, rest) = match rest.strip_prefix('@') {
            Some(after) => {
                let (xref, rest) = after.split_once("@ ")?;
                (Some(xref), rest)
            }
            None => (None, rest),
        };

        let (tag, value) = match rest.split_once(' ') {
            Some((tag, value)) => (tag, value),
            None => (rest, ""),
        };

        if tag.is_empty() {
            return None;
        }

        Some(Self { level, xref, tag, value })
    }
}

/// Identity of a record taken from its level-0 line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub xref: String,
    pub tag: String,
    pub value: String,
}

/// Parse the `0 @XREF@ TAG` line that starts every record.
pub fn parse_header(gedcom: &str) -> Option<RecordHeader> {
    let first = gedcom.lines().next()?;
    let line = GedcomLine::parse(first)?;

    if line.level != 0 {
        return None;
    }

    Some(RecordHeader {
        xref: line.xref?.to_string(),
        tag: line.tag.to_string(),
        value: line.value.to_string(),
    })
}

/// Split a record into its level-1 facts, in document order.
pub fn split_facts(gedcom: &str) -> Vec<Fact> {
    let mut facts = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for raw in gedcom.lines().skip(1) {
        if raw.starts_with("1 ") && !current.is_empty() {
            if let Some(fact) = Fact::from_lines(&current) {
                facts.push(fact);
            }
            current.clear();
        }
        if raw.starts_with("1 ") || !current.is_empty() {
            current.push(raw);
        }
    }

    if let Some(fact) = Fact::from_lines(&current) {
        facts.push(fact);
    }

    facts
}

/// All `(tag, xref)` pointers found anywhere in a record. These are the rows
/// the link table holds for the record.
pub fn extract_pointers(gedcom: &str) -> Vec<(String, String)> {
    let mut pointers: Vec<(String, String)> = Vec::new();

    for caps in embedded_pointer_regex().captures_iter(gedcom) {
        let pair = (caps[1].to_string(), caps[2].to_string());
        if !pointers.contains(&pair) {
            pointers.push(pair);
        }
    }

    pointers
}

/// Join a value with its `CONT`/`CONC` continuation lines.
pub(crate) fn continued_text<'a>(first: &str, lines: impl Iterator<Item = GedcomLine<'a>>, level: u8) -> String {
    let mut text = first.to_string();

    for line in lines {
        if line.level != level {
            continue;
        }
        match line.tag {
            "CONT" => {
                text.push('\n');
                text.push_str(line.value);
            }
            "CONC" => text.push_str(line.value),
            _ => {}
        }
    }

    text
}

/// Value of the level-0 line plus its continuations, e.g. the text of a
/// shared `NOTE` record.
pub fn record_text(gedcom: &str) -> String {
    let header = gedcom.lines().next().and_then(GedcomLine::parse);
    let first = header.map(|line| line.value).unwrap_or("");
    continued_text(first, gedcom.lines().skip(1).filter_map(GedcomLine::parse), 1)
}
