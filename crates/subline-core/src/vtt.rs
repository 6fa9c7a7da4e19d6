//! WebVTT cue parsing and serialization.
//!
//! The parser is deliberately lenient: it never fails, and lines that look
//! almost like a timing line are kept as cue text. Callers that need strict
//! timestamps run [`validate_segments`] on the result.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::{Result, SublineError};

const HEADER: &str = "WEBVTT";

fn timing_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(\d{2}:\d{2}:\d{2}\.\d{3})\s*-->\s*(\d{2}:\d{2}:\d{2}\.\d{3})(?:\s.*)?$")
            .expect("valid regex")
    })
}

fn timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{2}:([0-5]\d):([0-5]\d)\.\d{3}$").expect("valid regex"))
}

// ---------------------------------------------------------------------------
// Segment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
}

impl Segment {
    pub fn new(
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: end_time.into(),
            text: text.into(),
            translated_text: None,
        }
    }

    /// Text that should appear in a built document: the translation when one
    /// is present and non-empty, otherwise the source text.
    pub fn display_text(&self) -> &str {
        match self.translated_text.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => &self.text,
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn is_cue_number(line: &str) -> bool {
    !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a WebVTT document into segments in file order.
pub fn parse(document: &str) -> Vec<Segment> {
    let normalized = document.replace("\r\n", "\n").replace('\r', "\n");
    let mut segments = Vec::new();
    let mut open: Option<Segment> = None;

    for (i, raw) in normalized.split('\n').enumerate() {
        let raw = if i == 0 {
            raw.trim_start_matches('\u{FEFF}')
        } else {
            raw
        };
        // Trimmed only to classify the line; cue text is kept as written.
        let line = raw.trim();

        if line.is_empty() {
            if let Some(seg) = open.take() {
                segments.push(seg);
            }
            continue;
        }
        if line == HEADER || is_cue_number(line) {
            continue;
        }

        if let Some(caps) = timing_re().captures(line) {
            if let Some(seg) = open.take() {
                segments.push(seg);
            }
            open = Some(Segment::new(&caps[1], &caps[2], ""));
            continue;
        }

        if let Some(seg) = open.as_mut() {
            if !seg.text.is_empty() {
                seg.text.push('\n');
            }
            seg.text.push_str(raw);
        }
    }

    if let Some(seg) = open.take() {
        segments.push(seg);
    }

    tracing::debug!(count = segments.len(), "parsed vtt document");
    segments
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// Serialize segments into a WebVTT document without cue numbers.
///
/// `translations` overrides the text of individual segments by index.
pub fn build(segments: &[Segment], translations: &HashMap<usize, String>) -> String {
    render(segments, translations, false)
}

/// Like [`build`], but emits `index + 1` on its own line before each cue.
pub fn build_numbered(segments: &[Segment], translations: &HashMap<usize, String>) -> String {
    render(segments, translations, true)
}

fn render(segments: &[Segment], translations: &HashMap<usize, String>, numbered: bool) -> String {
    let cues: Vec<String> = segments
        .iter()
        .enumerate()
        .map(|(i, seg)| {
            let text = translations
                .get(&i)
                .map(String::as_str)
                .unwrap_or_else(|| seg.display_text());
            let timing = format!("{} --> {}", seg.start_time, seg.end_time);
            match (numbered, text.is_empty()) {
                (true, true) => format!("{}\n{timing}", i + 1),
                (true, false) => format!("{}\n{timing}\n{text}", i + 1),
                (false, true) => timing,
                (false, false) => format!("{timing}\n{text}"),
            }
        })
        .collect();

    let mut out = format!("{HEADER}\n\n");
    if !cues.is_empty() {
        out.push_str(&cues.join("\n\n"));
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// Editing and validation
// ---------------------------------------------------------------------------

/// Set the translated text of the segment at `index`.
pub fn set_translation(segments: &mut [Segment], index: usize, text: impl Into<String>) -> Result<()> {
    let seg = segments
        .get_mut(index)
        .ok_or(SublineError::SegmentNotFound(index))?;
    seg.translated_text = Some(text.into());
    Ok(())
}

pub fn is_valid_timestamp(ts: &str) -> bool {
    timestamp_re().is_match(ts)
}

/// Strict check: well-formed `HH:MM:SS.mmm` timestamps and `start < end`.
pub fn validate_segments(segments: &[Segment]) -> Result<()> {
    for (index, seg) in segments.iter().enumerate() {
        for ts in [&seg.start_time, &seg.end_time] {
            if !is_valid_timestamp(ts) {
                return Err(SublineError::InvalidSegment {
                    index,
                    reason: format!("malformed timestamp '{ts}'"),
                });
            }
        }
        // Fixed-width timestamps order lexicographically.
        if seg.start_time >= seg.end_time {
            return Err(SublineError::InvalidSegment {
                index,
                reason: format!("start {} is not before end {}", seg.start_time, seg.end_time),
            });
        }
    }
    Ok(())
}
