use std::collections::HashMap;

use axum::Json;
use subline_core::vtt::{self, Segment};
use subline_core::SublineError;

use crate::error::AppError;

#[derive(serde::Deserialize)]
pub struct ParseBody {
    pub content: String,
}

/// POST /api/vtt/parse — split a WebVTT document into segments.
pub async fn parse_vtt(Json(body): Json<ParseBody>) -> Result<Json<serde_json::Value>, AppError> {
    let segments = vtt::parse(&body.content);
    if segments.is_empty() {
        return Err(SublineError::NoSegments.into());
    }
    Ok(Json(serde_json::json!({
        "count": segments.len(),
        "segments": segments,
    })))
}

#[derive(serde::Deserialize)]
pub struct BuildBody {
    pub segments: Vec<Segment>,
    /// Per-index text overrides. JSON object keys are segment indices.
    #[serde(default)]
    pub translations: HashMap<usize, String>,
    #[serde(default)]
    pub numbered: bool,
}

/// POST /api/vtt/build — serialize segments back into a WebVTT document.
pub async fn build_vtt(Json(body): Json<BuildBody>) -> Result<Json<serde_json::Value>, AppError> {
    vtt::validate_segments(&body.segments)?;
    let content = render(&body.segments, &body.translations, body.numbered);
    Ok(Json(serde_json::json!({ "content": content })))
}

#[derive(serde::Deserialize)]
pub struct TranslateBody {
    pub content: String,
    pub index: usize,
    pub text: String,
    #[serde(default)]
    pub numbered: bool,
}

/// POST /api/vtt/translate — set one segment's translation and rebuild.
pub async fn translate_segment(
    Json(body): Json<TranslateBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut segments = vtt::parse(&body.content);
    if segments.is_empty() {
        return Err(SublineError::NoSegments.into());
    }
    vtt::set_translation(&mut segments, body.index, body.text)?;
    let content = render(&segments, &HashMap::new(), body.numbered);
    Ok(Json(serde_json::json!({
        "content": content,
        "segments": segments,
    })))
}

fn render(segments: &[Segment], translations: &HashMap<usize, String>, numbered: bool) -> String {
    if numbered {
        vtt::build_numbered(segments, translations)
    } else {
        vtt::build(segments, translations)
    }
}
