use crate::{progress::normalize_phrase_str, CoreError, Phrase};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;

const BUILTIN: &str = include_str!("../data/phrases.json");

/// The bundled 100-phrase Arabic starter set.
pub fn builtin_phrases() -> Vec<Phrase> {
    parse_phrases(BUILTIN).unwrap_or_default()
}

pub fn load_phrases(path: &Path) -> Result<Vec<Phrase>, CoreError> {
    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CoreError::NotFound("phrase file not found"),
        ErrorKind::PermissionDenied => CoreError::Storage("phrase file not readable: permission denied"),
        ErrorKind::InvalidData => CoreError::Parse("phrase file is not valid UTF-8"),
        _ => CoreError::Storage("phrase file could not be read"),
    })?;
    parse_phrases(&text)
}

/// Parses a phrase list; ids must already be canonical (`p001`) and unique.
pub fn parse_phrases(text: &str) -> Result<Vec<Phrase>, CoreError> {
    let items: Vec<Phrase> =
        serde_json::from_str(text).map_err(|_| CoreError::Parse("phrase list is not valid JSON"))?;
    let mut seen = HashSet::new();
    for p in &items {
        if normalize_phrase_str(&p.id).as_deref() != Some(p.id.as_str()) {
            return Err(CoreError::Validation("phrase id must look like p001"));
        }
        if !seen.insert(p.id.as_str()) {
            return Err(CoreError::Validation("duplicate phrase id"));
        }
    }
    Ok(items)
}

/// Distinct topics in first-appearance order.
pub fn topics(items: &[Phrase]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for p in items {
        if !out.iter().any(|t| t == &p.topic) {
            out.push(p.topic.clone());
        }
    }
    out
}

pub fn filter_by_topic(items: &[Phrase], topic: &str) -> Vec<Phrase> {
    let q = topic.trim().to_lowercase();
    items
        .iter()
        .filter(|p| p.topic.to_lowercase() == q)
        .cloned()
        .collect()
}
