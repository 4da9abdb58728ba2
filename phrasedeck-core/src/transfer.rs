use crate::{progress, quiz_stats, CoreError, LearnProgress, Phrase, Profile, QuizStats, DATA_VERSION};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileRef {
    pub id: String,
    pub name: String,
}

/// Portable backup of one profile.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub data_version: u32,
    pub profile: ProfileRef,
    pub learn_progress: LearnProgress,
    pub quiz_stats: QuizStats,
    pub exported_at: DateTime<Utc>,
}

pub fn export(
    profile: &Profile,
    progress: &LearnProgress,
    stats: &QuizStats,
    now: DateTime<Utc>,
) -> ExportDocument {
    ExportDocument {
        data_version: DATA_VERSION,
        profile: ProfileRef {
            id: profile.id.clone(),
            name: profile.name.clone(),
        },
        learn_progress: progress.clone(),
        quiz_stats: *stats,
        exported_at: now,
    }
}

/// `arabic-learner-<name>-<date>.json`, whitespace runs in the name become `-`.
pub fn export_filename(profile_name: &str, today: &str) -> String {
    let mut safe = String::new();
    let mut in_space = false;
    for c in profile_name.chars() {
        if c.is_whitespace() {
            if !in_space {
                safe.push('-');
            }
            in_space = true;
        } else {
            safe.extend(c.to_lowercase());
            in_space = false;
        }
    }
    format!("arabic-learner-{safe}-{today}.json")
}

/// A validated-but-untrusted import document. The sections still have to go
/// through normalization before use.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportPayload {
    pub data_version: f64,
    pub profile: Option<Value>,
    pub learn_progress: Option<Value>,
    pub quiz_stats: Option<Value>,
}

impl ImportPayload {
    /// Display name of the exported profile, when the document carries one.
    pub fn profile_name(&self) -> Option<&str> {
        self.profile.as_ref()?.get("name")?.as_str()
    }
}

fn section(obj: &serde_json::Map<String, Value>, key: &str) -> Option<Value> {
    obj.get(key).filter(|v| !v.is_null()).cloned()
}

pub fn parse_import_payload(raw_text: &str) -> Result<ImportPayload, CoreError> {
    if raw_text.trim().is_empty() {
        return Err(CoreError::Parse("Please paste JSON or upload a file first."));
    }

    let parsed: Value = serde_json::from_str(raw_text)
        .map_err(|_| CoreError::Parse("JSON parse failed. Please check formatting."))?;
    let Value::Object(obj) = parsed else {
        return Err(CoreError::Parse("Invalid JSON structure."));
    };

    let data_version = obj
        .get("dataVersion")
        .and_then(Value::as_f64)
        .ok_or(CoreError::Validation("Missing or invalid dataVersion."))?;

    let learn_progress = section(&obj, "learnProgress");
    let quiz_stats = section(&obj, "quizStats");
    if learn_progress.is_none() && quiz_stats.is_none() {
        return Err(CoreError::Validation(
            "Import payload must include learnProgress or quizStats.",
        ));
    }

    Ok(ImportPayload {
        data_version,
        profile: section(&obj, "profile"),
        learn_progress,
        quiz_stats,
    })
}

/// Unions today's studied ids from both sides (a stale side contributes
/// none) and lets imported marks win on collision.
pub fn merge_learn_progress(
    existing: &LearnProgress,
    imported: &LearnProgress,
    items: &[Phrase],
    today: &str,
) -> LearnProgress {
    let todays = |p: &LearnProgress| {
        if p.studied_date == today {
            p.studied_ids.clone()
        } else {
            Vec::new()
        }
    };

    let mut studied_ids = todays(existing);
    for id in todays(imported) {
        if !studied_ids.contains(&id) {
            studied_ids.push(id);
        }
    }

    let mut item_status = existing.item_status.clone();
    item_status.extend(imported.item_status.iter().map(|(k, v)| (k.clone(), *v)));

    progress::migrate(
        &LearnProgress {
            data_version: DATA_VERSION,
            studied_date: today.to_string(),
            studied_ids,
            item_status,
        },
        items,
    )
}

#[derive(Clone, Debug, PartialEq)]
pub struct MergedImport {
    pub learn_progress: LearnProgress,
    pub quiz_stats: QuizStats,
}

/// Normalizes both imported sections (absent ones count as empty) and merges
/// them into the current values.
pub fn apply_import(
    payload: &ImportPayload,
    existing_progress: &LearnProgress,
    existing_stats: &QuizStats,
    items: &[Phrase],
    today: &str,
) -> MergedImport {
    let imported_learn = match &payload.learn_progress {
        Some(raw) => progress::migrate(&progress::normalize(Some(raw), today), items),
        None => LearnProgress::new(today),
    };
    let imported_quiz = match &payload.quiz_stats {
        Some(raw) => quiz_stats::normalize(Some(raw)),
        None => QuizStats::default(),
    };

    MergedImport {
        learn_progress: merge_learn_progress(existing_progress, &imported_learn, items, today),
        quiz_stats: quiz_stats::merge(existing_stats, &imported_quiz),
    }
}
