use crate::storage::keys::{profile_record, ProfileRecord};
use crate::{QuizStats, Storage, DATA_VERSION};
use serde_json::Value;
use tracing::debug;

/// Largest count a JSON number carries exactly.
pub const MAX_COUNTER: u64 = (1 << 53) - 1;

/// Finite non-negative numbers up to [`MAX_COUNTER`], floored; anything else
/// is zero.
fn counter(value: Option<&Value>) -> u64 {
    let Some(Value::Number(n)) = value else {
        return 0;
    };
    let v = match n.as_u64() {
        Some(v) => v,
        None => match n.as_f64() {
            Some(f) if (0.0..=MAX_COUNTER as f64).contains(&f) => f.floor() as u64,
            _ => 0,
        },
    };
    if v > MAX_COUNTER {
        0
    } else {
        v
    }
}

pub fn normalize(raw: Option<&Value>) -> QuizStats {
    let Some(Value::Object(obj)) = raw else {
        return QuizStats::default();
    };
    QuizStats {
        data_version: obj
            .get("dataVersion")
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(DATA_VERSION),
        total_quizzes: counter(obj.get("totalQuizzes")),
        total_score: counter(obj.get("totalScore")),
        last_score: counter(obj.get("lastScore")),
        last_total: counter(obj.get("lastTotal")),
    }
}

/// Counters add up; the most recent result comes from `imported` only when it
/// recorded a quiz at all.
pub fn merge(existing: &QuizStats, imported: &QuizStats) -> QuizStats {
    let last = if imported.has_result() { imported } else { existing };
    QuizStats {
        data_version: DATA_VERSION,
        total_quizzes: existing.total_quizzes.saturating_add(imported.total_quizzes).min(MAX_COUNTER),
        total_score: existing.total_score.saturating_add(imported.total_score).min(MAX_COUNTER),
        last_score: last.last_score,
        last_total: last.last_total,
    }
}

pub struct QuizStatsStore<'a> {
    storage: &'a Storage,
}

impl<'a> QuizStatsStore<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn load(&self, profile_id: &str) -> QuizStats {
        let key = profile_record(profile_id, ProfileRecord::QuizStats);
        let next = normalize(self.storage.read_document(&key).as_ref());
        self.storage.write(&key, &next);
        next
    }

    pub fn save(&self, profile_id: &str, stats: &QuizStats) -> bool {
        let key = profile_record(profile_id, ProfileRecord::QuizStats);
        let value = serde_json::to_value(stats).ok();
        self.storage.write(&key, &normalize(value.as_ref()))
    }

    /// The only mutator run when a quiz finishes.
    pub fn record_result(&self, profile_id: &str, final_score: u64, total_questions: u64) -> QuizStats {
        let previous = self.load(profile_id);
        let next = QuizStats {
            data_version: DATA_VERSION,
            total_quizzes: previous.total_quizzes.saturating_add(1).min(MAX_COUNTER),
            total_score: previous.total_score.saturating_add(final_score).min(MAX_COUNTER),
            last_score: final_score,
            last_total: total_questions,
        };
        self.save(profile_id, &next);
        debug!(profile_id, final_score, total_questions, "quiz result recorded");
        next
    }
}
