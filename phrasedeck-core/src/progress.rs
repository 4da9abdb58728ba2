use crate::storage::keys::{profile_record, ProfileRecord};
use crate::{
    ItemStatus, KnowledgeStatus, LearnFilter, LearnProgress, Phrase, PhraseId, SessionCounts,
    Storage, DATA_VERSION,
};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

fn canonical(n: u64) -> Option<PhraseId> {
    (n > 0).then(|| format!("p{n:03}"))
}

/// Canonical `p###` form of `"12"`, `"012"`, `"p12"` or `"P012"`.
pub fn normalize_phrase_str(value: &str) -> Option<PhraseId> {
    let clean = value.trim().to_lowercase();
    let digits = clean.strip_prefix('p').unwrap_or(&clean);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    canonical(digits.parse().ok()?)
}

/// Like [`normalize_phrase_str`], but also accepts positive JSON integers.
pub fn normalize_phrase_id(value: &Value) -> Option<PhraseId> {
    match value {
        Value::Number(n) => canonical(n.as_u64()?),
        Value::String(s) => normalize_phrase_str(s),
        _ => None,
    }
}

fn dedup_ids<I: IntoIterator<Item = PhraseId>>(ids: I) -> Vec<PhraseId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

/// Defensive parse of stored or imported learn progress. Wrong-typed fields
/// fall back to defaults, ids are canonicalized and deduplicated, statuses
/// other than known/unknown are dropped.
pub fn normalize(raw: Option<&Value>, today: &str) -> LearnProgress {
    let Some(Value::Object(obj)) = raw else {
        return LearnProgress::new(today);
    };

    let studied_date = obj
        .get("studiedDate")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| today.to_string());

    let studied_ids = match obj.get("studiedIds") {
        Some(Value::Array(ids)) => dedup_ids(ids.iter().filter_map(normalize_phrase_id)),
        _ => Vec::new(),
    };

    let mut item_status = BTreeMap::new();
    if let Some(Value::Object(map)) = obj.get("itemStatus") {
        for (key, status) in map {
            let id = normalize_phrase_str(key);
            let status = status.as_str().and_then(KnowledgeStatus::parse);
            if let (Some(id), Some(status)) = (id, status) {
                item_status.insert(id, status);
            }
        }
    }

    let data_version = obj
        .get("dataVersion")
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(DATA_VERSION);

    LearnProgress {
        data_version,
        studied_date,
        studied_ids,
        item_status,
    }
}

/// Drops every id the current content set does not know and stamps the
/// current data version.
pub fn migrate(progress: &LearnProgress, items: &[Phrase]) -> LearnProgress {
    let valid: HashSet<&str> = items.iter().map(|p| p.id.as_str()).collect();

    let mut item_status = BTreeMap::new();
    for (key, status) in &progress.item_status {
        if let Some(id) = normalize_phrase_str(key).filter(|id| valid.contains(id.as_str())) {
            item_status.insert(id, *status);
        }
    }

    let studied_ids = dedup_ids(
        progress
            .studied_ids
            .iter()
            .filter_map(|id| normalize_phrase_str(id))
            .filter(|id| valid.contains(id.as_str())),
    );

    LearnProgress {
        data_version: DATA_VERSION,
        studied_date: progress.studied_date.clone(),
        studied_ids,
        item_status,
    }
}

/// Starts a fresh studied list when `progress` belongs to another day.
pub fn roll_over(progress: LearnProgress, today: &str) -> LearnProgress {
    if progress.studied_date == today {
        progress
    } else {
        LearnProgress {
            studied_date: today.to_string(),
            studied_ids: Vec::new(),
            ..progress
        }
    }
}

pub fn item_status(progress: &LearnProgress, item_id: &str) -> ItemStatus {
    progress
        .item_status
        .get(item_id)
        .map(|s| ItemStatus::from(*s))
        .unwrap_or(ItemStatus::Unseen)
}

pub fn mark_status(
    progress: &LearnProgress,
    item_id: &str,
    status: KnowledgeStatus,
    today: &str,
) -> LearnProgress {
    let mut studied_ids = if progress.studied_date == today {
        progress.studied_ids.clone()
    } else {
        Vec::new()
    };
    if !studied_ids.iter().any(|id| id == item_id) {
        studied_ids.push(item_id.to_string());
    }

    let mut item_status = progress.item_status.clone();
    item_status.insert(item_id.to_string(), status);

    LearnProgress {
        data_version: DATA_VERSION,
        studied_date: today.to_string(),
        studied_ids,
        item_status,
    }
}

pub fn filter(items: &[Phrase], progress: &LearnProgress, kind: LearnFilter) -> Vec<Phrase> {
    let want = match kind {
        LearnFilter::All => return items.to_vec(),
        LearnFilter::Unseen => ItemStatus::Unseen,
        LearnFilter::Known => ItemStatus::Known,
        LearnFilter::Unknown => ItemStatus::Unknown,
    };
    items
        .iter()
        .filter(|p| item_status(progress, &p.id) == want)
        .cloned()
        .collect()
}

/// Unseen items first, then items marked unknown. Known items never appear.
pub fn review_queue(items: &[Phrase], progress: &LearnProgress) -> Vec<Phrase> {
    let mut queue = filter(items, progress, LearnFilter::Unseen);
    queue.extend(filter(items, progress, LearnFilter::Unknown));
    queue
}

pub fn session_counts(items: &[Phrase], progress: &LearnProgress, today: &str) -> SessionCounts {
    let mut counts = SessionCounts {
        all: items.len(),
        ..SessionCounts::default()
    };
    for p in items {
        match item_status(progress, &p.id) {
            ItemStatus::Unseen => counts.unseen += 1,
            ItemStatus::Known => counts.known += 1,
            ItemStatus::Unknown => counts.unknown += 1,
        }
    }
    if progress.studied_date == today {
        counts.studied_today = progress.studied_ids.len();
    }
    counts
}

/// Per-profile learn progress persisted under `profile.<id>.learnProgress`.
pub struct LearnProgressStore<'a> {
    storage: &'a Storage,
    items: &'a [Phrase],
}

impl<'a> LearnProgressStore<'a> {
    pub fn new(storage: &'a Storage, items: &'a [Phrase]) -> Self {
        Self { storage, items }
    }

    /// Reads, repairs and writes back the profile's record.
    pub fn load(&self, profile_id: &str) -> LearnProgress {
        let key = profile_record(profile_id, ProfileRecord::LearnProgress);
        let today = self.storage.today_key();
        let raw = self.storage.read_document(&key);
        let parsed = migrate(&normalize(raw.as_ref(), &today), self.items);
        let next = roll_over(parsed, &today);
        self.storage.write(&key, &next);
        debug!(profile_id, marked = next.item_status.len(), "learn progress loaded");
        next
    }

    pub fn save(&self, profile_id: &str, progress: &LearnProgress) -> bool {
        let key = profile_record(profile_id, ProfileRecord::LearnProgress);
        self.storage.write(&key, &migrate(progress, self.items))
    }

    pub fn items(&self) -> &'a [Phrase] {
        self.items
    }
}
