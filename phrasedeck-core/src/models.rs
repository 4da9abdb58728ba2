use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub type PhraseId = String;
pub type ProfileId = String;

pub const DATA_VERSION: u32 = 2;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Phrase {
    pub id: PhraseId,
    pub topic: String,
    pub arabic: String,
    pub transliteration: String,
    pub meaning: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
}

impl Profile {
    pub fn guest() -> Self {
        Self {
            id: "guest".to_string(),
            name: "Guest".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfilesState {
    pub active_profile_id: ProfileId,
    pub profiles: Vec<Profile>,
}

impl Default for ProfilesState {
    fn default() -> Self {
        let guest = Profile::guest();
        Self {
            active_profile_id: guest.id.clone(),
            profiles: vec![guest],
        }
    }
}

impl ProfilesState {
    /// The active profile, or the first one if the active id dangles.
    pub fn active(&self) -> Profile {
        self.profiles
            .iter()
            .find(|p| p.id == self.active_profile_id)
            .or_else(|| self.profiles.first())
            .cloned()
            .unwrap_or_else(Profile::guest)
    }

    pub fn contains(&self, profile_id: &str) -> bool {
        self.profiles.iter().any(|p| p.id == profile_id)
    }
}

/// An explicit knowledge mark. "Unseen" is never stored.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeStatus {
    Known,
    Unknown,
}

impl KnowledgeStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "known" => Some(KnowledgeStatus::Known),
            "unknown" => Some(KnowledgeStatus::Unknown),
            _ => None,
        }
    }
}

/// Status of a phrase as seen by a learner: a stored mark or the unseen default.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Unseen,
    Known,
    Unknown,
}

impl From<KnowledgeStatus> for ItemStatus {
    fn from(s: KnowledgeStatus) -> Self {
        match s {
            KnowledgeStatus::Known => ItemStatus::Known,
            KnowledgeStatus::Unknown => ItemStatus::Unknown,
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemStatus::Unseen => "unseen",
            ItemStatus::Known => "known",
            ItemStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LearnFilter {
    #[default]
    All,
    Unseen,
    Known,
    Unknown,
}

impl FromStr for LearnFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(LearnFilter::All),
            "unseen" | "new" => Ok(LearnFilter::Unseen),
            "known" => Ok(LearnFilter::Known),
            "unknown" => Ok(LearnFilter::Unknown),
            other => Err(format!("unknown filter: {other}")),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LearnProgress {
    pub data_version: u32,
    pub studied_date: String,
    pub studied_ids: Vec<PhraseId>,
    pub item_status: BTreeMap<PhraseId, KnowledgeStatus>,
}

impl LearnProgress {
    pub fn new(today: &str) -> Self {
        Self {
            data_version: DATA_VERSION,
            studied_date: today.to_string(),
            studied_ids: Vec::new(),
            item_status: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionCounts {
    pub all: usize,
    pub unseen: usize,
    pub known: usize,
    pub unknown: usize,
    pub studied_today: usize,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizStats {
    pub data_version: u32,
    pub total_quizzes: u64,
    pub total_score: u64,
    pub last_score: u64,
    pub last_total: u64,
}

impl Default for QuizStats {
    fn default() -> Self {
        Self {
            data_version: DATA_VERSION,
            total_quizzes: 0,
            total_score: 0,
            last_score: 0,
            last_total: 0,
        }
    }
}

impl QuizStats {
    pub fn has_result(&self) -> bool {
        self.last_total > 0
    }

    pub fn average_score(&self) -> f64 {
        if self.total_quizzes == 0 {
            0.0
        } else {
            self.total_score as f64 / self.total_quizzes as f64
        }
    }
}
