const PREFIX: &str = "arabic-learner";

pub const PROFILES: &str = "arabic-learner.profiles";
pub const LEGACY_LEARN_PROGRESS: &str = "arabic-learner.learnProgress";
pub const LEGACY_QUIZ_STATS: &str = "arabic-learner.quizStats";
pub const LEGACY_MIGRATED: &str = "arabic-learner.legacyMigrated.v1";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileRecord {
    LearnProgress,
    QuizStats,
}

impl ProfileRecord {
    fn as_str(&self) -> &'static str {
        match self {
            ProfileRecord::LearnProgress => "learnProgress",
            ProfileRecord::QuizStats => "quizStats",
        }
    }
}

pub fn profile_record(profile_id: &str, record: ProfileRecord) -> String {
    format!(
        "{PREFIX}.profile.{}.{}",
        urlencoding::encode(profile_id),
        record.as_str()
    )
}
