pub mod content;
pub mod errors;
pub mod models;
pub mod profiles;
pub mod progress;
pub mod quiz;
pub mod quiz_stats;
pub mod speech;
pub mod storage;
pub mod transfer;

pub use errors::*;
pub use models::*;
pub use profiles::{Outcome, ProfileRegistry};
pub use progress::LearnProgressStore;
pub use quiz::{build_questions, QuizQuestion, QuizSession};
pub use quiz_stats::QuizStatsStore;
pub use storage::memory::MemoryStore;
pub use storage::{date_key, today_date_key, Clock, KeyValueStore, Storage, UnavailableStore};
