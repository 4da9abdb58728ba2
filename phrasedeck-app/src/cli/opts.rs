use clap::{Args, Parser, Subcommand, ValueEnum};
use phrasedeck_core::LearnFilter;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FilterArg {
    All,
    Unseen,
    Known,
    Unknown,
}

impl From<FilterArg> for LearnFilter {
    fn from(f: FilterArg) -> Self {
        match f {
            FilterArg::All => LearnFilter::All,
            FilterArg::Unseen => LearnFilter::Unseen,
            FilterArg::Known => LearnFilter::Known,
            FilterArg::Unknown => LearnFilter::Unknown,
        }
    }
}

#[derive(Debug, Parser, Clone)]
#[command(name = "phrasedeck", version, about = "PhraseDeck: Arabic phrase flashcards, quizzes and progress")]
pub struct Cli {
    /// Directory holding the progress store (defaults to the app data dir)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Phrase list JSON file (defaults to the bundled set)
    #[arg(long)]
    pub phrases: Option<PathBuf>,

    /// Cap on stored bytes; writes past it are dropped
    #[arg(long)]
    pub max_store_bytes: Option<usize>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Learner profiles
    #[command(subcommand)]
    Profile(ProfileCmd),
    /// Flip through cards and mark them known or unknown
    Learn(LearnCmd),
    /// Unseen cards first, then the ones marked unknown
    Review,
    /// Ten-question multiple-choice quiz
    Quiz,
    /// Counts and quiz history for the active profile
    Progress,
    /// Clear the active profile's progress and quiz stats
    Reset {
        #[arg(long)]
        yes: bool,
    },
    /// Write the active profile's progress to a JSON file
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Merge an exported JSON file ('-' for stdin) into the active profile
    Import {
        path: PathBuf,
        #[arg(long)]
        yes: bool,
    },
    /// Speak a phrase through the configured TTS program
    Speak { text: String },
}

#[derive(Debug, Subcommand, Clone)]
pub enum ProfileCmd {
    List,
    Add { name: String },
    Switch { profile: String },
    Rm { profile: String },
}

#[derive(Debug, Args, Clone)]
pub struct LearnCmd {
    #[arg(long, value_enum, default_value_t = FilterArg::All)]
    pub filter: FilterArg,
    #[arg(long)]
    pub topic: Option<String>,
}
