use crate::{Phrase, PhraseId};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

pub const QUESTION_COUNT: usize = 10;
pub const OPTION_COUNT: usize = 4;

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct QuizQuestion {
    pub id: PhraseId,
    pub arabic: String,
    pub transliteration: String,
    pub correct_meaning: String,
    pub options: Vec<String>,
}

impl QuizQuestion {
    pub fn is_correct(&self, option: &str) -> bool {
        option == self.correct_meaning
    }
}

/// Up to [`QUESTION_COUNT`] multiple-choice questions, none when fewer than
/// [`OPTION_COUNT`] items exist. Distractors are meanings of other items,
/// distinct from each other and from the correct answer.
pub fn build_questions<R: Rng + ?Sized>(items: &[Phrase], rng: &mut R) -> Vec<QuizQuestion> {
    if items.len() < OPTION_COUNT {
        return Vec::new();
    }

    let mut picked: Vec<&Phrase> = items.iter().collect();
    picked.shuffle(rng);
    picked.truncate(QUESTION_COUNT.min(items.len()));

    picked
        .into_iter()
        .map(|item| {
            let mut pool: Vec<&str> = Vec::new();
            for other in items.iter().filter(|c| c.id != item.id) {
                let m = other.meaning.as_str();
                if m != item.meaning && !pool.contains(&m) {
                    pool.push(m);
                }
            }
            pool.shuffle(rng);

            let mut options: Vec<String> = vec![item.meaning.clone()];
            options.extend(pool.into_iter().take(OPTION_COUNT - 1).map(str::to_string));
            options.shuffle(rng);

            QuizQuestion {
                id: item.id.clone(),
                arabic: item.arabic.clone(),
                transliteration: item.transliteration.clone(),
                correct_meaning: item.meaning.clone(),
                options,
            }
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Next,
    Finished,
}

/// One pass through a question list: each question takes one answer, then
/// [`QuizSession::advance`] moves on.
#[derive(Clone, Debug)]
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    index: usize,
    score: u64,
    selected: Option<String>,
    finished: bool,
}

impl QuizSession {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        let finished = questions.is_empty();
        Self {
            questions,
            index: 0,
            score: 0,
            selected: None,
            finished,
        }
    }

    pub fn current(&self) -> Option<&QuizQuestion> {
        if self.finished {
            None
        } else {
            self.questions.get(self.index)
        }
    }

    pub fn position(&self) -> (usize, usize) {
        (self.index + 1, self.questions.len())
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn total(&self) -> u64 {
        self.questions.len() as u64
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Records an answer for the current question. Returns whether it was
    /// correct, or `None` if the question was already answered.
    pub fn submit(&mut self, option: &str) -> Option<bool> {
        if self.selected.is_some() {
            return None;
        }
        let correct = self.current()?.is_correct(option);
        self.selected = Some(option.to_string());
        if correct {
            self.score += 1;
        }
        Some(correct)
    }

    /// Moves past an answered question. `None` until an answer was submitted.
    pub fn advance(&mut self) -> Option<Step> {
        if self.finished || self.selected.is_none() {
            return None;
        }
        self.selected = None;
        if self.index + 1 >= self.questions.len() {
            self.finished = true;
            Some(Step::Finished)
        } else {
            self.index += 1;
            Some(Step::Next)
        }
    }
}
