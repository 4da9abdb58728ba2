#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Known,
    Unknown,
    Play,
    Skip,
    Quit,
    None,
}

pub fn map_card_line(line: &str) -> CardAction {
    match line.trim().to_lowercase().as_str() {
        "k" | "known" | "1" => CardAction::Known,
        "u" | "unknown" | "2" => CardAction::Unknown,
        "p" | "play" => CardAction::Play,
        "s" | "skip" | "" => CardAction::Skip,
        "q" | "quit" => CardAction::Quit,
        _ => CardAction::None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizAction {
    Answer(usize),
    Quit,
    None,
}

/// 1-based option numbers.
pub fn map_quiz_line(line: &str, options: usize) -> QuizAction {
    let clean = line.trim().to_lowercase();
    if clean == "q" || clean == "quit" {
        return QuizAction::Quit;
    }
    match clean.parse::<usize>() {
        Ok(n) if (1..=options).contains(&n) => QuizAction::Answer(n - 1),
        _ => QuizAction::None,
    }
}

pub fn is_yes(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}
