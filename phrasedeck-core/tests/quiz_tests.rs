mod common;

use common::phrases;
use phrasedeck_core::quiz::{Step, OPTION_COUNT, QUESTION_COUNT};
use phrasedeck_core::{build_questions, content, QuizSession};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

#[test]
fn too_few_items_build_nothing() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(build_questions(&phrases(3), &mut rng).is_empty());
    assert!(build_questions(&[], &mut rng).is_empty());
}

#[test]
fn hundred_items_build_ten_well_formed_questions() {
    let items = phrases(100);
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let questions = build_questions(&items, &mut rng);
        assert_eq!(questions.len(), QUESTION_COUNT);

        let ids: HashSet<&str> = questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids.len(), QUESTION_COUNT, "questions repeat an item");

        for q in &questions {
            assert_eq!(q.options.len(), OPTION_COUNT);
            let distinct: HashSet<&String> = q.options.iter().collect();
            assert_eq!(distinct.len(), OPTION_COUNT);
            assert_eq!(q.options.iter().filter(|o| **o == q.correct_meaning).count(), 1);
            let source = items.iter().find(|p| p.id == q.id).unwrap();
            assert_eq!(source.meaning, q.correct_meaning);
            assert_eq!(source.arabic, q.arabic);
        }
    }
}

#[test]
fn small_sets_use_every_item_once() {
    let items = phrases(4);
    let mut rng = StdRng::seed_from_u64(7);
    let questions = build_questions(&items, &mut rng);
    assert_eq!(questions.len(), 4);
    let ids: HashSet<&str> = questions.iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids.len(), 4);
    for q in &questions {
        // with four items every other meaning is a distractor
        let expected: HashSet<&str> = items.iter().map(|p| p.meaning.as_str()).collect();
        let got: HashSet<&str> = q.options.iter().map(String::as_str).collect();
        assert_eq!(got, expected);
    }
}

#[test]
fn duplicate_meanings_never_show_twice() {
    let mut items = phrases(6);
    items[1].meaning = items[0].meaning.clone();
    let mut rng = StdRng::seed_from_u64(3);
    for q in build_questions(&items, &mut rng) {
        let distinct: HashSet<&String> = q.options.iter().collect();
        assert_eq!(distinct.len(), q.options.len());
        assert_eq!(q.options.iter().filter(|o| **o == q.correct_meaning).count(), 1);
    }
}

#[test]
fn options_are_shuffled() {
    let items = phrases(100);
    let mut rng = StdRng::seed_from_u64(11);
    let mut positions = HashSet::new();
    for _ in 0..20 {
        for q in build_questions(&items, &mut rng) {
            let pos = q.options.iter().position(|o| *o == q.correct_meaning).unwrap();
            positions.insert(pos);
        }
    }
    assert_eq!(positions.len(), OPTION_COUNT);
}

#[test]
fn builtin_set_builds_a_quiz() {
    let items = content::builtin_phrases();
    let mut rng = StdRng::seed_from_u64(5);
    assert_eq!(build_questions(&items, &mut rng).len(), QUESTION_COUNT);
}

#[test]
fn session_scores_each_question_once() {
    let items = phrases(5);
    let mut rng = StdRng::seed_from_u64(9);
    let mut session = QuizSession::new(build_questions(&items, &mut rng));
    assert_eq!(session.total(), 5);

    assert_eq!(session.advance(), None, "cannot skip an unanswered question");

    let mut steps = Vec::new();
    let mut answered = 0;
    while let Some(q) = session.current().cloned() {
        let answer = if answered % 2 == 0 {
            q.correct_meaning.clone()
        } else {
            q.options.iter().find(|o| **o != q.correct_meaning).unwrap().clone()
        };
        assert_eq!(session.submit(&answer), Some(answered % 2 == 0));
        assert_eq!(session.submit(&q.correct_meaning), None);
        answered += 1;
        steps.push(session.advance().unwrap());
    }

    assert_eq!(answered, 5);
    assert_eq!(steps.last(), Some(&Step::Finished));
    assert!(session.is_finished());
    assert_eq!(session.score(), 3);
    assert_eq!(session.advance(), None);
}

#[test]
fn empty_session_is_finished() {
    let session = QuizSession::new(Vec::new());
    assert!(session.is_finished());
    assert!(session.current().is_none());
}
