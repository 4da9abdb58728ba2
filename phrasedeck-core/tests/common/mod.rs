#![allow(dead_code)]

use chrono::NaiveDate;
use phrasedeck_core::{Clock, MemoryStore, Phrase, Storage};
use std::sync::Arc;

pub fn phrases(n: usize) -> Vec<Phrase> {
    (1..=n)
        .map(|i| Phrase {
            id: format!("p{i:03}"),
            topic: if i % 2 == 0 { "even".into() } else { "odd".into() },
            arabic: format!("arabic {i}"),
            transliteration: format!("translit {i}"),
            meaning: format!("meaning {i}"),
        })
        .collect()
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Memory-backed storage pinned to a fixed day.
pub fn storage_on(date: NaiveDate) -> (Arc<MemoryStore>, Storage) {
    let mem = Arc::new(MemoryStore::new());
    let storage = Storage::new(mem.clone()).with_clock(Clock::Fixed(date));
    (mem, storage)
}
