use crate::cli::inputs::{is_yes, map_card_line, map_quiz_line, CardAction, QuizAction};
use crate::cli::notices::{saved_notice, switch_target, Change};
use crate::cli::opts::*;

use anyhow::{bail, Context as _, Result};
use chrono::Utc;
use phrasedeck_core::{
    build_questions, content, profiles, progress, speech, transfer, KnowledgeStatus,
    LearnFilter, LearnProgress, LearnProgressStore, MemoryStore, Phrase, Profile,
    ProfileRegistry, QuizSession, QuizStats, QuizStatsStore, Storage,
};
use phrasedeck_core::quiz::Step;
use phrasedeck_core::speech::{CommandSpeech, SpeechEngine};
use phrasedeck_json::paths::StoreLayout;
use phrasedeck_json::JsonFileStore;
use std::io::{stdin, stdout, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub struct Context {
    pub storage: Storage,
    pub items: Vec<Phrase>,
    pub speech: Box<dyn SpeechEngine>,
}

pub fn run_cli(args: Cli) -> Result<()> {
    let ctx = open_context(&args)?;
    match args.cmd {
        Command::Profile(cmd) => profile_cmd(&ctx, cmd),
        Command::Learn(cmd) => learn_cmd(&ctx, cmd),
        Command::Review => review_cmd(&ctx),
        Command::Quiz => quiz_cmd(&ctx),
        Command::Progress => progress_cmd(&ctx),
        Command::Reset { yes } => reset_cmd(&ctx, yes),
        Command::Export { out } => export_cmd(&ctx, out),
        Command::Import { path, yes } => import_cmd(&ctx, &path, yes),
        Command::Speak { text } => {
            say(&ctx, &text);
            Ok(())
        }
    }
}

pub fn open_context(args: &Cli) -> Result<Context> {
    let items = match &args.phrases {
        Some(p) => content::load_phrases(p).with_context(|| format!("loading phrases from {}", p.display()))?,
        None => content::builtin_phrases(),
    };
    Ok(Context {
        storage: open_storage(args.data_dir.clone(), args.max_store_bytes),
        items,
        speech: speech_engine(),
    })
}

/// Falls back to an in-memory store when the data dir is unusable, so the
/// session still works without persistence.
pub fn open_storage(data_dir: Option<PathBuf>, max_bytes: Option<usize>) -> Storage {
    let layout = match data_dir {
        Some(root) => StoreLayout::under(&root),
        None => StoreLayout::user_default(),
    };
    match JsonFileStore::open_layout(layout.clone()) {
        Ok(store) => {
            let store = match max_bytes {
                Some(limit) => store.with_quota(limit),
                None => store,
            };
            Storage::new(Arc::new(store))
        }
        Err(e) => {
            warn!(file = %layout.file.display(), error = %e, "progress store unavailable; nothing will be saved");
            let store = match max_bytes {
                Some(limit) => MemoryStore::with_quota(limit),
                None => MemoryStore::new(),
            };
            Storage::new(Arc::new(store))
        }
    }
}

/// `PHRASEDECK_TTS="prog arg..."` overrides the default `espeak-ng -v ar`.
fn speech_engine() -> Box<dyn SpeechEngine> {
    match std::env::var("PHRASEDECK_TTS") {
        Ok(cmdline) if !cmdline.trim().is_empty() => {
            let mut parts = cmdline.split_whitespace().map(str::to_string);
            let program = parts.next().unwrap_or_default();
            Box::new(CommandSpeech::new(program, parts.collect()))
        }
        _ => Box::new(CommandSpeech::arabic_espeak()),
    }
}

fn active_profile(ctx: &Context) -> Profile {
    ProfileRegistry::new(&ctx.storage).load().active()
}

fn profile_cmd(ctx: &Context, cmd: ProfileCmd) -> Result<()> {
    let registry = ProfileRegistry::new(&ctx.storage);
    match cmd {
        ProfileCmd::List => {
            let state = registry.load();
            for p in &state.profiles {
                let mark = if p.id == state.active_profile_id { "*" } else { " " };
                println!("{mark} {}\t{}", p.id, p.name);
            }
        }
        ProfileCmd::Add { name } => {
            let out = registry.create(&name);
            match out.error {
                Some(e) => println!("{e}"),
                None => println!("Profile created and switched."),
            }
        }
        ProfileCmd::Switch { profile } => {
            let state = registry.load();
            match switch_target(&state, &profile) {
                Ok(id) => println!("active: {}", registry.switch_active(&id).active().name),
                Err(e) => println!("{e}"),
            }
        }
        ProfileCmd::Rm { profile } => {
            let state = registry.load();
            let id = profiles::find(&state, &profile)
                .map(|p| p.id.clone())
                .unwrap_or(profile);
            let out = registry.delete(&id);
            match out.error {
                Some(e) => println!("{e}"),
                None => println!("Profile deleted. Active: {}", out.state.active().name),
            }
        }
    }
    Ok(())
}

fn learn_cmd(ctx: &Context, cmd: LearnCmd) -> Result<()> {
    let profile = active_profile(ctx);
    let store = LearnProgressStore::new(&ctx.storage, &ctx.items);
    let progress = store.load(&profile.id);

    let pool = match &cmd.topic {
        Some(t) => content::filter_by_topic(&ctx.items, t),
        None => ctx.items.clone(),
    };
    let cards = progress::filter(&pool, &progress, LearnFilter::from(cmd.filter));
    card_loop(ctx, &store, &profile, progress, &cards)
}

fn review_cmd(ctx: &Context) -> Result<()> {
    let profile = active_profile(ctx);
    let store = LearnProgressStore::new(&ctx.storage, &ctx.items);
    let progress = store.load(&profile.id);
    let queue = progress::review_queue(&ctx.items, &progress);
    card_loop(ctx, &store, &profile, progress, &queue)
}

fn card_loop(
    ctx: &Context,
    store: &LearnProgressStore<'_>,
    profile: &Profile,
    mut progress: LearnProgress,
    cards: &[Phrase],
) -> Result<()> {
    if cards.is_empty() {
        println!("nothing to study");
        return Ok(());
    }

    let mut marked = 0usize;
    for (i, card) in cards.iter().enumerate() {
        println!("\n[{}/{}] {} ({})", i + 1, cards.len(), card.id, progress::item_status(&progress, &card.id));
        println!("  {}", card.arabic);
        println!("  {}", card.transliteration);
        prompt_enter("[enter=show meaning]")?;
        println!("  = {}", card.meaning);
        println!("[k=known, u=unknown, p=play, s=skip, q=quit]");

        let status = loop {
            match map_card_line(&read_line("mark> ")?) {
                CardAction::Known => break Some(KnowledgeStatus::Known),
                CardAction::Unknown => break Some(KnowledgeStatus::Unknown),
                CardAction::Play => say(ctx, &card.arabic),
                CardAction::Skip => break None,
                CardAction::Quit => {
                    print_counts(ctx, &progress);
                    return Ok(());
                }
                CardAction::None => println!("enter k, u, p, s or q"),
            }
        };

        if let Some(status) = status {
            progress = progress::mark_status(&progress, &card.id, status, &ctx.storage.today_key());
            if !store.save(&profile.id, &progress) {
                println!("(progress could not be saved; continuing in memory)");
            }
            marked += 1;
        }
    }

    println!("\nmarked {marked}");
    print_counts(ctx, &progress);
    Ok(())
}

fn print_counts(ctx: &Context, progress: &LearnProgress) {
    let c = progress::session_counts(&ctx.items, progress, &ctx.storage.today_key());
    println!(
        "all {}  unseen {}  known {}  unknown {}  studied today {}",
        c.all, c.unseen, c.known, c.unknown, c.studied_today
    );
}

fn say(ctx: &Context, text: &str) {
    let result = speech::speak(ctx.speech.as_ref(), text);
    if let Some(msg) = result.message {
        println!("{msg}");
    }
}

fn quiz_cmd(ctx: &Context) -> Result<()> {
    let profile = active_profile(ctx);
    let questions = build_questions(&ctx.items, &mut rand::thread_rng());
    let mut session = QuizSession::new(questions);
    if session.is_finished() {
        println!("Not enough items to build a quiz yet.");
        return Ok(());
    }

    while let Some(q) = session.current().cloned() {
        let (pos, total) = session.position();
        println!("\n[{pos}/{total}] {}  ({})", q.arabic, q.transliteration);
        for (i, opt) in q.options.iter().enumerate() {
            println!("  {}. {}", i + 1, opt);
        }
        let choice = loop {
            match map_quiz_line(&read_line("answer> ")?, q.options.len()) {
                QuizAction::Answer(i) => break i,
                QuizAction::Quit => {
                    println!("quiz abandoned; nothing recorded");
                    return Ok(());
                }
                QuizAction::None => println!("enter 1-{} or q", q.options.len()),
            }
        };

        match session.submit(&q.options[choice]) {
            Some(true) => println!("correct"),
            Some(false) => println!("wrong: {}", q.correct_meaning),
            None => {}
        }
        if session.advance() == Some(Step::Finished) {
            break;
        }
    }

    let stats = QuizStatsStore::new(&ctx.storage).record_result(&profile.id, session.score(), session.total());
    println!("\nscore {}/{}", session.score(), session.total());
    print_quiz_stats(&stats);
    Ok(())
}

fn print_quiz_stats(stats: &QuizStats) {
    println!("quizzes {}  average {:.1}", stats.total_quizzes, stats.average_score());
    if stats.has_result() {
        println!("last {}/{}", stats.last_score, stats.last_total);
    } else {
        println!("no quiz completed yet");
    }
}

fn progress_cmd(ctx: &Context) -> Result<()> {
    let profile = active_profile(ctx);
    let progress = LearnProgressStore::new(&ctx.storage, &ctx.items).load(&profile.id);
    let stats = QuizStatsStore::new(&ctx.storage).load(&profile.id);

    println!("profile: {} ({})", profile.name, profile.id);
    print_counts(ctx, &progress);
    print_quiz_stats(&stats);
    Ok(())
}

fn reset_cmd(ctx: &Context, yes: bool) -> Result<()> {
    let profile = active_profile(ctx);
    if !yes && !is_yes(&read_line(&format!("reset all progress for {}? [y/N] ", profile.name))?) {
        println!("cancelled");
        return Ok(());
    }
    let progress = LearnProgress::new(&ctx.storage.today_key());
    let learn_saved = LearnProgressStore::new(&ctx.storage, &ctx.items).save(&profile.id, &progress);
    let stats_saved = QuizStatsStore::new(&ctx.storage).save(&profile.id, &QuizStats::default());
    println!("{}", saved_notice(Change::Reset, learn_saved, stats_saved));
    Ok(())
}

fn export_cmd(ctx: &Context, out: Option<PathBuf>) -> Result<()> {
    let profile = active_profile(ctx);
    let progress = LearnProgressStore::new(&ctx.storage, &ctx.items).load(&profile.id);
    let stats = QuizStatsStore::new(&ctx.storage).load(&profile.id);

    let doc = transfer::export(&profile, &progress, &stats, Utc::now());
    let path = out.unwrap_or_else(|| PathBuf::from(transfer::export_filename(&profile.name, &ctx.storage.today_key())));
    let s = serde_json::to_string_pretty(&doc)?;
    std::fs::write(&path, s).with_context(|| format!("writing {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}

fn read_import_text(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut s = String::new();
        stdin().read_to_string(&mut s)?;
        Ok(s)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

/// Stages the file, shows what it holds, and merges only after confirmation.
fn import_cmd(ctx: &Context, path: &Path, yes: bool) -> Result<()> {
    let profile = active_profile(ctx);
    let text = read_import_text(path)?;
    let payload = match transfer::parse_import_payload(&text) {
        Ok(p) => p,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };

    println!(
        "import from {} into {}: learnProgress {}, quizStats {}",
        payload.profile_name().unwrap_or("unnamed export"),
        profile.name,
        if payload.learn_progress.is_some() { "yes" } else { "no" },
        if payload.quiz_stats.is_some() { "yes" } else { "no" },
    );
    if !yes && path.as_os_str() == "-" {
        println!("stdin is used up by the import; pass --yes to apply it");
        return Ok(());
    }
    if !yes && !is_yes(&read_line("apply? [y/N] ")?) {
        println!("cancelled");
        return Ok(());
    }

    let learn_store = LearnProgressStore::new(&ctx.storage, &ctx.items);
    let stats_store = QuizStatsStore::new(&ctx.storage);
    let merged = transfer::apply_import(
        &payload,
        &learn_store.load(&profile.id),
        &stats_store.load(&profile.id),
        &ctx.items,
        &ctx.storage.today_key(),
    );
    let learn_saved = learn_store.save(&profile.id, &merged.learn_progress);
    let stats_saved = stats_store.save(&profile.id, &merged.quiz_stats);
    println!("{}", saved_notice(Change::Import, learn_saved, stats_saved));
    if !(learn_saved && stats_saved) {
        return Ok(());
    }
    info!(profile_id = %profile.id, "import applied");
    print_counts(ctx, &merged.learn_progress);
    print_quiz_stats(&merged.quiz_stats);
    Ok(())
}

fn prompt_enter(label: &str) -> Result<()> {
    read_line(label).map(|_| ())
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    stdout().flush().ok();
    let mut s = String::new();
    if stdin().read_line(&mut s)? == 0 {
        bail!("input closed");
    }
    Ok(s)
}
