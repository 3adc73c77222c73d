use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use serde::Serialize;
use tipstore_sdk::{
    Cid, Event, EventPatch, EventTipStats, FileKeyValueStore, FsContentStore, SpeakerPatch,
    SpeakerProfile, StorageConfig, StorageOrchestrator, StorageStats, Timestamp, TipRecord,
    TipStatus,
};
use tokio::sync::mpsc;

use crate::cli::*;

const DEFAULT_CONFIG_FILE: &str = "tipstore.toml";

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let out = Output(cli.format);

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
        Command::Url { cid } => {
            let cid = Cid::parse(&cid)?;
            let orch = open(&config)?;
            println!("{}", orch.public_url(&cid));
            Ok(())
        }
        Command::Event(args) => cmd_event(&open(&config)?, out, args.action).await,
        Command::Speaker(args) => cmd_speaker(&open(&config)?, out, args.action).await,
        Command::Tip(args) => cmd_tip(&open(&config)?, out, args.action).await,
        Command::Stats => cmd_stats(&open(&config)?, out).await,
        Command::ClearCache { kind } => {
            let removed = open(&config)?.clear_cache(kind)?;
            println!("{} Cleared {} cached {} entries", "✓".green(), removed, kind);
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<StorageConfig> {
    let mut config = match &cli.config {
        Some(path) => StorageConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            StorageConfig::load(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => StorageConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    Ok(config)
}

fn open(config: &StorageConfig) -> anyhow::Result<StorageOrchestrator> {
    let content = FsContentStore::open(config.blob_dir(), config.resolver())
        .with_context(|| format!("opening blob store in {}", config.blob_dir().display()))?
        .with_max_payload_size(config.content.max_payload_bytes);
    let kv = FileKeyValueStore::open(config.local_dir())
        .with_context(|| format!("opening local store in {}", config.local_dir().display()))?;
    Ok(StorageOrchestrator::new(Arc::new(content), Arc::new(kv), config))
}

#[derive(Clone, Copy)]
struct Output(OutputFormat);

impl Output {
    /// Print `value` as JSON, or run `text` for the human format.
    fn emit<T: Serialize>(self, value: &T, text: impl FnOnce(&T)) -> anyhow::Result<()> {
        match self.0 {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Text => text(value),
        }
        Ok(())
    }

    fn written(self, what: &str, id: &str, cid: &Cid) -> anyhow::Result<()> {
        #[derive(Serialize)]
        struct Written<'a> {
            id: &'a str,
            cid: &'a Cid,
        }
        self.emit(&Written { id, cid }, |_| {
            println!("{} {} {}", "✓".green().bold(), what, id.bold());
            println!("  CID: {}", cid.as_str().yellow());
        })
    }
}

async fn cmd_event(orch: &StorageOrchestrator, out: Output, action: EventAction) -> anyhow::Result<()> {
    match action {
        EventAction::Create { id, name, organizer, description, location, start, end, speakers } => {
            let mut event = Event::new(&id, name, organizer)
                .with_location(location)
                .with_speakers(speakers);
            event.description = description;
            if let (Some(start), Some(end)) = (start, end) {
                event = event.with_schedule(Timestamp::from_millis(start), Timestamp::from_millis(end));
            }
            let cid = orch.create_event(event).await?;
            out.written("Created event", &id, &cid)
        }
        EventAction::Get { id } => {
            let Some(event) = orch.get_event(&id).await else {
                bail!("event {id} not found");
            };
            out.emit(&event, print_event)
        }
        EventAction::List { query } => {
            let events = match query {
                Some(q) => orch.search_events(&q).await,
                None => orch.get_events().await,
            };
            out.emit(&events, |events| {
                if events.is_empty() {
                    println!("No events.");
                }
                events.iter().for_each(print_event);
            })
        }
        EventAction::Update { id, name, description, location, active, speakers } => {
            let patch = EventPatch {
                name,
                description,
                location,
                is_active: active,
                speaker_ids: (!speakers.is_empty()).then_some(speakers),
                ..EventPatch::default()
            };
            let cid = orch.update_event(&id, patch).await?;
            out.written("Updated event", &id, &cid)
        }
        EventAction::Delete { id } => {
            if orch.delete_event(&id).await? {
                println!("{} Deleted event {}", "✓".green(), id.bold());
            } else {
                println!("Event {} was not tracked", id.bold());
            }
            Ok(())
        }
    }
}

async fn cmd_speaker(orch: &StorageOrchestrator, out: Output, action: SpeakerAction) -> anyhow::Result<()> {
    match action {
        SpeakerAction::Create { id, name, wallet, bio } => {
            let cid = orch
                .create_speaker(SpeakerProfile::new(&id, name, wallet).with_bio(bio))
                .await?;
            out.written("Created speaker", &id, &cid)
        }
        SpeakerAction::Get { id } => {
            let Some(speaker) = orch.get_speaker(&id).await else {
                bail!("speaker {id} not found");
            };
            out.emit(&speaker, print_speaker)
        }
        SpeakerAction::Search { query } => {
            let speakers = match query {
                Some(q) => orch.search_speakers(&q).await,
                None => orch.get_speakers().await,
            };
            out.emit(&speakers, |speakers| {
                if speakers.is_empty() {
                    println!("No speakers.");
                }
                speakers.iter().for_each(print_speaker);
            })
        }
        SpeakerAction::Update { id, name, bio, avatar } => {
            let patch = SpeakerPatch {
                name,
                bio,
                avatar_url: avatar.map(Some),
                ..SpeakerPatch::default()
            };
            let cid = orch.update_speaker(&id, patch).await?;
            out.written("Updated speaker", &id, &cid)
        }
    }
}

async fn cmd_tip(orch: &StorageOrchestrator, out: Output, action: TipAction) -> anyhow::Result<()> {
    match action {
        TipAction::Add { event_id, speaker, tipper, amount, message, id } => {
            let id = id.unwrap_or_else(|| uuid::Uuid::now_v7().to_string());
            let mut tip = TipRecord::new(&id, speaker, tipper, amount);
            if let Some(message) = message {
                tip = tip.with_message(message);
            }
            let cid = orch.add_tip(&event_id, tip).await?;
            out.written("Added tip", &id, &cid)
        }
        TipAction::History { event_id } => {
            let tips = orch.get_tip_history(&event_id).await;
            out.emit(&tips, |tips| print_tips(tips))
        }
        TipAction::Status { event_id, tip_id, status, tx_hash } => {
            let cid = orch
                .update_tip_status(&event_id, &tip_id, status, tx_hash)
                .await?;
            out.written(&format!("Tip marked {status}:"), &tip_id, &cid)
        }
        TipAction::Speaker { speaker_id } => {
            let tips = orch.get_tips_for_speaker(&speaker_id).await;
            out.emit(&tips, |tips| print_tips(tips))
        }
        TipAction::Recent { limit } => {
            let tips = orch.get_recent_tips(limit).await;
            out.emit(&tips, |tips| print_tips(tips))
        }
        TipAction::Stats { event_id } => {
            let stats = orch.get_event_stats(&event_id).await;
            out.emit(&stats, print_event_stats)
        }
        TipAction::Watch { event_id, count } => {
            let (tx, mut rx) = mpsc::unbounded_channel();
            let subscription = orch.subscribe(
                &event_id,
                Arc::new(move |tips: Vec<TipRecord>| {
                    let _ = tx.send(tips);
                }),
            );
            for _ in 0..count {
                let Some(tips) = rx.recv().await else { break };
                out.emit(&tips, |tips| {
                    println!("{} {} tips for {}", "↻".cyan(), tips.len(), event_id.bold());
                    print_tips(tips);
                })?;
            }
            subscription.cancel();
            Ok(())
        }
    }
}

async fn cmd_stats(orch: &StorageOrchestrator, out: Output) -> anyhow::Result<()> {
    let stats = orch.get_stats().await;
    out.emit(&stats, print_storage_stats)
}

fn print_event(event: &Event) {
    let status = if event.is_live_at(Timestamp::now()) {
        "live".green().bold()
    } else if event.is_active {
        "active".green()
    } else {
        "inactive".red()
    };
    println!("{}  {}  ({})", event.id.yellow().bold(), event.name.bold(), status);
    if !event.location.is_empty() {
        println!("  Location: {}", event.location);
    }
    if !event.description.is_empty() {
        println!("  {}", event.description.dimmed());
    }
    println!("  Organizer: {}", event.organizer.cyan());
    if !event.speaker_ids.is_empty() {
        println!("  Speakers: {}", event.speaker_ids.join(", "));
    }
}

fn print_speaker(speaker: &SpeakerProfile) {
    println!("{}  {}", speaker.id.yellow().bold(), speaker.name.bold());
    println!("  Wallet: {}", speaker.wallet_address.cyan());
    if !speaker.bio.is_empty() {
        println!("  {}", speaker.bio.dimmed());
    }
    if let Some(avatar) = &speaker.avatar_url {
        println!("  Avatar: {}", avatar.blue());
    }
}

fn print_tips(tips: &[TipRecord]) {
    if tips.is_empty() {
        println!("No tips.");
    }
    for tip in tips {
        let status = match tip.status {
            TipStatus::Confirmed => "confirmed".green(),
            TipStatus::Pending => "pending".yellow(),
            TipStatus::Failed => "failed".red(),
        };
        println!(
            "{}  {} → {}  {}  [{}]",
            tip.id.dimmed(),
            tip.tipper.cyan(),
            tip.speaker_id.bold(),
            tip.amount,
            status
        );
        if let Some(message) = &tip.message {
            println!("    \"{message}\"");
        }
    }
}

fn print_event_stats(stats: &EventTipStats) {
    println!("Tips for {}", stats.event_id.yellow().bold());
    println!("  Total: {} tips, amount {}", stats.total_tips.to_string().bold(), stats.total_amount);
    println!(
        "  Status: {} confirmed, {} pending, {} failed",
        stats.confirmed.to_string().green(),
        stats.pending.to_string().yellow(),
        stats.failed.to_string().red()
    );
    println!("  Unique tippers: {}", stats.unique_tippers);
    for (rank, speaker) in stats.top_speakers.iter().enumerate() {
        println!("  {}. {}  {} ({} tips)", rank + 1, speaker.speaker_id.bold(), speaker.amount, speaker.tips);
    }
}

fn print_storage_stats(stats: &StorageStats) {
    for (name, repo) in [("events", stats.events), ("speakers", stats.speakers), ("tips", stats.tips)] {
        println!(
            "{:<9} {} tracked, {} cached, {} index bytes",
            name.bold(),
            repo.tracked,
            repo.cached,
            repo.index_bytes
        );
    }
    println!(
        "{:<9} {} tracked, {} cached, {} index bytes",
        "total".green().bold(),
        stats.total_tracked,
        stats.total_cached,
        stats.total_index_bytes
    );
}
