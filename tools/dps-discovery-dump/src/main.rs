// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! dps-discovery-dump - Replay recorded discovery announcements
//!
//! Feeds every announcement through a discovery registry and prints the
//! resulting participant table and per-topic endpoint counts.

mod input;

use clap::{Parser, ValueEnum};
use colored::*;
use dps_discovery::{
    DiscoveryRegistry, EnvConfig, GraphGuard, Outcome, ParticipantRecord, RegistryStats,
    TopicDescriptor,
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Replay discovery announcements and dump the participant table
#[derive(Parser, Debug)]
#[command(name = "dps-discovery-dump")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Dump the participant table built from recorded discovery announcements")]
struct Args {
    /// Announcement file, one announcement per line (default: stdin)
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    format: OutputFormat,

    /// Only show topics containing this string
    #[arg(short = 't', long)]
    topic: Option<String>,

    /// Quiet mode - compact output
    #[arg(long)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
}

struct Replay {
    registry: DiscoveryRegistry,
    guard: Arc<GraphGuard>,
    topics: BTreeSet<String>,
}

fn main() {
    let config = EnvConfig::from_env();
    config.apply_log_level();
    env_logger::init();

    let args = Args::parse();

    if let Err(e) = run(&args, &config) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args, config: &EnvConfig) -> Result<(), Box<dyn std::error::Error>> {
    let announcements = input::load(args.input.as_deref())?;
    if !args.quiet {
        eprintln!(
            "{} Replaying {} announcement(s) (domain={}, discovery topic={})",
            ">>>".green().bold(),
            announcements.len(),
            config.domain_id,
            config.discovery_topic
        );
    }

    let replay = replay(&announcements);

    match args.format {
        OutputFormat::Pretty => print_pretty(&replay, args),
        OutputFormat::Json => print_json(&replay, args)?,
    }
    Ok(())
}

fn replay(announcements: &[input::Announcement]) -> Replay {
    let guard = Arc::new(GraphGuard::new());
    let registry = DiscoveryRegistry::new(guard.clone());

    for (line, announcement) in announcements.iter().enumerate() {
        if registry.on_publication(line + 1, announcement) == Outcome::Dropped {
            log::warn!("announcement #{} carries no participant id", line + 1);
        }
    }

    let topics = registry
        .snapshot()
        .iter()
        .flat_map(|p| p.publishers.iter().chain(p.subscribers.iter()))
        .map(|d| d.topic_name.clone())
        .collect();

    Replay {
        registry,
        guard,
        topics,
    }
}

fn selected_topics<'a>(replay: &'a Replay, args: &Args) -> Vec<&'a String> {
    replay
        .topics
        .iter()
        .filter(|name| args.topic.as_ref().map_or(true, |f| name.contains(f.as_str())))
        .collect()
}

fn format_descriptor(desc: &TopicDescriptor) -> String {
    if desc.type_names.is_empty() {
        desc.topic_name.clone()
    } else {
        format!("{} [{}]", desc.topic_name, desc.type_names.join(", "))
    }
}

fn print_participant(index: usize, identity: &str, p: &ParticipantRecord, quiet: bool) {
    if quiet {
        println!(
            "  [{}] {} {}{} ({}P/{}S)",
            index + 1,
            identity,
            p.namespace,
            p.name,
            p.publishers.len(),
            p.subscribers.len()
        );
        return;
    }

    let display_name = if p.name.is_empty() { "<unnamed>" } else { p.name.as_str() };
    println!(
        "  {} {} {}",
        format!("[{}]", index + 1).yellow(),
        display_name.green(),
        identity.dimmed()
    );
    println!("      Namespace: {}", p.namespace.white());
    for desc in &p.publishers {
        println!("        {} {}", "P".green(), format_descriptor(desc));
    }
    for desc in &p.subscribers {
        println!("        {} {}", "S".blue(), format_descriptor(desc));
    }
    println!();
}

fn print_pretty(replay: &Replay, args: &Args) {
    let registry = &replay.registry;
    let identities = registry.identities();

    println!();
    println!("{}", "=== Discovery Registry ===".bold());
    println!();
    println!(
        "{} {} participant(s) known",
        "Participants:".cyan().bold(),
        identities.len()
    );
    println!();

    for (i, identity) in identities.iter().enumerate() {
        if let Some(record) = registry.get(identity) {
            print_participant(i, identity, &record, args.quiet);
        }
    }

    let topics = selected_topics(replay, args);
    println!("{} {} topic(s)", "Topics:".cyan().bold(), topics.len());
    for name in &topics {
        println!(
            "  {} ({}P/{}S)",
            name.cyan(),
            registry
                .count_matching_publishers(name)
                .to_string()
                .green(),
            registry
                .count_matching_subscribers(name)
                .to_string()
                .blue()
        );
    }
    println!();

    let RegistryStats {
        announcements,
        dropped,
        changes,
        signal_failures,
    } = registry.stats();
    println!("{}", "--- Summary ---".dimmed());
    println!(
        "  Announcements: {}  Changes: {}  Dropped: {}  Signal failures: {}  Guard triggers: {}",
        announcements.to_string().white(),
        changes.to_string().green(),
        dropped.to_string().yellow(),
        signal_failures.to_string().red(),
        replay.guard.trigger_count()
    );
    println!();
}

fn print_json(replay: &Replay, args: &Args) -> Result<(), serde_json::Error> {
    let registry = &replay.registry;

    let participants: Vec<_> = registry
        .identities()
        .into_iter()
        .filter_map(|id| registry.get(&id).map(|record| (id, record)))
        .map(|(id, record)| {
            serde_json::json!({
                "id": id,
                "record": record,
            })
        })
        .collect();

    let topics: Vec<_> = selected_topics(replay, args)
        .into_iter()
        .map(|name| {
            serde_json::json!({
                "name": name,
                "publishers": registry.count_matching_publishers(name),
                "subscribers": registry.count_matching_subscribers(name),
            })
        })
        .collect();

    let stats = registry.stats();
    let doc = serde_json::json!({
        "participants": participants,
        "topics": topics,
        "stats": {
            "announcements": stats.announcements,
            "changes": stats.changes,
            "dropped": stats.dropped,
            "signal_failures": stats.signal_failures,
            "guard_triggers": replay.guard.trigger_count(),
        },
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
