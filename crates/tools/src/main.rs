use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use game_core::journal_file::load_journal_from_file;
use game_core::replay_to_end;
use tracing::info;
use zeta_tools::{init_tracing, load_session_config};

#[derive(Parser)]
#[command(author, version, about = "Replays a recorded Zeta journal", long_about = None)]
struct Args {
    /// Hash-chained JSONL journal to replay
    #[arg(short, long)]
    journal: PathBuf,

    /// Optional TOML session config; must match the one used while recording
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = load_session_config(args.config.as_deref())?;
    let loaded = load_journal_from_file(&args.journal)
        .with_context(|| format!("failed to load journal {}", args.journal.display()))?;
    info!(
        seed = loaded.journal.seed,
        build_id = %loaded.journal.build_id,
        inputs = loaded.journal.inputs.len(),
        "journal loaded"
    );

    let result = replay_to_end(&config, &loaded.journal).context("replay failed")?;

    println!("Replay complete.");
    println!("Level: {}", result.final_level_index + 1);
    println!("Clock: {} ms", result.final_clock_ms);
    println!("Score: {}", result.final_score);
    println!("Finished: {}", result.finished);
    println!("Snapshot Hash: {:#018x}", result.final_snapshot_hash);
    Ok(())
}
