use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use itertools::Itertools;
use simulation::{run_table, ConfigOverrides, SimulationConfig};
use store::{InMemoryStore, SharedStore};
use strategies::{DefaultStrategy, InputStrategy, RandomStrategy};
use types::{Strategy, Variant, PLAYER_COUNT};

const BOT_NAMES: [&str; PLAYER_COUNT] = ["North", "East", "South", "West"];

#[derive(Parser, Debug)]
struct Params {
    /// Player names; missing seats are filled with bots.
    #[arg(short, long)]
    player: Vec<String>,

    /// YAML file with table settings.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    rounds: Option<u32>,

    #[arg(long)]
    trick_delay_ms: Option<u64>,

    #[arg(long)]
    round_pause_ms: Option<u64>,

    #[arg(long)]
    store_retries: Option<usize>,

    /// Players who can beat the current winner must do so.
    #[arg(long)]
    must_overtake: bool,

    /// The first seat reads its moves from stdin.
    #[arg(long)]
    interactive: bool,

    /// Bots play random legal cards instead of the default heuristic.
    #[arg(long)]
    random_bots: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Params::parse();
    log::info!("args: {args:?}");

    let config = SimulationConfig::from_cli_or_env_or_yaml(
        ConfigOverrides {
            trick_delay_ms: args.trick_delay_ms,
            round_pause_ms: args.round_pause_ms,
            rounds: args.rounds,
            variant: args.must_overtake.then_some(Variant::MustOvertake),
            store_retries: args.store_retries,
        },
        args.config.as_deref(),
    )?;
    log::info!("config: {config:?}");

    let seats: Vec<(String, Box<dyn Strategy>)> = (0..PLAYER_COUNT)
        .map(|seat| {
            let name = args
                .player
                .get(seat)
                .cloned()
                .unwrap_or_else(|| BOT_NAMES[seat].to_string());
            let strategy: Box<dyn Strategy> = if seat == 0 && args.interactive {
                Box::new(InputStrategy::default())
            } else if args.random_bots {
                Box::new(RandomStrategy::default())
            } else {
                Box::new(DefaultStrategy::default())
            };
            (name, strategy)
        })
        .collect();

    let store: Arc<dyn SharedStore> = Arc::new(InMemoryStore::new());
    let rooms = run_table(store, seats, config).await?;

    if let Some(room) = rooms.first() {
        println!("Final standings after round {}:", room.round);
        for (place, player) in room.standings().iter().enumerate() {
            println!("{}. {} {:.1}", place + 1, player.name, player.score);
        }
        log::debug!(
            "bids: {}",
            room.players
                .values()
                .map(|p| format!("{}={}", p.name, p.bid.unwrap_or(0)))
                .join(", ")
        );
    }
    Ok(())
}
