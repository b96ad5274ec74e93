use std::net::SocketAddrV4;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use log::{error, info};
use starclaim_common::generate_world;

mod config_provider;
mod player;
mod server;
mod transport;

use config_provider::{default_config_provider, ServerConfig};
use server::Server;

/// CLI overrides layered on top of `ConfigProvider`'s defaults.
#[derive(Debug, Parser)]
#[command(name = "starclaim-server")]
struct Args {
    #[arg(long)]
    bind: Option<SocketAddrV4>,

    #[arg(long)]
    max_players: Option<usize>,

    #[arg(long)]
    timeout_secs: Option<u64>,

    #[arg(long)]
    snapshot_hz: Option<f32>,

    #[arg(long)]
    tick_hz: Option<f32>,

    #[arg(long)]
    rng_seed: Option<u32>,
}

fn apply_overrides(mut config: ServerConfig, args: Args) -> ServerConfig {
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    if let Some(max_players) = args.max_players {
        config.max_players = max_players;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config.client_timeout = std::time::Duration::from_secs(timeout_secs);
    }
    if let Some(snapshot_hz) = args.snapshot_hz {
        config.snapshot_hz = snapshot_hz;
    }
    if let Some(tick_hz) = args.tick_hz {
        config.tick_hz = tick_hz;
    }
    if let Some(rng_seed) = args.rng_seed {
        config.rng_seed = rng_seed;
    }
    config
}

fn main() {
    pretty_env_logger::init_timed();

    info!("starclaim server startup");

    let args = Args::parse();
    let config = apply_overrides(default_config_provider().get_config(), args);

    let world = generate_world(
        config.world_width,
        config.world_height,
        config.planet_count,
        config.max_players,
        config.rng_seed,
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_handle = shutdown.clone();
    if let Err(error) = ctrlc::set_handler(move || {
        shutdown_handle.store(true, Ordering::SeqCst);
    }) {
        error!("failed to install Ctrl-C handler: {error}");
    }

    let bind_address = config.bind_address;
    match Server::new(config, world) {
        Ok(mut server) => {
            info!("listening on {bind_address}");
            server.run(shutdown);
        }
        Err(error) => {
            error!("unable to bind {bind_address}: {error}");
            std::process::exit(1);
        }
    }
}
