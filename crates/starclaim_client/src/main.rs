use std::io::{self, BufRead};
use std::net::SocketAddrV4;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{error, info, warn};
use starclaim_common::packet::{ClientDisconnectPacket, MoveOrderPacket, Packet};

mod applicator;
mod config;
mod networking;

use applicator::Applicator;
use config::{default_config_provider, ClientConfig};
use networking::{ClientSocket, InboundMessage};

/// CLI overrides layered on top of `ConfigProvider`'s defaults.
#[derive(Debug, Parser)]
#[command(name = "starclaim-client")]
struct Args {
    #[arg(long)]
    connect: Option<SocketAddrV4>,

    #[arg(long)]
    bind: Option<SocketAddrV4>,

    #[arg(long)]
    name: Option<String>,
}

fn apply_overrides(mut config: ClientConfig, args: Args) -> ClientConfig {
    if let Some(connect) = args.connect {
        config.connect = connect;
    }
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(name) = args.name {
        config.name = name;
    }
    config
}

/// Reads stdin lines on a dedicated thread; only the command text crosses back to the
/// simulation loop, which stays single-threaded otherwise.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
    rx
}

/// Parses `send <dest> <origin> [origin...]`.
fn parse_send_command(line: &str) -> Option<MoveOrderPacket> {
    let mut parts = line.split_whitespace();
    if parts.next()? != "send" {
        return None;
    }
    let destination: usize = parts.next()?.parse().ok()?;
    let origins: Vec<usize> = parts.map(|p| p.parse().ok()).collect::<Option<Vec<_>>>()?;
    if origins.is_empty() {
        return None;
    }
    Some(MoveOrderPacket { destination, origins })
}

fn print_world(applicator: &Applicator) {
    println!("--- world state (faction {:?}) ---", applicator.faction_id);
    for (i, planet) in applicator.world.planets.iter().enumerate() {
        println!(
            "planet {i}: owner={:?} claimant={:?} fleet={:.1}/{:.1}",
            planet.owner, planet.claimant, planet.current_fleet_size, planet.max_fleet_capacity
        );
    }
}

fn main() {
    pretty_env_logger::init_timed();
    info!("starclaim client startup");

    let args = Args::parse();
    let config = apply_overrides(default_config_provider().get_config(), args);
    info!("connecting to {} as '{}'", config.connect, config.name);

    let mut socket = match ClientSocket::connect(config.bind, config.connect) {
        Ok(socket) => socket,
        Err(error) => {
            error!("could not open a socket to {}: {error}", config.connect);
            std::process::exit(1);
        }
    };

    socket.send_join();

    let stdin_rx = spawn_stdin_reader();
    let mut applicator = Applicator::new();
    let tick_budget = Duration::from_secs_f32(1.0 / 60.0);
    let mut last_tick = Instant::now();

    loop {
        if applicator.detached {
            info!("detached from server: {:?}", applicator.detach_reason);
            return;
        }

        for message in socket.drain() {
            match message {
                InboundMessage::Packet(packet) => {
                    let worth_printing = matches!(packet, Packet::Snapshot(_) | Packet::Full(_));
                    applicator.apply(packet);
                    if worth_printing {
                        print_world(&applicator);
                    }
                }
                InboundMessage::ServerFull => {
                    warn!("server is full, giving up");
                    return;
                }
            }
        }

        while let Ok(line) = stdin_rx.try_recv() {
            if line.trim() == "quit" {
                socket.send_packet(Packet::ClientDisconnect(ClientDisconnectPacket));
                info!("left the game");
                return;
            }
            match parse_send_command(&line) {
                Some(order) => socket.send_packet(Packet::MoveOrder(order)),
                None => warn!("unrecognized command: {line}"),
            }
        }

        let tick_start = Instant::now();
        let delta_time = (tick_start - last_tick).as_secs_f32();
        last_tick = tick_start;
        applicator.tick(delta_time);

        let elapsed = tick_start.elapsed();
        if elapsed < tick_budget {
            thread::sleep(tick_budget - elapsed);
        }
    }
}
