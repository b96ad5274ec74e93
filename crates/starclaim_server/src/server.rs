use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use log::{debug, info, warn};
use starclaim_common::packet::{
    AssignmentPacket, ClientDisconnectPacket, FactionInfo, FleetLaunchPacket, FullPacket,
    JOIN_PREFIX, MoveOrderPacket, Packet, PlanetInfo, SERVER_FULL_MESSAGE, ServerDisconnectPacket,
    SnapshotPacket, SnapshotPlanet, StarshipInfo,
};
use starclaim_common::{Decoder, Encoder, Lcg, PacketCodec, World};

use crate::config_provider::ServerConfig;
use crate::player::PlayerRegistry;
use crate::transport::{Transport, MAX_DATAGRAM_SIZE};

pub struct Server {
    world: World,
    registry: PlayerRegistry,
    transport: Transport,
    rng: Lcg,
    codec: PacketCodec,
    config: ServerConfig,
    snapshot_accumulator: f32,
    recv_buffer: Vec<u8>,
}

impl Server {
    pub fn new(config: ServerConfig, world: World) -> std::io::Result<Server> {
        let transport = Transport::bind(config.bind_address)?;
        Ok(Server {
            registry: PlayerRegistry::new(config.max_players),
            transport,
            rng: Lcg::new(config.rng_seed),
            codec: PacketCodec,
            snapshot_accumulator: 0.0,
            recv_buffer: vec![0u8; MAX_DATAGRAM_SIZE],
            world,
            config,
        })
    }

    /// Runs the tick loop until `shutdown` is flagged, e.g. by a Ctrl-C handler.
    pub fn run(&mut self, shutdown: Arc<AtomicBool>) {
        let tick_budget = Duration::from_secs_f32(1.0 / self.config.tick_hz);
        let mut last_tick = Instant::now();

        loop {
            if shutdown.load(Ordering::SeqCst) {
                self.broadcast_disconnect_all("server shutting down");
                info!("server shutdown complete");
                return;
            }

            let tick_start = Instant::now();
            let delta_time = (tick_start - last_tick).as_secs_f32();
            last_tick = tick_start;

            self.drain_inbound();
            self.world.tick(delta_time);
            self.expire_timed_out_players(delta_time);

            self.snapshot_accumulator += delta_time;
            let snapshot_period = 1.0 / self.config.snapshot_hz;
            while self.snapshot_accumulator >= snapshot_period {
                self.broadcast_snapshot();
                self.snapshot_accumulator -= snapshot_period;
            }

            let elapsed = tick_start.elapsed();
            if elapsed < tick_budget {
                std::thread::sleep(tick_budget - elapsed);
            }
        }
    }

    fn drain_inbound(&mut self) {
        loop {
            let (len, from) = match self.transport.try_recv(&mut self.recv_buffer) {
                Ok(Some(value)) => value,
                Ok(None) => return,
                Err(error) => {
                    warn!("transport receive error: {error}");
                    return;
                }
            };

            let datagram = self.recv_buffer[..len].to_vec();
            self.handle_datagram(&datagram, from);
        }
    }

    fn handle_datagram(&mut self, datagram: &[u8], from: SocketAddr) {
        if datagram.starts_with(JOIN_PREFIX) {
            self.handle_join(from);
            return;
        }

        match self.codec.decode(datagram) {
            Ok(Packet::MoveOrder(order)) => self.handle_move_order(from, order),
            Ok(Packet::ClientDisconnect(ClientDisconnectPacket)) => {
                if self.registry.remove_by_address(from).is_some() {
                    info!("{from} disconnected gracefully");
                }
            }
            Ok(other) => {
                debug!("dropping misrouted client->server packet {:?} from {from}", other.packet_type());
            }
            Err(error) => {
                debug!("dropping malformed datagram from {from}: {error}");
            }
        }
    }

    fn handle_join(&mut self, from: SocketAddr) {
        let faction_count = self.world.factions.len();
        match self.registry.ensure_for_address(from, faction_count) {
            Ok(index) => {
                let faction_id = self.registry.players()[index].faction_id;
                self.send_full(from);
                self.send_packet(Packet::Assignment(AssignmentPacket { faction_id }), from);
            }
            Err(error) => {
                warn!("rejecting JOIN from {from}: {error}");
                self.transport.send_to(SERVER_FULL_MESSAGE, from);
            }
        }
    }

    fn handle_move_order(&mut self, from: SocketAddr, order: MoveOrderPacket) {
        let Some(player_index) = self.registry.find_by_address(from) else {
            debug!("MOVE_ORDER from unknown address {from}");
            return;
        };
        let player_faction = self.registry.players()[player_index].faction_id;
        self.registry.reset_inactivity(player_index);

        if order.destination >= self.world.planets.len() {
            debug!("MOVE_ORDER destination {} out of range", order.destination);
            return;
        }

        for origin in order.origins {
            if origin == order.destination {
                continue;
            }
            let valid_origin = self
                .world
                .planets
                .get(origin)
                .is_some_and(|p| p.owner == Some(player_faction));
            if !valid_origin {
                debug!("skipping invalid MOVE_ORDER origin {origin} for {from}");
                continue;
            }

            self.launch_fleet(origin, order.destination);
        }
    }

    fn launch_fleet(&mut self, origin: usize, destination: usize) {
        let rng_state = self.rng.state();
        match self.world.send_fleet(origin, destination, &mut self.rng) {
            Ok(outcome) => {
                let launch = FleetLaunchPacket {
                    origin,
                    destination,
                    ship_count: outcome.ship_count,
                    owner_faction_id: outcome.owner,
                    ship_spawn_rng_state: rng_state,
                };
                self.broadcast(Packet::FleetLaunch(launch));
            }
            Err(error) => {
                debug!("fleet launch {origin}->{destination} rejected: {error}");
            }
        }
    }

    fn expire_timed_out_players(&mut self, delta_time: f32) {
        let timed_out = self
            .registry
            .update_timeouts(delta_time, self.config.client_timeout.as_secs_f32());
        for index in timed_out {
            if let Some(player) = self.registry.remove(index) {
                self.send_packet(
                    Packet::ServerDisconnect(ServerDisconnectPacket {
                        reason: "timed out".to_owned(),
                    }),
                    player.address,
                );
            }
        }
    }

    fn send_full(&mut self, addr: SocketAddr) {
        let factions = self
            .world
            .factions
            .iter()
            .map(|f| FactionInfo {
                id: f.id,
                color: [f.color.r, f.color.g, f.color.b, f.color.a],
            })
            .collect();

        let planets = self
            .world
            .planets
            .iter()
            .map(|p| PlanetInfo {
                pos_x: p.position.x,
                pos_y: p.position.y,
                max_cap: p.max_fleet_capacity,
                cur_size: p.current_fleet_size,
                owner_id: p.owner.unwrap_or(-1),
                claimant_id: p.claimant.unwrap_or(-1),
            })
            .collect();

        let starships = self
            .world
            .starships
            .iter()
            .map(|s| StarshipInfo {
                pos_x: s.position.x,
                pos_y: s.position.y,
                vel_x: s.velocity.x,
                vel_y: s.velocity.y,
                owner_id: s.owner.unwrap_or(-1),
                target_planet_index: s.target.map(|t| t as i32).unwrap_or(-1),
            })
            .collect();

        let full = FullPacket {
            width: self.world.width,
            height: self.world.height,
            factions,
            planets,
            starships,
        };

        self.send_packet(Packet::Full(full), addr);
    }

    fn broadcast_snapshot(&mut self) {
        let planets = self
            .world
            .planets
            .iter()
            .map(|p| SnapshotPlanet {
                cur_size: p.current_fleet_size,
                owner_id: p.owner.unwrap_or(-1),
                claimant_id: p.claimant.unwrap_or(-1),
            })
            .collect();

        self.broadcast(Packet::Snapshot(SnapshotPacket { planets }));
    }

    fn broadcast_disconnect_all(&mut self, reason: &str) {
        let packet = Packet::ServerDisconnect(ServerDisconnectPacket {
            reason: reason.to_owned(),
        });
        self.broadcast(packet);
    }

    fn broadcast(&mut self, packet: Packet) {
        let mut buf = BytesMut::new();
        if let Err(error) = self.codec.encode(packet, &mut buf) {
            warn!("failed to encode broadcast packet: {error}");
            return;
        }
        for player in self.registry.players().to_vec() {
            self.transport.send_to(&buf, player.address);
        }
    }

    fn send_packet(&mut self, packet: Packet, addr: SocketAddr) {
        let mut buf = BytesMut::new();
        if let Err(error) = self.codec.encode(packet, &mut buf) {
            warn!("failed to encode packet for {addr}: {error}");
            return;
        }
        self.transport.send_to(&buf, addr);
    }
}
