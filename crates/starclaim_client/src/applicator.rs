use log::{debug, info, warn};
use starclaim_common::packet::{FullPacket, Packet, SnapshotPacket};
use starclaim_common::{Color, Faction, FactionId, Planet, Starship, Vec2, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicatorState {
    AwaitingFull,
    Synced,
}

/// Mirrors the authoritative world from server broadcasts. Clients never run
/// `send_fleet` or `MOVE_ORDER` locally; they only replay what the server announces.
pub struct Applicator {
    pub state: ApplicatorState,
    pub world: World,
    pub faction_id: Option<FactionId>,
    pub detached: bool,
    pub detach_reason: Option<String>,
}

impl Applicator {
    pub fn new() -> Applicator {
        Applicator {
            state: ApplicatorState::AwaitingFull,
            world: World::new(0.0, 0.0),
            faction_id: None,
            detached: false,
            detach_reason: None,
        }
    }

    pub fn apply(&mut self, packet: Packet) {
        match packet {
            Packet::Full(full) => self.apply_full(full),
            Packet::Assignment(assignment) => {
                self.faction_id = Some(assignment.faction_id);
                info!("assigned to faction {}", assignment.faction_id);
            }
            Packet::Snapshot(snapshot) => self.apply_snapshot(snapshot),
            Packet::FleetLaunch(launch) => {
                if self.state != ApplicatorState::Synced {
                    debug!("ignoring FLEET_LAUNCH before FULL sync");
                    return;
                }
                if let Err(error) = self.world.simulate_fleet_launch(
                    launch.origin,
                    launch.destination,
                    launch.ship_count,
                    launch.owner_faction_id,
                    launch.ship_spawn_rng_state,
                ) {
                    warn!("could not replay fleet launch: {error}");
                }
            }
            Packet::ServerDisconnect(disconnect) => {
                info!("server disconnected us: {}", disconnect.reason);
                self.detached = true;
                self.detach_reason = Some(disconnect.reason);
            }
            Packet::MoveOrder(_) | Packet::ClientDisconnect(_) => {
                debug!("ignoring client->server packet echoed by the server");
            }
        }
    }

    fn apply_full(&mut self, full: FullPacket) {
        let mut world = World::new(full.width, full.height);

        for faction in &full.factions {
            let [r, g, b, a] = faction.color;
            world.factions.push(Faction::new(faction.id, Color { r, g, b, a }));
        }

        for planet in &full.planets {
            world.planets.push(Planet {
                position: Vec2::new(planet.pos_x, planet.pos_y),
                max_fleet_capacity: planet.max_cap,
                current_fleet_size: planet.cur_size,
                owner: non_negative(planet.owner_id),
                claimant: non_negative(planet.claimant_id),
            });
        }

        let planet_count = world.planets.len();
        for ship in &full.starships {
            let target = match non_negative(ship.target_planet_index) {
                Some(index) if (index as usize) < planet_count => Some(index as usize),
                Some(_) | None => {
                    debug!("dropping starship with out-of-range target {}", ship.target_planet_index);
                    continue;
                }
            };

            world.starships.push(Starship::new(
                Vec2::new(ship.pos_x, ship.pos_y),
                Vec2::new(ship.vel_x, ship.vel_y),
                non_negative(ship.owner_id),
                target,
            ));
        }

        self.world = world;
        self.state = ApplicatorState::Synced;
        info!("synced FULL world: {} factions, {} planets, {} starships",
            full.factions.len(), full.planets.len(), full.starships.len());
    }

    fn apply_snapshot(&mut self, snapshot: SnapshotPacket) {
        if self.state != ApplicatorState::Synced {
            debug!("ignoring SNAPSHOT before FULL sync");
            return;
        }
        if snapshot.planets.len() != self.world.planets.len() {
            warn!(
                "rejecting SNAPSHOT: expected {} planets, got {}",
                self.world.planets.len(),
                snapshot.planets.len()
            );
            return;
        }

        for (planet, update) in self.world.planets.iter_mut().zip(snapshot.planets.iter()) {
            planet.current_fleet_size = update.cur_size;
            planet.owner = non_negative(update.owner_id);
            planet.claimant = non_negative(update.claimant_id);
        }
    }

    /// Advances local starship motion and collision resolution between snapshots so
    /// movement looks smooth. Planet build-up and decay are not computed locally; the
    /// next SNAPSHOT corrects planet state regardless.
    pub fn tick(&mut self, delta_time: f32) {
        if self.state == ApplicatorState::Synced {
            self.world.tick_starships(delta_time);
        }
    }
}

impl Default for Applicator {
    fn default() -> Applicator {
        Applicator::new()
    }
}

fn non_negative(value: i32) -> Option<i32> {
    if value < 0 {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starclaim_common::packet::{FactionInfo, PlanetInfo, StarshipInfo};

    fn sample_full() -> FullPacket {
        FullPacket {
            width: 100.0,
            height: 100.0,
            factions: vec![FactionInfo { id: 0, color: [1.0, 0.0, 0.0, 1.0] }],
            planets: vec![PlanetInfo {
                pos_x: 0.0,
                pos_y: 0.0,
                max_cap: 10.0,
                cur_size: 5.0,
                owner_id: 0,
                claimant_id: -1,
            }],
            starships: vec![
                StarshipInfo {
                    pos_x: 1.0,
                    pos_y: 1.0,
                    vel_x: 0.0,
                    vel_y: 0.0,
                    owner_id: 0,
                    target_planet_index: 0,
                },
                StarshipInfo {
                    pos_x: 1.0,
                    pos_y: 1.0,
                    vel_x: 0.0,
                    vel_y: 0.0,
                    owner_id: 0,
                    target_planet_index: 5,
                },
            ],
        }
    }

    #[test]
    fn full_packet_transitions_to_synced_and_drops_invalid_targets() {
        let mut applicator = Applicator::new();
        applicator.apply(Packet::Full(sample_full()));
        assert_eq!(applicator.state, ApplicatorState::Synced);
        assert_eq!(applicator.world.planets.len(), 1);
        assert_eq!(applicator.world.starships.len(), 1);
    }

    #[test]
    fn snapshot_before_full_is_ignored() {
        let mut applicator = Applicator::new();
        applicator.apply(Packet::Snapshot(SnapshotPacket { planets: vec![] }));
        assert_eq!(applicator.state, ApplicatorState::AwaitingFull);
    }

    #[test]
    fn snapshot_with_mismatched_planet_count_is_rejected() {
        use starclaim_common::packet::SnapshotPlanet;

        let mut applicator = Applicator::new();
        applicator.apply(Packet::Full(sample_full()));
        let original = applicator.world.planets[0].current_fleet_size;

        applicator.apply(Packet::Snapshot(SnapshotPacket {
            planets: vec![
                SnapshotPlanet { cur_size: 9.0, owner_id: 0, claimant_id: -1 },
                SnapshotPlanet { cur_size: 9.0, owner_id: 0, claimant_id: -1 },
            ],
        }));

        assert_eq!(applicator.world.planets[0].current_fleet_size, original);
    }

    #[test]
    fn server_disconnect_marks_the_client_detached() {
        use starclaim_common::packet::ServerDisconnectPacket;

        let mut applicator = Applicator::new();
        applicator.apply(Packet::ServerDisconnect(ServerDisconnectPacket {
            reason: "timed out".to_owned(),
        }));
        assert!(applicator.detached);
        assert_eq!(applicator.detach_reason.as_deref(), Some("timed out"));
    }
}
