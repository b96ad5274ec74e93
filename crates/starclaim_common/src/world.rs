use std::f32::consts::TAU;

use thiserror::Error;

use crate::constants::{STARSHIP_INITIAL_SPEED, STARSHIP_RADIUS, STARSHIP_STORAGE_INITIAL_CAPACITY};
use crate::faction::{Faction, FactionId};
use crate::planet::Planet;
use crate::rng::Lcg;
use crate::starship::{PlanetIndex, Starship};
use crate::vec2::Vec2;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FleetLaunchError {
    #[error("origin planet {0} does not exist")]
    UnknownOrigin(PlanetIndex),
    #[error("destination planet {0} does not exist")]
    UnknownDestination(PlanetIndex),
    #[error("origin and destination planets are identical")]
    SameOriginAndDestination,
    #[error("origin planet has no owner")]
    OriginUnowned,
    #[error("origin planet has no ships to launch")]
    OriginEmpty,
}

/// The outcome of a successful fleet launch, enough information to build the
/// `FLEET_LAUNCH` broadcast.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FleetLaunchOutcome {
    pub ship_count: u32,
    pub owner: FactionId,
}

/// Owns every faction, planet, and live starship for one match. Factions and planets are
/// addressed by their index, which doubles as the canonical network identifier. This
/// collection-arena layout sidesteps cyclic Planet/Starship/Faction references.
#[derive(Debug, Clone)]
pub struct World {
    pub factions: Vec<Faction>,
    pub planets: Vec<Planet>,
    pub starships: Vec<Starship>,
    pub width: f32,
    pub height: f32,
}

impl World {
    pub fn new(width: f32, height: f32) -> World {
        World {
            factions: Vec::new(),
            planets: Vec::new(),
            starships: Vec::with_capacity(STARSHIP_STORAGE_INITIAL_CAPACITY),
            width,
            height,
        }
    }

    /// Advances the whole simulation by `delta_time` seconds: planet economy, then
    /// starship motion and collision resolution.
    pub fn tick(&mut self, delta_time: f32) {
        for planet in self.planets.iter_mut() {
            planet.tick(delta_time);
        }

        self.tick_starships(delta_time);
    }

    /// Advances starship motion and resolves any arrivals, without touching planet
    /// build-up or decay. Used by clients replaying movement between snapshots, who
    /// get planet economy from the server instead of computing it locally.
    pub fn tick_starships(&mut self, delta_time: f32) {
        let mut i = 0;
        while i < self.starships.len() {
            let target_position = self.starships[i]
                .target
                .and_then(|idx| self.planets.get(idx))
                .map(|p| p.position);

            self.starships[i].tick(delta_time, target_position);

            let collided = match self.starships[i].target.and_then(|idx| self.planets.get(idx)) {
                Some(target) => self.starships[i].collides_with(target.position, target.collision_radius()),
                None => false,
            };

            if collided {
                let ship = self.starships.swap_remove(i);
                if let (Some(target_idx), Some(owner)) = (ship.target, ship.owner) {
                    if let Some(planet) = self.planets.get_mut(target_idx) {
                        planet.handle_incoming_ship(owner);
                    }
                }
                // do not advance `i`: swap_remove moved the last element into this slot
            } else {
                i += 1;
            }
        }
    }

    /// Server-side fleet launch: spawns ships from the origin's owner, draining the
    /// origin to zero.
    pub fn send_fleet(
        &mut self,
        origin: PlanetIndex,
        destination: PlanetIndex,
        rng: &mut Lcg,
    ) -> Result<FleetLaunchOutcome, FleetLaunchError> {
        if origin == destination {
            return Err(FleetLaunchError::SameOriginAndDestination);
        }
        if destination >= self.planets.len() {
            return Err(FleetLaunchError::UnknownDestination(destination));
        }
        let owner = self
            .planets
            .get(origin)
            .ok_or(FleetLaunchError::UnknownOrigin(origin))?
            .owner
            .ok_or(FleetLaunchError::OriginUnowned)?;

        let ship_count = self.planets[origin].current_fleet_size.floor() as u32;
        if ship_count == 0 {
            return Err(FleetLaunchError::OriginEmpty);
        }

        self.spawn_fleet(origin, destination, ship_count, owner, rng);
        self.planets[origin].current_fleet_size = 0.0;

        Ok(FleetLaunchOutcome { ship_count, owner })
    }

    /// Client-side replay of a server-announced launch. Unlike `send_fleet`, the ship
    /// count and owner are dictated by the broadcast, and an unowned origin takes
    /// `owner_override` to converge under packet reordering.
    pub fn simulate_fleet_launch(
        &mut self,
        origin: PlanetIndex,
        destination: PlanetIndex,
        ship_count: u32,
        owner_override: FactionId,
        rng_state: u32,
    ) -> Result<(), FleetLaunchError> {
        if origin == destination {
            return Err(FleetLaunchError::SameOriginAndDestination);
        }
        if origin >= self.planets.len() {
            return Err(FleetLaunchError::UnknownOrigin(origin));
        }
        if destination >= self.planets.len() {
            return Err(FleetLaunchError::UnknownDestination(destination));
        }

        if self.planets[origin].owner.is_none() {
            self.planets[origin].owner = Some(owner_override);
            self.planets[origin].claimant = None;
        }

        let mut rng = Lcg::new(rng_state);
        self.spawn_fleet(origin, destination, ship_count, owner_override, &mut rng);
        self.planets[origin].current_fleet_size = 0.0;

        Ok(())
    }

    /// The deterministic circular spawn pattern shared by server and clients.
    fn spawn_fleet(
        &mut self,
        origin: PlanetIndex,
        destination: PlanetIndex,
        ship_count: u32,
        owner: FactionId,
        rng: &mut Lcg,
    ) {
        let origin_planet = &self.planets[origin];
        let center = origin_planet.position;
        let spawn_radius = origin_planet.outer_radius() + STARSHIP_RADIUS * 1.5;

        let angle_step = TAU / ship_count as f32;
        let rotation_offset = rng.next_f32() * TAU;

        for i in 0..ship_count {
            let angle = rotation_offset + angle_step * i as f32;
            let direction = Vec2::from_angle(angle);
            let position = center + direction.scale(spawn_radius);
            let velocity = direction.scale(STARSHIP_INITIAL_SPEED);

            self.starships.push(Starship::new(
                position,
                velocity,
                Some(owner),
                Some(destination),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faction::Color;

    fn faction(id: FactionId) -> Faction {
        Faction::new(id, Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 })
    }

    fn world_with_two_planets() -> World {
        let mut world = World::new(1000.0, 1000.0);
        world.factions.push(faction(0));
        world.factions.push(faction(1));
        world.planets.push(Planet::new(Vec2::new(0.0, 0.0), 10.0));
        world.planets.push(Planet::new(Vec2::new(500.0, 0.0), 10.0));
        world
    }

    #[test]
    fn send_fleet_rejects_identical_origin_and_destination() {
        let mut world = world_with_two_planets();
        let mut rng = Lcg::new(1);
        assert_eq!(
            world.send_fleet(0, 0, &mut rng),
            Err(FleetLaunchError::SameOriginAndDestination)
        );
    }

    #[test]
    fn send_fleet_rejects_unowned_origin() {
        let mut world = world_with_two_planets();
        let mut rng = Lcg::new(1);
        assert_eq!(world.send_fleet(0, 1, &mut rng), Err(FleetLaunchError::OriginUnowned));
    }

    #[test]
    fn send_fleet_rejects_empty_origin() {
        let mut world = world_with_two_planets();
        world.planets[0].owner = Some(0);
        world.planets[0].current_fleet_size = 0.0;
        let mut rng = Lcg::new(1);
        assert_eq!(world.send_fleet(0, 1, &mut rng), Err(FleetLaunchError::OriginEmpty));
    }

    #[test]
    fn send_fleet_spawns_floor_of_current_fleet_size_and_drains_origin() {
        let mut world = world_with_two_planets();
        world.planets[0].owner = Some(0);
        world.planets[0].current_fleet_size = 7.9;
        let mut rng = Lcg::new(1);

        let outcome = world.send_fleet(0, 1, &mut rng).unwrap();
        assert_eq!(outcome.ship_count, 7);
        assert_eq!(outcome.owner, 0);
        assert_eq!(world.starships.len(), 7);
        assert_eq!(world.planets[0].current_fleet_size, 0.0);
        assert!(world.starships.iter().all(|s| s.target == Some(1)));
    }

    #[test]
    fn deterministic_replay_matches_server_spawn() {
        let mut server_world = world_with_two_planets();
        server_world.planets[0].owner = Some(0);
        server_world.planets[0].current_fleet_size = 7.0;
        let mut rng = Lcg::new(0x1234_5678);
        let snapshot = rng.state();
        let outcome = server_world.send_fleet(0, 1, &mut rng).unwrap();

        let mut client_world = world_with_two_planets();
        client_world
            .simulate_fleet_launch(0, 1, outcome.ship_count, outcome.owner, snapshot)
            .unwrap();

        assert_eq!(server_world.starships.len(), client_world.starships.len());
        for (a, b) in server_world.starships.iter().zip(client_world.starships.iter()) {
            assert_eq!(a.position, b.position);
            assert_eq!(a.velocity, b.velocity);
        }
    }

    #[test]
    fn simulate_fleet_launch_takes_ownership_of_unowned_origin() {
        let mut world = world_with_two_planets();
        world.planets[0].current_fleet_size = 3.0;
        world.simulate_fleet_launch(0, 1, 3, 5, 42).unwrap();
        assert_eq!(world.planets[0].owner, Some(5));
        assert!(world.planets[0].claimant.is_none());
    }

    #[test]
    fn world_tick_resolves_collisions_within_the_same_tick() {
        let mut world = world_with_two_planets();
        world.planets[1].owner = None;
        world.starships.push(Starship::new(
            Vec2::new(499.0, 0.0),
            Vec2::ZERO,
            Some(0),
            Some(1),
        ));

        world.tick(1.0 / 60.0);
        assert_eq!(world.starships.len(), 0);
        assert_eq!(world.planets[1].claimant, Some(0));
    }

    #[test]
    fn world_tick_swap_removes_by_index_without_skipping_entries() {
        let mut world = world_with_two_planets();
        // three ships already touching their target: all three must be resolved and removed
        for _ in 0..3 {
            world.starships.push(Starship::new(
                Vec2::new(500.0, 0.0),
                Vec2::ZERO,
                Some(0),
                Some(1),
            ));
        }

        world.tick(1.0 / 60.0);
        assert_eq!(world.starships.len(), 0);
    }
}
