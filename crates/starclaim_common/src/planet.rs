use crate::constants::{PLANET_FLEET_BUILD_RATE, PLANET_FLEET_REDUCTION_MULTIPLIER, PLANET_RADIUS_SCALE, PLANET_RING_THICKNESS};
use crate::faction::FactionId;
use crate::vec2::Vec2;

#[derive(Debug, Clone, PartialEq)]
pub struct Planet {
    pub position: Vec2,
    pub max_fleet_capacity: f32,
    pub current_fleet_size: f32,
    pub owner: Option<FactionId>,
    pub claimant: Option<FactionId>,
}

impl Planet {
    pub fn new(position: Vec2, max_fleet_capacity: f32) -> Planet {
        Planet {
            position,
            max_fleet_capacity,
            current_fleet_size: 0.0,
            owner: None,
            claimant: None,
        }
    }

    pub fn outer_radius(&self) -> f32 {
        (self.max_fleet_capacity * PLANET_RADIUS_SCALE).max(1.0)
    }

    pub fn inner_radius(&self) -> f32 {
        let outer = self.outer_radius();
        let fill = if self.max_fleet_capacity > 0.0 {
            (self.current_fleet_size / self.max_fleet_capacity).max(0.0)
        } else {
            0.0
        };
        ((outer - PLANET_RING_THICKNESS / 2.0) * fill).max(0.0)
    }

    pub fn collision_radius(&self) -> f32 {
        self.outer_radius().max(self.inner_radius())
    }

    /// Advances the planet's fleet economy by `delta_time` seconds.
    pub fn tick(&mut self, delta_time: f32) {
        match (self.owner, self.claimant) {
            (None, None) => self.current_fleet_size = 0.0,
            (None, Some(_)) => {
                self.current_fleet_size = self
                    .current_fleet_size
                    .clamp(0.0, self.max_fleet_capacity);
            }
            (Some(_), _) => {
                if self.current_fleet_size < self.max_fleet_capacity {
                    self.current_fleet_size = (self.current_fleet_size
                        + PLANET_FLEET_BUILD_RATE * delta_time)
                        .min(self.max_fleet_capacity);
                } else if self.current_fleet_size > self.max_fleet_capacity {
                    let overshoot = self.current_fleet_size - self.max_fleet_capacity;
                    self.current_fleet_size = (self.current_fleet_size
                        - overshoot * PLANET_FLEET_REDUCTION_MULTIPLIER * delta_time)
                        .max(self.max_fleet_capacity);
                }
            }
        }

        if self.current_fleet_size < 0.0 {
            self.current_fleet_size = 0.0;
        }
    }

    /// Resolves a single starship colliding with this planet, the ownership state
    /// machine. `attacker` is the faction that owned the arriving ship.
    pub fn handle_incoming_ship(&mut self, attacker: FactionId) {
        match (self.owner, self.claimant) {
            (Some(owner), _) if owner == attacker => {
                self.current_fleet_size += 1.0;
            }
            (Some(_), _) => {
                self.current_fleet_size -= 1.0;
                if self.current_fleet_size < 0.0 {
                    self.owner = Some(attacker);
                    self.claimant = None;
                    self.current_fleet_size = (-self.current_fleet_size).max(1.0);
                }
            }
            (None, None) => {
                self.claimant = Some(attacker);
                self.current_fleet_size = 1.0;
            }
            (None, Some(claimant)) if claimant == attacker => {
                self.current_fleet_size += 1.0;
                if self.max_fleet_capacity > 0.0
                    && self.current_fleet_size >= self.max_fleet_capacity
                {
                    self.owner = Some(attacker);
                    self.claimant = None;
                    self.current_fleet_size = self.max_fleet_capacity;
                }
            }
            (None, Some(_)) => {
                self.current_fleet_size -= 1.0;
                if self.current_fleet_size <= 0.0 {
                    self.claimant = Some(attacker);
                    self.current_fleet_size = 1.0;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FACTION_A: FactionId = 0;
    const FACTION_B: FactionId = 1;

    fn owned(max: f32, current: f32, owner: FactionId) -> Planet {
        Planet {
            position: Vec2::ZERO,
            max_fleet_capacity: max,
            current_fleet_size: current,
            owner: Some(owner),
            claimant: None,
        }
    }

    fn neutral() -> Planet {
        Planet::new(Vec2::ZERO, 1.0)
    }

    #[test]
    fn unowned_unclaimed_planet_is_forced_to_zero() {
        let mut p = neutral();
        p.current_fleet_size = 5.0;
        p.tick(1.0);
        assert_eq!(p.current_fleet_size, 0.0);
    }

    #[test]
    fn single_ship_captures_neutral_planet() {
        let mut p = neutral();
        p.handle_incoming_ship(FACTION_A);
        assert_eq!(p.claimant, Some(FACTION_A));
        assert_eq!(p.current_fleet_size, 1.0);
        assert!(p.owner.is_none());

        p.handle_incoming_ship(FACTION_A);
        assert_eq!(p.owner, Some(FACTION_A));
        assert!(p.claimant.is_none());
        assert_eq!(p.current_fleet_size, 1.0);
    }

    #[test]
    fn counter_attack_carries_over_damage() {
        let mut p = owned(5.0, 0.2, FACTION_A);

        p.handle_incoming_ship(FACTION_B);
        assert_eq!(p.owner, Some(FACTION_B));
        assert_eq!(p.current_fleet_size, 1.0);

        p.handle_incoming_ship(FACTION_B);
        p.handle_incoming_ship(FACTION_B);
        assert_eq!(p.owner, Some(FACTION_B));
        assert_eq!(p.current_fleet_size, 3.0);
    }

    #[test]
    fn build_up_rate() {
        let mut p = owned(10.0, 0.0, FACTION_A);
        p.tick(3.0);
        assert!((p.current_fleet_size - 6.0).abs() < 1e-5);
    }

    #[test]
    fn over_capacity_decay_converges_monotonically() {
        let mut p = owned(10.0, 30.0, FACTION_A);
        p.tick(1.0);
        assert!((p.current_fleet_size - 20.0).abs() < 1e-5);
        p.tick(1.0);
        assert!((p.current_fleet_size - 15.0).abs() < 1e-5);
        assert!(p.current_fleet_size > 10.0);
    }

    #[test]
    fn ownership_exclusivity_holds_after_capture() {
        let mut p = neutral();
        p.handle_incoming_ship(FACTION_A);
        p.handle_incoming_ship(FACTION_A);
        assert!(p.owner.is_some());
        assert!(p.claimant.is_none());
    }

    #[test]
    fn rival_claimant_is_replaced_once_accrual_drops_to_zero() {
        let mut p = Planet::new(Vec2::ZERO, 10.0);
        p.handle_incoming_ship(FACTION_A);
        assert_eq!(p.claimant, Some(FACTION_A));

        p.handle_incoming_ship(FACTION_B);
        assert_eq!(p.claimant, Some(FACTION_B));
        assert_eq!(p.current_fleet_size, 1.0);
    }
}
