use crate::constants::{STARSHIP_ACCELERATION, STARSHIP_MAX_SPEED, STARSHIP_RADIUS};
use crate::faction::FactionId;
use crate::vec2::Vec2;

/// Index of a planet within `World::planets`; also the canonical network identifier.
pub type PlanetIndex = usize;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Starship {
    pub position: Vec2,
    pub velocity: Vec2,
    pub owner: Option<FactionId>,
    pub target: Option<PlanetIndex>,
}

impl Starship {
    pub fn new(
        position: Vec2,
        velocity: Vec2,
        owner: Option<FactionId>,
        target: Option<PlanetIndex>,
    ) -> Starship {
        Starship {
            position,
            velocity: velocity.clamped_to_length(STARSHIP_MAX_SPEED),
            owner,
            target,
        }
    }

    /// Advances kinematics toward `target_position`, if the ship has a target.
    pub fn tick(&mut self, delta_time: f32, target_position: Option<Vec2>) {
        if let Some(target_position) = target_position {
            let direction = (target_position - self.position).normalized();
            self.velocity += direction.scale(STARSHIP_ACCELERATION * delta_time);
            self.velocity = self.velocity.clamped_to_length(STARSHIP_MAX_SPEED);
        }

        self.position += self.velocity.scale(delta_time);
    }

    pub fn collides_with(&self, target_position: Vec2, target_collision_radius: f32) -> bool {
        self.position.distance_to(target_position) <= target_collision_radius + STARSHIP_RADIUS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ship_clamps_velocity_to_max_speed() {
        let s = Starship::new(Vec2::ZERO, Vec2::new(1000.0, 0.0), Some(0), Some(0));
        assert!((s.velocity.length() - STARSHIP_MAX_SPEED).abs() < 1e-4);
    }

    #[test]
    fn ship_without_a_target_coasts_in_a_straight_line() {
        let mut s = Starship::new(Vec2::ZERO, Vec2::new(10.0, 0.0), Some(0), None);
        s.tick(1.0, None);
        assert_eq!(s.position, Vec2::new(10.0, 0.0));
        assert_eq!(s.velocity, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn ship_accelerates_toward_its_target() {
        let mut s = Starship::new(Vec2::ZERO, Vec2::ZERO, Some(0), Some(0));
        s.tick(1.0, Some(Vec2::new(100.0, 0.0)));
        assert!(s.velocity.x > 0.0);
        assert_eq!(s.velocity.y, 0.0);
    }

    #[test]
    fn collision_uses_combined_radius() {
        let s = Starship::new(Vec2::new(5.0, 0.0), Vec2::ZERO, Some(0), Some(0));
        assert!(s.collides_with(Vec2::ZERO, 4.0));
        assert!(!s.collides_with(Vec2::ZERO, 2.0));
    }
}
