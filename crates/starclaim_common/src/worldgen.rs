use crate::faction::{Color, Faction, FactionId};
use crate::planet::Planet;
use crate::rng::Lcg;
use crate::vec2::Vec2;
use crate::world::World;

/// Evenly spaced hues around the color wheel, one per faction slot.
fn faction_color(index: usize, count: usize) -> Color {
    let hue = index as f32 / count.max(1) as f32;
    let (r, g, b) = hsv_to_rgb(hue);
    Color { r, g, b, a: 1.0 }
}

fn hsv_to_rgb(hue: f32) -> (f32, f32, f32) {
    let h = hue * 6.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    }
}

/// Builds a deterministic world from `rng_seed`. Planet layout and count are bundled
/// defaults, not a modeled feature. `faction_count` reserves a neutral-free roster of
/// factions that the player registry assigns to joining clients one at a time.
pub fn generate_world(
    width: f32,
    height: f32,
    planet_count: usize,
    faction_count: usize,
    rng_seed: u32,
) -> World {
    let mut world = World::new(width, height);
    let mut rng = Lcg::new(rng_seed);

    for i in 0..faction_count {
        let id = i as FactionId;
        world.factions.push(Faction::new(id, faction_color(i, faction_count)));
    }

    let margin = (width.min(height) * 0.1).max(1.0);
    for _ in 0..planet_count {
        let x = margin + rng.next_f32() * (width - 2.0 * margin).max(1.0);
        let y = margin + rng.next_f32() * (height - 2.0 * margin).max(1.0);
        let capacity = 5.0 + rng.next_f32() * 20.0;
        world.planets.push(Planet::new(Vec2::new(x, y), capacity));
    }

    world
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_produces_identical_worlds() {
        let a = generate_world(1000.0, 1000.0, 12, 4, 0x1234_5678);
        let b = generate_world(1000.0, 1000.0, 12, 4, 0x1234_5678);
        assert_eq!(a.planets, b.planets);
        assert_eq!(a.factions, b.factions);
    }

    #[test]
    fn different_seeds_produce_different_layouts() {
        let a = generate_world(1000.0, 1000.0, 12, 4, 1);
        let b = generate_world(1000.0, 1000.0, 12, 4, 2);
        assert_ne!(a.planets, b.planets);
    }

    #[test]
    fn generated_planets_stay_within_bounds() {
        let world = generate_world(500.0, 300.0, 20, 4, 7);
        for planet in &world.planets {
            assert!(planet.position.x >= 0.0 && planet.position.x <= 500.0);
            assert!(planet.position.y >= 0.0 && planet.position.y <= 300.0);
        }
    }

    #[test]
    fn faction_count_matches_request() {
        let world = generate_world(500.0, 500.0, 5, 6, 3);
        assert_eq!(world.factions.len(), 6);
    }
}
