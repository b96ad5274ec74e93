pub const PROTOCOL_VERSION: u8 = 1;

/// Server-authoritative simulation tuning. Every implementation on the wire MUST agree on
/// these exactly; see the packet codec for the layout they travel in.
pub mod constants {
    pub const PLANET_RADIUS_SCALE: f32 = 3.5;
    pub const PLANET_RING_THICKNESS: f32 = 10.0;
    pub const PLANET_FLEET_BUILD_RATE: f32 = 2.0;
    pub const PLANET_FLEET_REDUCTION_MULTIPLIER: f32 = 0.5;

    pub const STARSHIP_RADIUS: f32 = 1.0;
    pub const STARSHIP_MAX_SPEED: f32 = 75.0;
    pub const STARSHIP_ACCELERATION: f32 = 90.0;
    pub const STARSHIP_INITIAL_SPEED: f32 = 45.0;

    pub const SNAPSHOT_HZ: f32 = 20.0;
    pub const CLIENT_TIMEOUT_SECONDS: f32 = 1800.0;
    pub const MAX_PLAYERS: usize = 16;
    pub const DEFAULT_RNG_SEED: u32 = 0x1234_5678;
    pub const DEFAULT_PORT: u16 = 22311;

    pub const STARSHIP_STORAGE_INITIAL_CAPACITY: usize = 16;

    pub const DEFAULT_WORLD_WIDTH: f32 = 2000.0;
    pub const DEFAULT_WORLD_HEIGHT: f32 = 2000.0;
    pub const DEFAULT_PLANET_COUNT: usize = 24;

    pub const DEFAULT_TICK_HZ: f32 = 60.0;
}

pub mod vec2;
pub mod rng;
pub mod faction;
pub mod planet;
pub mod starship;
pub mod world;
pub mod worldgen;
pub mod packet;
pub mod codec;

pub use codec::{Decoder, Encoder, PacketCodec, PacketDecodeError};
pub use faction::{Color, Faction, FactionId};
pub use planet::Planet;
pub use rng::Lcg;
pub use starship::{PlanetIndex, Starship};
pub use vec2::Vec2;
pub use world::{FleetLaunchError, FleetLaunchOutcome, World};
pub use worldgen::generate_world;
