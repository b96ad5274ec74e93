use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use starclaim_common::constants::{
    DEFAULT_PLANET_COUNT, DEFAULT_PORT, DEFAULT_RNG_SEED, DEFAULT_TICK_HZ, DEFAULT_WORLD_HEIGHT,
    DEFAULT_WORLD_WIDTH, MAX_PLAYERS, SNAPSHOT_HZ,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_address: SocketAddrV4,
    pub max_players: usize,
    pub client_timeout: Duration,
    pub snapshot_hz: f32,
    pub tick_hz: f32,
    pub rng_seed: u32,
    pub world_width: f32,
    pub world_height: f32,
    pub planet_count: usize,
}

pub trait ConfigProvider {
    fn get_config(&self) -> ServerConfig;
}

mod default {
    use super::*;

    pub struct DefaultServerConfig;

    impl ConfigProvider for DefaultServerConfig {
        fn get_config(&self) -> ServerConfig {
            ServerConfig {
                bind_address: SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_PORT),
                max_players: MAX_PLAYERS,
                client_timeout: Duration::from_secs_f32(
                    starclaim_common::constants::CLIENT_TIMEOUT_SECONDS,
                ),
                snapshot_hz: SNAPSHOT_HZ,
                tick_hz: DEFAULT_TICK_HZ,
                rng_seed: DEFAULT_RNG_SEED,
                world_width: DEFAULT_WORLD_WIDTH,
                world_height: DEFAULT_WORLD_HEIGHT,
                planet_count: DEFAULT_PLANET_COUNT,
            }
        }
    }
}

pub fn default_config_provider() -> Box<dyn ConfigProvider> {
    Box::new(default::DefaultServerConfig {})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_constants() {
        let cfg = default_config_provider().get_config();
        assert_eq!(cfg.bind_address.port(), DEFAULT_PORT);
        assert_eq!(cfg.max_players, MAX_PLAYERS);
    }
}
