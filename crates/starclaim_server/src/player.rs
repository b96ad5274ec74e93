use std::net::SocketAddr;

use log::info;
use starclaim_common::FactionId;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PlayerRegistryError {
    #[error("the player registry is at capacity")]
    Full,
    #[error("no unassigned faction is available")]
    NoFreeFaction,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub address: SocketAddr,
    pub faction_id: FactionId,
    pub awaiting_full: bool,
    pub inactivity_seconds: f32,
}

/// Tracks connected players by IPv4 address (port-agnostic, so NAT re-mappings do not
/// unseat a player) and the faction each was assigned on join.
#[derive(Debug, Default, Clone)]
pub struct PlayerRegistry {
    players: Vec<Player>,
    max_players: usize,
}

impl PlayerRegistry {
    pub fn new(max_players: usize) -> PlayerRegistry {
        PlayerRegistry {
            players: Vec::new(),
            max_players,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    fn same_host(a: SocketAddr, b: SocketAddr) -> bool {
        a.ip() == b.ip()
    }

    pub fn find_by_address(&self, addr: SocketAddr) -> Option<usize> {
        self.players.iter().position(|p| Self::same_host(p.address, addr))
    }

    fn first_unused_faction(&self, faction_count: usize) -> Option<FactionId> {
        (0..faction_count as FactionId).find(|candidate| {
            !self.players.iter().any(|p| p.faction_id == *candidate)
        })
    }

    /// Registers a new address or refreshes an existing one's endpoint and
    /// `awaiting_full` flag, as called for on receipt of a `JOIN`.
    pub fn ensure_for_address(
        &mut self,
        addr: SocketAddr,
        faction_count: usize,
    ) -> Result<usize, PlayerRegistryError> {
        if let Some(index) = self.find_by_address(addr) {
            self.players[index].address = addr;
            self.players[index].awaiting_full = true;
            self.players[index].inactivity_seconds = 0.0;
            return Ok(index);
        }

        if self.players.len() >= self.max_players {
            return Err(PlayerRegistryError::Full);
        }

        let faction_id = self
            .first_unused_faction(faction_count)
            .ok_or(PlayerRegistryError::NoFreeFaction)?;

        self.players.push(Player {
            address: addr,
            faction_id,
            awaiting_full: true,
            inactivity_seconds: 0.0,
        });

        info!("player {addr} joined, assigned faction {faction_id}");
        Ok(self.players.len() - 1)
    }

    /// Removes a player by swap-with-last.
    pub fn remove(&mut self, index: usize) -> Option<Player> {
        if index >= self.players.len() {
            return None;
        }
        let removed = self.players.swap_remove(index);
        info!("player {} left", removed.address);
        Some(removed)
    }

    pub fn remove_by_address(&mut self, addr: SocketAddr) -> Option<Player> {
        let index = self.find_by_address(addr)?;
        self.remove(index)
    }

    /// Advances inactivity timers, returning the players that have crossed `timeout` and
    /// must be disconnected. Callers are responsible for actually removing them after
    /// sending `SERVER_DISCONNECT`, since the registry can't both iterate and mutate.
    pub fn update_timeouts(&mut self, delta_time: f32, timeout_seconds: f32) -> Vec<usize> {
        for player in self.players.iter_mut() {
            player.inactivity_seconds += delta_time;
        }

        let mut timed_out: Vec<usize> = self
            .players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.inactivity_seconds >= timeout_seconds)
            .map(|(i, _)| i)
            .collect();
        // descending order so repeated swap_remove in the caller does not invalidate
        // indices collected before the removal point
        timed_out.sort_unstable_by(|a, b| b.cmp(a));
        timed_out
    }

    pub fn reset_inactivity(&mut self, index: usize) {
        if let Some(player) = self.players.get_mut(index) {
            player.inactivity_seconds = 0.0;
        }
    }
}
