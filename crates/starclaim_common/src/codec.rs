use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;

use crate::packet::{
    AssignmentPacket, ClientDisconnectPacket, FactionInfo, FleetLaunchPacket, FullPacket,
    MoveOrderPacket, Packet, PacketType, PlanetInfo, ServerDisconnectPacket,
    SERVER_DISCONNECT_REASON_MAX_LEN, SnapshotPacket, SnapshotPlanet, StarshipInfo,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PacketDecodeError {
    #[error("buffer too short to hold a packet of this type")]
    TooShort,
    #[error("unknown packet discriminant {0}")]
    UnknownType(u32),
    #[error("expected count {expected}, got {actual}")]
    CountMismatch { expected: u32, actual: u32 },
    #[error("malformed packet: {0}")]
    Malformed(&'static str),
}

/// Mirrors the shape of a `tokio_util::codec::{Encoder, Decoder}` pair, without pulling
/// in the async runtime this crate deliberately does not depend on. The transport runs a
/// plain blocking tick loop over a non-blocking socket, not a reactor.
pub trait Encoder<Item> {
    type Error;
    fn encode(&mut self, item: Item, dst: &mut BytesMut) -> Result<(), Self::Error>;
}

pub trait Decoder {
    type Item;
    type Error;
    /// Decodes exactly one whole datagram. Unlike a streaming `tokio_util` decoder, this
    /// never asks for more bytes: UDP already hands us complete messages.
    fn decode(&mut self, src: &[u8]) -> Result<Self::Item, Self::Error>;
}

#[derive(Debug, Default, Copy, Clone)]
pub struct PacketCodec;

const FULL_HEADER_LEN: usize = 24;
const FACTION_RECORD_LEN: usize = 20;
const PLANET_RECORD_LEN: usize = 24;
const STARSHIP_RECORD_LEN: usize = 24;
const SNAPSHOT_HEADER_LEN: usize = 8;
const SNAPSHOT_RECORD_LEN: usize = 12;
const ASSIGNMENT_LEN: usize = 8;
const MOVE_ORDER_HEADER_LEN: usize = 12;
const FLEET_LAUNCH_LEN: usize = 24;
const SERVER_DISCONNECT_HEADER_LEN: usize = 8;
const CLIENT_DISCONNECT_LEN: usize = 4;

impl Encoder<Packet> for PacketCodec {
    type Error = PacketDecodeError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Packet::Full(full) => {
                dst.put_u32_le(PacketType::Full as u32);
                dst.put_f32_le(full.width);
                dst.put_f32_le(full.height);
                dst.put_u32_le(full.factions.len() as u32);
                dst.put_u32_le(full.planets.len() as u32);
                dst.put_u32_le(full.starships.len() as u32);
                for faction in &full.factions {
                    dst.put_i32_le(faction.id);
                    for channel in faction.color {
                        dst.put_f32_le(channel);
                    }
                }
                for planet in &full.planets {
                    dst.put_f32_le(planet.pos_x);
                    dst.put_f32_le(planet.pos_y);
                    dst.put_f32_le(planet.max_cap);
                    dst.put_f32_le(planet.cur_size);
                    dst.put_i32_le(planet.owner_id);
                    dst.put_i32_le(planet.claimant_id);
                }
                for ship in &full.starships {
                    dst.put_f32_le(ship.pos_x);
                    dst.put_f32_le(ship.pos_y);
                    dst.put_f32_le(ship.vel_x);
                    dst.put_f32_le(ship.vel_y);
                    dst.put_i32_le(ship.owner_id);
                    dst.put_i32_le(ship.target_planet_index);
                }
            }
            Packet::Snapshot(snapshot) => {
                dst.put_u32_le(PacketType::Snapshot as u32);
                dst.put_u32_le(snapshot.planets.len() as u32);
                for planet in &snapshot.planets {
                    dst.put_f32_le(planet.cur_size);
                    dst.put_i32_le(planet.owner_id);
                    dst.put_i32_le(planet.claimant_id);
                }
            }
            Packet::Assignment(assignment) => {
                dst.put_u32_le(PacketType::Assignment as u32);
                dst.put_i32_le(assignment.faction_id);
            }
            Packet::MoveOrder(order) => {
                dst.put_u32_le(PacketType::MoveOrder as u32);
                dst.put_u32_le(order.origins.len() as u32);
                dst.put_i32_le(order.destination as i32);
                for origin in &order.origins {
                    dst.put_i32_le(*origin as i32);
                }
            }
            Packet::FleetLaunch(launch) => {
                dst.put_u32_le(PacketType::FleetLaunch as u32);
                dst.put_i32_le(launch.origin as i32);
                dst.put_i32_le(launch.destination as i32);
                dst.put_i32_le(launch.ship_count as i32);
                dst.put_i32_le(launch.owner_faction_id);
                dst.put_u32_le(launch.ship_spawn_rng_state);
            }
            Packet::ServerDisconnect(disconnect) => {
                let reason = if disconnect.reason.len() > SERVER_DISCONNECT_REASON_MAX_LEN {
                    &disconnect.reason[..SERVER_DISCONNECT_REASON_MAX_LEN]
                } else {
                    &disconnect.reason
                };
                dst.put_u32_le(PacketType::ServerDisconnect as u32);
                dst.put_u32_le(reason.len() as u32);
                dst.put_slice(reason.as_bytes());
            }
            Packet::ClientDisconnect(_) => {
                dst.put_u32_le(PacketType::ClientDisconnect as u32);
            }
        }
        Ok(())
    }
}

impl Decoder for PacketCodec {
    type Item = Packet;
    type Error = PacketDecodeError;

    fn decode(&mut self, src: &[u8]) -> Result<Packet, PacketDecodeError> {
        if src.len() < 4 {
            return Err(PacketDecodeError::TooShort);
        }

        let mut cursor = src;
        let raw_type = cursor.get_u32_le();
        let packet_type =
            PacketType::from_u32(raw_type).ok_or(PacketDecodeError::UnknownType(raw_type))?;

        match packet_type {
            PacketType::Full => decode_full(cursor),
            PacketType::Snapshot => decode_snapshot(cursor),
            PacketType::Assignment => decode_assignment(cursor),
            PacketType::MoveOrder => decode_move_order(cursor),
            PacketType::FleetLaunch => decode_fleet_launch(cursor),
            PacketType::ServerDisconnect => decode_server_disconnect(cursor),
            PacketType::ClientDisconnect => decode_client_disconnect(cursor),
        }
    }
}

fn decode_full(mut cursor: &[u8]) -> Result<Packet, PacketDecodeError> {
    if cursor.len() < FULL_HEADER_LEN - 4 {
        return Err(PacketDecodeError::TooShort);
    }
    let width = cursor.get_f32_le();
    let height = cursor.get_f32_le();
    let faction_count = cursor.get_u32_le();
    let planet_count = cursor.get_u32_le();
    let starship_count = cursor.get_u32_le();

    let required = faction_count as usize * FACTION_RECORD_LEN
        + planet_count as usize * PLANET_RECORD_LEN
        + starship_count as usize * STARSHIP_RECORD_LEN;
    if cursor.len() < required {
        return Err(PacketDecodeError::TooShort);
    }

    let mut factions = Vec::with_capacity(faction_count as usize);
    for _ in 0..faction_count {
        let id = cursor.get_i32_le();
        let color = [
            cursor.get_f32_le(),
            cursor.get_f32_le(),
            cursor.get_f32_le(),
            cursor.get_f32_le(),
        ];
        factions.push(FactionInfo { id, color });
    }

    let mut planets = Vec::with_capacity(planet_count as usize);
    for _ in 0..planet_count {
        planets.push(PlanetInfo {
            pos_x: cursor.get_f32_le(),
            pos_y: cursor.get_f32_le(),
            max_cap: cursor.get_f32_le(),
            cur_size: cursor.get_f32_le(),
            owner_id: cursor.get_i32_le(),
            claimant_id: cursor.get_i32_le(),
        });
    }

    let mut starships = Vec::with_capacity(starship_count as usize);
    for _ in 0..starship_count {
        starships.push(StarshipInfo {
            pos_x: cursor.get_f32_le(),
            pos_y: cursor.get_f32_le(),
            vel_x: cursor.get_f32_le(),
            vel_y: cursor.get_f32_le(),
            owner_id: cursor.get_i32_le(),
            target_planet_index: cursor.get_i32_le(),
        });
    }

    Ok(Packet::Full(FullPacket {
        width,
        height,
        factions,
        planets,
        starships,
    }))
}

fn decode_snapshot(mut cursor: &[u8]) -> Result<Packet, PacketDecodeError> {
    if cursor.len() < SNAPSHOT_HEADER_LEN - 4 {
        return Err(PacketDecodeError::TooShort);
    }
    let planet_count = cursor.get_u32_le();
    let required = planet_count as usize * SNAPSHOT_RECORD_LEN;
    if cursor.len() < required {
        return Err(PacketDecodeError::TooShort);
    }

    let mut planets = Vec::with_capacity(planet_count as usize);
    for _ in 0..planet_count {
        planets.push(SnapshotPlanet {
            cur_size: cursor.get_f32_le(),
            owner_id: cursor.get_i32_le(),
            claimant_id: cursor.get_i32_le(),
        });
    }

    Ok(Packet::Snapshot(SnapshotPacket { planets }))
}

fn decode_assignment(mut cursor: &[u8]) -> Result<Packet, PacketDecodeError> {
    if cursor.len() < ASSIGNMENT_LEN - 4 {
        return Err(PacketDecodeError::TooShort);
    }
    Ok(Packet::Assignment(AssignmentPacket {
        faction_id: cursor.get_i32_le(),
    }))
}

fn decode_move_order(mut cursor: &[u8]) -> Result<Packet, PacketDecodeError> {
    if cursor.len() < MOVE_ORDER_HEADER_LEN - 4 {
        return Err(PacketDecodeError::TooShort);
    }
    let origin_count = cursor.get_u32_le();
    if origin_count == 0 {
        return Err(PacketDecodeError::Malformed("origin_count must be non-zero"));
    }
    let destination = cursor.get_i32_le();
    if destination < 0 {
        return Err(PacketDecodeError::Malformed("destination index cannot be negative"));
    }

    let required = origin_count as usize * 4;
    if cursor.len() < required {
        return Err(PacketDecodeError::TooShort);
    }

    let mut origins = Vec::with_capacity(origin_count as usize);
    for _ in 0..origin_count {
        let origin = cursor.get_i32_le();
        if origin < 0 {
            return Err(PacketDecodeError::Malformed("origin index cannot be negative"));
        }
        origins.push(origin as usize);
    }

    Ok(Packet::MoveOrder(MoveOrderPacket {
        destination: destination as usize,
        origins,
    }))
}

fn decode_fleet_launch(mut cursor: &[u8]) -> Result<Packet, PacketDecodeError> {
    if cursor.len() < FLEET_LAUNCH_LEN - 4 {
        return Err(PacketDecodeError::TooShort);
    }
    let origin = cursor.get_i32_le();
    let destination = cursor.get_i32_le();
    let ship_count = cursor.get_i32_le();
    let owner_faction_id = cursor.get_i32_le();
    let ship_spawn_rng_state = cursor.get_u32_le();

    if origin < 0 || destination < 0 || ship_count < 0 {
        return Err(PacketDecodeError::Malformed("fleet launch indices must be non-negative"));
    }

    Ok(Packet::FleetLaunch(FleetLaunchPacket {
        origin: origin as usize,
        destination: destination as usize,
        ship_count: ship_count as u32,
        owner_faction_id,
        ship_spawn_rng_state,
    }))
}

fn decode_server_disconnect(mut cursor: &[u8]) -> Result<Packet, PacketDecodeError> {
    if cursor.len() < SERVER_DISCONNECT_HEADER_LEN - 4 {
        return Err(PacketDecodeError::TooShort);
    }
    let reason_len = cursor.get_u32_le();
    if reason_len as usize > SERVER_DISCONNECT_REASON_MAX_LEN {
        return Err(PacketDecodeError::Malformed("reason_len exceeds the 256 byte bound"));
    }
    if cursor.len() < reason_len as usize {
        return Err(PacketDecodeError::TooShort);
    }

    let bytes = &cursor[..reason_len as usize];
    let reason = std::str::from_utf8(bytes)
        .map_err(|_| PacketDecodeError::Malformed("reason bytes are not valid ASCII/UTF-8"))?
        .to_owned();

    Ok(Packet::ServerDisconnect(ServerDisconnectPacket { reason }))
}

fn decode_client_disconnect(cursor: &[u8]) -> Result<Packet, PacketDecodeError> {
    let _ = CLIENT_DISCONNECT_LEN;
    let _ = cursor;
    Ok(Packet::ClientDisconnect(ClientDisconnectPacket))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{FleetLaunchPacket, MoveOrderPacket, SnapshotPacket, SnapshotPlanet};

    fn roundtrip(packet: Packet) -> Packet {
        let mut codec = PacketCodec;
        let mut buf = BytesMut::new();
        codec.encode(packet, &mut buf).unwrap();
        codec.decode(&buf).unwrap()
    }

    #[test]
    fn assignment_roundtrips() {
        let packet = Packet::Assignment(AssignmentPacket { faction_id: 3 });
        assert_eq!(roundtrip(packet.clone()), packet);
    }

    #[test]
    fn fleet_launch_roundtrips() {
        let packet = Packet::FleetLaunch(FleetLaunchPacket {
            origin: 1,
            destination: 2,
            ship_count: 7,
            owner_faction_id: 0,
            ship_spawn_rng_state: 0xDEAD_BEEF,
        });
        assert_eq!(roundtrip(packet.clone()), packet);
    }

    #[test]
    fn move_order_roundtrips() {
        let packet = Packet::MoveOrder(MoveOrderPacket {
            destination: 4,
            origins: vec![0, 1, 2],
        });
        assert_eq!(roundtrip(packet.clone()), packet);
    }

    #[test]
    fn snapshot_roundtrips() {
        let packet = Packet::Snapshot(SnapshotPacket {
            planets: vec![
                SnapshotPlanet { cur_size: 1.5, owner_id: 0, claimant_id: -1 },
                SnapshotPlanet { cur_size: 0.0, owner_id: -1, claimant_id: -1 },
            ],
        });
        assert_eq!(roundtrip(packet.clone()), packet);
    }

    #[test]
    fn server_disconnect_roundtrips() {
        let packet = Packet::ServerDisconnect(ServerDisconnectPacket {
            reason: "server shutting down".to_owned(),
        });
        assert_eq!(roundtrip(packet.clone()), packet);
    }

    #[test]
    fn client_disconnect_roundtrips() {
        let packet = Packet::ClientDisconnect(ClientDisconnectPacket);
        assert_eq!(roundtrip(packet), Packet::ClientDisconnect(ClientDisconnectPacket));
    }

    #[test]
    fn decode_rejects_truncated_buffer() {
        let mut codec = PacketCodec;
        let mut buf = BytesMut::new();
        buf.put_u32_le(PacketType::Assignment as u32);
        assert_eq!(codec.decode(&buf), Err(PacketDecodeError::TooShort));
    }

    #[test]
    fn decode_rejects_unknown_type() {
        let mut codec = PacketCodec;
        let mut buf = BytesMut::new();
        buf.put_u32_le(999);
        assert_eq!(codec.decode(&buf), Err(PacketDecodeError::UnknownType(999)));
    }

    #[test]
    fn decode_rejects_zero_origin_count_move_order() {
        let mut codec = PacketCodec;
        let mut buf = BytesMut::new();
        buf.put_u32_le(PacketType::MoveOrder as u32);
        buf.put_u32_le(0);
        buf.put_i32_le(0);
        assert!(matches!(codec.decode(&buf), Err(PacketDecodeError::Malformed(_))));
    }

    #[test]
    fn decode_rejects_full_packet_with_mismatched_buffer_length() {
        let mut codec = PacketCodec;
        let mut buf = BytesMut::new();
        buf.put_u32_le(PacketType::Full as u32);
        buf.put_f32_le(100.0);
        buf.put_f32_le(100.0);
        buf.put_u32_le(1);
        buf.put_u32_le(0);
        buf.put_u32_le(0);
        // declares one faction record but the buffer ends here
        assert_eq!(codec.decode(&buf), Err(PacketDecodeError::TooShort));
    }
}
