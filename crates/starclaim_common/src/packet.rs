use crate::faction::FactionId;
use crate::starship::PlanetIndex;

/// Raw ASCII handshake messages. These are not typed packets. The transport layer
/// recognizes them by prefix before anything reaches `PacketCodec`.
pub const JOIN_PREFIX: &[u8] = b"JOIN";
pub const SERVER_FULL_MESSAGE: &[u8] = b"SERVER_FULL";

pub const SERVER_DISCONNECT_REASON_MAX_LEN: usize = 256;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u32)]
pub enum PacketType {
    Full = 1,
    Snapshot = 2,
    Assignment = 3,
    MoveOrder = 4,
    FleetLaunch = 5,
    ServerDisconnect = 6,
    ClientDisconnect = 7,
}

impl PacketType {
    pub fn from_u32(value: u32) -> Option<PacketType> {
        match value {
            1 => Some(PacketType::Full),
            2 => Some(PacketType::Snapshot),
            3 => Some(PacketType::Assignment),
            4 => Some(PacketType::MoveOrder),
            5 => Some(PacketType::FleetLaunch),
            6 => Some(PacketType::ServerDisconnect),
            7 => Some(PacketType::ClientDisconnect),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FactionInfo {
    pub id: FactionId,
    pub color: [f32; 4],
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlanetInfo {
    pub pos_x: f32,
    pub pos_y: f32,
    pub max_cap: f32,
    pub cur_size: f32,
    pub owner_id: i32,
    pub claimant_id: i32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StarshipInfo {
    pub pos_x: f32,
    pub pos_y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub owner_id: i32,
    pub target_planet_index: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FullPacket {
    pub width: f32,
    pub height: f32,
    pub factions: Vec<FactionInfo>,
    pub planets: Vec<PlanetInfo>,
    pub starships: Vec<StarshipInfo>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SnapshotPlanet {
    pub cur_size: f32,
    pub owner_id: i32,
    pub claimant_id: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotPacket {
    pub planets: Vec<SnapshotPlanet>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AssignmentPacket {
    pub faction_id: FactionId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOrderPacket {
    pub destination: PlanetIndex,
    pub origins: Vec<PlanetIndex>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FleetLaunchPacket {
    pub origin: PlanetIndex,
    pub destination: PlanetIndex,
    pub ship_count: u32,
    pub owner_faction_id: FactionId,
    pub ship_spawn_rng_state: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerDisconnectPacket {
    pub reason: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ClientDisconnectPacket;

#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Full(FullPacket),
    Snapshot(SnapshotPacket),
    Assignment(AssignmentPacket),
    MoveOrder(MoveOrderPacket),
    FleetLaunch(FleetLaunchPacket),
    ServerDisconnect(ServerDisconnectPacket),
    ClientDisconnect(ClientDisconnectPacket),
}

impl Packet {
    pub fn packet_type(&self) -> PacketType {
        match self {
            Packet::Full(_) => PacketType::Full,
            Packet::Snapshot(_) => PacketType::Snapshot,
            Packet::Assignment(_) => PacketType::Assignment,
            Packet::MoveOrder(_) => PacketType::MoveOrder,
            Packet::FleetLaunch(_) => PacketType::FleetLaunch,
            Packet::ServerDisconnect(_) => PacketType::ServerDisconnect,
            Packet::ClientDisconnect(_) => PacketType::ClientDisconnect,
        }
    }
}
