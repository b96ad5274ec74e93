pub type FactionId = i32;

/// No team assignment; the faction is free-for-all.
pub const NO_TEAM: i32 = -1;
/// No shared-control group.
pub const NO_SHARED_CONTROL: i32 = -1;
/// Sentinel used on the wire for an absent faction reference.
pub const NO_FACTION: i32 = -1;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// A faction's identity. Never mutated after world init except `color`, which may be
/// changed while players are still in the lobby.
#[derive(Debug, Clone, PartialEq)]
pub struct Faction {
    pub id: FactionId,
    pub color: Color,
    pub team_number: i32,
    pub shared_control_number: i32,
}

impl Faction {
    pub fn new(id: FactionId, color: Color) -> Faction {
        Faction {
            id,
            color,
            team_number: NO_TEAM,
            shared_control_number: NO_SHARED_CONTROL,
        }
    }

    pub fn is_friendly_to(&self, other: &Faction) -> bool {
        self.id == other.id
            || (self.team_number >= 0
                && other.team_number >= 0
                && self.team_number == other.team_number)
    }

    pub fn shares_control_with(&self, other: &Faction) -> bool {
        if self.id == other.id {
            return true;
        }

        self.team_number >= 0
            && self.shared_control_number >= 0
            && self.team_number == other.team_number
            && self.shared_control_number == other.shared_control_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faction(id: FactionId, team: i32, shared_control: i32) -> Faction {
        Faction {
            id,
            color: Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 },
            team_number: team,
            shared_control_number: shared_control,
        }
    }

    #[test]
    fn identical_factions_are_friendly() {
        let a = faction(1, NO_TEAM, NO_SHARED_CONTROL);
        assert!(a.is_friendly_to(&a.clone()));
    }

    #[test]
    fn free_for_all_factions_are_not_friendly() {
        let a = faction(1, NO_TEAM, NO_SHARED_CONTROL);
        let b = faction(2, NO_TEAM, NO_SHARED_CONTROL);
        assert!(!a.is_friendly_to(&b));
    }

    #[test]
    fn same_team_factions_are_friendly() {
        let a = faction(1, 3, NO_SHARED_CONTROL);
        let b = faction(2, 3, NO_SHARED_CONTROL);
        assert!(a.is_friendly_to(&b));
    }

    #[test]
    fn shared_control_requires_matching_team_and_group() {
        let a = faction(1, 3, 9);
        let b = faction(2, 3, 9);
        let c = faction(3, 3, 10);
        assert!(a.shares_control_with(&b));
        assert!(!a.shares_control_with(&c));
    }

    #[test]
    fn identical_factions_always_share_control() {
        let a = faction(1, NO_TEAM, NO_SHARED_CONTROL);
        assert!(a.shares_control_with(&a.clone()));
    }
}
