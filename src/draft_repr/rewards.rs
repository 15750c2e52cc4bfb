// Reward terms scored at terminal states.
//
// Every term carries a value per side because the two teams may weight
// the same composition differently. All search arithmetic is signed
// from A's perspective: A-side values add, B-side values subtract.

/// Value of having a hero index on the team at the end of the draft.
/// Tracked incrementally during search rather than rescanned at
/// terminals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleReward {
    pub a_value: i32,
    pub b_value: i32,
}

/// Granted when a team's bitset covers every hero in `heroes`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynergyReward {
    pub heroes: u64,
    pub a_value: i32,
    pub b_value: i32,
}

/// Granted when a team covers `heroes` and its opponent covers `foes`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterReward {
    pub heroes: u64,
    pub foes: u64,
    pub a_value: i32,
    pub b_value: i32,
}
