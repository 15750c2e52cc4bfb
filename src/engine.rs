// Engine setup and search entry.
//
// Everything a search reads lives in one Engine value: sizes, reward
// tables, hero legality masks, the draft schedule, Zobrist keys, and
// the transposition table. Setup takes &mut between searches; a search
// takes &self, so the recursion sees frozen tables and only the
// lock-free transposition table is written concurrently.

use crate::draft_repr::{
    bit, covers, low_mask, CounterReward, DraftStage, HeroInfo, Lineup, LineupSet, RoleReward,
    Selection, SynergyReward, Team, INF, MAX_COUNTERS, MAX_DRAFT_LEN, MAX_HEROES, MAX_SYNERGIES,
};
use crate::errors::DraftError;
use crate::search::{
    root_negamax, KeyRow, SearchCtx, SearchResult, TranspositionTable, ZobristKeys, MAX_TT_STAGE,
};
use log::debug;

/// A fully configured draft engine.
///
/// The driver populates it through the `set_*` operations, then calls
/// [`Engine::run_search`] any number of times. Mutating rewards, hero
/// infos, the schedule, or Zobrist keys invalidates transposition
/// table contents; callers must [`Engine::clear_tt`] afterwards.
pub struct Engine {
    pub(crate) num_heroes: usize,
    pub(crate) num_synergies: usize,
    pub(crate) num_counters: usize,
    pub(crate) draft_len: usize,

    pub(crate) role_rs: [RoleReward; MAX_HEROES],
    pub(crate) synergy_rs: [SynergyReward; MAX_SYNERGIES],
    pub(crate) counter_rs: [CounterReward; MAX_COUNTERS],

    pub(crate) h_infos: [HeroInfo; MAX_HEROES],
    pub(crate) draft: [DraftStage; MAX_DRAFT_LEN],

    pub(crate) zobrist: ZobristKeys,
    pub(crate) tt: TranspositionTable,
    pub(crate) tt_max_stage: usize,
}

impl Engine {
    /// Create an engine with empty tables, seeded Zobrist keys, and
    /// the transposition table allocated up front.
    pub fn new() -> Self {
        Self {
            num_heroes: 0,
            num_synergies: 0,
            num_counters: 0,
            draft_len: 0,
            role_rs: [RoleReward::default(); MAX_HEROES],
            synergy_rs: [SynergyReward::default(); MAX_SYNERGIES],
            counter_rs: [CounterReward::default(); MAX_COUNTERS],
            h_infos: [HeroInfo::default(); MAX_HEROES],
            draft: [DraftStage::default(); MAX_DRAFT_LEN],
            zobrist: ZobristKeys::generate(),
            tt: TranspositionTable::new(),
            tt_max_stage: MAX_TT_STAGE,
        }
    }

    pub fn num_heroes(&self) -> usize {
        self.num_heroes
    }

    pub fn draft_len(&self) -> usize {
        self.draft_len
    }

    /// Declare how much of each table is in use.
    pub fn set_sizes(
        &mut self,
        num_heroes: usize,
        num_synergies: usize,
        num_counters: usize,
        draft_len: usize,
    ) -> Result<(), DraftError> {
        Self::check_limit("hero", num_heroes, MAX_HEROES)?;
        Self::check_limit("synergy", num_synergies, MAX_SYNERGIES)?;
        Self::check_limit("counter", num_counters, MAX_COUNTERS)?;
        Self::check_limit("draft", draft_len, MAX_DRAFT_LEN)?;

        self.num_heroes = num_heroes;
        self.num_synergies = num_synergies;
        self.num_counters = num_counters;
        self.draft_len = draft_len;
        Ok(())
    }

    /// Reward for having `hero` on the corresponding team at the end
    /// of the draft.
    pub fn set_role_r(&mut self, hero: usize, a_value: i32, b_value: i32) -> Result<(), DraftError> {
        self.check_hero(hero)?;
        self.role_rs[hero] = RoleReward { a_value, b_value };
        Ok(())
    }

    /// Reward granted when a team fields every hero in `heroes`.
    pub fn set_synergy_r(
        &mut self,
        slot: usize,
        heroes: &[usize],
        a_value: i32,
        b_value: i32,
    ) -> Result<(), DraftError> {
        if slot >= self.num_synergies {
            return Err(DraftError::SlotOutOfRange {
                kind: "synergy",
                slot,
                len: self.num_synergies,
            });
        }
        self.synergy_rs[slot] = SynergyReward {
            heroes: self.hero_bits(heroes)?,
            a_value,
            b_value,
        };
        Ok(())
    }

    /// Reward granted when a team fields `heroes` while its opponent
    /// fields `foes`.
    pub fn set_counter_r(
        &mut self,
        slot: usize,
        heroes: &[usize],
        foes: &[usize],
        a_value: i32,
        b_value: i32,
    ) -> Result<(), DraftError> {
        if slot >= self.num_counters {
            return Err(DraftError::SlotOutOfRange {
                kind: "counter",
                slot,
                len: self.num_counters,
            });
        }
        self.counter_rs[slot] = CounterReward {
            heroes: self.hero_bits(heroes)?,
            foes: self.hero_bits(foes)?,
            a_value,
            b_value,
        };
        Ok(())
    }

    /// Legality relations for one hero index: every index playing the
    /// same role or sharing the same underlying hero, and every index
    /// sharing the same underlying hero. The engine keeps the
    /// complements, which update a legal pool with a single AND.
    pub fn set_h_info(
        &mut self,
        hero: usize,
        same_role_and_h: &[usize],
        same_h: &[usize],
    ) -> Result<(), DraftError> {
        self.check_hero(hero)?;
        self.h_infos[hero] = HeroInfo {
            diff_role_and_h: !self.hero_bits(same_role_and_h)?,
            diff_h: !self.hero_bits(same_h)?,
        };
        Ok(())
    }

    /// Define one stage of the draft. Double selections occupy two
    /// consecutive slots; only the first slot's entry is consulted.
    pub fn set_draft_stage(
        &mut self,
        stage: usize,
        team: Team,
        selection: Selection,
    ) -> Result<(), DraftError> {
        if stage >= self.draft_len {
            return Err(DraftError::StageOutOfRange {
                stage,
                draft_len: self.draft_len,
            });
        }
        self.draft[stage] = DraftStage { team, selection };
        Ok(())
    }

    /// Override one Zobrist key. Only needed by drivers that manage
    /// keys externally, e.g. to match a persisted search state.
    pub fn set_zobrist_key(
        &mut self,
        row: KeyRow,
        hero: usize,
        key: u64,
    ) -> Result<(), DraftError> {
        if hero >= MAX_HEROES {
            return Err(DraftError::HeroOutOfRange {
                hero,
                num_heroes: MAX_HEROES,
            });
        }
        self.zobrist.set(row, hero, key);
        Ok(())
    }

    /// Drop every cached evaluation. Must be called after any change
    /// to rewards, hero infos, the schedule, or Zobrist keys.
    pub fn clear_tt(&self) {
        self.tt.clear();
    }

    /// Synergy and counter rewards of a finished draft, signed from
    /// team A's perspective. Role rewards are accounted separately
    /// (incrementally during search).
    pub fn terminal_value(&self, team_a: u64, team_b: u64) -> i32 {
        let mut value = 0;

        for synergy in &self.synergy_rs[..self.num_synergies] {
            if covers(team_a, synergy.heroes) {
                value += synergy.a_value;
            } else if covers(team_b, synergy.heroes) {
                value -= synergy.b_value;
            }
        }

        for counter in &self.counter_rs[..self.num_counters] {
            if covers(team_a, counter.heroes) && covers(team_b, counter.foes) {
                value += counter.a_value;
            } else if covers(team_b, counter.heroes) && covers(team_a, counter.foes) {
                value -= counter.b_value;
            }
        }

        value
    }

    /// A-relative role reward delta for `team` picking `hero`.
    #[inline(always)]
    pub(crate) fn role_delta(&self, team: Team, hero: usize) -> i32 {
        match team {
            Team::A => self.role_rs[hero].a_value,
            Team::B => -self.role_rs[hero].b_value,
        }
    }

    /// Find the optimal next selection(s) for the team to move.
    ///
    /// Each side passes every role assignment of its current picks as
    /// a starting lineup (a single, possibly empty, lineup when
    /// nothing is ambiguous). The stage to search is implied by the
    /// pick and ban counts. Returns the negamax value from the moving
    /// team's perspective and the selection(s) achieving it.
    pub fn run_search(
        &self,
        start_teams_a: &[Vec<usize>],
        start_teams_b: &[Vec<usize>],
        banned: &[usize],
    ) -> Result<SearchResult, DraftError> {
        let stage = self.validate_search_inputs(start_teams_a, start_teams_b, banned)?;
        let terminal_team = self.validate_schedule(stage)?;

        let lineups_a = self.build_lineups(Team::A, start_teams_a, &start_teams_b[0], banned);
        let lineups_b = self.build_lineups(Team::B, start_teams_b, &start_teams_a[0], banned);

        // a ban of any role variant is the same selection, so one hash
        // covers the bans of every lineup
        let bans_hash = banned
            .iter()
            .fold(0u64, |hash, &hero| hash ^ self.zobrist.ban(hero));

        let ctx = SearchCtx {
            root_team: self.draft[stage].team,
            terminal_team,
            tt_max_stage: self.tt_max_stage,
        };

        debug!(
            "search: stage {stage}, {}x{} lineups, {} bans, {:?} to move",
            lineups_a.len(),
            lineups_b.len(),
            banned.len(),
            ctx.root_team,
        );

        let result = match ctx.root_team {
            Team::A => root_negamax(self, &ctx, &lineups_a, &lineups_b, bans_hash, stage),
            Team::B => root_negamax(self, &ctx, &lineups_b, &lineups_a, bans_hash, stage),
        };

        debug!("search done: value {}, best {:?}", result.value, result.best);
        debug_assert!(result.value >= -INF && result.value <= INF);
        Ok(result)
    }

    /// Cap the stages that may use the transposition table. Search
    /// behavior with a lowered cap is the reference for equivalence
    /// tests.
    #[cfg(test)]
    pub(crate) fn set_tt_max_stage(&mut self, tt_max_stage: usize) {
        self.tt_max_stage = tt_max_stage;
    }

    fn validate_search_inputs(
        &self,
        start_teams_a: &[Vec<usize>],
        start_teams_b: &[Vec<usize>],
        banned: &[usize],
    ) -> Result<usize, DraftError> {
        if start_teams_a.is_empty() || start_teams_b.is_empty() {
            return Err(DraftError::NoLineups);
        }

        for (side, size) in [
            (start_teams_a, start_teams_a[0].len()),
            (start_teams_b, start_teams_b[0].len()),
        ] {
            for lineup in side {
                if lineup.len() != size {
                    return Err(DraftError::LineupMismatch);
                }
                for &hero in lineup {
                    self.check_hero(hero)?;
                }
            }
        }
        for &hero in banned {
            self.check_hero(hero)?;
        }

        let stage = start_teams_a[0].len() + start_teams_b[0].len() + banned.len();
        if stage >= self.draft_len {
            return Err(DraftError::DraftComplete {
                stage,
                draft_len: self.draft_len,
            });
        }
        Ok(stage)
    }

    /// Check the remaining schedule alternates teams and lands exactly
    /// on the draft length, and derive the side holding the terminal
    /// frame (one mover flip per schedule entry).
    fn validate_schedule(&self, stage: usize) -> Result<Team, DraftError> {
        let mut s = stage;
        let mut last: Option<(usize, Team)> = None;

        while s < self.draft_len {
            let entry = self.draft[s];
            if let Some((prev_stage, prev_team)) = last {
                if prev_team == entry.team {
                    return Err(DraftError::NonAlternatingSchedule {
                        stage: prev_stage,
                        next_stage: s,
                    });
                }
            }
            last = Some((s, entry.team));
            s += entry.selection.slots();
        }

        if s != self.draft_len {
            // a double stage straddling the end of the schedule
            return Err(DraftError::StageOutOfRange {
                stage: s,
                draft_len: self.draft_len,
            });
        }

        // the loop ran at least once because stage < draft_len
        Ok(last.expect("non-empty remaining schedule").1.opposite())
    }

    fn build_lineups(
        &self,
        team: Team,
        start_teams: &[Vec<usize>],
        enemy_picks: &[usize],
        banned: &[usize],
    ) -> LineupSet {
        start_teams
            .iter()
            .map(|picks| Lineup {
                team: Self::team_bits(picks),
                legal: self.legal_bits(picks, enemy_picks, banned),
                rr_value: self.init_rr_value(team, picks),
                hash: self.init_pick_hash(team, picks),
            })
            .collect()
    }

    pub(crate) fn team_bits(picks: &[usize]) -> u64 {
        picks.iter().fold(0u64, |team, &hero| team | bit(hero))
    }

    /// Legal pool for a side given its own picks, any one enemy
    /// lineup (every role variant of an enemy pick is removed either
    /// way), and the bans.
    pub(crate) fn legal_bits(&self, picks: &[usize], enemy_picks: &[usize], banned: &[usize]) -> u64 {
        let mut legal = low_mask(self.num_heroes);

        for &hero in picks {
            legal &= self.h_infos[hero].diff_role_and_h;
        }
        for &hero in enemy_picks {
            legal &= self.h_infos[hero].diff_h;
        }
        for &hero in banned {
            legal &= self.h_infos[hero].diff_h;
        }

        legal
    }

    pub(crate) fn init_rr_value(&self, team: Team, picks: &[usize]) -> i32 {
        picks
            .iter()
            .map(|&hero| self.role_delta(team, hero))
            .sum()
    }

    pub(crate) fn init_pick_hash(&self, team: Team, picks: &[usize]) -> u64 {
        picks
            .iter()
            .fold(0u64, |hash, &hero| hash ^ self.zobrist.pick(team, hero))
    }

    fn check_hero(&self, hero: usize) -> Result<(), DraftError> {
        if hero >= self.num_heroes {
            return Err(DraftError::HeroOutOfRange {
                hero,
                num_heroes: self.num_heroes,
            });
        }
        Ok(())
    }

    fn check_limit(kind: &'static str, requested: usize, limit: usize) -> Result<(), DraftError> {
        if requested > limit {
            return Err(DraftError::SizeLimitExceeded {
                kind,
                requested,
                limit,
            });
        }
        Ok(())
    }

    fn hero_bits(&self, heroes: &[usize]) -> Result<u64, DraftError> {
        let mut bits = 0u64;
        for &hero in heroes {
            self.check_hero(hero)?;
            bits |= bit(hero);
        }
        Ok(bits)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft_repr::bit;

    fn sized_engine() -> Engine {
        let mut eng = Engine::new();
        eng.set_sizes(8, 2, 2, 4).unwrap();
        eng
    }

    #[test]
    fn test_set_sizes_rejects_over_limits() {
        let mut eng = Engine::new();
        assert!(matches!(
            eng.set_sizes(65, 0, 0, 0),
            Err(DraftError::SizeLimitExceeded { kind: "hero", .. })
        ));
        assert!(matches!(
            eng.set_sizes(64, 51, 0, 0),
            Err(DraftError::SizeLimitExceeded { kind: "synergy", .. })
        ));
        assert!(matches!(
            eng.set_sizes(64, 50, 51, 0),
            Err(DraftError::SizeLimitExceeded { kind: "counter", .. })
        ));
        assert!(matches!(
            eng.set_sizes(64, 50, 50, 25),
            Err(DraftError::SizeLimitExceeded { kind: "draft", .. })
        ));
        assert!(eng.set_sizes(64, 50, 50, 24).is_ok());
    }

    #[test]
    fn test_setup_rejects_out_of_range_heroes() {
        let mut eng = sized_engine();
        assert!(matches!(
            eng.set_role_r(8, 1, 1),
            Err(DraftError::HeroOutOfRange { hero: 8, .. })
        ));
        assert!(matches!(
            eng.set_h_info(0, &[0, 9], &[0]),
            Err(DraftError::HeroOutOfRange { hero: 9, .. })
        ));
        assert!(matches!(
            eng.set_synergy_r(0, &[0, 8], 5, 5),
            Err(DraftError::HeroOutOfRange { hero: 8, .. })
        ));
    }

    #[test]
    fn test_setup_rejects_out_of_range_slots() {
        let mut eng = sized_engine();
        assert!(matches!(
            eng.set_synergy_r(2, &[0], 1, 1),
            Err(DraftError::SlotOutOfRange { kind: "synergy", .. })
        ));
        assert!(matches!(
            eng.set_counter_r(2, &[0], &[1], 1, 1),
            Err(DraftError::SlotOutOfRange { kind: "counter", .. })
        ));
        assert!(matches!(
            eng.set_draft_stage(4, Team::A, Selection::Pick),
            Err(DraftError::StageOutOfRange { stage: 4, .. })
        ));
    }

    #[test]
    fn test_h_info_stores_complements() {
        let mut eng = sized_engine();
        eng.set_h_info(0, &[0, 1], &[0]).unwrap();
        assert_eq!(eng.h_infos[0].diff_role_and_h, !(bit(0) | bit(1)));
        assert_eq!(eng.h_infos[0].diff_h, !bit(0));
    }

    #[test]
    fn test_terminal_value_synergies_and_counters() {
        let mut eng = sized_engine();
        eng.set_synergy_r(0, &[0, 1], 40, 25).unwrap();
        eng.set_counter_r(0, &[2], &[0], 10, 60).unwrap();

        // A fields the synergy pair and the counter foe; B fields the
        // counter hero
        let team_a = bit(0) | bit(1);
        let team_b = bit(2) | bit(3);
        assert_eq!(eng.terminal_value(team_a, team_b), 40 - 60);

        // mirrored composition uses the B-side values
        assert_eq!(eng.terminal_value(team_b, team_a), -25 + 10);

        // nobody completes anything
        assert_eq!(eng.terminal_value(bit(0) | bit(2), bit(1) | bit(3)), 0);
    }

    #[test]
    fn test_legal_bits_removes_roles_variants_and_bans() {
        let mut eng = sized_engine();
        // heroes 0 and 1 are role variants of the same underlying
        // hero; hero 2 shares a role with hero 3
        eng.set_h_info(0, &[0, 1], &[0, 1]).unwrap();
        eng.set_h_info(1, &[1, 0], &[1, 0]).unwrap();
        eng.set_h_info(2, &[2, 3], &[2]).unwrap();
        eng.set_h_info(3, &[3, 2], &[3]).unwrap();
        for h in 4..8 {
            eng.set_h_info(h, &[h], &[h]).unwrap();
        }

        // own pick of 2 fills the shared role; enemy picked variant 0;
        // hero 5 banned
        let legal = eng.legal_bits(&[2], &[0], &[5]);
        assert_eq!(legal, bit(4) | bit(6) | bit(7));

        // the enemy pick only removes identity variants, not the role
        let legal = eng.legal_bits(&[], &[2], &[]);
        assert_eq!(legal, low_mask(8) & !bit(2));
    }

    #[test]
    fn test_init_pick_hash_is_xor_of_keys() {
        let eng = sized_engine();
        let hash = eng.init_pick_hash(Team::A, &[1, 4]);
        assert_eq!(
            hash,
            eng.zobrist.pick(Team::A, 1) ^ eng.zobrist.pick(Team::A, 4)
        );
        assert_eq!(eng.init_pick_hash(Team::B, &[]), 0);
    }

    #[test]
    fn test_init_rr_value_signs() {
        let mut eng = sized_engine();
        eng.set_role_r(0, 7, 3).unwrap();
        eng.set_role_r(1, 2, 9).unwrap();
        assert_eq!(eng.init_rr_value(Team::A, &[0, 1]), 9);
        assert_eq!(eng.init_rr_value(Team::B, &[0, 1]), -12);
    }

    #[test]
    fn test_run_search_rejects_bad_inputs() {
        let mut eng = sized_engine();
        eng.set_sizes(8, 0, 0, 2).unwrap();
        eng.set_draft_stage(0, Team::A, Selection::Pick).unwrap();
        eng.set_draft_stage(1, Team::B, Selection::Pick).unwrap();

        assert!(matches!(
            eng.run_search(&[], &[vec![]], &[]),
            Err(DraftError::NoLineups)
        ));
        assert!(matches!(
            eng.run_search(&[vec![0], vec![1, 2]], &[vec![]], &[]),
            Err(DraftError::LineupMismatch)
        ));
        assert!(matches!(
            eng.run_search(&[vec![8]], &[vec![]], &[]),
            Err(DraftError::HeroOutOfRange { hero: 8, .. })
        ));
        assert!(matches!(
            eng.run_search(&[vec![0]], &[vec![1]], &[]),
            Err(DraftError::DraftComplete { stage: 2, .. })
        ));
    }

    #[test]
    fn test_run_search_rejects_non_alternating_schedule() {
        let mut eng = sized_engine();
        eng.set_sizes(8, 0, 0, 2).unwrap();
        eng.set_draft_stage(0, Team::A, Selection::Pick).unwrap();
        eng.set_draft_stage(1, Team::A, Selection::Pick).unwrap();

        assert!(matches!(
            eng.run_search(&[vec![]], &[vec![]], &[]),
            Err(DraftError::NonAlternatingSchedule {
                stage: 0,
                next_stage: 1
            })
        ));
    }

    #[test]
    fn test_run_search_rejects_straddling_double() {
        let mut eng = sized_engine();
        eng.set_sizes(8, 0, 0, 2).unwrap();
        eng.set_draft_stage(0, Team::A, Selection::Pick).unwrap();
        eng.set_draft_stage(1, Team::B, Selection::PickPick).unwrap();

        assert!(matches!(
            eng.run_search(&[vec![]], &[vec![]], &[]),
            Err(DraftError::StageOutOfRange { stage: 3, .. })
        ));
    }
}
