// Root search: one ply of flex negamax, parallel across candidates.
//
// Only the root needs to know which selection produced the value, so
// tracking the best move lives here instead of in every recursion
// level. First-slot candidates are spread over a work-stealing pool;
// each worker runs its whole subtree sequentially. Hero ordering is by
// fixed potential, which is not perfect in every state, so starting
// the first group of candidates together also raises the chance that
// a strong bound is available early for later cutoffs, and all workers
// share evaluations through the transposition table.

use super::flex::{flex_negamax, lineups_after_pick, lineups_after_removal};
use super::SearchCtx;
use crate::draft_repr::{above, indices, pop_lsb, union_legal, Lineup, Selection, INF};
use crate::engine::Engine;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};

/// Outcome of a search: the negamax value for the team to move and
/// the selection(s) achieving it. `best` is None only when the stage
/// had no legal candidate at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub value: i32,
    pub best: Option<BestMove>,
}

/// The recommended selection for the stage searched: one hero for
/// single stages, the pair for double stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestMove {
    Single(usize),
    Double(usize, usize),
}

const NO_HERO: u64 = 0xFF;

/// Best (value, hero, hero2) triple packed into one atomic word:
/// biased value in bits 16.., heroes in the low two bytes. Workers
/// race to improve it through a compare-and-swap loop; replacement is
/// strictly greater-than, so under serial iteration the lowest-index
/// candidate wins ties.
struct SharedBest(AtomicU64);

impl SharedBest {
    fn new() -> Self {
        Self(AtomicU64::new(Self::pack(-INF, NO_HERO, NO_HERO)))
    }

    #[inline]
    fn pack(value: i32, hero: u64, hero2: u64) -> u64 {
        (((value + INF) as u64) << 16) | (hero << 8) | hero2
    }

    #[inline]
    fn unpack(word: u64) -> (i32, u64, u64) {
        ((word >> 16) as i32 - INF, (word >> 8) & 0xFF, word & 0xFF)
    }

    /// Current best value, re-read before every child search so the
    /// pruning window tightens as candidates finish.
    #[inline]
    fn value(&self) -> i32 {
        Self::unpack(self.0.load(Ordering::Relaxed)).0
    }

    fn offer(&self, value: i32, hero: usize, hero2: Option<usize>) {
        let packed = Self::pack(
            value,
            hero as u64,
            hero2.map_or(NO_HERO, |h| h as u64),
        );
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            if value <= Self::unpack(current).0 {
                return;
            }
            match self
                .0
                .compare_exchange_weak(current, packed, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }

    fn result(&self, selection: Selection) -> SearchResult {
        let (value, hero, hero2) = Self::unpack(self.0.load(Ordering::Relaxed));
        let best = if hero == NO_HERO {
            None
        } else if selection.is_double() {
            Some(BestMove::Double(hero as usize, hero2 as usize))
        } else {
            Some(BestMove::Single(hero as usize))
        };
        SearchResult { value, best }
    }
}

/// Flex negamax for the root stage, recording the best move(s) and
/// evaluating outer candidates in parallel.
pub(crate) fn root_negamax(
    eng: &Engine,
    ctx: &SearchCtx,
    lineups: &[Lineup],
    e_lineups: &[Lineup],
    bans_hash: u64,
    stage: usize,
) -> SearchResult {
    let best = SharedBest::new();
    let stage_team = eng.draft[stage].team;
    let selection = eng.draft[stage].selection;

    match selection {
        Selection::Pick => {
            let cands: Vec<usize> = indices(union_legal(lineups)).collect();
            cands.par_iter().for_each(|&h| {
                let picked = lineups_after_pick(eng, stage_team, h, lineups);
                let e_updated = lineups_after_removal(eng, h, e_lineups);

                let child_value = -flex_negamax(
                    eng,
                    ctx,
                    &e_updated,
                    &picked,
                    bans_hash,
                    stage + 1,
                    -INF,
                    -best.value(),
                );

                best.offer(child_value, h, None);
            });
        }

        Selection::Ban => {
            let cands: Vec<usize> = indices(union_legal(e_lineups)).collect();
            cands.par_iter().for_each(|&h| {
                let own = lineups_after_removal(eng, h, lineups);
                let enemy = lineups_after_removal(eng, h, e_lineups);

                let child_value = -flex_negamax(
                    eng,
                    ctx,
                    &enemy,
                    &own,
                    bans_hash ^ eng.zobrist.ban(h),
                    stage + 1,
                    -INF,
                    -best.value(),
                );

                best.offer(child_value, h, None);
            });
        }

        Selection::PickPick => {
            let cands: Vec<usize> = indices(union_legal(lineups)).collect();
            cands.par_iter().for_each(|&h| {
                let picked = lineups_after_pick(eng, stage_team, h, lineups);
                let e_updated = lineups_after_removal(eng, h, e_lineups);

                let mut cands2 = union_legal(&picked) & above(h);
                while cands2 != 0 {
                    let h2 = pop_lsb(&mut cands2);
                    let picked2 = lineups_after_pick(eng, stage_team, h2, &picked);
                    let e_updated2 = lineups_after_removal(eng, h2, &e_updated);

                    let child_value = -flex_negamax(
                        eng,
                        ctx,
                        &e_updated2,
                        &picked2,
                        bans_hash,
                        stage + 2,
                        -INF,
                        -best.value(),
                    );

                    best.offer(child_value, h, Some(h2));
                }
            });
        }

        Selection::PickBan => {
            let cands: Vec<usize> = indices(union_legal(lineups)).collect();
            cands.par_iter().for_each(|&h| {
                let picked = lineups_after_pick(eng, stage_team, h, lineups);
                let e_updated = lineups_after_removal(eng, h, e_lineups);

                let mut cands2 = union_legal(&e_updated);
                while cands2 != 0 {
                    let h2 = pop_lsb(&mut cands2);
                    let own2 = lineups_after_removal(eng, h2, &picked);
                    let enemy2 = lineups_after_removal(eng, h2, &e_updated);

                    let child_value = -flex_negamax(
                        eng,
                        ctx,
                        &enemy2,
                        &own2,
                        bans_hash ^ eng.zobrist.ban(h2),
                        stage + 2,
                        -INF,
                        -best.value(),
                    );

                    best.offer(child_value, h, Some(h2));
                }
            });
        }

        Selection::BanPick => {
            let cands: Vec<usize> = indices(union_legal(e_lineups)).collect();
            cands.par_iter().for_each(|&h| {
                let own_b = lineups_after_removal(eng, h, lineups);
                let enemy_b = lineups_after_removal(eng, h, e_lineups);
                let bans_hash_b = bans_hash ^ eng.zobrist.ban(h);

                let mut cands2 = union_legal(&own_b);
                while cands2 != 0 {
                    let h2 = pop_lsb(&mut cands2);
                    let picked = lineups_after_pick(eng, stage_team, h2, &own_b);
                    let enemy_bp = lineups_after_removal(eng, h2, &enemy_b);

                    let child_value = -flex_negamax(
                        eng,
                        ctx,
                        &enemy_bp,
                        &picked,
                        bans_hash_b,
                        stage + 2,
                        -INF,
                        -best.value(),
                    );

                    best.offer(child_value, h, Some(h2));
                }
            });
        }

        Selection::BanBan => {
            let cands: Vec<usize> = indices(union_legal(e_lineups)).collect();
            cands.par_iter().for_each(|&h| {
                let own_b = lineups_after_removal(eng, h, lineups);
                let enemy_b = lineups_after_removal(eng, h, e_lineups);
                let bans_hash_b = bans_hash ^ eng.zobrist.ban(h);

                let mut cands2 = union_legal(&enemy_b) & above(h);
                while cands2 != 0 {
                    let h2 = pop_lsb(&mut cands2);
                    let own_bb = lineups_after_removal(eng, h2, &own_b);
                    let enemy_bb = lineups_after_removal(eng, h2, &enemy_b);

                    let child_value = -flex_negamax(
                        eng,
                        ctx,
                        &enemy_bb,
                        &own_bb,
                        bans_hash_b ^ eng.zobrist.ban(h2),
                        stage + 2,
                        -INF,
                        -best.value(),
                    );

                    best.offer(child_value, h, Some(h2));
                }
            });
        }
    }

    best.result(selection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_best_starts_at_sentinel() {
        let best = SharedBest::new();
        assert_eq!(best.value(), -INF);
        assert_eq!(best.result(Selection::Pick).best, None);
        assert_eq!(best.result(Selection::Pick).value, -INF);
    }

    #[test]
    fn test_shared_best_strict_improvement_only() {
        let best = SharedBest::new();
        best.offer(10, 3, None);
        best.offer(10, 1, None);
        assert_eq!(best.result(Selection::Pick).best, Some(BestMove::Single(3)));

        best.offer(11, 1, None);
        let result = best.result(Selection::Pick);
        assert_eq!(result.value, 11);
        assert_eq!(result.best, Some(BestMove::Single(1)));
    }

    #[test]
    fn test_shared_best_packs_negative_values() {
        let best = SharedBest::new();
        best.offer(-INF + 1, 62, Some(63));
        let result = best.result(Selection::BanBan);
        assert_eq!(result.value, -INF + 1);
        assert_eq!(result.best, Some(BestMove::Double(62, 63)));
    }
}
