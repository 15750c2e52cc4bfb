// Flex negamax: search over sets of possible lineups.
//
// A flex hero selected before the search root could occupy any of its
// role indices, so a side's true lineup may be one of several. Running
// the plain search once per combination is unsound: the optimal action
// against one enemy lineup may be a blunder against another, and the
// mover cannot condition on information it does not have. This layer
// applies each candidate selection across every lineup it is legal in,
// recursing until the enemy's lineup is unambiguous, then hands over
// to the inner negamax.

use super::negamax::negamax;
use super::SearchCtx;
use crate::draft_repr::{
    above, bit, contains, pop_lsb, union_legal, Lineup, LineupSet, Selection, Team, INF,
};
use crate::engine::Engine;

/// Apply a pick of `hero` by `team` across `lineups`, keeping only
/// the lineups in which it is legal.
pub(crate) fn lineups_after_pick(
    eng: &Engine,
    team: Team,
    hero: usize,
    lineups: &[Lineup],
) -> LineupSet {
    let hero_bit = bit(hero);
    let info = eng.h_infos[hero];
    let delta = eng.role_delta(team, hero);
    let key = eng.zobrist.pick(team, hero);

    lineups
        .iter()
        .filter(|l| contains(l.legal, hero))
        .map(|l| Lineup {
            team: l.team | hero_bit,
            legal: l.legal & info.diff_role_and_h,
            rr_value: l.rr_value + delta,
            hash: l.hash ^ key,
        })
        .collect()
}

/// Update every lineup's legal pool after `hero` is banned or picked
/// by the other side. No lineup is dropped: a side may be better off
/// in a lineup where the hero was never available.
pub(crate) fn lineups_after_removal(eng: &Engine, hero: usize, lineups: &[Lineup]) -> LineupSet {
    let diff_h = eng.h_infos[hero].diff_h;
    lineups
        .iter()
        .map(|l| Lineup {
            legal: l.legal & diff_h,
            ..*l
        })
        .collect()
}

/// Guaranteed value of a terminal reached while both sides still have
/// several possible lineups.
///
/// Teams could keep reassigning roles to exploit each other, so the
/// game value need not converge; what is well defined is the best
/// outcome the root's selecting team can guarantee: its best lineup
/// under the opponent's worst-case response. Whichever earlier search
/// chose a path into this terminal assumed exactly this value, so the
/// two can never disagree.
fn flex_terminal(eng: &Engine, ctx: &SearchCtx, lineups: &[Lineup], e_lineups: &[Lineup]) -> i32 {
    let (a_lineups, b_lineups) = match ctx.terminal_team {
        Team::A => (lineups, e_lineups),
        Team::B => (e_lineups, lineups),
    };

    let value_a = match ctx.root_team {
        Team::A => {
            // best (max) lineup for A, each valued at the best (min)
            // response B has against it
            let mut value_max = -INF;
            for a in a_lineups {
                let mut value_min = INF;
                for b in b_lineups {
                    let value = a.rr_value + b.rr_value + eng.terminal_value(a.team, b.team);
                    if value < value_min {
                        value_min = value;
                    }
                    if value_min <= value_max {
                        // A won't use this lineup
                        break;
                    }
                }
                if value_min > value_max {
                    value_max = value_min;
                }
            }
            value_max
        }
        Team::B => {
            // best (min) lineup for B, each valued at the best (max)
            // response A has against it
            let mut value_min = INF;
            for b in b_lineups {
                let mut value_max = -INF;
                for a in a_lineups {
                    let value = a.rr_value + b.rr_value + eng.terminal_value(a.team, b.team);
                    if value > value_max {
                        value_max = value;
                    }
                    if value_max >= value_min {
                        // B won't use this lineup
                        break;
                    }
                }
                if value_max < value_min {
                    value_min = value_max;
                }
            }
            value_min
        }
    };

    match ctx.terminal_team {
        Team::A => value_a,
        Team::B => -value_a,
    }
}

/// Negamax over lineup sets from the perspective of the side
/// selecting at `stage`.
///
/// `lineups` are the mover's possible starting lineups, `e_lineups`
/// the opponent's; `bans_hash` is kept apart from the per-lineup pick
/// hashes because a ban is the same selection in every lineup.
#[allow(clippy::too_many_arguments)]
pub(crate) fn flex_negamax(
    eng: &Engine,
    ctx: &SearchCtx,
    lineups: &[Lineup],
    e_lineups: &[Lineup],
    bans_hash: u64,
    stage: usize,
    mut alpha: i32,
    beta: i32,
) -> i32 {
    if e_lineups.len() == 1 {
        // the enemy can't switch lineups: the value is the best the
        // mover can get by committing to one of its own
        let e = &e_lineups[0];
        let mut value = -INF;

        for l in lineups {
            let team_value = negamax(
                eng,
                ctx,
                l.team,
                e.team,
                l.legal,
                e.legal,
                l.rr_value + e.rr_value,
                bans_hash ^ l.hash ^ e.hash,
                stage,
                alpha,
                beta,
            );

            if team_value > value {
                value = team_value;
            }
            if value > alpha {
                alpha = value;
            }
            // remaining lineups can't matter once the enemy has
            // better options elsewhere
            if alpha >= beta {
                break;
            }
        }

        return value;
    }

    if stage == eng.draft_len {
        return flex_terminal(eng, ctx, lineups, e_lineups);
    }

    let stage_team = eng.draft[stage].team;
    let mut value = -INF;

    match eng.draft[stage].selection {
        Selection::Pick => {
            let mut cands = union_legal(lineups);
            while cands != 0 {
                let h = pop_lsb(&mut cands);
                let picked = lineups_after_pick(eng, stage_team, h, lineups);
                let e_updated = lineups_after_removal(eng, h, e_lineups);

                let child_value = -flex_negamax(
                    eng,
                    ctx,
                    &e_updated,
                    &picked,
                    bans_hash,
                    stage + 1,
                    -beta,
                    -alpha,
                );

                if child_value > value {
                    value = child_value;
                }
                if value > alpha {
                    alpha = value;
                }
                if alpha >= beta {
                    return value;
                }
            }
        }

        Selection::Ban => {
            // a ban is worth considering if the hero is legal in any
            // enemy lineup; all enemy lineups survive it regardless
            let mut cands = union_legal(e_lineups);
            while cands != 0 {
                let h = pop_lsb(&mut cands);
                let own = lineups_after_removal(eng, h, lineups);
                let enemy = lineups_after_removal(eng, h, e_lineups);

                let child_value = -flex_negamax(
                    eng,
                    ctx,
                    &enemy,
                    &own,
                    bans_hash ^ eng.zobrist.ban(h),
                    stage + 1,
                    -beta,
                    -alpha,
                );

                if child_value > value {
                    value = child_value;
                }
                if value > alpha {
                    alpha = value;
                }
                if alpha >= beta {
                    return value;
                }
            }
        }

        Selection::PickPick => {
            let mut cands = union_legal(lineups);
            while cands != 0 {
                let h = pop_lsb(&mut cands);
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
                        -beta,
                        -alpha,
                    );

                    if child_value > value {
                        value = child_value;
                    }
                    if value > alpha {
                        alpha = value;
                    }
                    if alpha >= beta {
                        return value;
                    }
                }
            }
        }

        Selection::PickBan => {
            let mut cands = union_legal(lineups);
            while cands != 0 {
                let h = pop_lsb(&mut cands);
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
                        -beta,
                        -alpha,
                    );

                    if child_value > value {
                        value = child_value;
                    }
                    if value > alpha {
                        alpha = value;
                    }
                    if alpha >= beta {
                        return value;
                    }
                }
            }
        }

        Selection::BanPick => {
            let mut cands = union_legal(e_lineups);
            while cands != 0 {
                let h = pop_lsb(&mut cands);
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
                        -beta,
                        -alpha,
                    );

                    if child_value > value {
                        value = child_value;
                    }
                    if value > alpha {
                        alpha = value;
                    }
                    if alpha >= beta {
                        return value;
                    }
                }
            }
        }

        Selection::BanBan => {
            let mut cands = union_legal(e_lineups);
            while cands != 0 {
                let h = pop_lsb(&mut cands);
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
                        -beta,
                        -alpha,
                    );

                    if child_value > value {
                        value = child_value;
                    }
                    if value > alpha {
                        alpha = value;
                    }
                    if alpha >= beta {
                        return value;
                    }
                }
            }
        }
    }

    value
}
