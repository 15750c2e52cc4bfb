// Negamax search with alpha-beta pruning over the draft schedule.
//
// Teams and legal pools swap with every recursive call, so there is no
// undo and no mutable state: each child position is a few AND/OR ops
// on the parent's bitsets. The running role-reward sum and the Zobrist
// hash ride the recursion the same way, leaving only synergy and
// counter terms to evaluate at terminals.

use super::transposition_table::Flag;
use super::SearchCtx;
use crate::draft_repr::{above, bit, pop_lsb, Selection, Team, INF};
use crate::engine::Engine;

/// Alpha-beta negamax from the perspective of the team selecting at
/// `stage`.
///
/// `team`/`legal` belong to the selecting side, `e_team`/`e_legal` to
/// its opponent; `rr_value` is the A-relative sum of role rewards for
/// every pick on the path; `hash` is the XOR of Zobrist keys for every
/// selection on the path. Double selections recurse once per pair,
/// advancing the stage by two.
#[allow(clippy::too_many_arguments)]
pub(crate) fn negamax(
    eng: &Engine,
    ctx: &SearchCtx,
    team: u64,
    e_team: u64,
    legal: u64,
    e_legal: u64,
    rr_value: i32,
    hash: u64,
    stage: usize,
    mut alpha: i32,
    mut beta: i32,
) -> i32 {
    debug_assert_eq!(team & e_team, 0);
    debug_assert_eq!(legal & (team | e_team), 0);
    debug_assert_eq!(e_legal & (team | e_team), 0);

    if stage == eng.draft_len {
        // the frame holding the terminal is fixed by the schedule;
        // orient the A-relative score to whichever side holds it
        return match ctx.terminal_team {
            Team::A => rr_value + eng.terminal_value(team, e_team),
            Team::B => -(rr_value + eng.terminal_value(e_team, team)),
        };
    }

    let original_alpha = alpha;

    if stage < ctx.tt_max_stage {
        if let Some((flag, stored)) = eng.tt.probe(hash) {
            match flag {
                Flag::Exact => return stored,
                Flag::LowerBound => {
                    if stored > alpha {
                        alpha = stored;
                    }
                }
                Flag::UpperBound => {
                    if stored < beta {
                        beta = stored;
                    }
                }
            }

            if alpha >= beta {
                return stored;
            }
        }
    }

    let stage_team = eng.draft[stage].team;
    let mut value = -INF;

    match eng.draft[stage].selection {
        Selection::Pick => {
            let mut cands = legal;
            while cands != 0 {
                let h = pop_lsb(&mut cands);
                let info = eng.h_infos[h];

                // swap teams and legal pools around after updating
                // them for the next stage
                let child_value = -negamax(
                    eng,
                    ctx,
                    e_team,
                    team | bit(h),
                    e_legal & info.diff_h,
                    legal & info.diff_role_and_h,
                    rr_value + eng.role_delta(stage_team, h),
                    hash ^ eng.zobrist.pick(stage_team, h),
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
                    break;
                }
            }
        }

        Selection::Ban => {
            // only bans of heroes the enemy could still pick change
            // the state; the rest are redundant and skipped
            let mut cands = e_legal;
            while cands != 0 {
                let h = pop_lsb(&mut cands);
                let diff_h = eng.h_infos[h].diff_h;

                let child_value = -negamax(
                    eng,
                    ctx,
                    e_team,
                    team,
                    e_legal & diff_h,
                    legal & diff_h,
                    rr_value,
                    hash ^ eng.zobrist.ban(h),
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
                    break;
                }
            }
        }

        Selection::PickPick => {
            let mut cands = legal;
            'outer_pp: while cands != 0 {
                let h = pop_lsb(&mut cands);
                let info = eng.h_infos[h];
                let new_team = team | bit(h);
                let new_legal = legal & info.diff_role_and_h;
                let new_e_legal = e_legal & info.diff_h;
                let new_rr_value = rr_value + eng.role_delta(stage_team, h);
                let new_hash = hash ^ eng.zobrist.pick(stage_team, h);

                // pick order within the pair is irrelevant, so pairs
                // below the diagonal are skipped
                let mut cands2 = new_legal & above(h);
                while cands2 != 0 {
                    let h2 = pop_lsb(&mut cands2);
                    let info2 = eng.h_infos[h2];

                    let child_value = -negamax(
                        eng,
                        ctx,
                        e_team,
                        new_team | bit(h2),
                        new_e_legal & info2.diff_h,
                        new_legal & info2.diff_role_and_h,
                        new_rr_value + eng.role_delta(stage_team, h2),
                        new_hash ^ eng.zobrist.pick(stage_team, h2),
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
                        break 'outer_pp;
                    }
                }
            }
        }

        Selection::PickBan => {
            let mut cands = legal;
            'outer_pb: while cands != 0 {
                let h = pop_lsb(&mut cands);
                let info = eng.h_infos[h];
                let new_team = team | bit(h);
                let new_legal = legal & info.diff_role_and_h;
                let new_e_legal = e_legal & info.diff_h;
                let new_rr_value = rr_value + eng.role_delta(stage_team, h);
                let new_hash = hash ^ eng.zobrist.pick(stage_team, h);

                // order matters here: the ban ranges over everything
                // the enemy could still pick after the pick
                let mut cands2 = new_e_legal;
                while cands2 != 0 {
                    let h2 = pop_lsb(&mut cands2);
                    let diff_h2 = eng.h_infos[h2].diff_h;

                    let child_value = -negamax(
                        eng,
                        ctx,
                        e_team,
                        new_team,
                        new_e_legal & diff_h2,
                        new_legal & diff_h2,
                        new_rr_value,
                        new_hash ^ eng.zobrist.ban(h2),
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
                        break 'outer_pb;
                    }
                }
            }
        }

        Selection::BanPick => {
            let mut cands = e_legal;
            'outer_bp: while cands != 0 {
                let h = pop_lsb(&mut cands);
                let diff_h = eng.h_infos[h].diff_h;
                let new_legal = legal & diff_h;
                let new_e_legal = e_legal & diff_h;
                let new_hash = hash ^ eng.zobrist.ban(h);

                let mut cands2 = new_legal;
                while cands2 != 0 {
                    let h2 = pop_lsb(&mut cands2);
                    let info2 = eng.h_infos[h2];

                    let child_value = -negamax(
                        eng,
                        ctx,
                        e_team,
                        team | bit(h2),
                        new_e_legal & info2.diff_h,
                        new_legal & info2.diff_role_and_h,
                        rr_value + eng.role_delta(stage_team, h2),
                        new_hash ^ eng.zobrist.pick(stage_team, h2),
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
                        break 'outer_bp;
                    }
                }
            }
        }

        Selection::BanBan => {
            let mut cands = e_legal;
            'outer_bb: while cands != 0 {
                let h = pop_lsb(&mut cands);
                let diff_h = eng.h_infos[h].diff_h;
                let new_legal = legal & diff_h;
                let new_e_legal = e_legal & diff_h;
                let new_hash = hash ^ eng.zobrist.ban(h);

                // ban order within the pair is irrelevant
                let mut cands2 = new_e_legal & above(h);
                while cands2 != 0 {
                    let h2 = pop_lsb(&mut cands2);
                    let diff_h2 = eng.h_infos[h2].diff_h;

                    let child_value = -negamax(
                        eng,
                        ctx,
                        e_team,
                        team,
                        new_e_legal & diff_h2,
                        new_legal & diff_h2,
                        rr_value,
                        new_hash ^ eng.zobrist.ban(h2),
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
                        break 'outer_bb;
                    }
                }
            }
        }
    }

    if stage < ctx.tt_max_stage {
        let flag = if value <= original_alpha {
            Flag::UpperBound
        } else if value >= beta {
            Flag::LowerBound
        } else {
            Flag::Exact
        };
        eng.tt.store(hash, flag, value);
    }

    value
}
