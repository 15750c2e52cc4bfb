// Lineup-ambiguity scenarios: flex heroes selected before the root.

use super::{engine_with, single_thread_pool};
use crate::draft_repr::{Lineup, Selection, Team, INF};
use crate::engine::Engine;
use crate::search::{flex_negamax, BestMove, SearchCtx, MAX_TT_STAGE};

/// Heroes 0 and 1 are the two role variants of one underlying hero,
/// picked by the enemy before the root.
fn flex_enemy_engine() -> Engine {
    let schedule = [(Team::B, Selection::Pick), (Team::A, Selection::Pick)];
    let mut eng = engine_with(4, 0, 4, &schedule);
    eng.set_h_info(0, &[0, 1], &[0, 1]).unwrap();
    eng.set_h_info(1, &[1, 0], &[1, 0]).unwrap();

    // what A's candidates are worth depends on which role the enemy
    // flex hero ends up playing
    eng.set_counter_r(0, &[2], &[0], 20, 0).unwrap();
    eng.set_counter_r(1, &[2], &[1], 5, 0).unwrap();
    eng.set_counter_r(2, &[3], &[0], 0, 0).unwrap();
    eng.set_counter_r(3, &[3], &[1], 15, 0).unwrap();
    eng
}

#[test]
fn test_flex_enemy_collapses_to_guaranteed_value() {
    // vs X-as-0: hero 2 is worth 20, hero 3 nothing
    // vs X-as-1: hero 2 is worth 5, hero 3 is worth 15
    // the enemy settles into whichever role hurts A's choice most, so
    // the sound value is max-min: hero 2 guaranteeing 5 -- not the
    // best case 20, not the per-lineup optima 20/15
    let eng = flex_enemy_engine();
    let result = eng
        .run_search(&[vec![]], &[vec![0], vec![1]], &[])
        .unwrap();
    assert_eq!(result.value, 5);
    assert_eq!(result.best, Some(BestMove::Single(2)));
}

#[test]
fn test_single_lineup_enemy_has_no_ambiguity_discount() {
    // when the enemy's role assignment is pinned, each lineup's own
    // optimum applies
    let eng = flex_enemy_engine();

    let vs_role_0 = eng.run_search(&[vec![]], &[vec![0]], &[]).unwrap();
    assert_eq!(vs_role_0.value, 20);
    assert_eq!(vs_role_0.best, Some(BestMove::Single(2)));

    let vs_role_1 = eng.run_search(&[vec![]], &[vec![1]], &[]).unwrap();
    assert_eq!(vs_role_1.value, 15);
    assert_eq!(vs_role_1.best, Some(BestMove::Single(3)));
}

/// Engine where both sides carry a flex hero to the terminal: A's is
/// indices 0/1, B's is indices 2/3, and heroes 4, 5 are filler picks.
/// The counter grid gives the lineup-vs-lineup value matrix
/// [[8, 2], [1, 6]] (A lineups by rows, B lineups by columns).
fn double_flex_engine() -> Engine {
    let schedule = [
        (Team::A, Selection::Pick),
        (Team::B, Selection::Pick),
        (Team::A, Selection::Pick),
        (Team::B, Selection::Pick),
    ];
    let mut eng = engine_with(6, 0, 4, &schedule);
    eng.set_h_info(0, &[0, 1], &[0, 1]).unwrap();
    eng.set_h_info(1, &[1, 0], &[1, 0]).unwrap();
    eng.set_h_info(2, &[2, 3], &[2, 3]).unwrap();
    eng.set_h_info(3, &[3, 2], &[3, 2]).unwrap();

    eng.set_counter_r(0, &[0], &[2], 8, 0).unwrap();
    eng.set_counter_r(1, &[0], &[3], 2, 0).unwrap();
    eng.set_counter_r(2, &[1], &[2], 1, 0).unwrap();
    eng.set_counter_r(3, &[1], &[3], 6, 0).unwrap();
    eng
}

#[test]
fn test_ambiguous_terminal_value_for_root_a() {
    // both flex sets survive to the end of the draft; A commits to a
    // lineup first, so the value is max over rows of the row minimum:
    // max(min(8, 2), min(1, 6)) = 2. The filler picks are equal, so
    // serial tie-breaking selects the lower index.
    let eng = double_flex_engine();
    let result = single_thread_pool().install(|| {
        eng.run_search(&[vec![0], vec![1]], &[vec![2], vec![3]], &[])
            .unwrap()
    });
    assert_eq!(result.value, 2);
    assert_eq!(result.best, Some(BestMove::Single(4)));
}

#[test]
fn test_ambiguous_terminal_value_for_root_b() {
    // same draft one stage later with B to move: B commits first, so
    // A-relative value is min over columns of the column maximum:
    // min(max(8, 1), max(2, 6)) = 6, i.e. -6 for B
    let eng = double_flex_engine();
    let result = eng
        .run_search(&[vec![0, 4], vec![1, 4]], &[vec![2], vec![3]], &[])
        .unwrap();
    assert_eq!(result.value, -6);
    assert_eq!(result.best, Some(BestMove::Single(5)));
}

#[test]
fn test_flex_terminal_lattice_orientations() {
    // drive the ambiguous-terminal evaluation directly across every
    // root/terminal orientation over the matrix [[8, 2], [1, 6]]
    let eng = double_flex_engine();

    let lineup = |hero: usize| Lineup {
        team: crate::draft_repr::bit(hero),
        legal: 0,
        rr_value: 0,
        hash: 0,
    };
    let a_lineups = [lineup(0), lineup(1)];
    let b_lineups = [lineup(2), lineup(3)];
    let stage = eng.draft_len();

    let value = |root_team, terminal_team, lineups: &[Lineup], e_lineups: &[Lineup]| {
        let ctx = SearchCtx {
            root_team,
            terminal_team,
            tt_max_stage: MAX_TT_STAGE,
        };
        flex_negamax(&eng, &ctx, lineups, e_lineups, 0, stage, -INF, INF)
    };

    // terminal frame held by A: A-relative values come back directly
    assert_eq!(value(Team::A, Team::A, &a_lineups, &b_lineups), 2);
    assert_eq!(value(Team::B, Team::A, &a_lineups, &b_lineups), 6);

    // terminal frame held by B: same lattice, negated for the mover
    assert_eq!(value(Team::A, Team::B, &b_lineups, &a_lineups), -2);
    assert_eq!(value(Team::B, Team::B, &b_lineups, &a_lineups), -6);
}

#[test]
fn test_flex_ban_keeps_every_lineup_alive() {
    // same flex matchup with a ban stage in the middle of the
    // remaining draft; the filler heroes carry no reward, so however
    // the picks and the ban fall, the value is still the guaranteed
    // lattice value of the flex matchup
    let schedule = [
        (Team::A, Selection::Pick),
        (Team::B, Selection::Pick),
        (Team::A, Selection::Pick),
        (Team::B, Selection::Ban),
        (Team::A, Selection::Pick),
    ];
    let mut eng = engine_with(7, 0, 4, &schedule);
    eng.set_h_info(0, &[0, 1], &[0, 1]).unwrap();
    eng.set_h_info(1, &[1, 0], &[1, 0]).unwrap();
    eng.set_h_info(2, &[2, 3], &[2, 3]).unwrap();
    eng.set_h_info(3, &[3, 2], &[3, 2]).unwrap();
    eng.set_counter_r(0, &[0], &[2], 8, 0).unwrap();
    eng.set_counter_r(1, &[0], &[3], 2, 0).unwrap();
    eng.set_counter_r(2, &[1], &[2], 1, 0).unwrap();
    eng.set_counter_r(3, &[1], &[3], 6, 0).unwrap();

    let result = single_thread_pool().install(|| {
        eng.run_search(&[vec![0], vec![1]], &[vec![2], vec![3]], &[])
            .unwrap()
    });
    assert_eq!(result.value, 2);
    assert_eq!(result.best, Some(BestMove::Single(4)));
}
