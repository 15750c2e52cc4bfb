// End-to-end scenarios and search laws.

mod flex_tests;

use crate::draft_repr::{Selection, Team};
use crate::engine::Engine;

/// Engine with the given schedule and every hero in its own role with
/// its own identity. Tests with flex heroes override the relevant
/// hero infos afterwards.
fn engine_with(
    heroes: usize,
    synergies: usize,
    counters: usize,
    schedule: &[(Team, Selection)],
) -> Engine {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut eng = Engine::new();
    let draft_len = schedule.iter().map(|(_, s)| s.slots()).sum();
    eng.set_sizes(heroes, synergies, counters, draft_len)
        .unwrap();

    let mut stage = 0;
    for &(team, selection) in schedule {
        eng.set_draft_stage(stage, team, selection).unwrap();
        stage += selection.slots();
    }

    for hero in 0..heroes {
        eng.set_h_info(hero, &[hero], &[hero]).unwrap();
    }

    eng
}

/// Alternating single-pick schedule of the given length, team A first.
fn alternating_picks(len: usize) -> Vec<(Team, Selection)> {
    (0..len)
        .map(|i| {
            let team = if i % 2 == 0 { Team::A } else { Team::B };
            (team, Selection::Pick)
        })
        .collect()
}

/// Serial execution makes tie-breaks deterministic: among equal-value
/// candidates the lowest hero index wins.
fn single_thread_pool() -> rayon::ThreadPool {
    rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
}
