use threes_core::{CellCoord, Command, Direction, Event, MoveRejection, TileId};
use threes_world::{self as world, query, World};

fn board(tiles: &[(i32, i32, u32)]) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureBoard {
            rows: 3,
            columns: 3,
        },
        &mut events,
    );
    for &(column, row, number) in tiles {
        world::apply(
            &mut world,
            Command::AddTile {
                number,
                cell: CellCoord::new(column, row),
            },
            &mut events,
        );
    }
    world
}

fn acknowledge(world: &mut World, tiles: &[u32]) -> Vec<Event> {
    let mut events = Vec::new();
    for &tile in tiles {
        world::apply(
            world,
            Command::AcknowledgeScore {
                tile: TileId::new(tile),
            },
            &mut events,
        );
    }
    events
}

#[test]
fn sweep_skips_empty_tiers_and_sums_each_tier() {
    let mut world = board(&[(0, 0, 6), (1, 0, 6), (2, 2, 12), (0, 1, 1)]);

    let mut events = Vec::new();
    world::apply(&mut world, Command::ShowScore, &mut events);
    assert_eq!(
        events,
        vec![
            Event::TileStacked {
                tile: TileId::new(0),
                z: 0
            },
            Event::TileStacked {
                tile: TileId::new(1),
                z: 1
            },
            Event::TileStacked {
                tile: TileId::new(3),
                z: 1
            },
            Event::TileStacked {
                tile: TileId::new(2),
                z: 4
            },
            Event::ScoreRevealRequested {
                tile: TileId::new(0),
                number: 6,
                score: 9,
            },
            Event::ScoreRevealRequested {
                tile: TileId::new(1),
                number: 6,
                score: 9,
            },
        ]
    );
    assert!(query::score_sweep_in_flight(&world));
    assert_eq!(query::pending_score_reveals(&world), 2);

    let first = acknowledge(&mut world, &[0]);
    assert!(first.is_empty(), "tier waits for every tile");

    let second = acknowledge(&mut world, &[1]);
    assert_eq!(
        second,
        vec![Event::ScoreRevealRequested {
            tile: TileId::new(2),
            number: 12,
            score: 27,
        }]
    );

    let done = acknowledge(&mut world, &[2]);
    assert_eq!(done, vec![Event::ScoreDone { total: 45 }]);
    assert!(!query::score_sweep_in_flight(&world));
    assert_eq!(query::tile(&world, TileId::new(2)).map(|tile| tile.z), Some(4));
}

#[test]
fn duplicate_acknowledgements_do_not_advance_a_tier() {
    let mut world = board(&[(0, 0, 3), (1, 0, 3)]);
    let mut events = Vec::new();
    world::apply(&mut world, Command::ShowScore, &mut events);

    let events = acknowledge(&mut world, &[0, 0, 7]);
    assert!(events.is_empty());
    assert_eq!(query::pending_score_reveals(&world), 1);

    let events = acknowledge(&mut world, &[1]);
    assert_eq!(events, vec![Event::ScoreDone { total: 6 }]);
}

#[test]
fn empty_board_scores_zero_immediately() {
    let mut world = board(&[]);
    let mut events = Vec::new();
    world::apply(&mut world, Command::ShowScore, &mut events);
    assert_eq!(events, vec![Event::ScoreDone { total: 0 }]);
    assert!(!query::score_sweep_in_flight(&world));
}

#[test]
fn board_of_small_numbers_scores_zero() {
    let mut world = board(&[(0, 0, 1), (1, 0, 2)]);
    let mut events = Vec::new();
    world::apply(&mut world, Command::ShowScore, &mut events);
    assert_eq!(events.last(), Some(&Event::ScoreDone { total: 0 }));
}

#[test]
fn moves_wait_for_the_sweep_to_finish() {
    let mut world = board(&[(2, 0, 3)]);
    let mut events = Vec::new();
    world::apply(&mut world, Command::ShowScore, &mut events);

    events.clear();
    world::apply(
        &mut world,
        Command::Move {
            direction: Direction::Left,
            distance: 100.0,
        },
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::MoveRejected {
            direction: Direction::Left,
            reason: MoveRejection::ScoreSweepInFlight,
        }]
    );

    let done = acknowledge(&mut world, &[0]);
    assert_eq!(done, vec![Event::ScoreDone { total: 3 }]);
}

#[test]
fn reset_abandons_the_score_sweep() {
    let mut world = board(&[(0, 0, 6), (1, 0, 12)]);

    let mut events = Vec::new();
    world::apply(&mut world, Command::ShowScore, &mut events);
    assert!(query::score_sweep_in_flight(&world));

    events.clear();
    world::apply(&mut world, Command::Reset, &mut events);
    assert_eq!(events, vec![Event::BoardCleared]);
    assert!(!query::score_sweep_in_flight(&world));
    assert_eq!(query::pending_score_reveals(&world), 0);

    let stale = acknowledge(&mut world, &[0, 1]);
    assert!(stale.is_empty());

    let mut after = Vec::new();
    world::apply(
        &mut world,
        Command::Move {
            direction: Direction::Left,
            distance: 100.0,
        },
        &mut after,
    );
    assert!(!after
        .iter()
        .any(|event| matches!(event, Event::MoveRejected { .. })));
}
