use core::time::Duration;
use minefield_core::*;
use rand::prelude::*;
use rand::rngs::SmallRng;
use web_time::Instant;

/// A wall of mines down column 3 keeps the opening cascade on the left side of the board.
const WALL_MINES: [Coord2; 10] = [
    (0, 3),
    (1, 3),
    (2, 3),
    (3, 3),
    (4, 3),
    (5, 3),
    (6, 3),
    (7, 3),
    (0, 7),
    (7, 7),
];

#[test]
fn opening_cascade_then_clear_board_wins_and_ranks() {
    let path = std::env::temp_dir().join(format!("minefield-gameplay-{}.txt", std::process::id()));
    let t0 = Instant::now();
    let board = Board::from_mine_coords((8, 8), &WALL_MINES).unwrap();
    assert_eq!(board.safe_cell_count(), 54);

    let store = LeaderboardStore::new(&path);
    let mut session = GameSession::new(GameState::new_at(board, t0), Some("D"), store);

    let first = session.handle_at(Intent::LeftClick((0, 0)), t0);
    assert_eq!(first.update.changes.len(), 24);
    assert_eq!(session.game().display_at((3, 4)), Some(CellDisplay::Hidden));
    assert_eq!(session.game().display_at((0, 0)), Some(CellDisplay::Blank));
    assert!(first.ranking.is_none());

    let mut last = SessionUpdate::default();
    for row in 0..8 {
        for col in 0..8 {
            if session.game().is_finished() {
                break;
            }
            if !session.game().board().is_mine((row, col)) {
                last = session.handle_at(Intent::LeftClick((row, col)), t0 + Duration::from_millis(9000));
            }
        }
    }

    assert_eq!(session.game().status(), GameStatus::Won);
    assert_eq!(session.game().revealed_safe_count(), 54);
    assert_eq!(last.update.game_over, Some(GameOver::Won { elapsed_millis: 9000 }));

    let ranking = last.ranking.unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(ranking.rank, 4);
    assert_eq!(
        written,
        "Leaderboard:\n1. Riyaz: 14500ms\n2. Lokesh: 11000ms\n3. Rahul: 10000ms\n4. D: 9000ms\n"
    );
    for mine in WALL_MINES {
        assert_eq!(session.game().display_at(mine), Some(CellDisplay::Hidden));
    }
}

#[test]
fn random_play_keeps_counters_consistent() {
    for seed in 0..50 {
        let config = GameConfig::new((9, 11), 15).unwrap();
        let mut game = GameState::new(RandomBoardGenerator::from_seed(seed).generate(config).unwrap());
        let mut rng = SmallRng::seed_from_u64(seed + 1000);

        while !game.is_finished() {
            let coords = (rng.random_range(0..9), rng.random_range(0..11));
            let intent = if rng.random_range(0..4) == 0 {
                Intent::RightClick(coords)
            } else {
                Intent::LeftClick(coords)
            };
            game.handle(intent);

            let revealed = game
                .snapshot()
                .iter()
                .filter(|cell| matches!(cell.display, CellDisplay::Blank | CellDisplay::Count(_)))
                .count();
            assert_eq!(revealed, usize::from(game.revealed_safe_count()));
        }

        let won = game.revealed_safe_count() == config.safe_cells();
        assert_eq!(game.status() == GameStatus::Won, won);
        if game.status() == GameStatus::Lost {
            for mine in game.board().mine_coords() {
                assert_eq!(game.display_at(mine), Some(CellDisplay::Mine));
            }
        }
    }
}

#[test]
fn revealed_counts_match_neighbors() {
    let board = RandomBoardGenerator::from_seed(3)
        .generate(GameConfig::new((12, 12), 30).unwrap())
        .unwrap();

    for row in 0..12 {
        for col in 0..12 {
            if board.is_mine((row, col)) {
                continue;
            }
            let mut expected = 0;
            for d_row in -1i16..=1 {
                for d_col in -1i16..=1 {
                    if (d_row, d_col) == (0, 0) {
                        continue;
                    }
                    let (r, c) = (i16::from(row) + d_row, i16::from(col) + d_col);
                    if (0..12).contains(&r) && (0..12).contains(&c) && board.is_mine((r as u8, c as u8)) {
                        expected += 1;
                    }
                }
            }
            assert_eq!(adjacent_mine_count(&board, (row, col)), expected);
        }
    }
}
