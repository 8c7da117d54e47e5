use crate::models::{AnnotatedGame, DerivedFlags, GameRecord, Stat};

const DOUBLE_DIGITS: f64 = 10.0;

/// Count how many of points, rebounds, assists, steals and blocks reached 10.
/// Absent values never count.
pub fn double_digit_count(game: &GameRecord) -> usize {
    Stat::DOUBLE_CATEGORIES
        .iter()
        .filter(|stat| game.get(**stat).is_some_and(|v| v >= DOUBLE_DIGITS))
        .count()
}

pub fn derive_flags(game: &GameRecord) -> DerivedFlags {
    let count = double_digit_count(game);
    DerivedFlags {
        is_double_double: count >= 2,
        is_triple_double: count >= 3,
    }
}

/// Attach double-double and triple-double flags to every game, keeping provider order
pub fn annotate(games: &[GameRecord]) -> Vec<AnnotatedGame> {
    games
        .iter()
        .map(|game| AnnotatedGame {
            record: game.clone(),
            flags: derive_flags(game),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(pts: Option<f64>, reb: Option<f64>, ast: Option<f64>, stl: Option<f64>, blk: Option<f64>) -> GameRecord {
        GameRecord {
            points: pts,
            rebounds: reb,
            assists: ast,
            steals: stl,
            blocks: blk,
            ..Default::default()
        }
    }

    #[test]
    fn test_double_and_triple_doubles() {
        let flags = derive_flags(&game(Some(30.0), Some(5.0), Some(3.0), Some(1.0), Some(0.0)));
        assert!(!flags.is_double_double);
        assert!(!flags.is_triple_double);

        let flags = derive_flags(&game(Some(10.0), Some(12.0), Some(11.0), None, None));
        assert!(flags.is_double_double);
        assert!(flags.is_triple_double);

        // Exactly 10 counts
        let flags = derive_flags(&game(Some(10.0), Some(10.0), Some(9.0), None, None));
        assert!(flags.is_double_double);
        assert!(!flags.is_triple_double);

        // Steals and blocks are eligible categories
        let flags = derive_flags(&game(Some(2.0), Some(1.0), Some(0.0), Some(10.0), Some(10.0)));
        assert!(flags.is_double_double);
    }

    #[test]
    fn test_turnovers_do_not_count() {
        let mut g = game(Some(20.0), Some(3.0), None, None, None);
        g.turnovers = Some(11.0);
        assert_eq!(double_digit_count(&g), 1);
        assert!(!derive_flags(&g).is_double_double);
    }

    #[test]
    fn test_triple_double_implies_double_double() {
        let values = [None, Some(0.0), Some(9.0), Some(10.0), Some(25.0)];
        for pts in values {
            for reb in values {
                for ast in values {
                    for stl in [None, Some(10.0)] {
                        let flags = derive_flags(&game(pts, reb, ast, stl, None));
                        assert!(!flags.is_triple_double || flags.is_double_double);
                    }
                }
            }
        }
    }

    #[test]
    fn test_absent_behaves_like_zero() {
        let values = [None, Some(4.0), Some(10.0), Some(15.0)];
        for pts in values {
            for reb in values {
                for ast in values {
                    let with_absent = game(pts, reb, ast, None, None);
                    let zeroed = game(
                        Some(pts.unwrap_or(0.0)),
                        Some(reb.unwrap_or(0.0)),
                        Some(ast.unwrap_or(0.0)),
                        Some(0.0),
                        Some(0.0),
                    );
                    assert_eq!(derive_flags(&with_absent), derive_flags(&zeroed));
                }
            }
        }
    }

    #[test]
    fn test_annotate_keeps_order_and_original_values() {
        let games = vec![
            game(Some(30.0), Some(5.0), Some(3.0), None, None),
            game(Some(10.0), Some(12.0), Some(11.0), None, None),
        ];
        let annotated = annotate(&games);

        assert_eq!(annotated.len(), 2);
        assert_eq!(annotated[0].record, games[0]);
        assert_eq!(annotated[1].record, games[1]);
        assert!(!annotated[0].flags.is_double_double);
        assert!(annotated[1].flags.is_triple_double);
    }
}
