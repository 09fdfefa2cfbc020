//! Brick layouts
//!
//! Level files are plain whitespace-separated integers: a brick count `N`,
//! then `N` triples of `colour x y`. Colour codes are 0 red, 1 orange and
//! 2 yellow; `x`/`y` are the brick centre in pixels, y up.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::brick::BrickColour;
use crate::consts::{BRICK_HEIGHT, BRICK_WIDTH, SCREEN_HEIGHT, SCREEN_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrickPlacement {
    pub colour: BrickColour,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub bricks: Vec<BrickPlacement>,
}

#[derive(Debug)]
pub enum LevelError {
    Io { path: PathBuf, source: io::Error },
    MissingCount,
    BadCount { token: String },
    BadToken { brick: usize, token: String },
    UnknownColour { brick: usize, code: i64 },
    Truncated { expected: usize, found: usize },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::MissingCount => write!(f, "level is empty: expected a brick count"),
            Self::BadCount { token } => write!(f, "invalid brick count: {token:?}"),
            Self::BadToken { brick, token } => {
                write!(f, "brick {brick}: expected an integer, got {token:?}")
            }
            Self::UnknownColour { brick, code } => {
                write!(f, "brick {brick}: unknown colour code {code}")
            }
            Self::Truncated { expected, found } => {
                write!(f, "level truncated: expected {expected} bricks, found {found}")
            }
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Level {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse level text. Tokens after the last declared brick are ignored.
    pub fn parse(text: &str) -> Result<Self, LevelError> {
        let mut tokens = text.split_whitespace();

        let count_token = tokens.next().ok_or(LevelError::MissingCount)?;
        let count: usize = count_token.parse().map_err(|_| LevelError::BadCount {
            token: count_token.to_string(),
        })?;

        let mut bricks = Vec::new();
        for brick in 0..count {
            let mut field = || -> Result<i64, LevelError> {
                let token = tokens.next().ok_or(LevelError::Truncated {
                    expected: count,
                    found: brick,
                })?;
                token.parse().map_err(|_| LevelError::BadToken {
                    brick,
                    token: token.to_string(),
                })
            };

            let code = field()?;
            let x = field()?;
            let y = field()?;
            let colour =
                BrickColour::from_code(code).ok_or(LevelError::UnknownColour { brick, code })?;
            let coord = |v: i64| {
                i32::try_from(v).map_err(|_| LevelError::BadToken {
                    brick,
                    token: v.to_string(),
                })
            };
            bricks.push(BrickPlacement {
                colour,
                x: coord(x)?,
                y: coord(y)?,
            });
        }

        Ok(Self { bricks })
    }

    pub fn read(path: &Path) -> Result<Self, LevelError> {
        let text = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Like [`Level::read`], but a bad file yields an empty level
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(level) => {
                log::info!("Loaded {} bricks from {}", level.bricks.len(), path.display());
                level
            }
            Err(e) => {
                log::warn!("Level load failed, continuing with no bricks: {e}");
                Self::empty()
            }
        }
    }

    /// Plain text form accepted by [`Level::parse`]
    pub fn to_text(&self) -> String {
        let mut out = format!("{}\n", self.bricks.len());
        for b in &self.bricks {
            out.push_str(&format!("{} {} {}\n", b.colour.code(), b.x, b.y));
        }
        out
    }

    /// Built-in layout: rows of red, orange and yellow across the top of the screen
    pub fn classic() -> Self {
        let columns = 24;
        let rows = [
            BrickColour::Red,
            BrickColour::Red,
            BrickColour::Orange,
            BrickColour::Orange,
            BrickColour::Yellow,
            BrickColour::Yellow,
        ];
        let left = (SCREEN_WIDTH - columns as f32 * BRICK_WIDTH) * 0.5 + BRICK_WIDTH * 0.5;
        let top = SCREEN_HEIGHT - 160.0;

        let bricks = rows
            .iter()
            .enumerate()
            .flat_map(|(row, &colour)| {
                (0..columns).map(move |col| BrickPlacement {
                    colour,
                    x: (left + col as f32 * BRICK_WIDTH) as i32,
                    y: (top - row as f32 * BRICK_HEIGHT) as i32,
                })
            })
            .collect();
        Self { bricks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_reads_triples() {
        let level = Level::parse("2\n0 100 900\n2 164 900\n").unwrap();
        assert_eq!(
            level.bricks,
            vec![
                BrickPlacement { colour: BrickColour::Red, x: 100, y: 900 },
                BrickPlacement { colour: BrickColour::Yellow, x: 164, y: 900 },
            ]
        );
    }

    #[test]
    fn zero_bricks_is_valid() {
        assert!(Level::parse("0").unwrap().bricks.is_empty());
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(matches!(Level::parse("   "), Err(LevelError::MissingCount)));
        assert!(matches!(Level::parse("-1"), Err(LevelError::BadCount { .. })));
        assert!(matches!(
            Level::parse("2\n0 1 2\n1 3"),
            Err(LevelError::Truncated { expected: 2, found: 1 })
        ));
        assert!(matches!(
            Level::parse("1\n0 abc 2"),
            Err(LevelError::BadToken { brick: 0, .. })
        ));
        assert!(matches!(
            Level::parse("1\n7 10 20"),
            Err(LevelError::UnknownColour { brick: 0, code: 7 })
        ));
    }

    #[test]
    fn text_form_parses_back() {
        let level = Level::classic();
        assert_eq!(level.bricks.len(), 144);
        assert_eq!(Level::parse(&level.to_text()).unwrap(), level);
    }

    #[test]
    fn read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "1\n1 640 800\n").unwrap();
        let level = Level::read(file.path()).unwrap();
        assert_eq!(level.bricks[0].colour, BrickColour::Orange);
    }

    #[test]
    fn load_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        assert!(matches!(Level::read(&missing), Err(LevelError::Io { .. })));
        assert_eq!(Level::load(&missing), Level::empty());

        let garbage = dir.path().join("garbage.txt");
        std::fs::write(&garbage, "lots of bricks").unwrap();
        assert!(Level::load(&garbage).bricks.is_empty());
    }

    #[test]
    fn huge_count_is_truncated_not_allocated() {
        let text = format!("{}\n0 10 10\n", usize::MAX);
        assert!(matches!(
            Level::parse(&text),
            Err(LevelError::Truncated { found: 1, .. })
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.txt");
        std::fs::write(&path, text).unwrap();
        assert_eq!(Level::load(&path), Level::empty());
    }
}
