use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Piece symbol to image asset, uppercase white and lowercase black.
pub const PIECE_ASSETS: [(char, &str); 12] = [
    ('r', "res/img/black_rook.png"),
    ('n', "res/img/black_knight.png"),
    ('b', "res/img/black_bishop.png"),
    ('q', "res/img/black_queen.png"),
    ('k', "res/img/black_king.png"),
    ('p', "res/img/black_pawn.png"),
    ('R', "res/img/white_rook.png"),
    ('N', "res/img/white_knight.png"),
    ('B', "res/img/white_bishop.png"),
    ('Q', "res/img/white_queen.png"),
    ('K', "res/img/white_king.png"),
    ('P', "res/img/white_pawn.png"),
];

pub fn asset_path(symbol: char) -> Option<&'static str> {
    PIECE_ASSETS
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, path)| *path)
}

/// The default table with optional per-symbol replacements, e.g. to point a
/// piece at an SVG set instead of the bundled PNGs.
#[derive(Debug, Clone, Default)]
pub struct PieceAssets {
    overrides: HashMap<char, PathBuf>,
}

impl PieceAssets {
    pub fn with_overrides(overrides: HashMap<char, PathBuf>) -> Self {
        Self { overrides }
    }

    pub fn path(&self, symbol: char) -> Option<&Path> {
        self.overrides
            .get(&symbol)
            .map(PathBuf::as_path)
            .or_else(|| asset_path(symbol).map(Path::new))
    }
}
