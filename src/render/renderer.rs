use crate::board::{self, BoardGeometry, Token};
use crate::render::{Image, ImageLoader, LoadError, Palette, PieceAssets, Surface};

/// A piece square that could not be drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquareFailure {
    pub rank: usize,
    pub file: usize,
    pub symbol: char,
    pub reason: String,
}

/// What a render actually managed to paint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Squares that received a background and border.
    pub squares_painted: usize,
    pub pieces_drawn: usize,
    pub failures: Vec<SquareFailure>,
}

impl RenderReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Paints a FEN board layout onto a [`Surface`].
///
/// Rendering is best effort: the layout is not validated, and a piece image
/// that fails to load leaves its square unpainted while the rest of the board
/// is still drawn. Failures are logged and collected in the returned
/// [`RenderReport`]; nothing is propagated to the caller.
pub struct BoardRenderer<L> {
    loader: L,
    assets: PieceAssets,
    palette: Palette,
}

impl<L: ImageLoader> BoardRenderer<L> {
    pub fn new(loader: L) -> Self {
        Self::with_assets(loader, PieceAssets::default())
    }

    pub fn with_assets(loader: L, assets: PieceAssets) -> Self {
        Self {
            loader,
            assets,
            palette: Palette::default(),
        }
    }

    pub async fn render<S: Surface>(
        &self,
        surface: &mut S,
        layout: &str,
        width: u32,
        height: u32,
    ) -> RenderReport {
        let mut report = RenderReport::default();

        if let Err(e) = surface.resize(width, height) {
            tracing::error!("Cannot render on '{}': {}", surface.id(), e);
            return report;
        }

        let geometry = BoardGeometry::new(width, height);

        for (rank, rank_str) in board::ranks(layout).enumerate() {
            let mut file = 0usize;

            for token in board::tokens(rank_str) {
                match token {
                    Token::Empty(count) => {
                        for _ in 0..count {
                            self.paint_square(surface, &geometry, file, rank);
                            report.squares_painted += 1;
                            file += 1;
                        }
                    }
                    Token::Piece(symbol) => {
                        // Loads are awaited one at a time so squares land in raster order.
                        match self.load_piece(symbol).await {
                            Ok(image) => {
                                self.paint_square(surface, &geometry, file, rank);
                                surface.draw_image(&image, geometry.square(file, rank));
                                report.squares_painted += 1;
                                report.pieces_drawn += 1;
                                file += 1;
                            }
                            // The cursor stays put, so the rest of the rank shifts
                            // left and the gap ends up at the end of the rank.
                            Err(e) => {
                                tracing::error!(rank, file, %symbol, "Skipping square: {}", e);
                                report.failures.push(SquareFailure {
                                    rank,
                                    file,
                                    symbol,
                                    reason: e.to_string(),
                                });
                            }
                        }
                    }
                }
            }
        }

        // Corner markers go on last so nothing on the board covers them.
        for marker in geometry.corner_markers() {
            surface.fill_rect(marker, self.palette.corner_marker);
        }
        surface.set_outer_border(geometry.border_width);

        tracing::debug!(
            "Rendered {}x{} board on '{}': {} squares, {} pieces, {} failures",
            width,
            height,
            surface.id(),
            report.squares_painted,
            report.pieces_drawn,
            report.failures.len()
        );

        report
    }

    fn paint_square<S: Surface>(
        &self,
        surface: &mut S,
        geometry: &BoardGeometry,
        file: usize,
        rank: usize,
    ) {
        surface.fill_rect(geometry.square(file, rank), self.palette.square(file, rank));
        surface.stroke_rect(
            geometry.border_rect(file, rank),
            geometry.border_width,
            self.palette.square_border,
        );
    }

    async fn load_piece(&self, symbol: char) -> Result<Image, LoadError> {
        let path = self.assets.path(symbol).ok_or(LoadError::NoAsset { symbol })?;
        self.loader.load(path).await
    }
}
