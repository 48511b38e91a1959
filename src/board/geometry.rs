/// Axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl SquareRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn to_skia(self) -> Option<tiny_skia::Rect> {
        tiny_skia::Rect::from_xywh(self.x, self.y, self.width, self.height)
    }
}

/// Pixel layout of the board, derived from the canvas size on every render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardGeometry {
    pub width: f32,
    pub height: f32,
    pub square_width: f32,
    pub square_height: f32,
    pub border_width: f32,
}

impl BoardGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width as f32;
        let height = height as f32;
        let square_width = width / 8.0;
        let square_height = height / 8.0;

        Self {
            width,
            height,
            square_width,
            square_height,
            border_width: square_height / 24.0,
        }
    }

    /// Bounds of the square at `file` (left to right) and `rank` (top to bottom).
    pub fn square(&self, file: usize, rank: usize) -> SquareRect {
        SquareRect::new(
            file as f32 * self.square_width,
            rank as f32 * self.square_height,
            self.square_width,
            self.square_height,
        )
    }

    /// The square outline, inset by half the border so the stroke stays inside the square.
    pub fn border_rect(&self, file: usize, rank: usize) -> SquareRect {
        let square = self.square(file, rank);
        let half = self.border_width / 2.0;
        SquareRect::new(
            square.x + half,
            square.y + half,
            square.width - self.border_width,
            square.height - self.border_width,
        )
    }

    pub fn marker_size(&self) -> (f32, f32) {
        (self.square_width / 5.0, self.square_height / 5.0)
    }

    /// Top-left, top-right, bottom-left, bottom-right.
    pub fn corner_markers(&self) -> [SquareRect; 4] {
        let (w, h) = self.marker_size();
        [
            SquareRect::new(0.0, 0.0, w, h),
            SquareRect::new(self.width - w, 0.0, w, h),
            SquareRect::new(0.0, self.height - h, w, h),
            SquareRect::new(self.width - w, self.height - h, w, h),
        ]
    }
}
