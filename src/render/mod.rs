mod loader;
mod palette;
mod pieces;
mod renderer;
mod surface;

pub use loader::{FsImageLoader, Image, ImageLoader, LoadError};
pub use palette::{Palette, Rgb};
pub use pieces::PieceAssets;
pub use renderer::BoardRenderer;
pub use surface::{PixmapSurface, Surface, SurfaceError, CHESSBOARD_ID};
