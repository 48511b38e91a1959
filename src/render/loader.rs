use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tiny_skia::{Pixmap, Transform};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("No image asset for piece symbol '{symbol}'")]
    NoAsset { symbol: char },
    #[error("Failed to load image: {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode image {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },
}

/// A decoded bitmap, ready to blit.
#[derive(Debug, Clone)]
pub struct Image {
    pixmap: Pixmap,
}

impl Image {
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, path: &Path) -> Result<Image, LoadError>;
}

/// Reads assets from disk relative to `root`. Nothing is cached; every call
/// reads and decodes the file again.
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[async_trait]
impl ImageLoader for FsImageLoader {
    async fn load(&self, path: &Path) -> Result<Image, LoadError> {
        let path = self.resolve(path);
        let data = tokio::fs::read(&path)
            .await
            .map_err(|source| LoadError::Read {
                path: path.clone(),
                source,
            })?;

        let is_svg = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
        let pixmap = if is_svg {
            decode_svg(&path, &data)?
        } else {
            decode_png(&path, &data)?
        };

        tracing::debug!(
            "Loaded {} ({}x{})",
            path.display(),
            pixmap.width(),
            pixmap.height()
        );
        Ok(Image::from_pixmap(pixmap))
    }
}

fn decode_png(path: &Path, data: &[u8]) -> Result<Pixmap, LoadError> {
    Pixmap::decode_png(data).map_err(|e| LoadError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Rasterizes an SVG at its intrinsic size; scaling happens at blit time.
fn decode_svg(path: &Path, data: &[u8]) -> Result<Pixmap, LoadError> {
    let decode_err = |reason: String| LoadError::Decode {
        path: path.to_path_buf(),
        reason,
    };

    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_data(data, &opt).map_err(|e| decode_err(e.to_string()))?;

    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height())
        .ok_or_else(|| decode_err("SVG has an empty canvas".to_string()))?;
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

    Ok(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Color;

    const SQUARE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="45" height="45">
  <rect x="0" y="0" width="45" height="45" fill="#ff0000"/>
</svg>"##;

    #[tokio::test]
    async fn test_load_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut pixmap = Pixmap::new(6, 4).unwrap();
        pixmap.fill(Color::from_rgba8(10, 20, 30, 255));
        pixmap.save_png(dir.path().join("piece.png")).unwrap();

        let loader = FsImageLoader::new(dir.path());
        let image = loader.load(Path::new("piece.png")).await.unwrap();
        assert_eq!((image.width(), image.height()), (6, 4));
        let px = image.pixmap().pixel(0, 0).unwrap().demultiply();
        assert_eq!((px.red(), px.green(), px.blue()), (10, 20, 30));
    }

    #[tokio::test]
    async fn test_load_svg() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("wk.svg"), SQUARE_SVG).unwrap();

        let loader = FsImageLoader::new(dir.path());
        let image = loader.load(Path::new("wk.svg")).await.unwrap();
        assert_eq!((image.width(), image.height()), (45, 45));
        let px = image.pixmap().pixel(22, 22).unwrap().demultiply();
        assert_eq!((px.red(), px.green(), px.blue()), (255, 0, 0));
    }

    #[tokio::test]
    async fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FsImageLoader::new(dir.path());
        let err = loader
            .load(Path::new("res/img/white_king.png"))
            .await
            .unwrap_err();
        match &err {
            LoadError::Read { path, .. } => assert!(path.ends_with("res/img/white_king.png")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("white_king.png"));
    }

    #[tokio::test]
    async fn test_garbage_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();

        let loader = FsImageLoader::new(dir.path());
        let err = loader.load(Path::new("broken.png")).await.unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
    }
}
