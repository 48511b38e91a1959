//! Imports the rendered 3D chess dataset (https://osf.io/xf3ka) into the
//! bounding-box metadata format written by [`super::generate`].
//!
//! Every `<name>.json` found under the source tree is rewritten into
//! `dest/<name>.json` and its `<name>.png` is copied next to it. Converted
//! files also carry the camera side and each piece's square, which the YOLO
//! annotator ignores.

use super::{io_err, BoundingBox, DatasetError, CORNER_LABEL};
use serde::{Deserialize, Serialize};
use std::path::Path;
use walkdir::WalkDir;

/// Corner points are widened into square boxes of this size.
const CORNER_BOX: f32 = 20.0;

/// Where the camera sits relative to the board, seen in FEN orientation
/// (rank 8 at the top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraPosition {
    Top,
    Bottom,
    Right,
    Left,
    Unknown,
}

fn in_range(angle: f64, min: f64, max: f64) -> bool {
    angle >= min && angle < max
}

impl CameraPosition {
    /// Classifies the angle, in degrees within `[0, 360)`, between the x
    /// axis and the camera. Top and bottom win on the overlapping edges.
    pub fn from_angle(angle: f64) -> Self {
        if in_range(angle, 46.0, 136.0) {
            Self::Top
        } else if in_range(angle, 226.0, 316.0) {
            Self::Bottom
        } else if in_range(angle, 0.0, 46.0) || in_range(angle, 315.0, 360.0) {
            Self::Right
        } else if in_range(angle, 136.0, 226.0) {
            Self::Left
        } else {
            Self::Unknown
        }
    }

    /// Only x and y matter; the camera is always above the board.
    pub fn from_location(x: f64, y: f64) -> Self {
        let mut angle = y.atan2(x).to_degrees();
        if angle < 0.0 {
            angle += 360.0;
        }
        Self::from_angle(angle)
    }
}

#[derive(Debug, Deserialize)]
struct SourceCamera {
    #[serde(default)]
    location: Option<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct SourcePiece {
    piece: String,
    square: String,
    #[serde(rename = "box")]
    bbox: [f32; 4],
}

/// Metadata as shipped with the source dataset.
#[derive(Debug, Deserialize)]
pub struct SourceMetadata {
    fen: String,
    #[serde(default)]
    camera: Option<SourceCamera>,
    #[serde(default)]
    corners: Vec<[f32; 2]>,
    #[serde(default)]
    pieces: Vec<SourcePiece>,
}

impl SourceMetadata {
    pub fn camera_position(&self) -> CameraPosition {
        match self.camera.as_ref().and_then(|c| c.location.as_deref()) {
            Some([x, y, ..]) => CameraPosition::from_location(*x, *y),
            _ => CameraPosition::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedBox {
    #[serde(flatten)]
    pub bbox: BoundingBox,
    /// Square the piece stands on; absent for corners.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedMetadata {
    pub fen: String,
    pub camera_position: CameraPosition,
    pub bounding_boxes: Vec<ConvertedBox>,
}

pub fn convert_metadata(src: &SourceMetadata) -> ConvertedMetadata {
    let corners = src.corners.iter().map(|[x, y]| ConvertedBox {
        bbox: BoundingBox {
            kind: CORNER_LABEL.to_string(),
            left: (x - CORNER_BOX / 2.0).max(0.0),
            top: (y - CORNER_BOX / 2.0).max(0.0),
            width: CORNER_BOX,
            height: CORNER_BOX,
        },
        position: None,
    });
    let pieces = src.pieces.iter().map(|piece| {
        let [left, top, width, height] = piece.bbox;
        ConvertedBox {
            bbox: BoundingBox {
                kind: piece.piece.clone(),
                left,
                top,
                width,
                height,
            },
            position: Some(piece.square.clone()),
        }
    });

    ConvertedMetadata {
        fen: src.fen.clone(),
        camera_position: src.camera_position(),
        bounding_boxes: corners.chain(pieces).collect(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PositionCounts {
    pub top: usize,
    pub bottom: usize,
    pub right: usize,
    pub left: usize,
    pub unknown: usize,
}

impl PositionCounts {
    fn record(&mut self, position: CameraPosition) {
        let slot = match position {
            CameraPosition::Top => &mut self.top,
            CameraPosition::Bottom => &mut self.bottom,
            CameraPosition::Right => &mut self.right,
            CameraPosition::Left => &mut self.left,
            CameraPosition::Unknown => &mut self.unknown,
        };
        *slot += 1;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConvertSummary {
    pub num_files: usize,
    pub count_camera_position: PositionCounts,
}

/// Converts every metadata file under `src` (recursively) into `dest`.
pub fn convert_dir(src: &Path, dest: &Path) -> Result<ConvertSummary, DatasetError> {
    if !src.is_dir() {
        return Err(DatasetError::MissingDirectory(src.to_path_buf()));
    }
    std::fs::create_dir_all(dest).map_err(io_err(dest))?;

    let mut summary = ConvertSummary::default();
    let walker = WalkDir::new(src)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.path() != dest);

    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(name) = path.file_name() else { continue };

        let image = path.with_extension("png");
        if !image.exists() {
            return Err(DatasetError::MissingImage(image));
        }

        let raw = std::fs::read_to_string(path).map_err(io_err(path))?;
        let source: SourceMetadata = serde_json::from_str(&raw)?;
        let converted = convert_metadata(&source);

        let json_path = dest.join(name);
        std::fs::write(&json_path, serde_json::to_vec(&converted)?).map_err(io_err(&json_path))?;
        let png_path = json_path.with_extension("png");
        std::fs::copy(&image, &png_path).map_err(io_err(&png_path))?;

        tracing::debug!("Converted {} ({:?})", path.display(), converted.camera_position);
        summary.num_files += 1;
        summary.count_camera_position.record(converted.camera_position);
    }

    Ok(summary)
}
