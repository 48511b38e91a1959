//! Synthetic training data for chess piece and board-corner detection.
//!
//! Each sample is a random arrangement of the full set of 32 pieces rendered
//! to PNG, paired with a JSON file listing a bounding box per piece and per
//! corner marker.

pub mod convert;
pub mod yolo;

use crate::board::{self, BoardGeometry, Grid};
use crate::render::{BoardRenderer, ImageLoader, PixmapSurface, SurfaceError, CHESSBOARD_ID};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use shakmaty::{Color, Piece, Role};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CORNER_LABEL: &str = "corner";

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid metadata: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("Unknown bounding box label: {0}")]
    UnknownLabel(String),
    #[error("Image file doesn't exist: {}", .0.display())]
    MissingImage(PathBuf),
    #[error("Source directory doesn't exist: {}", .0.display())]
    MissingDirectory(PathBuf),
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
    #[error("Sample {sample} left {failures} pieces unpainted")]
    IncompleteSample { sample: String, failures: usize },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> DatasetError + '_ {
    move |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(rename = "type")]
    pub kind: String,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Board layout field of the rendered position.
    pub fen: String,
    pub bounding_boxes: Vec<BoundingBox>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub samples: usize,
    pub width: u32,
    pub height: u32,
    pub seed: Option<u64>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DatasetOptions {
    pub num_samples: usize,
    pub width: u32,
    pub height: u32,
    pub dest: PathBuf,
    pub seed: Option<u64>,
    pub yolo: bool,
}

const BACK_RANK: [Role; 8] = [
    Role::Rook,
    Role::Knight,
    Role::Bishop,
    Role::Queen,
    Role::King,
    Role::Bishop,
    Role::Knight,
    Role::Rook,
];

/// One side's sixteen pieces, back rank first.
fn side(color: Color) -> impl Iterator<Item = Option<Piece>> {
    BACK_RANK
        .into_iter()
        .chain(std::iter::repeat(Role::Pawn).take(8))
        .map(move |role| Some(Piece { color, role }))
}

/// The 32 pieces of a new game plus 32 blanks, shuffled over the board.
pub fn random_grid<R: Rng + ?Sized>(rng: &mut R) -> Grid {
    let mut squares: Vec<Option<Piece>> = side(Color::Black)
        .chain(std::iter::repeat(None).take(32))
        .chain(side(Color::White))
        .collect();
    squares.shuffle(rng);

    let mut grid: Grid = [[None; 8]; 8];
    for (idx, square) in squares.into_iter().enumerate() {
        grid[idx / 8][idx % 8] = square;
    }
    grid
}

pub fn piece_boxes(grid: &Grid, geometry: &BoardGeometry) -> Vec<BoundingBox> {
    let mut boxes = Vec::new();
    for (rank, row) in grid.iter().enumerate() {
        for (file, square) in row.iter().enumerate() {
            let Some(piece) = square else { continue };
            let rect = geometry.square(file, rank);
            boxes.push(BoundingBox {
                kind: piece.char().to_string(),
                left: rect.x,
                top: rect.y,
                width: rect.width,
                height: rect.height,
            });
        }
    }
    boxes
}

pub fn corner_boxes(geometry: &BoardGeometry) -> Vec<BoundingBox> {
    geometry
        .corner_markers()
        .into_iter()
        .map(|rect| BoundingBox {
            kind: CORNER_LABEL.to_string(),
            left: rect.x,
            top: rect.y,
            width: rect.width,
            height: rect.height,
        })
        .collect()
}

pub fn metadata(grid: &Grid, geometry: &BoardGeometry) -> Metadata {
    let mut bounding_boxes = piece_boxes(grid, geometry);
    bounding_boxes.extend(corner_boxes(geometry));
    Metadata {
        fen: board::encode_layout(grid),
        bounding_boxes,
    }
}

/// Sample file stem, zero padded to the width of the last index.
fn sample_name(idx: usize, num_samples: usize) -> String {
    let width = num_samples.saturating_sub(1).to_string().len();
    format!("{:0width$}", idx, width = width)
}

/// Renders `options.num_samples` random boards into `options.dest`.
pub async fn generate<L: ImageLoader>(
    renderer: &BoardRenderer<L>,
    options: &DatasetOptions,
) -> Result<Manifest, DatasetError> {
    tokio::fs::create_dir_all(&options.dest)
        .await
        .map_err(io_err(&options.dest))?;

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let geometry = BoardGeometry::new(options.width, options.height);

    for idx in 0..options.num_samples {
        let name = sample_name(idx, options.num_samples);
        tracing::info!("Processing sample {}", name);

        let grid = random_grid(&mut rng);
        let mdata = metadata(&grid, &geometry);

        let mut surface = PixmapSurface::new(CHESSBOARD_ID);
        let report = renderer
            .render(&mut surface, &mdata.fen, options.width, options.height)
            .await;
        // A missing piece shifts the rest of its rank, so the boxes no longer match.
        if !report.is_complete() {
            tracing::error!(
                "Sample {} has {} unpainted pieces, stopping",
                name,
                report.failures.len()
            );
            return Err(DatasetError::IncompleteSample {
                sample: name,
                failures: report.failures.len(),
            });
        }

        let png_path = options.dest.join(format!("{}.png", name));
        let png = surface.encode_png(false)?;
        tokio::fs::write(&png_path, png)
            .await
            .map_err(io_err(&png_path))?;

        let json_path = options.dest.join(format!("{}.json", name));
        tokio::fs::write(&json_path, serde_json::to_vec(&mdata)?)
            .await
            .map_err(io_err(&json_path))?;

        if options.yolo {
            let txt_path = options.dest.join(format!("{}.txt", name));
            let annotation = yolo::annotation(&mdata, options.width as f32, options.height as f32)?;
            tokio::fs::write(&txt_path, annotation)
                .await
                .map_err(io_err(&txt_path))?;
        }
    }

    if options.yolo {
        let yaml_path = options.dest.join(yolo::DATA_YAML);
        tokio::fs::write(&yaml_path, yolo::data_yaml())
            .await
            .map_err(io_err(&yaml_path))?;
    }

    let manifest = Manifest {
        samples: options.num_samples,
        width: options.width,
        height: options.height,
        seed: options.seed,
        generated_at: Utc::now(),
    };
    let manifest_path = options.dest.join("manifest.json");
    tokio::fs::write(&manifest_path, serde_json::to_vec_pretty(&manifest)?)
        .await
        .map_err(io_err(&manifest_path))?;

    Ok(manifest)
}
