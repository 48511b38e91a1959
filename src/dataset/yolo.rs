//! YOLOv5 text annotations: one `class center_x center_y width height` row
//! per bounding box, all normalised to the image size.

use super::{io_err, DatasetError, Metadata};
use std::path::Path;
use walkdir::WalkDir;

pub const LABELS: [&str; 13] = [
    "corner", "p", "r", "n", "b", "q", "k", "P", "R", "N", "B", "Q", "K",
];

pub const DATA_YAML: &str = "data.yaml";

pub fn class_id(label: &str) -> Option<usize> {
    LABELS.iter().position(|l| *l == label)
}

pub fn annotation(metadata: &Metadata, img_width: f32, img_height: f32) -> Result<String, DatasetError> {
    let mut rows = Vec::with_capacity(metadata.bounding_boxes.len());

    for bbox in &metadata.bounding_boxes {
        let class = class_id(&bbox.kind).ok_or_else(|| DatasetError::UnknownLabel(bbox.kind.clone()))?;
        let center_x = (bbox.left + bbox.width / 2.0) / img_width;
        let center_y = (bbox.top + bbox.height / 2.0) / img_height;
        rows.push(format!(
            "{} {} {} {} {}",
            class,
            center_x,
            center_y,
            bbox.width / img_width,
            bbox.height / img_height
        ));
    }

    Ok(rows.join("\n"))
}

pub fn data_yaml() -> String {
    let names = LABELS
        .iter()
        .map(|l| format!("'{}'", l))
        .collect::<Vec<_>>()
        .join(", ");
    format!("nc: {}\nnames: [{}]", LABELS.len(), names)
}

/// Writes a `.txt` annotation next to every `.json` metadata file under
/// `src`, subdirectories included, plus the `data.yaml` class list at the
/// top. Returns the number of annotated samples.
pub fn annotate_dir(src: &Path, img_width: f32, img_height: f32) -> Result<usize, DatasetError> {
    if !src.is_dir() {
        return Err(DatasetError::MissingDirectory(src.to_path_buf()));
    }
    let mut count = 0;

    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if path.file_name().and_then(|n| n.to_str()) == Some("manifest.json") {
            continue;
        }

        let image = path.with_extension("png");
        if !image.exists() {
            return Err(DatasetError::MissingImage(image));
        }

        let raw = std::fs::read_to_string(path).map_err(io_err(path))?;
        let metadata: Metadata = serde_json::from_str(&raw)?;
        let txt_path = path.with_extension("txt");
        std::fs::write(&txt_path, annotation(&metadata, img_width, img_height)?)
            .map_err(io_err(&txt_path))?;

        tracing::debug!("Annotated {}", path.display());
        count += 1;
    }

    let yaml_path = src.join(DATA_YAML);
    std::fs::write(&yaml_path, data_yaml()).map_err(io_err(&yaml_path))?;

    Ok(count)
}
