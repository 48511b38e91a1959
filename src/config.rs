use crate::render::{PieceAssets, CHESSBOARD_ID};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Piece override key must be a single character, got '{0}'")]
    InvalidPieceSymbol(String),
}

/// Settings shared by every command. Missing fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory the `res/img/...` piece paths are resolved against.
    pub asset_root: String,
    pub width: u32,
    pub height: u32,
    pub framed: bool,
    /// Per-symbol image replacements, e.g. `{ "K": "svg/wk.svg" }`.
    pub pieces: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            asset_root: ".".to_string(),
            width: 480,
            height: 480,
            framed: false,
            pieces: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("fen-board").join("config.json"))
    }

    /// Loads `path` if given, otherwise the per-user config file when it
    /// exists, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path),
                None => Ok(Self::default()),
            },
        }
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn asset_root(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.asset_root).as_ref())
    }

    pub fn piece_assets(&self) -> Result<PieceAssets, ConfigError> {
        let mut overrides = HashMap::new();
        for (key, path) in &self.pieces {
            let mut chars = key.chars();
            let (Some(symbol), None) = (chars.next(), chars.next()) else {
                return Err(ConfigError::InvalidPieceSymbol(key.clone()));
            };
            overrides.insert(symbol, PathBuf::from(shellexpand::tilde(path).as_ref()));
        }
        Ok(PieceAssets::with_overrides(overrides))
    }
}

#[derive(Parser, Debug)]
#[command(name = "fen-board", about = "Render FEN board layouts and build detection datasets")]
pub struct Cli {
    /// JSON config file (defaults to the per-user config when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Render one board layout to PNG
    Render(RenderArgs),
    /// Render random boards with bounding-box metadata
    Dataset(DatasetArgs),
    /// Write YOLOv5 annotations for every metadata file in a directory
    Annotate(AnnotateArgs),
    /// Convert an external photo dataset's metadata into this crate's format
    Convert(ConvertArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RenderArgs {
    /// Full FEN or just its board layout field
    pub fen: String,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
    #[arg(long, default_value_os_t = default_out())]
    pub out: PathBuf,
    /// Include the outer border as a frame around the image
    #[arg(long)]
    pub framed: bool,
    /// Reject malformed layouts instead of rendering them best effort
    #[arg(long)]
    pub strict: bool,
}

fn default_out() -> PathBuf {
    PathBuf::from(format!("{}.png", CHESSBOARD_ID))
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct DatasetArgs {
    #[arg(short = 'n', long)]
    pub num_samples: usize,
    #[arg(short, long)]
    pub dest: PathBuf,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
    #[arg(long)]
    pub seed: Option<u64>,
    /// Also write YOLOv5 annotations and data.yaml
    #[arg(long)]
    pub yolo: bool,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AnnotateArgs {
    #[arg(short, long)]
    pub src: PathBuf,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ConvertArgs {
    #[arg(short, long)]
    pub src: PathBuf,
    #[arg(short, long)]
    pub dest: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    fn parse(line: &str) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("fen-board").chain(line.split_whitespace()))
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_defaults() {
        let cli = parse("render 8/8/8/8/8/8/8/8").unwrap();
        assert_eq!(cli.config, None);
        assert_eq!(
            cli.command,
            Command::Render(RenderArgs {
                fen: "8/8/8/8/8/8/8/8".to_string(),
                width: None,
                height: None,
                out: PathBuf::from("chessboard.png"),
                framed: false,
                strict: false,
            })
        );
    }

    #[test]
    fn test_render_flags_and_config() {
        let cli = parse(
            "render 8/8/8/8/8/8/8/8 --width 640 --height 320 --out b.png --framed --strict --config cfg.json",
        )
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("cfg.json")));
        let Command::Render(render) = cli.command else {
            panic!("expected render");
        };
        assert_eq!((render.width, render.height), (Some(640), Some(320)));
        assert_eq!(render.out, PathBuf::from("b.png"));
        assert!(render.framed && render.strict);
    }

    #[test]
    fn test_dataset() {
        let cli = parse("dataset -n 10 --dest out --seed 3 --yolo").unwrap();
        assert_eq!(
            cli.command,
            Command::Dataset(DatasetArgs {
                num_samples: 10,
                dest: PathBuf::from("out"),
                width: None,
                height: None,
                seed: Some(3),
                yolo: true,
            })
        );
    }

    #[test]
    fn test_annotate_and_convert() {
        let cli = parse("annotate --src data --width 640").unwrap();
        assert_eq!(
            cli.command,
            Command::Annotate(AnnotateArgs {
                src: PathBuf::from("data"),
                width: Some(640),
                height: None,
            })
        );

        let cli = parse("convert -s raw -d out").unwrap();
        assert_eq!(
            cli.command,
            Command::Convert(ConvertArgs {
                src: PathBuf::from("raw"),
                dest: PathBuf::from("out"),
            })
        );
    }

    #[test]
    fn test_errors() {
        assert!(parse("").is_err());
        assert_eq!(parse("paint").unwrap_err().kind(), ErrorKind::InvalidSubcommand);
        assert_eq!(
            parse("render").unwrap_err().kind(),
            ErrorKind::MissingRequiredArgument
        );
        assert_eq!(
            parse("render 8/8 --width wide").unwrap_err().kind(),
            ErrorKind::ValueValidation
        );
        assert_eq!(
            parse("dataset --dest out").unwrap_err().kind(),
            ErrorKind::MissingRequiredArgument
        );
        assert_eq!(
            parse("annotate --src d --bogus").unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
    }

    #[test]
    fn test_config_file_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "width": 640, "asset_root": "~/chess" }"#).unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 480);
        assert!(!config.framed);
        assert!(config.pieces.is_empty());
        if dirs::home_dir().is_some() {
            assert!(!config.asset_root().starts_with("~"));
        }
    }

    #[test]
    fn test_piece_overrides() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "pieces": { "K": "svg/wk.svg", "k": "svg/bk.svg" } }"#).unwrap();
        let assets = config.piece_assets().unwrap();
        assert_eq!(assets.path('K'), Some(Path::new("svg/wk.svg")));
        assert_eq!(assets.path('k'), Some(Path::new("svg/bk.svg")));
        assert_eq!(assets.path('Q'), Some(Path::new("res/img/white_queen.png")));

        let bad: AppConfig = serde_json::from_str(r#"{ "pieces": { "KK": "x.svg" } }"#).unwrap();
        assert!(matches!(
            bad.piece_assets(),
            Err(ConfigError::InvalidPieceSymbol(key)) if key == "KK"
        ));
    }

    #[test]
    fn test_config_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(AppConfig::load(Some(&missing)), Err(ConfigError::Read { .. })));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ width: ").unwrap();
        assert!(matches!(AppConfig::load(Some(&bad)), Err(ConfigError::Parse { .. })));
    }
}
