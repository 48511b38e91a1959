mod board;
mod config;
mod dataset;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use config::{AnnotateArgs, AppConfig, Cli, Command, ConvertArgs, DatasetArgs, RenderArgs};
use dataset::DatasetOptions;
use render::{BoardRenderer, FsImageLoader, PixmapSurface, CHESSBOARD_ID};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let app_config = AppConfig::load(cli.config.as_deref())?;
    tracing::debug!("Using config: {:?}", app_config);

    // Piece images are loaded one after another, so a single thread is enough.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(run(cli.command, app_config))
}

async fn run(command: Command, config: AppConfig) -> Result<()> {
    match command {
        Command::Render(args) => render_board(args, &config).await,
        Command::Dataset(args) => generate_dataset(args, &config).await,
        Command::Annotate(args) => annotate(args, &config),
        Command::Convert(args) => convert(args),
    }
}

async fn render_board(args: RenderArgs, config: &AppConfig) -> Result<()> {
    let layout = board::board_field(&args.fen);
    if args.strict {
        board::validate(layout)?;
    }

    let width = args.width.unwrap_or(config.width);
    let height = args.height.unwrap_or(config.height);
    tracing::info!("Rendering {} at {}x{}", layout, width, height);

    let renderer = BoardRenderer::with_assets(
        FsImageLoader::new(config.asset_root()),
        config.piece_assets()?,
    );
    let mut surface = PixmapSurface::new(CHESSBOARD_ID);
    let report = renderer.render(&mut surface, layout, width, height).await;
    for failure in &report.failures {
        tracing::warn!(
            "Square {}{} ('{}') left blank: {}",
            b'a'.wrapping_add(failure.file as u8) as char,
            8 - failure.rank as i64,
            failure.symbol,
            failure.reason
        );
    }

    surface
        .save_png(&args.out, args.framed || config.framed)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;
    tracing::info!(
        "Wrote {} ({} squares, {} pieces)",
        args.out.display(),
        report.squares_painted,
        report.pieces_drawn
    );

    Ok(())
}

async fn generate_dataset(args: DatasetArgs, config: &AppConfig) -> Result<()> {
    let options = DatasetOptions {
        num_samples: args.num_samples,
        width: args.width.unwrap_or(config.width),
        height: args.height.unwrap_or(config.height),
        dest: args.dest,
        seed: args.seed,
        yolo: args.yolo,
    };

    let renderer = BoardRenderer::with_assets(
        FsImageLoader::new(config.asset_root()),
        config.piece_assets()?,
    );
    let manifest = dataset::generate(&renderer, &options)
        .await
        .with_context(|| format!("Dataset generation into {} failed", options.dest.display()))?;

    tracing::info!(
        "Generated {} samples in {} at {}",
        manifest.samples,
        options.dest.display(),
        manifest.generated_at
    );
    Ok(())
}

fn annotate(args: AnnotateArgs, config: &AppConfig) -> Result<()> {
    let width = args.width.unwrap_or(config.width) as f32;
    let height = args.height.unwrap_or(config.height) as f32;

    let count = dataset::yolo::annotate_dir(&args.src, width, height)
        .with_context(|| format!("Failed to annotate {}", args.src.display()))?;
    tracing::info!("Wrote {} YOLO annotations to {}", count, args.src.display());
    Ok(())
}

fn convert(args: ConvertArgs) -> Result<()> {
    let summary = dataset::convert::convert_dir(&args.src, &args.dest)
        .with_context(|| format!("Failed to convert {}", args.src.display()))?;
    tracing::info!(
        "Converted {} files into {}: {}",
        summary.num_files,
        args.dest.display(),
        serde_json::to_string(&summary.count_camera_position)?
    );
    Ok(())
}
