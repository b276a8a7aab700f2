//! Suitability map service.
//!
//! `serve` runs the HTTP server with the browser map; `render` performs one
//! render pass and writes the overlays to disk.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ingestion::SampleProgress;
use map_api::handlers::common::MapQuery;
use map_api::session::ProgressFn;
use map_api::{build_router, AppState, MapConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "map-api")]
#[command(about = "Solar, CO₂ and pipeline suitability map")]
struct Args {
    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Delete the point and centroid caches before running
    #[arg(long)]
    clear_caches: bool,

    /// Cache directory (overrides TERRA_CACHE_DIR)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Grid latitude step in degrees
    #[arg(long)]
    lat_step: Option<f64>,

    /// Grid longitude step in degrees
    #[arg(long)]
    lon_step: Option<f64>,

    /// Sample every N-th grid point
    #[arg(long)]
    skip_factor: Option<usize>,

    /// Local GeoJSON file of country polygons
    #[arg(long)]
    geometry_path: Option<PathBuf>,

    /// Local JSON file of `{country, co2_total_mt}` rows
    #[arg(long)]
    emissions_path: Option<PathBuf>,

    /// Overlay style file
    #[arg(long)]
    style_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Listen address (overrides LISTEN_ADDR)
        #[arg(short, long)]
        listen: Option<String>,
    },
    /// Render once and write PNG + JSON
    Render {
        /// Comma-separated layers
        #[arg(long, default_value = "solar,co2,pipelines")]
        layers: String,

        #[arg(long)]
        solar_weight: Option<f64>,

        #[arg(long)]
        co2_weight: Option<f64>,

        #[arg(long)]
        pipelines_weight: Option<f64>,

        /// Keep only solar samples on land
        #[arg(long)]
        land_only: bool,

        /// Overlay to rasterize: `composite` or a layer id
        #[arg(long, default_value = "composite")]
        overlay: String,

        #[arg(long, default_value_t = 1440)]
        width: u32,

        #[arg(long, default_value_t = 720)]
        height: u32,

        /// Output directory
        #[arg(short, long, default_value = "out")]
        out_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args)?;

    let mut config = MapConfig::from_env()?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    let state = Arc::new(AppState::new(config).context("Failed to initialise render engine")?);

    if args.clear_caches {
        state.engine.clear_caches()?;
        if args.command.is_none() {
            return Ok(());
        }
    }

    match args.command {
        None => serve(state, None).await,
        Some(Command::Serve { listen }) => serve(state, listen).await,
        Some(Command::Render {
            layers,
            solar_weight,
            co2_weight,
            pipelines_weight,
            land_only,
            overlay,
            width,
            height,
            out_dir,
        }) => {
            let query = MapQuery {
                layers: Some(layers),
                solar_weight,
                co2_weight,
                pipelines_weight,
                land_only: Some(land_only),
                composite: Some(true),
                overlay: Some(overlay),
                width: Some(width),
                height: Some(height),
            };
            render_once(&state, &query, &out_dir).await
        }
    }
}

fn init_tracing(args: &Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder().with_max_level(level);
    if args.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn apply_overrides(config: &mut MapConfig, args: &Args) {
    if let Some(dir) = &args.cache_dir {
        config.cache_dir = dir.clone();
    }
    if let Some(step) = args.lat_step {
        config.sampling.lat_step = step;
    }
    if let Some(step) = args.lon_step {
        config.sampling.lon_step = step;
    }
    if let Some(skip) = args.skip_factor {
        config.sampling.skip_factor = skip;
    }
    if let Some(path) = &args.geometry_path {
        config.geometry.local_path = Some(path.clone());
    }
    if let Some(path) = &args.emissions_path {
        config.emissions.local_path = Some(path.clone());
    }
    if let Some(path) = &args.style_file {
        config.style_path = Some(path.clone());
    }
}

async fn serve(state: Arc<AppState>, listen: Option<String>) -> Result<()> {
    // Initialize Prometheus metrics exporter
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!("Prometheus metrics exporter initialized");
    info!("Starting map server");

    let listen = listen.unwrap_or_else(|| state.config.listen.clone());
    let app = build_router(state, prometheus_handle);
    map_api::server::serve(app, &listen).await
}

async fn render_once(state: &AppState, query: &MapQuery, out_dir: &Path) -> Result<()> {
    let request = query.to_request()?;
    let overlay_id = query.overlay_id()?;
    let (width, height) = query.dimensions()?;

    let report = |p: SampleProgress| {
        if p.position == p.total || p.position % 50 == 0 {
            info!(
                percent = (p.fraction() * 100.0).round() as u32,
                sampled = p.sampled,
                failed = p.failed,
                "Sampling progress"
            );
        }
    };
    let progress: ProgressFn<'_> = &report;
    let output = state
        .engine
        .render_with_progress(&request, Some(progress))
        .await?;

    for message in &output.status {
        info!(%message, "Status");
    }

    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let json_path = out_dir.join("layers.json");
    tokio::fs::write(&json_path, serde_json::to_vec_pretty(&output)?)
        .await
        .with_context(|| format!("Failed to write {}", json_path.display()))?;

    match state.engine.render_png(&output, &overlay_id, width, height) {
        Ok(png) => {
            let png_path = out_dir.join(format!("{}.png", overlay_id));
            tokio::fs::write(&png_path, png)
                .await
                .with_context(|| format!("Failed to write {}", png_path.display()))?;
            info!(path = %png_path.display(), "Wrote overlay PNG");
        }
        // A layer that produced no data is already reported in the status list
        Err(e) => tracing::warn!(error = %e, "No PNG written"),
    }

    info!(path = %json_path.display(), pass_id = %output.pass_id, "Render complete");
    Ok(())
}
