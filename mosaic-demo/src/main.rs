use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result, bail};
use clap::Parser;
use mosaic_canvas::{DimensionCache, DimensionLoader, FsDimensionLoader, MasonryCanvas};
use mosaic_ui::{ManualFrameClock, Px, PxSize, init_tracing};
use tracing::{debug, info};

mod script;
mod session;

use script::DemoFile;
use session::{Session, StepReport};

#[derive(Parser)]
#[command(name = "mosaic-demo")]
#[command(version, about = "Replay a pan session over an infinite masonry canvas", long_about = None)]
struct Cli {
    /// Portfolio JSON file, an array of items
    #[arg(short, long)]
    portfolio: PathBuf,
    /// Canvas settings, known image sizes and the session script (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory that `/uploads/...` image URLs resolve against
    #[arg(short, long)]
    uploads: Option<PathBuf>,
    /// Viewport width in pixels
    #[arg(long, default_value_t = 1000)]
    width: i32,
    /// Viewport height in pixels
    #[arg(long, default_value_t = 800)]
    height: i32,
    /// How long to wait for image sizes after each step, in milliseconds
    #[arg(long, default_value_t = 2000)]
    preload_timeout_ms: u64,
    /// Print one JSON object per step instead of a summary line
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    init_tracing("error,mosaic_canvas=info,mosaic_demo=info");
    let cli = Cli::parse();
    if cli.width <= 0 || cli.height <= 0 {
        bail!("Viewport must be positive, got {}x{}", cli.width, cli.height);
    }

    let demo = match &cli.config {
        Some(path) => DemoFile::load(path)?,
        None => DemoFile::default(),
    };
    let portfolio = script::load_portfolio(&cli.portfolio)?;
    info!(items = portfolio.len(), "loaded portfolio");

    let loader: Arc<dyn DimensionLoader> = match &cli.uploads {
        Some(root) => {
            let root = root
                .canonicalize()
                .with_context(|| format!("Uploads directory {} not found", root.display()))?;
            Arc::new(FsDimensionLoader::new(root))
        }
        None => Arc::new(demo.size_loader()),
    };

    let clock = Arc::new(ManualFrameClock::new());
    let mut canvas = MasonryCanvas::new(
        demo.canvas.clone(),
        clock.clone(),
        Arc::new(DimensionCache::new()),
    )
    .with_loader(loader);
    canvas.set_items(portfolio);
    canvas.resize(PxSize::new(Px(cli.width), Px(cli.height)));

    let mut session = Session::new(
        canvas,
        clock,
        Duration::from_millis(cli.preload_timeout_ms),
    );
    let visible = session.settle();
    debug!(cells = visible.len(), "initial layout");
    print_report(&session.report(0), cli.json)?;

    for (index, step) in demo.steps().iter().enumerate() {
        info!(?step, "replaying");
        session.apply(step);
        session.settle();
        print_report(&session.report(index + 1), cli.json)?;
    }
    Ok(())
}

fn print_report(report: &StepReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }
    let columns = match report.columns {
        Some([first, last]) => format!("{first}..={last}"),
        None => "-".to_owned(),
    };
    println!(
        "step {:>2}  offset ({:>6}, {:>6})  columns {:<10} cells {:>3}  measured {:>3}  sized {:>3}  estimated {:>3}{}",
        report.step,
        report.offset.x.raw(),
        report.offset.y.raw(),
        columns,
        report.cells,
        report.measured,
        report.aspect_ratio,
        report.estimated,
        if report.truncated { "  TRUNCATED" } else { "" },
    );
    Ok(())
}
