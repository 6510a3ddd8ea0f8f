use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "garment-studio", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a design document to a PNG.
    Render(RenderArgs),
    /// Print the base image a garment selection resolves to.
    Resolve(ResolveArgs),
    /// Render a design and store it as `<uuid>.png` in a directory.
    Save(SaveArgs),
}

#[derive(Parser, Debug)]
struct CommonArgs {
    /// Studio config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input design document JSON.
    #[arg(long)]
    design: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Override the configured canvas width.
    #[arg(long)]
    width: Option<u32>,

    /// Override the configured canvas height.
    #[arg(long)]
    height: Option<u32>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Parser, Debug)]
struct ResolveArgs {
    #[arg(long, default_value = "t-shirt")]
    product: String,

    #[arg(long, default_value = "black")]
    color: String,

    #[arg(long, default_value = "front")]
    view: String,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Parser, Debug)]
struct SaveArgs {
    /// Input design document JSON.
    #[arg(long)]
    design: PathBuf,

    /// Directory designs are written to.
    #[arg(long)]
    store_dir: PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("GARMENT_STUDIO_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Resolve(args) => cmd_resolve(args),
        Command::Save(args) => cmd_save(args),
    }
}

fn load_config(common: &CommonArgs) -> anyhow::Result<garment_studio::StudioConfig> {
    let cfg = match &common.config {
        Some(path) => garment_studio::StudioConfig::from_json_file(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => garment_studio::StudioConfig::default(),
    };
    Ok(cfg.with_env_overrides())
}

fn read_design_json(path: &Path) -> anyhow::Result<garment_studio::DesignState> {
    let f = File::open(path).with_context(|| format!("open design '{}'", path.display()))?;
    let r = BufReader::new(f);
    let design: garment_studio::DesignState =
        serde_json::from_reader(r).with_context(|| "parse design JSON")?;
    Ok(design)
}

/// Render `design_path` and return the flattened PNG plus the garment it was drawn on.
fn render_design(
    cfg: &garment_studio::StudioConfig,
    design_path: &Path,
    canvas: garment_studio::Canvas,
) -> anyhow::Result<(Vec<u8>, garment_studio::GarmentSelection)> {
    let raw = read_design_json(design_path)?;
    let mut compositor = cfg.compositor();
    let limits = garment_studio::LayerLimits::for_canvas(
        canvas,
        cfg.min_layer_size_px,
        cfg.max_layer_size_factor,
    );
    let design = raw.sanitized(&garment_studio::EditContext::new(limits, compositor.fonts()));

    let (raster, report) = compositor.render_with_report(&design, canvas)?;
    for w in &report.warnings {
        eprintln!("warning: {w}");
    }
    let png = garment_studio::flatten(&raster)?;
    Ok((png, design.garment))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.common)?;
    let canvas = garment_studio::Canvas::new(
        args.width.unwrap_or(cfg.canvas.width),
        args.height.unwrap_or(cfg.canvas.height),
    )?;
    let (png, _) = render_design(&cfg, &args.design, canvas)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_resolve(args: ResolveArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.common)?;
    let selection = garment_studio::GarmentSelection::new(
        args.product.parse()?,
        args.color.parse()?,
        args.view.parse()?,
    );
    let catalog = cfg.catalog();
    if let Err(e) = catalog.try_resolve(&selection) {
        eprintln!("note: {e}; using default");
    }
    println!("{}", catalog.resolve(&selection));
    Ok(())
}

fn cmd_save(args: SaveArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.common)?;
    let (png, garment) = render_design(&cfg, &args.design, cfg.canvas)?;
    let mut store = garment_studio::FsDesignStore::new(&args.store_dir);
    let id = garment_studio::submit(&mut store, png, garment)?;

    eprintln!("wrote {}", store.path_for(&id).display());
    println!("{id}");
    Ok(())
}
