use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tilecast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a frame with the built-in sphere engine and write it as an image.
    Render(RenderArgs),
    /// Print the patch plan for a frame.
    Plan(PlanArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Render config JSON; unset fields use defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output image path (format from extension, PNG otherwise).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Frame width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Frame height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Square patch edge in pixels.
    #[arg(long)]
    patch_size: Option<u32>,

    /// Subpixels per axis.
    #[arg(long)]
    subpixels: Option<u32>,

    /// Accumulation passes.
    #[arg(long)]
    iterations: Option<u32>,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Render patches one after another on the main thread.
    #[arg(long, default_value_t = false)]
    sequential: bool,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Frame width in pixels.
    #[arg(long)]
    width: u32,

    /// Frame height in pixels.
    #[arg(long)]
    height: u32,

    /// Square patch edge in pixels.
    #[arg(long, default_value_t = 8)]
    patch_size: u32,

    /// Emit the plan as JSON instead of one patch per line.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut cfg = match &args.config {
        Some(path) => tilecast::RenderConfig::from_path(path)?,
        None => tilecast::RenderConfig::default(),
    };
    if let Some(v) = args.out {
        cfg.output = v;
    }
    if let Some(v) = args.width {
        cfg.width = v;
    }
    if let Some(v) = args.height {
        cfg.height = v;
    }
    if let Some(v) = args.patch_size {
        cfg.patch_size = v;
    }
    if let Some(v) = args.subpixels {
        cfg.subpixel_count = v;
    }
    if let Some(v) = args.iterations {
        cfg.iteration_count = v;
    }
    if args.threads.is_some() {
        cfg.threads = args.threads;
    }
    if args.sequential {
        cfg.parallel = false;
    }

    let mut opts = cfg.dispatch_opts();
    opts.progress = Some(Arc::new(tilecast::LogProgress));
    let job = tilecast::RenderJob::from_config(&cfg)?.with_dispatch(opts);

    let out = job
        .render(&tilecast::SphereEngine, &cfg.scene)
        .with_context(|| format!("render '{}'", cfg.output.display()))?;

    eprintln!(
        "wrote {} ({} patches in {:.3}s)",
        cfg.output.display(),
        out.report.total,
        out.elapsed.as_secs_f64()
    );
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let geometry = tilecast::ScreenGeometry::new(args.width, args.height)?;
    let patches = tilecast::plan_patches(&geometry, args.patch_size)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&patches)?);
    } else {
        for p in &patches {
            println!("{p}");
        }
    }
    eprintln!("{} patches", patches.len());
    Ok(())
}
