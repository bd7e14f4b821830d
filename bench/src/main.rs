use std::time::{Duration, Instant};

use anyhow::Context as _;
use serde_json::json;
use sha2::Digest as _;

#[derive(Clone, Debug)]
struct BenchArgs {
    width: u32,
    height: u32,
    patch_size: u32,
    subpixels: u32,
    iterations: u32,
    warmup: u32,
    repeats: u32,
    parallel: bool,
    threads: Option<usize>,
    json: bool,
}

#[derive(Clone, Debug, Default)]
struct RunMetrics {
    plan: Duration,
    scene_and_dispatch: Duration,
    assemble: Duration,
    wall_total: Duration,
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    let args = parse_args()?;

    if args.width == 0 || args.height == 0 {
        anyhow::bail!("--width/--height must be > 0");
    }
    if args.patch_size == 0 {
        anyhow::bail!("--patch-size must be > 0");
    }
    if args.subpixels == 0 || args.iterations == 0 {
        anyhow::bail!("--subpixels and --iterations must be > 0");
    }
    if let Some(n) = args.threads
        && n == 0
    {
        anyhow::bail!("--threads must be >= 1 when set");
    }

    let scene = tilecast::SphereSceneDesc::default();

    if args.warmup > 0 {
        eprintln!("warmup: {} run(s)", args.warmup);
        for _ in 0..args.warmup {
            let _ = run_once(&args, &scene)?;
        }
    }

    eprintln!(
        "bench: {repeats} run(s) ({profile} build), {w}x{h}, patch={patch}, subpixels={sp}, iterations={it}, mode={mode}, threads={threads}",
        repeats = args.repeats,
        profile = if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        },
        w = args.width,
        h = args.height,
        patch = args.patch_size,
        sp = args.subpixels,
        it = args.iterations,
        mode = if args.parallel {
            "parallel"
        } else {
            "sequential"
        },
        threads = args
            .threads
            .map(|n| n.to_string())
            .unwrap_or_else(|| "auto".to_string()),
    );

    let mut runs = Vec::<RunMetrics>::with_capacity(args.repeats as usize);
    let mut digests = Vec::<String>::with_capacity(args.repeats as usize);
    for _ in 0..args.repeats {
        let (metrics, digest) = run_once(&args, &scene)?;
        runs.push(metrics);
        digests.push(digest);
    }

    // Every run renders the same frame; differing digests mean scheduling leaked into the output.
    digests.dedup();
    if digests.len() > 1 {
        anyhow::bail!(
            "buffer digest changed between runs ({} distinct values)",
            digests.len()
        );
    }
    let digest = digests.pop().unwrap_or_default();
    eprintln!("buffer sha256: {digest}");

    report_percentiles(&runs);

    if args.json {
        let wall: Vec<f64> = runs
            .iter()
            .map(|m| m.wall_total.as_secs_f64() * 1000.0)
            .collect();
        let summary = json!({
            "width": args.width,
            "height": args.height,
            "patch_size": args.patch_size,
            "subpixels": args.subpixels,
            "iterations": args.iterations,
            "parallel": args.parallel,
            "threads": args.threads,
            "repeats": args.repeats,
            "buffer_sha256": digest,
            "wall_ms": wall,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

fn run_once(
    args: &BenchArgs,
    scene: &tilecast::SphereSceneDesc,
) -> anyhow::Result<(RunMetrics, String)> {
    let mut m = RunMetrics::default();
    let t_wall = Instant::now();

    let geometry = tilecast::ScreenGeometry::new(args.width, args.height)?;
    let sampling = tilecast::SamplingParams::new(args.subpixels, args.iterations)?;

    let opts = tilecast::DispatchOpts {
        parallel: args.parallel,
        threads: args.threads,
        ..tilecast::DispatchOpts::default()
    };
    let t0 = Instant::now();
    let job = tilecast::RenderJob::new(geometry, args.patch_size, sampling)?.with_dispatch(opts);
    m.plan = t0.elapsed();

    let t0 = Instant::now();
    let out = job
        .render(&tilecast::SphereEngine, scene)
        .context("render bench frame")?;
    m.scene_and_dispatch = t0.elapsed();

    let t0 = Instant::now();
    let image = tilecast::assemble_image(&out.buffer)?;
    m.assemble = t0.elapsed();

    m.wall_total = t_wall.elapsed();
    Ok((m, sha256_hex(image.as_raw())))
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}

fn parse_args() -> anyhow::Result<BenchArgs> {
    let mut args = std::env::args().skip(1);

    let mut out = BenchArgs {
        width: 640,
        height: 360,
        patch_size: 8,
        subpixels: 2,
        iterations: 1,
        warmup: 1,
        repeats: 20,
        parallel: false,
        threads: None,
        json: false,
    };

    while let Some(a) = args.next() {
        match a.as_str() {
            "--width" => out.width = parse_u32(args.next(), "--width")?,
            "--height" => out.height = parse_u32(args.next(), "--height")?,
            "--patch-size" => out.patch_size = parse_u32(args.next(), "--patch-size")?,
            "--subpixels" => out.subpixels = parse_u32(args.next(), "--subpixels")?,
            "--iterations" => out.iterations = parse_u32(args.next(), "--iterations")?,
            "--warmup" => out.warmup = parse_u32(args.next(), "--warmup")?,
            "--repeats" => out.repeats = parse_u32(args.next(), "--repeats")?,
            "--parallel" => out.parallel = true,
            "--threads" => out.threads = Some(parse_usize(args.next(), "--threads")?),
            "--json" => out.json = true,
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => anyhow::bail!("unknown arg '{a}' (try --help)"),
        }
    }

    Ok(out)
}

fn print_help() {
    eprintln!(
        r#"tilecast-bench

Renders the default sphere scene repeatedly and reports p50/p90/p99 for each stage.
Fails if the assembled image differs between runs.

Usage:
  cargo run -q --release
  cargo run -q --release -- --parallel --threads 4
  cargo run -q --release -- --width 1920 --height 1080 --subpixels 4 --json

Args:
  --width N        (default 640)
  --height N       (default 360)
  --patch-size N   (default 8)
  --subpixels N    (default 2)
  --iterations N   (default 1)
  --warmup N       (default 1)
  --repeats N      (default 20)
  --parallel       dispatch on a rayon pool
  --threads N      rayon worker threads (parallel only)
  --json           print a JSON summary on stdout
"#
    );
}

fn parse_u32(v: Option<String>, flag: &str) -> anyhow::Result<u32> {
    let v = v.ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))?;
    v.parse::<u32>()
        .with_context(|| format!("parse {flag} value '{v}'"))
}

fn parse_usize(v: Option<String>, flag: &str) -> anyhow::Result<usize> {
    let v = v.ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))?;
    v.parse::<usize>()
        .with_context(|| format!("parse {flag} value '{v}'"))
}

fn report_percentiles(runs: &[RunMetrics]) {
    type Getter = fn(&RunMetrics) -> Duration;
    type Field = (&'static str, Getter);

    fn collect(runs: &[RunMetrics], f: Getter) -> Vec<Duration> {
        let mut v = runs.iter().map(f).collect::<Vec<_>>();
        v.sort_by_key(|d| d.as_nanos());
        v
    }

    fn p(v: &[Duration], p: f64) -> Duration {
        if v.is_empty() {
            return Duration::ZERO;
        }
        let n = v.len();
        let rank = (p * (n as f64)).ceil().clamp(1.0, n as f64) as usize;
        v[rank - 1]
    }

    fn fmt_ms(d: Duration) -> String {
        format!("{:.3}ms", d.as_secs_f64() * 1000.0)
    }

    let fields: &[Field] = &[
        ("plan", |m| m.plan),
        ("scene_and_dispatch", |m| m.scene_and_dispatch),
        ("assemble", |m| m.assemble),
        ("wall_total", |m| m.wall_total),
    ];

    eprintln!("\npercentiles across runs (p50/p90/p99):");
    for (name, getter) in fields {
        let v = collect(runs, *getter);
        eprintln!(
            "  {name:18} p50={p50:>10}  p90={p90:>10}  p99={p99:>10}",
            name = *name,
            p50 = fmt_ms(p(&v, 0.50)),
            p90 = fmt_ms(p(&v, 0.90)),
            p99 = fmt_ms(p(&v, 0.99)),
        );
    }
}
