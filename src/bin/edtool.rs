use clap::{Parser, Subcommand, ValueEnum};
use edge_drawing::models::Ellipse;
use edge_drawing::tools::overlay::render_overlay;
use edge_drawing::tools::synthetic::{render_bar, render_disk, render_ellipse, render_step_edge};
use edge_drawing::tools::{
    DetectionTotals, bench_limit_from_env, dataset_iter, dataset_root_from_env, grayscale_stats, load_gray,
    save_gray,
};
use edge_drawing::{Detection, Detector, EdParams, Point};
use log::{LevelFilter, error, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "edtool", version, about = "Edge Drawing CLI tools")]
struct Cli {
    /// Log stage summaries at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum SceneKind {
    Disk,
    Ellipse,
    Step,
    Bar,
}

#[derive(Subcommand)]
enum Command {
    /// Run detection on a single image
    Detect {
        #[arg(long)]
        image: PathBuf,
        /// Stop after line fitting
        #[arg(long)]
        lines_only: bool,
        /// Write detections drawn over the input
        #[arg(long)]
        overlay: Option<PathBuf>,
    },
    /// Write a synthetic test scene
    Synth {
        #[arg(value_enum)]
        kind: SceneKind,
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = 200)]
        size: usize,
    },
    /// Iterate a dataset and run detection once per image
    Dataset {
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    let detector = Detector::with_params(EdParams::from_env());
    let result = match cli.command {
        Command::Detect {
            image,
            lines_only,
            overlay,
        } => detect_cmd(&detector, &image, lines_only, overlay.as_deref()),
        Command::Synth { kind, output, size } => synth_cmd(kind, &output, size),
        Command::Dataset { root, limit } => dataset_cmd(&detector, root, limit),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn detect_cmd(detector: &Detector, image: &Path, lines_only: bool, overlay: Option<&Path>) -> Result<(), String> {
    let gray = load_gray(image).map_err(|e| format!("{}: {e}", image.display()))?;
    let stats = grayscale_stats(gray.as_bytes());
    println!(
        "Image: {} ({}x{}) gray min={} max={} avg={}",
        image.display(),
        gray.width(),
        gray.height(),
        stats.min,
        stats.max,
        stats.avg
    );

    let start = Instant::now();
    let detection = if lines_only {
        let lines = detector
            .detect_lines(gray.as_bytes(), gray.width(), gray.height())
            .map_err(|e| e.to_string())?;
        Detection {
            lines,
            ..Detection::default()
        }
    } else {
        detector.detect_image(&gray).map_err(|e| e.to_string())?
    };
    let elapsed = start.elapsed().as_secs_f64() * 1000.0;

    print_detection(&detection);
    println!("Time: {elapsed:.2} ms");

    if let Some(path) = overlay {
        render_overlay(&gray, &detection)
            .save(path)
            .map_err(|e| format!("{}: {e}", path.display()))?;
        info!("overlay written to {}", path.display());
    }
    Ok(())
}

fn print_detection(detection: &Detection) {
    if !detection.segments.is_empty() {
        println!("Segments: {}", detection.segments.len());
    }
    println!("Lines: {}", detection.lines.len());
    for (i, line) in detection.lines.iter().enumerate() {
        let (a, b) = line.endpoints();
        println!(
            "  line {i}: ({:.1}, {:.1}) -> ({:.1}, {:.1}) err={:.3}",
            a.x,
            a.y,
            b.x,
            b.y,
            line.fitting_error()
        );
    }
    println!("Arcs: {}", detection.arcs.len());
    println!("Circles: {}", detection.circles.len());
    for (i, c) in detection.circles.iter().enumerate() {
        println!(
            "  circle {i}: center=({:.2}, {:.2}) r={:.2} err={:.3}",
            c.center.x, c.center.y, c.radius, c.fitting_error
        );
    }
    println!("Ellipses: {}", detection.ellipses.len());
    for (i, e) in detection.ellipses.iter().enumerate() {
        let center = e.center();
        println!(
            "  ellipse {i}: center=({:.2}, {:.2}) a={:.2} b={:.2} theta={:.1}deg err={:.3}",
            center.x,
            center.y,
            e.semi_major(),
            e.semi_minor(),
            e.angle().to_degrees(),
            e.fitting_error()
        );
    }
}

fn synth_cmd(kind: SceneKind, output: &Path, size: usize) -> Result<(), String> {
    let half = size as f64 / 2.0;
    let gray = match kind {
        SceneKind::Disk => render_disk(size, size, Point::new(half, half), size as f64 / 5.0, 40, 200),
        SceneKind::Ellipse => {
            let ellipse = Ellipse::from_geometry(Point::new(half, half), size as f64 / 3.5, size as f64 / 6.0, 0.4);
            render_ellipse(size, size, &ellipse, 40, 200)
        }
        SceneKind::Step => render_step_edge(
            size,
            size,
            Point::new(1.0, size as f64 * 0.25),
            Point::new(size as f64 - 2.0, size as f64 * 0.7),
            40,
            200,
        ),
        SceneKind::Bar => render_bar(
            size,
            size,
            Point::new(size as f64 * 0.15, size as f64 * 0.3),
            Point::new(size as f64 * 0.85, size as f64 * 0.7),
            3.0,
            40,
            200,
        ),
    }
    .map_err(|e| e.to_string())?;
    save_gray(output, &gray).map_err(|e| format!("{}: {e}", output.display()))?;
    println!("Wrote {} ({size}x{size})", output.display());
    Ok(())
}

fn dataset_cmd(detector: &Detector, root: Option<PathBuf>, limit: Option<usize>) -> Result<(), String> {
    let root = root.unwrap_or_else(dataset_root_from_env);
    let limit = limit.or_else(bench_limit_from_env);
    let mut totals = DetectionTotals::default();
    let mut failures = 0usize;
    let start = Instant::now();

    for path in dataset_iter(&root, limit) {
        let gray = match load_gray(&path) {
            Ok(gray) => gray,
            Err(e) => {
                error!("{}: {e}", path.display());
                failures += 1;
                continue;
            }
        };
        match detector.detect_image(&gray) {
            Ok(detection) => totals.add(&detection),
            Err(e) => {
                error!("{}: {e}", path.display());
                failures += 1;
            }
        }
    }

    if totals.images == 0 && failures == 0 {
        return Err(format!("no images under {}", root.display()));
    }
    let elapsed = start.elapsed().as_secs_f64();
    println!("Dataset: {}", root.display());
    println!("Images: {} ({} failed)", totals.images, failures);
    println!(
        "Totals: segments={} lines={} arcs={} circles={} ellipses={}",
        totals.segments, totals.lines, totals.arcs, totals.circles, totals.ellipses
    );
    if totals.images > 0 {
        println!("Avg time: {:.2} ms/image", elapsed * 1000.0 / totals.images as f64);
    }
    Ok(())
}
