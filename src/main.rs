use clap::Parser;
use std::path::PathBuf;

use pcbinspect::capture;
use pcbinspect::detector::sidecar_path;
use pcbinspect::{DetectionSet, FixedDetections, InspectionSession, MatchPolicy, Status};

#[derive(Parser)]
#[command(name = "pcbinspect")]
#[command(about = "Check a test circuit board against a known-good reference board")]
struct Cli {
    /// Image of the known-good reference board
    #[arg(long, value_name = "IMAGE")]
    reference: PathBuf,

    /// Image of the board under inspection
    #[arg(long, value_name = "IMAGE")]
    test: PathBuf,

    /// Detections for the reference image (defaults to <reference>.json)
    #[arg(long, value_name = "JSON")]
    reference_detections: Option<PathBuf>,

    /// Detections for the test image (defaults to <test>.json)
    #[arg(long, value_name = "JSON")]
    test_detections: Option<PathBuf>,

    /// Where to write the annotated test image
    #[arg(short, long, value_name = "FILE", conflicts_with = "out_dir")]
    output: Option<PathBuf>,

    /// Folder for timestamped annotated images (used when --output is absent)
    #[arg(long, value_name = "DIR", default_value = capture::DEFAULT_SAVE_FOLDER)]
    out_dir: PathBuf,

    /// Also save the raw reference detections plotted on the reference image
    #[arg(long, value_name = "FILE")]
    reference_plot: Option<PathBuf>,

    /// Require matching components to overlap the reference box by this IoU
    #[arg(long, value_name = "IOU")]
    min_iou: Option<f32>,

    /// Print the comparison result as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let policy = match args.min_iou {
        Some(min_iou) => MatchPolicy::LabelAndOverlap { min_iou },
        None => MatchPolicy::Label,
    };
    policy.validate()?;

    // Reference board
    let reference_img = capture::load_image(&args.reference)?;
    let reference_json = args
        .reference_detections
        .clone()
        .unwrap_or_else(|| sidecar_path(&args.reference));
    let reference_set = DetectionSet::from_json_file(&reference_json)?;
    log::info!(
        "reference {:?}: {}x{}, {} detections",
        args.reference,
        reference_img.width(),
        reference_img.height(),
        reference_set.len()
    );

    // Test board detections come from the session's detector
    let test_json = args
        .test_detections
        .clone()
        .unwrap_or_else(|| sidecar_path(&args.test));
    let detector = FixedDetections::from_json_file(&test_json)?;

    let mut session = InspectionSession::new(detector).with_policy(policy);
    session.set_reference(reference_set.clone());

    if let Some(plot_path) = &args.reference_plot {
        let plot = session
            .annotator()
            .render_detections(&reference_img, &reference_set)?;
        capture::save_image(&plot, plot_path)?;
        log::info!("saved reference plot to {:?}", plot_path);
    }

    let test_img = capture::load_image(&args.test)?;
    let inspection = session.inspect(&test_img)?;

    let output = match &args.output {
        Some(path) => path.clone(),
        None => capture::timestamped_path(&args.out_dir, capture::now())?,
    };
    capture::save_image(&inspection.annotated, &output)?;

    let result = &inspection.result;
    if args.json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("\n=== Board Inspection Results ===");
    println!("Reference components: {}", reference_set.len());
    println!("Test components:      {}", inspection.detections.len());
    println!("Correct: {}", result.correct_count());
    println!("Extra:   {}", result.extra_count());
    println!("Missing: {}", result.missing_count());

    if result.extra_count() > 0 {
        println!("\nExtra components:");
        for entry in result.entries.iter().filter(|e| e.status == Status::Extra) {
            let r = entry.region;
            println!("  {} at ({}, {})-({}, {})", entry.label, r.x1, r.y1, r.x2, r.y2);
        }
    }
    if !result.missing.is_empty() {
        println!("\nMissing components:");
        for missing in &result.missing {
            println!("  {}", missing.label);
        }
    }

    println!(
        "\n{} - annotated image saved as {}",
        if result.is_pass() { "PASS" } else { "FAIL" },
        output.display()
    );

    Ok(())
}
