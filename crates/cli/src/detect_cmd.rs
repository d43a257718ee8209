use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Args;
use eventscope_core::{
    export_file_name, format_file_size, DetectionSettings, FastRandom, ResultFilter, Sensitivity,
    Timestamp, VideoHandle,
};
use eventscope_detector::{build_catalog, DetectionOutcome, Detector, DetectorConfig, UploadOutcome};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::load_config;
use crate::output::{print_json, render_detect_text, DetectReport, EventRow, OutputFormat};

#[derive(Debug, Clone, Args)]
pub struct DetectArgs {
    /// Video file to analyze
    pub video: PathBuf,

    /// Event to look for, e.g. "person walking"
    #[arg(long)]
    pub event: String,

    /// low, medium or high (default from config)
    #[arg(long)]
    pub sensitivity: Option<Sensitivity>,

    /// Confidence threshold recorded with the detection (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub confidence_threshold: Option<u8>,

    /// Hide events below this confidence
    #[arg(long)]
    pub min_confidence: Option<u32>,

    /// Playback duration in seconds, used for timeline markers
    #[arg(long)]
    pub duration: Option<f64>,

    /// Seed the random source for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Playback position (`MM:SS`) for the active-event listing
    #[arg(long)]
    pub at: Option<String>,

    /// Write `detection-results-<millis>.json` into this directory
    #[arg(long)]
    pub export: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

pub async fn run(args: DetectArgs) -> Result<()> {
    let config = load_config()?;
    let catalog = build_catalog(&config.catalog).context("Failed to build catalog from config")?;

    let position = args
        .at
        .as_deref()
        .map(str::parse::<Timestamp>)
        .transpose()
        .context("Invalid --at position")?;
    let sensitivity = match args.sensitivity {
        Some(sensitivity) => sensitivity,
        None => config
            .detection
            .sensitivity
            .parse::<Sensitivity>()
            .map_err(anyhow::Error::msg)
            .context("Invalid detection.sensitivity in config")?,
    };
    let settings = DetectionSettings {
        sensitivity,
        confidence_threshold: args
            .confidence_threshold
            .unwrap_or(config.detection.confidence_threshold),
    };
    let filter = ResultFilter::new(
        args.min_confidence
            .unwrap_or(u32::from(config.detection.min_confidence)),
    );

    let video = video_handle(&args.video)?;
    let video_name = video.name.clone();
    let video_size = video.size_bytes;

    let mut detector = Detector::new(DetectorConfig::from(&config), catalog);
    if let Some(seed) = args.seed {
        detector = detector.with_random(FastRandom::with_seed(seed));
    }

    match detector.upload(video).await? {
        UploadOutcome::Accepted => {}
        UploadOutcome::Cancelled => bail!("Upload of {video_name} was cancelled"),
    }
    if let Some(duration) = args.duration {
        detector.set_playback_duration(duration);
    }

    let handle = detector.start_detection(&args.event, settings)?;
    match handle.wait().await {
        DetectionOutcome::Completed { events, .. } => info!(events, "detection finished"),
        DetectionOutcome::Failed { error, .. } => {
            return Err(error).context("Detection failed");
        }
        other => bail!("Detection did not complete: {other:?}"),
    }

    let (mut report, export) = detector.read(|session| {
        let timeline = session.timeline();
        let events = session.events();
        let report = DetectReport {
            video: video_name.clone(),
            size: format_file_size(video_size),
            query: session.source_query().to_string(),
            settings: session.settings(),
            duration: timeline.duration_label(),
            events: events
                .iter()
                .enumerate()
                .map(|(index, event)| EventRow::new(index, event))
                .collect(),
            markers: timeline.markers(),
            position: position.map(|at| at.to_string()),
            active: position
                .map(|at| timeline.active_indices(at.as_secs_f64()))
                .unwrap_or_default(),
            min_confidence: filter.min_confidence,
            visible: filter.visible_indices(events),
            export_path: None,
        };
        let export = args.export.as_ref().map(|_| session.export());
        (report, export)
    });

    if let (Some(dir), Some(export)) = (&args.export, export) {
        let document = export.context("Nothing to export")?;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(export_file_name(Utc::now()));
        std::fs::write(&path, document.to_json_pretty()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "exported results");
        report.export_path = Some(path.display().to_string());
    }

    match args.format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            render_detect_text(&report, &mut std::io::stdout().lock())?;
            Ok(())
        }
    }
}

/// Name and size come from the filesystem; the thumbnail is a media-fragment
/// reference one second into the file.
fn video_handle(path: &Path) -> Result<VideoHandle> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read video at {}", path.display()))?;
    if !metadata.is_file() {
        bail!("{} is not a file", path.display());
    }
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(VideoHandle::new(name, metadata.len()).with_thumbnail(format!("{}#t=1", path.display())))
}
