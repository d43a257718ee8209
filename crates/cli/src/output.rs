use std::io::Write;

use eventscope_core::{ConfidenceTier, DetectionSettings, MarkerProjection, VideoEvent};
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Everything `eventscope detect` reports about a finished detection.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectReport {
    pub video: String,
    /// Human-readable file size.
    pub size: String,
    pub query: String,
    pub settings: DetectionSettings,
    /// `MM:SS`, present when the playback duration is known.
    pub duration: Option<String>,
    pub events: Vec<EventRow>,
    pub markers: Vec<MarkerProjection>,
    /// Playback position used for `active`, as `MM:SS`.
    pub position: Option<String>,
    pub active: Vec<usize>,
    pub min_confidence: u32,
    /// Indices of events at or above `min_confidence`.
    pub visible: Vec<usize>,
    pub export_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EventRow {
    pub index: usize,
    #[serde(flatten)]
    pub event: VideoEvent,
    pub tier: &'static str,
}

impl EventRow {
    pub fn new(index: usize, event: &VideoEvent) -> Self {
        Self {
            index,
            event: event.clone(),
            tier: ConfidenceTier::of(event.confidence).as_str(),
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn render_detect_text(report: &DetectReport, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "Video:     {} ({})", report.video, report.size)?;
    writeln!(
        out,
        "Detection: \"{}\" (sensitivity {}, threshold {}%)",
        report.query, report.settings.sensitivity, report.settings.confidence_threshold
    )?;
    if let Some(duration) = &report.duration {
        writeln!(out, "Duration:  {duration}")?;
    }
    writeln!(out)?;

    if report.events.is_empty() {
        writeln!(out, "No events detected.")?;
        return Ok(());
    }

    let hidden = report.events.len() - report.visible.len();
    writeln!(
        out,
        "Detected Events ({} shown, min confidence {}%)",
        report.visible.len(),
        report.min_confidence
    )?;
    for row in report
        .events
        .iter()
        .filter(|row| report.visible.contains(&row.index))
    {
        let marker = if report.active.contains(&row.index) {
            '>'
        } else {
            ' '
        };
        writeln!(
            out,
            "{marker} #{:<2} {} - {}  {:<20} {:>3}% {}",
            row.index + 1,
            row.event.start,
            row.event.end,
            row.event.label,
            row.event.confidence,
            row.tier
        )?;
    }
    if hidden > 0 {
        writeln!(out, "  ({hidden} below threshold hidden)")?;
    }

    if !report.markers.is_empty() {
        writeln!(out)?;
        writeln!(out, "Timeline markers")?;
        for marker in &report.markers {
            writeln!(
                out,
                "  {:>6.2}%  {}",
                marker.position_percent, marker.title
            )?;
        }
    }

    if let Some(position) = &report.position {
        writeln!(out)?;
        if report.active.is_empty() {
            writeln!(out, "No events active at {position}")?;
        } else {
            let labels: Vec<String> = report
                .active
                .iter()
                .map(|index| format!("#{}", index + 1))
                .collect();
            writeln!(out, "Active at {position}: {}", labels.join(", "))?;
        }
    }

    if let Some(path) = &report.export_path {
        writeln!(out)?;
        writeln!(out, "Exported results to {path}")?;
    }
    Ok(())
}
