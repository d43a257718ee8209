use eventscope_core::{
    Completion, DetectionSettings, EventCatalog, FastRandom, ProgressSimulation, ProgressTick,
    RandomSource, Session, SynthesisError, Synthesizer, VideoHandle,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::{DetectorConfig, TimingProfile};
use crate::DetectorError;

type SharedRandom = Arc<Mutex<Box<dyn RandomSource + Send>>>;

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionOutcome {
    /// Results were installed and the session is `Ready`.
    Completed { generation: u64, events: usize },
    /// The task was stopped by a clear, a new video or a newer detection.
    Cancelled { generation: u64 },
    /// The task finished but the session had moved on; results were dropped.
    Stale { generation: u64 },
    Failed {
        generation: u64,
        error: SynthesisError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Accepted,
    /// The session was cleared while the upload was still running.
    Cancelled,
}

/// A running detection.
#[derive(Debug)]
pub struct DetectionHandle {
    generation: u64,
    progress: watch::Receiver<u8>,
    join: JoinHandle<DetectionOutcome>,
}

impl DetectionHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Rounded progress percentage, updated on every tick.
    pub fn progress(&self) -> watch::Receiver<u8> {
        self.progress.clone()
    }

    pub async fn wait(self) -> DetectionOutcome {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => {
                warn!(generation = self.generation, "detection task panicked");
                std::panic::resume_unwind(e.into_panic())
            }
            Err(e) => {
                debug!(generation = self.generation, "detection task aborted: {e}");
                DetectionOutcome::Cancelled {
                    generation: self.generation,
                }
            }
        }
    }
}

struct Inflight {
    generation: u64,
    cancel: watch::Sender<bool>,
}

/// Everything a spawned detection task needs, detached from `&Detector`.
struct DetectionJob {
    session: Arc<Mutex<Session>>,
    catalog: Arc<EventCatalog>,
    rng: SharedRandom,
    profile: TimingProfile,
    assumed_duration_secs: u32,
    generation: u64,
    query: String,
    thumbnail: Option<String>,
}

/// Owns a [`Session`] and drives its timer-based transitions.
///
/// Methods that spawn work must be called from within a tokio runtime.
pub struct Detector {
    session: Arc<Mutex<Session>>,
    catalog: Arc<EventCatalog>,
    rng: SharedRandom,
    config: DetectorConfig,
    inflight: Mutex<Option<Inflight>>,
    /// Bumped on every clear; uploads watch it to abort.
    clears: watch::Sender<u64>,
    upload_progress: watch::Sender<u8>,
}

impl Detector {
    pub fn new(config: DetectorConfig, catalog: EventCatalog) -> Self {
        let (clears, _) = watch::channel(0);
        let (upload_progress, _) = watch::channel(0);
        Self {
            session: Arc::new(Mutex::new(Session::new())),
            catalog: Arc::new(catalog),
            rng: Arc::new(Mutex::new(Box::new(FastRandom::new()))),
            config,
            inflight: Mutex::new(None),
            clears,
            upload_progress,
        }
    }

    /// Replace the randomness source, e.g. with a seeded one.
    pub fn with_random(self, rng: impl RandomSource + Send + 'static) -> Self {
        *lock(&self.rng) = Box::new(rng);
        self
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    /// Run a read-only query against the current session.
    pub fn read<T>(&self, f: impl FnOnce(&Session) -> T) -> T {
        f(&lock(&self.session))
    }

    pub fn set_playback_duration(&self, seconds: f64) {
        lock(&self.session).set_playback_duration(seconds);
    }

    /// Rounded progress of the current (or last) upload.
    pub fn upload_progress(&self) -> watch::Receiver<u8> {
        self.upload_progress.subscribe()
    }

    /// Validate `video`, simulate its upload, then attach it to the session.
    pub async fn upload(&self, video: VideoHandle) -> Result<UploadOutcome, DetectorError> {
        self.config.video_policy.validate(&video)?;
        info!(name = %video.name, size = video.size_bytes, "uploading video");

        let mut clears = self.clears.subscribe();
        self.upload_progress.send_replace(0);
        let finished = run_progress(
            "upload",
            &self.config.upload,
            &self.rng,
            &mut clears,
            &self.upload_progress,
        )
        .await;
        if !finished {
            info!(name = %video.name, "upload cancelled");
            return Ok(UploadOutcome::Cancelled);
        }

        let mut session = lock(&self.session);
        // clear() bumps the epoch while holding the session lock.
        if clears.has_changed().unwrap_or(true) {
            info!(name = %video.name, "upload cleared before acceptance");
            return Ok(UploadOutcome::Cancelled);
        }
        let mut inflight = lock(&self.inflight);
        if let Some(generation) = session.accept_video(video) {
            debug!(generation, "new video discarded outstanding detection");
        }
        cancel_inflight(&mut inflight);
        info!("video accepted");
        Ok(UploadOutcome::Accepted)
    }

    /// Start a detection for `query`, superseding any detection in flight.
    ///
    /// Fails without changing anything when the query is blank or no video has
    /// been accepted.
    pub fn start_detection(
        &self,
        query: &str,
        settings: DetectionSettings,
    ) -> Result<DetectionHandle, DetectorError> {
        let mut session = lock(&self.session);
        let ticket = session.begin_detection(query, settings)?;

        let mut inflight = lock(&self.inflight);
        cancel_inflight(&mut inflight);

        let (cancel, cancelled) = watch::channel(false);
        let (report, progress) = watch::channel(0u8);
        *inflight = Some(Inflight {
            generation: ticket.generation,
            cancel,
        });

        info!(
            generation = ticket.generation,
            query = %ticket.query,
            superseded = ?ticket.superseded,
            "detection started"
        );

        let job = DetectionJob {
            session: Arc::clone(&self.session),
            catalog: Arc::clone(&self.catalog),
            rng: Arc::clone(&self.rng),
            profile: self.config.processing,
            assumed_duration_secs: self.config.assumed_duration_secs,
            generation: ticket.generation,
            query: ticket.query,
            thumbnail: ticket.thumbnail,
        };
        let join = tokio::spawn(run_detection(job, cancelled, report));

        Ok(DetectionHandle {
            generation: ticket.generation,
            progress,
            join,
        })
    }

    /// Reset the session and stop any in-flight upload or detection.
    pub fn clear(&self) {
        let mut session = lock(&self.session);
        let mut inflight = lock(&self.inflight);
        cancel_inflight(&mut inflight);
        self.clears.send_modify(|n| *n += 1);
        if let Some(generation) = session.clear() {
            info!(generation, "cleared session with detection in flight");
        } else {
            info!("cleared session");
        }
    }
}

impl Drop for Detector {
    fn drop(&mut self) {
        cancel_inflight(&mut lock(&self.inflight));
    }
}

fn cancel_inflight(inflight: &mut Option<Inflight>) {
    if let Some(task) = inflight.take() {
        debug!(generation = task.generation, "cancelling detection task");
        let _ = task.cancel.send(true);
    }
}

/// Tick `profile` until 100% or until `cancel` changes. Returns whether the
/// bar completed.
async fn run_progress<T>(
    label: &'static str,
    profile: &TimingProfile,
    rng: &SharedRandom,
    cancel: &mut watch::Receiver<T>,
    report: &watch::Sender<u8>,
) -> bool {
    let mut progress = ProgressSimulation::new(profile.max_increment);
    let mut interval = tokio::time::interval(profile.tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of a tokio interval fires immediately.
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = cancel.changed() => return false,
            _ = interval.tick() => {
                let tick = {
                    let mut rng = lock(rng);
                    progress.tick(&mut **rng)
                };
                report.send_replace(progress.display_percent());
                match tick {
                    ProgressTick::Advanced(percent) => debug!(label, percent, "progress"),
                    ProgressTick::Completed | ProgressTick::Finished => break,
                }
            }
        }
    }

    if !profile.settle.is_zero() {
        tokio::select! {
            biased;
            _ = cancel.changed() => return false,
            _ = tokio::time::sleep(profile.settle) => {}
        }
    }
    true
}

async fn run_detection(
    job: DetectionJob,
    mut cancelled: watch::Receiver<bool>,
    report: watch::Sender<u8>,
) -> DetectionOutcome {
    let generation = job.generation;
    if !run_progress("detection", &job.profile, &job.rng, &mut cancelled, &report).await {
        debug!(generation, "detection cancelled before completion");
        return DetectionOutcome::Cancelled { generation };
    }
    publish(&job)
}

/// Synthesize and install results if `job` is still the outstanding generation.
fn publish(job: &DetectionJob) -> DetectionOutcome {
    let generation = job.generation;
    let mut session = lock(&job.session);
    if !session.is_current(generation) {
        debug!(generation, "dropping stale detection result");
        return DetectionOutcome::Stale { generation };
    }

    let synthesizer =
        Synthesizer::new(&job.catalog).with_assumed_duration(job.assumed_duration_secs);
    let events = {
        let mut rng = lock(&job.rng);
        synthesizer.synthesize(&job.query, job.thumbnail.as_deref(), &mut **rng)
    };

    match events {
        Ok(events) => match session.complete(generation, events) {
            Completion::Applied { events } => {
                info!(generation, events, "detection complete");
                DetectionOutcome::Completed { generation, events }
            }
            Completion::Stale => DetectionOutcome::Stale { generation },
        },
        Err(error) => {
            warn!(generation, "detection failed: {error}");
            session.abandon(generation);
            DetectionOutcome::Failed { generation, error }
        }
    }
}
