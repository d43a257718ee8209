pub mod catalog;
pub mod event;
pub mod export;
pub mod filter;
pub mod progress;
pub mod session;
pub mod synth;
pub mod timeline;
pub mod timestamp;
pub mod video;

pub use catalog::{CatalogEntry, CatalogError, EventCatalog};
pub use event::VideoEvent;
pub use export::{export_file_name, ExportDocument, ExportError};
pub use filter::{ConfidenceTier, ResultFilter};
pub use progress::{ProgressSimulation, ProgressTick};
pub use session::{
    Completion, DetectionSettings, DetectionTicket, Sensitivity, Session, SessionError,
    SessionState,
};
pub use synth::{FastRandom, RandomSource, SynthesisError, Synthesizer};
pub use timeline::{MarkerProjection, TimelineIndex};
pub use timestamp::{Timestamp, TimestampError};
pub use video::{format_file_size, VideoError, VideoHandle, VideoPolicy};

#[cfg(any(test, feature = "testing"))]
pub mod testing;
