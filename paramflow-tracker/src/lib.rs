pub mod detector;
pub mod error;
pub mod graph;
pub mod tracked;
pub mod transforms;

pub use detector::{DetectorConfig, DetectorHandle, OriginDetector, StatusCallback};
pub use error::TrackError;
pub use graph::DependencyGraph;
pub use tracked::TrackedParameter;
pub use transforms::{best_evidence, OriginEvidence, Transform};
