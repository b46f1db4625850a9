//! Asynchronous origin detection over tracked parameters.
//!
//! The detector enumerates ordered pairs (A, B) where A was first observed
//! no later than B and tests whether any of B's values is a deterministic
//! transform of any of A's. It runs as a spawned task that owns the vertex
//! vector; the caller gets the vector back, origins populated, by awaiting
//! the handle. Awaiting the handle is the completion signal — there is no
//! polling loop and no lock shared between the task and the initiating flow.

use crate::error::{Result, TrackError};
use crate::graph::DependencyGraph;
use crate::tracked::TrackedParameter;
use crate::transforms::{best_evidence, Transform};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub type StatusCallback = Arc<dyn Fn(&str) + Send + Sync>;
pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

/// Pairs evaluated between cooperative yields, so cancellation is observed
/// promptly even on large pair sets.
const PAIRS_PER_YIELD: usize = 64;

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Minimum transform confidence for recording an origin.
    pub confidence_threshold: f64,
    /// Source values shorter than this are not tested.
    pub min_value_len: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            min_value_len: 6,
        }
    }
}

/// One discovered origin relationship, by arena index.
#[derive(Debug, Clone)]
pub struct OriginLink {
    pub origin: usize,
    pub dependent: usize,
    pub transform: Transform,
}

/// Final state of a detection run. `vertices` is the same arena the caller
/// handed to `spawn`, with each vertex's origin set populated.
#[derive(Debug)]
pub struct DetectionOutcome {
    pub vertices: Vec<TrackedParameter>,
    pub links: Vec<OriginLink>,
    pub pairs_tested: usize,
    pub pairs_skipped: usize,
    pub cancelled: bool,
}

impl DetectionOutcome {
    /// Build the dependency graph: all vertices first, then one edge per
    /// origin relationship, then the layout trigger. Edges are only added
    /// here, after the detection task has completed.
    pub fn into_graph(self) -> DependencyGraph {
        let keys: Vec<_> = self.vertices.iter().map(|v| v.key().clone()).collect();
        let mut graph = DependencyGraph::new();
        for vertex in self.vertices {
            graph.add_vertex(vertex);
        }
        for link in &self.links {
            graph.add_edge_labeled(
                &keys[link.origin],
                &keys[link.dependent],
                link.transform.label().to_string(),
            );
        }
        graph.request_layout();
        graph
    }
}

/// Background worker that populates origin sets for a vertex arena.
pub struct OriginDetector {
    config: DetectorConfig,
    status_callback: Option<StatusCallback>,
    progress_callback: Option<ProgressCallback>,
}

impl OriginDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            status_callback: None,
            progress_callback: None,
        }
    }

    pub fn with_status_callback(mut self, callback: StatusCallback) -> Self {
        self.status_callback = Some(callback);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Start detection in a background task. The task owns `vertices` until
    /// completion; cancel via the returned handle at any time.
    pub fn spawn(self, vertices: Vec<TrackedParameter>) -> DetectorHandle {
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_flag = cancel.clone();
        let handle = tokio::spawn(async move { self.run(vertices, cancel_flag).await });
        DetectorHandle { cancel, handle }
    }

    async fn run(
        self,
        mut vertices: Vec<TrackedParameter>,
        cancel: Arc<AtomicBool>,
    ) -> DetectionOutcome {
        let candidates = candidate_pairs(&vertices);
        let total = candidates.len();
        info!(
            "Origin detection started: {} parameters, {} candidate pairs",
            vertices.len(),
            total
        );
        self.set_status(&format!(
            "Testing {} parameter pairs for origin relationships...",
            total
        ));

        let mut links = Vec::new();
        let mut pairs_tested = 0usize;
        let mut pairs_skipped = 0usize;
        let mut last_percent = 0u8;
        let mut cancelled = false;

        for (done, &(a, b)) in candidates.iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                cancelled = true;
                break;
            }

            match self.test_candidate(&vertices, a, b) {
                Ok(Some(transform)) => {
                    debug!(
                        "Origin found: {} -> {} via {}",
                        vertices[a].name(),
                        vertices[b].name(),
                        transform.label()
                    );
                    vertices[b].origins.insert(a);
                    links.push(OriginLink {
                        origin: a,
                        dependent: b,
                        transform,
                    });
                    pairs_tested += 1;
                }
                Ok(None) => pairs_tested += 1,
                Err(e) => {
                    // Best effort: a failing pair is reported and skipped,
                    // never aborts the run.
                    warn!("Skipping pair {} -> {}: {}", a, b, e);
                    self.set_status(&format!("Skipped one pair: {}", e));
                    pairs_skipped += 1;
                }
            }

            let percent = (100 * (done + 1) / total.max(1)) as u8;
            if percent != last_percent {
                last_percent = percent;
                self.set_progress(percent);
            }
            if (done + 1) % PAIRS_PER_YIELD == 0 {
                tokio::task::yield_now().await;
            }
        }

        if cancelled {
            info!(
                "Origin detection cancelled after {} of {} pairs",
                pairs_tested + pairs_skipped,
                total
            );
            self.set_status("Origin detection cancelled; partial results retained.");
        } else {
            self.set_progress(100);
            self.set_status(&format!(
                "Origin detection complete: {} origin relationships found.",
                links.len()
            ));
        }

        DetectionOutcome {
            vertices,
            links,
            pairs_tested,
            pairs_skipped,
            cancelled,
        }
    }

    fn test_candidate(
        &self,
        vertices: &[TrackedParameter],
        a: usize,
        b: usize,
    ) -> Result<Option<Transform>> {
        let source_values = vertices[a].param().unique_values();
        let derived_values = vertices[b].param().unique_values();
        if source_values.is_empty() || derived_values.is_empty() {
            return Err(TrackError::Other(format!(
                "parameter {} has no observed values",
                if source_values.is_empty() {
                    vertices[a].name()
                } else {
                    vertices[b].name()
                }
            )));
        }
        let evidence = best_evidence(&source_values, &derived_values, self.config.min_value_len);
        Ok(evidence
            .filter(|e| e.weight() >= self.config.confidence_threshold)
            .map(|e| e.transform))
    }

    fn set_status(&self, text: &str) {
        if let Some(ref callback) = self.status_callback {
            callback(text);
        }
    }

    fn set_progress(&self, percent: u8) {
        if let Some(ref callback) = self.progress_callback {
            callback(percent);
        }
    }
}

/// Ordered pairs (a, b), a != b, with a first observed no later than b.
fn candidate_pairs(vertices: &[TrackedParameter]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for a in 0..vertices.len() {
        for b in 0..vertices.len() {
            if a == b {
                continue;
            }
            let a_seen = vertices[a].first_seen().unwrap_or(u64::MAX);
            let b_seen = vertices[b].first_seen().unwrap_or(u64::MAX);
            if a_seen <= b_seen {
                pairs.push((a, b));
            }
        }
    }
    pairs
}

/// Handle to a running detection task. Dropping the handle without awaiting
/// detaches the task; awaiting `wait` is the single completion signal.
pub struct DetectorHandle {
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<DetectionOutcome>,
}

impl DetectorHandle {
    /// Request cancellation. The task stops between pairs and still resolves
    /// `wait` with the origins discovered so far.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub async fn wait(self) -> Result<DetectionOutcome> {
        Ok(self.handle.await?)
    }
}
