//! Parallel framelet reprojection against a shared reference map.

use crate::framelet::{Framelet, FrameletId};
use pushframe_core::{Band, CoordinateExtent};
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Why a reprojection produced nothing.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReprojectError {
    /// The framelet does not map onto the body (off-body, limb).
    #[error("geometry: {0}")]
    Geometry(String),
    /// The projection tool itself failed.
    #[error("reprojection tool failed: {0}")]
    Tool(String),
    #[error("deadline exceeded")]
    TimedOut,
}

/// A framelet resampled onto the map grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectedFramelet {
    pub id: FrameletId,
    pub path: PathBuf,
    pub extent: CoordinateExtent,
}

/// Cartographic reprojection engine.
///
/// Implementations are shared across worker threads. Each `project` call runs
/// on its own thread and is handed the instant by which it must return. A call
/// still running at the deadline is abandoned and its result discarded, so
/// implementations driving child processes should stop them by `deadline`.
pub trait Reprojector: Send + Sync + 'static {
    type Reference: Send + Sync + 'static;

    /// Build the map shared by every framelet of a run.
    fn build_reference(&self, framelet: &Framelet<'_>, projection: &str) -> Result<Self::Reference, ReprojectError>;

    fn project(
        &self,
        framelet: &Framelet<'_>,
        reference: &Self::Reference,
        deadline: Instant,
    ) -> Result<ProjectedFramelet, ReprojectError>;
}

/// How one framelet's reprojection ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameletOutcome {
    Projected,
    GeometryFailure,
    ToolFailure,
    TimedOut,
}

impl From<&ReprojectError> for FrameletOutcome {
    fn from(e: &ReprojectError) -> Self {
        match e {
            ReprojectError::Geometry(_) => FrameletOutcome::GeometryFailure,
            ReprojectError::Tool(_) => FrameletOutcome::ToolFailure,
            ReprojectError::TimedOut => FrameletOutcome::TimedOut,
        }
    }
}

/// Everything the reprojection stage produced, keyed by framelet.
#[derive(Clone, Debug, Default)]
pub struct Reprojection {
    pub results: BTreeMap<FrameletId, Option<ProjectedFramelet>>,
    pub outcomes: BTreeMap<FrameletId, FrameletOutcome>,
}

impl Reprojection {
    pub fn projected(&self) -> impl Iterator<Item = &ProjectedFramelet> + '_ {
        self.results.values().flatten()
    }

    pub fn projected_for(&self, band: Band) -> Vec<ProjectedFramelet> {
        self.projected().filter(|p| p.id.band == band).cloned().collect()
    }

    pub fn extents(&self) -> impl Iterator<Item = &CoordinateExtent> + '_ {
        self.projected().map(|p| &p.extent)
    }

    pub fn count(&self, outcome: FrameletOutcome) -> usize {
        self.outcomes.values().filter(|&&o| o == outcome).count()
    }
}

/// Deadline used when `now + timeout` is not representable.
const FALLBACK_DEADLINE: Duration = Duration::from_secs(7 * 86_400);

fn project_one<R: Reprojector>(
    reprojector: &Arc<R>,
    framelet: &Framelet<'_>,
    reference: &Arc<R::Reference>,
    timeout: Duration,
) -> Result<ProjectedFramelet, ReprojectError> {
    let start = Instant::now();
    let deadline = start
        .checked_add(timeout)
        .unwrap_or_else(|| start + FALLBACK_DEADLINE);

    let pixels = framelet.view.to_owned_image();
    let (id, row_offset) = (framelet.id, framelet.row_offset);
    let reprojector = Arc::clone(reprojector);
    let reference = Arc::clone(reference);
    let (tx, rx) = mpsc::sync_channel(1);
    thread::Builder::new()
        .name(format!("reproject-{id}"))
        .spawn(move || {
            let framelet = Framelet {
                id,
                view: pixels.view(),
                row_offset,
            };
            // Nobody is listening any more once the deadline has passed.
            let _ = tx.send(reprojector.project(&framelet, &reference, deadline));
        })
        .map_err(|e| ReprojectError::Tool(format!("cannot start worker for {id}: {e}")))?;

    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(ReprojectError::TimedOut),
        Err(RecvTimeoutError::Disconnected) => Err(ReprojectError::Tool(format!("reprojector panicked on {id}"))),
    }
}

/// Reproject every framelet on `pool`, dropping failures.
///
/// No ordering between framelets is assumed. A framelet whose reprojection
/// has not returned `timeout` after it started is recorded as
/// [`FrameletOutcome::TimedOut`] without waiting for it. Geometry failures are
/// logged at debug level, tool failures and timeouts at warn level.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip_all, fields(framelets = framelets.len())))]
pub fn reproject_all<R: Reprojector>(
    pool: &ThreadPool,
    reprojector: &Arc<R>,
    framelets: &[Framelet<'_>],
    reference: &Arc<R::Reference>,
    timeout: Duration,
) -> Reprojection {
    let raw: Vec<(FrameletId, Result<ProjectedFramelet, ReprojectError>)> = pool.install(|| {
        framelets
            .par_iter()
            .map(|f| (f.id, project_one(reprojector, f, reference, timeout)))
            .collect()
    });

    let mut out = Reprojection::default();
    for (id, result) in raw {
        match result {
            Ok(p) => {
                out.outcomes.insert(id, FrameletOutcome::Projected);
                out.results.insert(id, Some(p));
            }
            Err(e) => {
                match &e {
                    ReprojectError::Geometry(msg) => log::debug!("framelet {id} dropped: {msg}"),
                    ReprojectError::Tool(_) | ReprojectError::TimedOut => {
                        log::warn!("framelet {id} dropped: {e}")
                    }
                }
                out.outcomes.insert(id, FrameletOutcome::from(&e));
                out.results.insert(id, None);
            }
        }
    }
    log::info!(
        "reprojected {}/{} framelets",
        out.count(FrameletOutcome::Projected),
        framelets.len()
    );
    out
}
