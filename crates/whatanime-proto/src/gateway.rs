//! Confirm and report requests.
//!
//! Both are fire-and-report: failures are logged and never surface as an
//! error the user has to dismiss.

use tracing::{info, warn};

use crate::anisong::{SongAnnId, SongId, TrackId};
use crate::backend::{Backend, BackendError, ConfirmRequest, ReportRequest};
use crate::sync::SyncHandle;

/// Bind `song_id` to the playing track, then ask the sync loop for exactly
/// one forced refresh whatever the outcome.
pub async fn confirm_binding<B: Backend>(
    backend: &B,
    sync: &SyncHandle,
    song_id: SongId,
    track_id: TrackId,
) -> Result<(), BackendError> {
    let request = ConfirmRequest { song_id, track_id };
    let result = backend.confirm(&request).await;
    match &result {
        Ok(()) => info!(
            "[gateway] bound song {} to track {}",
            request.song_id.0, request.track_id
        ),
        Err(e) => warn!("[gateway] confirm song {} failed: {}", request.song_id.0, e),
    }
    sync.refresh();
    result
}

/// Send a report. The caller closes its dialog regardless of the result.
pub async fn submit_report<B: Backend>(
    backend: &B,
    track_id: &TrackId,
    ann_song_id: Option<SongAnnId>,
    message: String,
) -> Result<(), BackendError> {
    let request = ReportRequest {
        track_id: (!track_id.is_empty()).then(|| track_id.clone()),
        ann_song_id,
        message,
    };
    let result = backend.report(&request).await;
    match &result {
        Ok(()) => info!(
            "[gateway] report sent (ann song {:?})",
            request.ann_song_id.map(|id| id.0)
        ),
        Err(e) => warn!("[gateway] report failed: {}", e),
    }
    result
}
