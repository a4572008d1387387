use std::future::Future;

use im::Vector;
use tracing::warn;

use crate::prelude::{Record, SyncError};

use super::{LoadingFlag, Notifications};

/// Runs one backend call with the store's loading flag raised.
///
/// On failure the error is logged, handed to `on_error` and surfaced as a
/// transient notification; no retry is attempted.
pub async fn tracked<T, F>(
    loading: &LoadingFlag,
    notifications: &Notifications,
    failure: &'static str,
    on_error: impl FnOnce(&SyncError),
    request: F,
) -> Result<T, SyncError>
where
    F: Future<Output = Result<T, SyncError>>,
{
    let _guard = loading.guard();
    let result = request.await;
    if let Err(error) = &result {
        warn!(%error, "{}", failure);
        on_error(error);
        notifications.error(failure);
    }
    result
}

/// Replaces the record sharing `updated`'s id. Unknown ids leave the
/// collection unchanged.
pub fn replace_record<R: Record>(records: &Vector<R>, updated: R) -> Vector<R> {
    let index = updated
        .record_id()
        .and_then(|id| records.iter().position(|record| record.record_id() == Some(id)));
    match index {
        Some(index) => records.update(index, updated),
        None => records.clone(),
    }
}

pub fn remove_record<R: Record>(records: &Vector<R>, id: &str) -> Vector<R> {
    records
        .iter()
        .filter(|record| record.record_id() != Some(id))
        .cloned()
        .collect()
}

/// Keeps `current` pointing at the freshest copy of itself.
pub fn refresh_current<R: Record>(current: &Option<R>, updated: &R) -> Option<R> {
    match current {
        Some(current) if current.record_id().is_some() && current.record_id() == updated.record_id() => {
            Some(updated.clone())
        }
        other => other.clone(),
    }
}
