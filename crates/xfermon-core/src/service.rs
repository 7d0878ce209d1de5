// ── Transfer service seam ──
//
// The monitor talks to the remote service only through `TransferService`,
// so cycles can be driven by in-memory fakes in tests.

use std::future::Future;

use futures_util::{Stream, StreamExt};
use tracing::{debug, warn};
use xfermon_api::TransferClient;

use crate::convert::task_from_record;
use crate::error::CoreError;
use crate::model::{EndpointId, Task, TaskId};

/// Remote operations the monitor needs.
pub trait TransferService: Send + Sync {
    /// Lazy, finite feed of active tasks touching `endpoint`.
    ///
    /// A record that cannot be decoded yields `CoreError::MalformedTask`
    /// and the feed continues. Any other error ends the feed.
    fn task_feed<'a>(
        &'a self,
        endpoint: &'a EndpointId,
    ) -> impl Stream<Item = Result<Task, CoreError>> + Send + 'a;

    /// Pause the given tasks. Idempotent on the service side.
    fn pause<'a>(
        &'a self,
        task_ids: &'a [TaskId],
        reason: &'a str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send + 'a;

    /// Human-facing name of `endpoint`.
    fn endpoint_name<'a>(
        &'a self,
        endpoint: &'a EndpointId,
    ) -> impl Future<Output = Result<String, CoreError>> + Send + 'a;
}

impl TransferService for TransferClient {
    fn task_feed<'a>(
        &'a self,
        endpoint: &'a EndpointId,
    ) -> impl Stream<Item = Result<Task, CoreError>> + Send + 'a {
        self.active_tasks(endpoint.as_str())
            .map(|record| task_from_record(record?))
    }

    async fn pause<'a>(&'a self, task_ids: &'a [TaskId], reason: &'a str) -> Result<(), CoreError> {
        let ids: Vec<String> = task_ids.iter().map(|id| id.as_str().to_owned()).collect();
        let result = self.pause_tasks(&ids, reason).await.map_err(|e| {
            if e.is_auth_expired() {
                warn!(error = %e, "access token rejected; pauses fail until it is replaced");
            } else if e.is_transient() {
                debug!(error = %e, "transient pause failure");
            }
            CoreError::from(e)
        })?;
        debug!(
            code = %result.code,
            request_id = result.request_id.as_deref().unwrap_or("-"),
            "pause accepted"
        );
        Ok(())
    }

    async fn endpoint_name<'a>(&'a self, endpoint: &'a EndpointId) -> Result<String, CoreError> {
        let info = self.get_endpoint(endpoint.as_str()).await?;
        Ok(info.label().to_owned())
    }
}
