// Endpoint-manager task endpoints
//
// Task listing is marker-paginated and exposed both page-at-a-time and as
// a lazy stream. Pausing is an administrative action on a set of task ids.

use futures_util::Stream;
use tracing::debug;

use crate::client::TransferClient;
use crate::error::Error;
use crate::models::{AdminPauseRequest, PauseResult, TaskListPage};

/// Page size requested from the service.
pub const PAGE_LIMIT: u32 = 1000;

impl TransferClient {
    /// Fetch one page of active tasks touching `endpoint_id`.
    ///
    /// `GET endpoint_manager/task_list?filter_endpoint=..&filter_status=ACTIVE&limit=..[&last_key=..]`
    pub async fn task_list_page(
        &self,
        endpoint_id: &str,
        last_key: Option<&str>,
    ) -> Result<TaskListPage, Error> {
        let mut params = vec![
            ("filter_endpoint", endpoint_id.to_owned()),
            ("filter_status", "ACTIVE".to_owned()),
            ("limit", PAGE_LIMIT.to_string()),
        ];
        if let Some(key) = last_key {
            params.push(("last_key", key.to_owned()));
        }
        self.get_with_params("endpoint_manager/task_list", &params)
            .await
    }

    /// Lazily walk every page of active tasks touching `endpoint_id`.
    ///
    /// Each page is fetched only when the previous one has been consumed.
    /// The stream ends after the last page, or right after yielding the
    /// first page error. Every call starts a fresh listing.
    pub fn active_tasks<'a>(
        &'a self,
        endpoint_id: &'a str,
    ) -> impl Stream<Item = Result<serde_json::Value, Error>> + Send + 'a {
        async_stream::try_stream! {
            let mut marker: Option<String> = None;
            let mut page_no = 0_u32;
            loop {
                page_no += 1;
                let page = self.task_list_page(endpoint_id, marker.as_deref()).await?;
                debug!(endpoint_id, page_no, records = page.data.len(), "task list page");
                for record in page.data {
                    yield record;
                }
                match page.last_key {
                    Some(key) if page.has_next_page && marker.as_deref() != Some(key.as_str()) => {
                        marker = Some(key);
                    }
                    _ => break,
                }
            }
        }
    }

    /// Administratively pause the given tasks.
    ///
    /// `POST endpoint_manager/admin_pause`. Pausing a task that is already
    /// paused is accepted by the service as a no-op.
    pub async fn pause_tasks(
        &self,
        task_ids: &[String],
        message: &str,
    ) -> Result<PauseResult, Error> {
        debug!(count = task_ids.len(), "pausing tasks");
        self.post(
            "endpoint_manager/admin_pause",
            &AdminPauseRequest {
                data_type: "admin_pause",
                message,
                task_id_list: task_ids,
            },
        )
        .await
    }
}
