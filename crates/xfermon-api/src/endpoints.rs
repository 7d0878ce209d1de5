// Endpoint lookup.

use crate::client::TransferClient;
use crate::error::Error;
use crate::models::EndpointInfo;

impl TransferClient {
    /// Fetch endpoint details.
    ///
    /// `GET endpoint/{id}`
    pub async fn get_endpoint(&self, endpoint_id: &str) -> Result<EndpointInfo, Error> {
        self.get(&format!("endpoint/{endpoint_id}")).await
    }
}
