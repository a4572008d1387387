use std::{cell::RefCell, rc::Rc, time::Duration};

use im::Vector;
use reqwest::{header, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::prelude::{ComplianceAnalysis, ComplianceRequest, Record, StudioConfig};

use super::{SyncError, TokenStore};

/// Authenticated JSON client for the backend.
///
/// Every request is bounded by the configured timeout and observes the
/// client's cancellation token, so a call that never resolves cannot leave a
/// store stuck in its loading state.
pub struct RestClient {
    http: Client,
    base_url: String,
    timeout: Duration,
    tokens: Rc<dyn TokenStore>,
    cancel: RefCell<CancellationToken>,
}

impl core::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RestClient {
    pub fn new(config: &StudioConfig, tokens: Rc<dyn TokenStore>) -> Result<Self, SyncError> {
        let timeout = config.request_timeout();
        let http = Client::builder().connect_timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            timeout,
            tokens,
            cancel: RefCell::new(CancellationToken::new()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Rc<dyn TokenStore> {
        &self.tokens
    }

    /// Aborts every request currently in flight. Requests issued afterwards
    /// are unaffected.
    pub fn cancel_in_flight(&self) {
        let previous = self.cancel.replace(CancellationToken::new());
        previous.cancel();
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, SyncError> {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header(header::ACCEPT, "application/json");
        Ok(match self.tokens.load()? {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Sends `builder` and returns the body of a successful response.
    async fn execute(&self, builder: RequestBuilder) -> Result<Vec<u8>, SyncError> {
        let cancel = self.cancel.borrow().clone();
        let timeout = self.timeout;
        tokio::select! {
            _ = cancel.cancelled() => Err(SyncError::Cancelled),
            result = tokio::time::timeout(timeout, exchange(builder)) => {
                result.unwrap_or_else(|_| Err(SyncError::Timeout(timeout)))
            }
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SyncError> {
        debug!(path, "GET");
        let body = self.execute(self.request(Method::GET, path)?).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: &B,
    ) -> Result<T, SyncError> {
        debug!(%method, path, "send");
        let builder = self.request(method, path)?.json(payload);
        let body = self.execute(builder).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn delete_path(&self, path: &str) -> Result<(), SyncError> {
        debug!(path, "DELETE");
        self.execute(self.request(Method::DELETE, path)?).await?;
        Ok(())
    }

    pub async fn list<R: Record>(&self) -> Result<Vector<R>, SyncError> {
        let records: Vector<R> = self.get_json(&R::RESOURCE.collection_path()).await?;
        info!(resource = %R::RESOURCE, count = records.len(), "loaded records");
        Ok(records)
    }

    pub async fn create<R: Record>(&self, record: &R) -> Result<R, SyncError> {
        let created: R = self
            .send_json(Method::POST, &R::RESOURCE.collection_path(), record)
            .await?;
        info!(resource = %R::RESOURCE, id = ?created.record_id(), "created record");
        Ok(created)
    }

    /// Sends a partial update and returns the record as stored by the server.
    pub async fn update<R: Record, P: Serialize + ?Sized>(
        &self,
        id: &str,
        patch: &P,
    ) -> Result<R, SyncError> {
        let updated: R = self
            .send_json(Method::PUT, &R::RESOURCE.item_path(id), patch)
            .await?;
        info!(resource = %R::RESOURCE, id, "updated record");
        Ok(updated)
    }

    pub async fn remove<R: Record>(&self, id: &str) -> Result<(), SyncError> {
        self.delete_path(&R::RESOURCE.item_path(id)).await?;
        info!(resource = %R::RESOURCE, id, "deleted record");
        Ok(())
    }

    pub async fn analyze_compliance(
        &self,
        request: &ComplianceRequest,
    ) -> Result<ComplianceAnalysis, SyncError> {
        let analysis: ComplianceAnalysis = self
            .send_json(Method::POST, "/api/compliance/analyze", request)
            .await?;
        info!(
            process_id = %request.process_id,
            matrix = analysis.compliance_matrix.len(),
            waste = analysis.waste_analysis.len(),
            "compliance analysis completed"
        );
        Ok(analysis)
    }
}

async fn exchange(builder: RequestBuilder) -> Result<Vec<u8>, SyncError> {
    let response = builder.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SyncError::Status {
            status,
            body: body.chars().take(200).collect(),
        });
    }
    Ok(response.bytes().await?.to_vec())
}
