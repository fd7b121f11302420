//! `SearchTransport` over the service's REST API

use indexmap::IndexMap;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::disjunctive::{build_queries, merge};
use super::params::SearchParams;
use super::{CompletionSender, RequestHandle, RequestState, SearchTransport, TransportOutcome};
use crate::config::TransportConfig;
use crate::errors::TransportError;
use crate::query::QueryState;
use crate::results::ResultPayload;

const APP_ID_HEADER: &str = "X-Algolia-Application-Id";
const API_KEY_HEADER: &str = "X-Algolia-API-Key";

#[derive(Debug, Deserialize)]
struct MultiQueryResponse {
    results: Vec<ResultPayload>,
}

/// HTTP transport bound to one application and index
///
/// Each request runs on its own tokio task and is raced against its
/// cancellation; a cancelled request never resolves its completion.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<TransportConfig>,
}

impl HttpTransport {
    /// # Errors
    /// Fails when the HTTP client cannot be built (TLS backend unavailable).
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TransportError::Other(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    #[must_use]
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Run a plain search and wait for its payload
    pub async fn search(&self, query: &QueryState) -> TransportOutcome {
        let url = format!(
            "{}/1/indexes/{}/query",
            self.config.base_url(),
            urlencoding::encode(self.config.index_name())
        );
        let body = json!({ "params": SearchParams::from_query(query).encode() });
        let value = self.post(&url, &body).await?;
        Ok(ResultPayload::from_json(value)?)
    }

    /// Run a disjunctive-faceting search and wait for the merged payload
    pub async fn search_disjunctive(
        &self,
        query: &QueryState,
        disjunctive_facets: &[String],
        refinements: &IndexMap<String, Vec<String>>,
    ) -> TransportOutcome {
        let url = format!("{}/1/indexes/*/queries", self.config.base_url());
        let requests: Vec<Value> = build_queries(query, disjunctive_facets, refinements)
            .iter()
            .map(|params| {
                json!({
                    "indexName": self.config.index_name(),
                    "params": params.encode(),
                })
            })
            .collect();
        let value = self.post(&url, &json!({ "requests": requests })).await?;
        let response: MultiQueryResponse = serde_json::from_value(value)?;
        merge(response.results, disjunctive_facets, refinements)
            .ok_or_else(|| TransportError::Decode("multi-query response has no results".to_string()))
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        let response = self
            .client
            .post(url)
            .header(APP_ID_HEADER, self.config.app_id())
            .header(API_KEY_HEADER, self.config.api_key())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            // The service reports failures as {"message": "...", "status": N}
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(text);
            warn!(status = status.as_u16(), %message, "search request rejected");
            return Err(TransportError::Http {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<Value>().await?)
    }

    fn spawn<F>(&self, work: F, completion: CompletionSender) -> Arc<dyn RequestHandle>
    where
        F: Future<Output = TransportOutcome> + Send + 'static,
    {
        let state = Arc::new(RequestState::new());

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            state.finish();
            completion.complete(Err(TransportError::Other(
                "HttpTransport requires a tokio runtime".to_string(),
            )));
            return state;
        };

        let task_state = Arc::clone(&state);
        runtime.spawn(async move {
            tokio::select! {
                biased;
                () = task_state.cancelled() => {
                    debug!("request cancelled before the response arrived");
                }
                outcome = work => {
                    if task_state.finish() {
                        completion.complete(outcome);
                    }
                }
            }
        });
        state
    }
}

impl SearchTransport for HttpTransport {
    fn execute_search(
        &self,
        query: &QueryState,
        completion: CompletionSender,
    ) -> Arc<dyn RequestHandle> {
        let transport = self.clone();
        let query = query.clone();
        self.spawn(async move { transport.search(&query).await }, completion)
    }

    fn execute_disjunctive_search(
        &self,
        query: &QueryState,
        disjunctive_facets: &[String],
        refinements: &IndexMap<String, Vec<String>>,
        completion: CompletionSender,
    ) -> Arc<dyn RequestHandle> {
        let transport = self.clone();
        let query = query.clone();
        let facets = disjunctive_facets.to_vec();
        let refinements = refinements.clone();
        self.spawn(
            async move {
                transport
                    .search_disjunctive(&query, &facets, &refinements)
                    .await
            },
            completion,
        )
    }
}
