// Command-line search: runs one query against the configured index.
//
// Usage: kodegen-instantsearch <query> [facet ...]
// Credentials come from ALGOLIA_APP_ID, ALGOLIA_API_KEY and ALGOLIA_INDEX_NAME.

use anyhow::{Context, Result, anyhow};
use kodegen_tools_instantsearch::{
    HttpTransport, QueryState, ResultObserver, SearchResults, Searcher, TransportConfig,
    TransportError,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

type Outcome = Result<SearchResults, TransportError>;

/// Forwards the first outcome to `main`
struct ChannelObserver(mpsc::UnboundedSender<Outcome>);

impl ResultObserver for ChannelObserver {
    fn on_results(&self, results: &SearchResults, _is_loading_more: bool) {
        let _ = self.0.send(Ok(results.clone()));
    }

    fn on_error(&self, _query: &QueryState, error: &TransportError) {
        let _ = self.0.send(Err(error.clone()));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let mut args = std::env::args().skip(1);
    let text = args
        .next()
        .ok_or_else(|| anyhow!("usage: kodegen-instantsearch <query> [facet ...]"))?;
    let facets: Vec<String> = args.collect();

    let config = TransportConfig::from_env().context("failed to read transport configuration")?;
    let timeout = config.request_timeout() + Duration::from_secs(1);
    let transport = Arc::new(HttpTransport::new(config)?);
    let searcher = Searcher::builder(transport).build()?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    searcher.register_observer(Arc::new(ChannelObserver(tx)));
    let facet_refs: Vec<&str> = facets.iter().map(String::as_str).collect();
    searcher.add_facets(&facet_refs).search_query(text);

    let outcome = tokio::time::timeout(timeout, rx.recv())
        .await
        .context("search timed out")?
        .ok_or_else(|| anyhow!("searcher stopped before answering"))?;
    let results = outcome?;

    println!(
        "{} hits on page {}/{}",
        results.payload.nb_hits.unwrap_or(results.hits().len() as u64),
        results.page() + 1,
        results.nb_pages().max(1)
    );
    for (attribute, stat) in searcher.facet_stats() {
        println!(
            "{attribute}: min={} max={} avg={:.3} sum={}",
            stat.min, stat.max, stat.avg, stat.sum
        );
    }

    searcher.shutdown().await;
    Ok(())
}
