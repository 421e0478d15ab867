use ahash::AHashMap;
use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::ProgressBar;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::analyze::{AnalysisResult, Analyzer};
use crate::error::FetchError;
use crate::probe::header_source::{analyze_url, HeaderSource};

/// Caller-owned cache of analysis results keyed by URL, with a TTL.
pub struct ResultCache {
    entries: RwLock<AHashMap<String, (Instant, AnalysisResult)>>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(AHashMap::new()),
            ttl,
        }
    }

    pub fn get(&self, url: &str) -> Option<AnalysisResult> {
        let entries = self.entries.read();
        entries
            .get(url)
            .filter(|(stored, _)| stored.elapsed() < self.ttl)
            .map(|(_, result)| result.clone())
    }

    pub fn insert(&self, url: &str, result: AnalysisResult) {
        self.entries.write().insert(url.to_string(), (Instant::now(), result));
    }

    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, (stored, _)| stored.elapsed() < self.ttl);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub url: String,
    pub result: Result<AnalysisResult, FetchError>,
}

/// Analyses many URLs concurrently. Every URL is fetched at most once;
/// retries belong to the header source.
pub struct BatchRunner {
    analyzer: Arc<Analyzer>,
    source: Arc<dyn HeaderSource>,
    semaphore: Arc<Semaphore>,
    cache: Option<Arc<ResultCache>>,
    progress: Option<ProgressBar>,
    completed: Arc<AtomicUsize>,
    errors: Arc<AtomicUsize>,
}

impl BatchRunner {
    pub fn new(analyzer: Arc<Analyzer>, source: Arc<dyn HeaderSource>, concurrency: usize) -> Self {
        Self {
            analyzer,
            source,
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
            cache: None,
            progress: None,
            completed: Arc::new(AtomicUsize::new(0)),
            errors: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Runs the batch and returns outcomes in input order. A task that
    /// panics yields no outcome and counts as a completed error.
    pub async fn run(&self, urls: Vec<String>) -> Vec<BatchOutcome> {
        if let Some(cache) = &self.cache {
            let purged = cache.purge_expired();
            if purged > 0 {
                debug!(purged, "dropped expired cache entries");
            }
        }

        let mut futures = FuturesUnordered::new();

        for (index, url) in urls.into_iter().enumerate() {
            let semaphore = self.semaphore.clone();
            let analyzer = self.analyzer.clone();
            let source = self.source.clone();
            let cache = self.cache.clone();
            let completed = self.completed.clone();
            let errors = self.errors.clone();
            let progress = self.progress.clone();

            futures.push(tokio::spawn(async move {
                // The semaphore is never closed while the runner is alive.
                let _permit = semaphore.acquire_owned().await.ok();

                let result = match cache.as_ref().and_then(|c| c.get(&url)) {
                    Some(hit) => {
                        debug!(url = %url, "cache hit");
                        Ok(hit)
                    }
                    None => analyze_url(&analyzer, source.as_ref(), &url).await,
                };

                match &result {
                    Ok(r) => {
                        if let Some(c) = &cache {
                            c.insert(&url, r.clone());
                        }
                    }
                    Err(e) => {
                        warn!(url = %url, error = %e, "analysis failed");
                        errors.fetch_add(1, Ordering::Relaxed);
                    }
                }
                completed.fetch_add(1, Ordering::Relaxed);
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
                (index, BatchOutcome { url, result })
            }));
        }

        let mut outcomes = Vec::with_capacity(futures.len());
        while let Some(joined) = futures.next().await {
            match joined {
                Ok(pair) => outcomes.push(pair),
                Err(e) => {
                    warn!(error = %e, "batch task panicked");
                    self.completed.fetch_add(1, Ordering::Relaxed);
                    self.errors.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
        outcomes.sort_by_key(|(index, _)| *index);
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }

    /// (completed, errors)
    pub fn get_stats(&self) -> (usize, usize) {
        (
            self.completed.load(Ordering::Relaxed),
            self.errors.load(Ordering::Relaxed),
        )
    }

    pub fn succeeded(&self) -> usize {
        let (completed, errors) = self.get_stats();
        completed.saturating_sub(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::HeaderMap;
    use async_trait::async_trait;
    use url::Url;

    struct Counting(AtomicUsize);

    #[async_trait]
    impl HeaderSource for Counting {
        async fn fetch(&self, url: &Url) -> Result<HeaderMap, FetchError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            let mut headers = HeaderMap::new();
            if url.host_str() == Some("good.test") {
                headers.insert("x-frame-options".into(), "DENY".into());
            }
            Ok(headers)
        }
    }

    #[tokio::test]
    async fn outcomes_follow_input_order() {
        let source = Arc::new(Counting(AtomicUsize::new(0)));
        let runner = BatchRunner::new(Arc::new(Analyzer::new()), source.clone(), 2);
        let urls = vec!["good.test".to_string(), "ftp://bad.test".to_string(), "other.test".to_string()];
        let outcomes = runner.run(urls).await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].url, "good.test");
        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[1].result.is_err());
        assert_eq!(runner.get_stats(), (3, 1));
        assert_eq!(source.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cache_prevents_refetch() {
        let source = Arc::new(Counting(AtomicUsize::new(0)));
        let cache = Arc::new(ResultCache::new(Duration::from_secs(60)));
        let runner = BatchRunner::new(Arc::new(Analyzer::new()), source.clone(), 1).with_cache(cache.clone());

        runner.run(vec!["good.test".to_string()]).await;
        runner.run(vec!["good.test".to_string()]).await;
        assert_eq!(source.0.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    struct Exploding;

    #[async_trait]
    impl HeaderSource for Exploding {
        async fn fetch(&self, _url: &Url) -> Result<HeaderMap, FetchError> {
            panic!("source blew up");
        }
    }

    #[tokio::test]
    async fn panicked_task_counts_as_completed_error() {
        let runner = BatchRunner::new(Arc::new(Analyzer::new()), Arc::new(Exploding), 1);
        let outcomes = runner.run(vec!["boom.test".to_string()]).await;
        assert!(outcomes.is_empty());
        assert_eq!(runner.get_stats(), (1, 1));
        assert_eq!(runner.succeeded(), 0);
    }

    #[tokio::test]
    async fn run_purges_expired_cache_entries() {
        let cache = Arc::new(ResultCache::new(Duration::ZERO));
        cache.insert("https://old.test/", Analyzer::new().analyze("https://old.test/", &HeaderMap::new()));
        let source = Arc::new(Counting(AtomicUsize::new(0)));
        let runner = BatchRunner::new(Arc::new(Analyzer::new()), source, 1).with_cache(cache.clone());

        runner.run(Vec::new()).await;
        assert!(cache.is_empty());
    }

    #[test]
    fn expired_entries_are_ignored() {
        let cache = ResultCache::new(Duration::ZERO);
        cache.insert("https://a.test/", Analyzer::new().analyze("https://a.test/", &HeaderMap::new()));
        assert!(cache.get("https://a.test/").is_none());
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }
}
