use async_trait::async_trait;
use dashmap::DashMap;
use extract::{Summarizer, SummarizerError};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Memoizes summarizer output by prompt hash. Failures are not cached.
pub struct CachingSummarizer {
    inner: Arc<dyn Summarizer>,
    responses: DashMap<String, String>,
    max_entries: usize,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl CachingSummarizer {
    pub fn new(inner: Arc<dyn Summarizer>, max_entries: usize) -> Self {
        Self {
            inner,
            responses: DashMap::new(),
            max_entries,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    fn insert(&self, key: String, response: String) {
        if self.max_entries == 0 {
            return;
        }
        if self.responses.len() >= self.max_entries {
            // clear a quarter when full
            let to_remove: Vec<_> = self
                .responses
                .iter()
                .take((self.max_entries / 4).max(1))
                .map(|r| r.key().clone())
                .collect();
            for key in to_remove {
                self.responses.remove(&key);
            }
        }
        self.responses.insert(key, response);
    }

    fn hash_prompt(prompt: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(prompt.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.responses.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub fn clear(&self) {
        self.responses.clear();
    }
}

#[async_trait]
impl Summarizer for CachingSummarizer {
    async fn summarize(&self, prompt: &str) -> Result<String, SummarizerError> {
        let key = Self::hash_prompt(prompt);
        if let Some(hit) = self.responses.get(&key).map(|r| r.value().clone()) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let response = self.inner.summarize(prompt).await?;
        self.insert(key, response.clone());
        Ok(response)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo {
        calls: AtomicUsize,
        fail: bool,
    }

    impl Echo {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl Summarizer for Echo {
        async fn summarize(&self, prompt: &str) -> Result<String, SummarizerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SummarizerError::Status(503));
            }
            Ok(format!("summary of {prompt}"))
        }
    }

    #[tokio::test]
    async fn repeated_prompts_hit_the_cache() {
        let inner = Echo::new(false);
        let cache = CachingSummarizer::new(inner.clone(), 100);

        let first = cache.summarize("röse").await.unwrap();
        let second = cache.summarize("röse").await.unwrap();
        cache.summarize("hög").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            cache.stats(),
            CacheStats {
                entries: 2,
                hits: 1,
                misses: 2
            }
        );
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let inner = Echo::new(true);
        let cache = CachingSummarizer::new(inner.clone(), 100);

        assert!(cache.summarize("röse").await.is_err());
        assert!(cache.summarize("röse").await.is_err());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().entries, 0);
    }

    #[tokio::test]
    async fn a_full_cache_evicts_a_quarter() {
        let cache = CachingSummarizer::new(Echo::new(false), 8);
        for i in 0..8 {
            cache.summarize(&i.to_string()).await.unwrap();
        }
        assert_eq!(cache.stats().entries, 8);

        cache.summarize("one more").await.unwrap();
        assert_eq!(cache.stats().entries, 7);
    }
}
