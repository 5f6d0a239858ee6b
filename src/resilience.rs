//! Fallback policy for dashboard loads.
//!
//! A [`ResilienceShim`] owns the demo snapshot for one screen session and
//! numbers every load it starts. A failed fetch or transform never escapes:
//! the caller gets the fallback, a demo flag and a single notice. Results are
//! applied through [`ViewState::apply`], which drops anything but the most
//! recently issued load so overlapping refreshes cannot clobber newer state.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::error::ClientError;

pub const DEMO_NOTICE_TITLE: &str = "Using Demo Data";
pub const DEMO_NOTICE_MESSAGE: &str =
    "Could not connect to backend. Showing demo data instead.";

/// User-facing advisory raised once per load that fell back to demo data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoNotice {
    pub title: &'static str,
    pub message: &'static str,
    pub cause: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<A> {
    pub analytics: A,
    pub is_demo: bool,
    pub notice: Option<DemoNotice>,
    pub generation: u64,
}

pub struct ResilienceShim<A> {
    fallback: A,
    issued: AtomicU64,
}

impl<A: Clone> ResilienceShim<A> {
    pub fn new(fallback: A) -> Self {
        Self {
            fallback,
            issued: AtomicU64::new(0),
        }
    }

    /// Runs `fetcher` then `transformer`. `transformer` is only called when
    /// the fetch succeeded.
    pub async fn load<R, Fetch, Fut, Transform>(
        &self,
        fetcher: Fetch,
        transformer: Transform,
    ) -> Loaded<A>
    where
        Fetch: FnOnce() -> Fut,
        Fut: Future<Output = Result<R, ClientError>>,
        Transform: FnOnce(R) -> Result<A, ClientError>,
    {
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        match fetcher().await.and_then(transformer) {
            Ok(analytics) => Loaded {
                analytics,
                is_demo: false,
                notice: None,
                generation,
            },
            Err(err) => {
                warn!(error = %err, generation, "Load failed, using demo data");
                Loaded {
                    analytics: self.fallback.clone(),
                    is_demo: true,
                    notice: Some(DemoNotice {
                        title: DEMO_NOTICE_TITLE,
                        message: DEMO_NOTICE_MESSAGE,
                        cause: err.to_string(),
                    }),
                    generation,
                }
            }
        }
    }

    pub fn latest_generation(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, loaded: &Loaded<A>) -> bool {
        loaded.generation == self.latest_generation()
    }

    /// The screen went away; every outstanding load becomes stale.
    pub fn detach(&self) {
        self.issued.fetch_add(1, Ordering::SeqCst);
    }
}

/// Analytics currently shown by a screen.
#[derive(Debug)]
pub struct ViewState<A> {
    current: Option<Loaded<A>>,
}

impl<A> Default for ViewState<A> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<A: Clone> ViewState<A> {
    /// Applies `loaded` only when it is the latest load `shim` issued.
    pub fn apply(&mut self, shim: &ResilienceShim<A>, loaded: Loaded<A>) -> bool {
        if !shim.is_current(&loaded) {
            debug!(
                generation = loaded.generation,
                latest = shim.latest_generation(),
                "Discarding stale load"
            );
            return false;
        }

        self.current = Some(loaded);
        true
    }

    pub fn current(&self) -> Option<&Loaded<A>> {
        self.current.as_ref()
    }

    pub fn is_demo(&self) -> bool {
        self.current.as_ref().is_some_and(|loaded| loaded.is_demo)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[tokio::test]
    async fn failed_fetch_returns_fallback_without_transforming() {
        let shim = ResilienceShim::new(7u32);
        let transformed = Cell::new(false);

        let loaded = shim
            .load(
                || async { Err::<u32, _>(ClientError::NetworkFailure("offline".into())) },
                |raw| {
                    transformed.set(true);
                    Ok(raw)
                },
            )
            .await;

        assert_eq!(loaded.analytics, 7);
        assert!(loaded.is_demo);
        assert!(!transformed.get());
        let notice = loaded.notice.unwrap();
        assert_eq!(notice.title, DEMO_NOTICE_TITLE);
        assert!(notice.cause.contains("offline"));
    }

    #[tokio::test]
    async fn transformer_failure_falls_back() {
        let shim = ResilienceShim::new(0u32);

        let loaded = shim
            .load(
                || async { Ok::<_, ClientError>(Vec::<u32>::new()) },
                |_| Err(ClientError::EmptyInput),
            )
            .await;

        assert!(loaded.is_demo);
        assert_eq!(loaded.analytics, 0);
    }

    #[tokio::test]
    async fn successful_load_is_live() {
        let shim = ResilienceShim::new(0u32);

        let loaded = shim
            .load(
                || async { Ok::<_, ClientError>(vec![1u32, 2, 3]) },
                |raw| Ok(raw.iter().sum()),
            )
            .await;

        assert_eq!(loaded.analytics, 6);
        assert!(!loaded.is_demo);
        assert!(loaded.notice.is_none());
    }

    #[tokio::test]
    async fn stale_loads_are_not_applied() {
        let shim = ResilienceShim::new(0u32);
        let mut view = ViewState::default();

        let older = shim.load(|| async { Ok::<_, ClientError>(1u32) }, Ok).await;
        let newer = shim.load(|| async { Ok::<_, ClientError>(2u32) }, Ok).await;

        assert!(view.apply(&shim, newer));
        assert!(!view.apply(&shim, older));
        assert_eq!(view.current().map(|loaded| loaded.analytics), Some(2));
    }

    #[tokio::test]
    async fn detached_screen_ignores_outstanding_load() {
        let shim = ResilienceShim::new(0u32);
        let mut view = ViewState::default();

        let loaded = shim.load(|| async { Ok::<_, ClientError>(5u32) }, Ok).await;
        shim.detach();

        assert!(!view.apply(&shim, loaded));
        assert!(view.current().is_none());
        assert!(!view.is_demo());
    }
}
