// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use crate::config::Config;
use crate::error::{FetchError, Result, RosterCacheError};
use crate::fetcher::RosterFetcher;
use crate::snapshot::{NodePrice, RosterSnapshot};
use crate::types::RosterRequest;
use futures::FutureExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, info, warn};

type RefreshOutcome = Result<Arc<RosterSnapshot>>;

/// Observable state of a single cache entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    /// Nothing has been fetched yet (or every previous fetch failed) and no refresh is running.
    Empty,

    /// A refresh is outstanding. A previous snapshot might still be available.
    Fetching,

    /// A snapshot is available and no refresh is running. It might be stale.
    Ready,
}

/// Last known-good snapshot alongside the moment it was stored.
#[derive(Debug, Clone)]
pub struct CachedRoster {
    pub snapshot: Arc<RosterSnapshot>,
    pub last_updated: Instant,
}

impl CachedRoster {
    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.last_updated)
    }

    pub fn is_fresh(&self, stale_threshold: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.last_updated) < stale_threshold
    }
}

#[derive(Default)]
struct CacheEntry {
    current: Option<CachedRoster>,

    // explicitly marked as stale, regardless of its age
    invalidated: bool,

    // set exactly while a refresh is outstanding; holds everyone waiting for its outcome
    in_flight: Option<Vec<oneshot::Sender<RefreshOutcome>>>,
}

impl CacheEntry {
    fn status(&self) -> CacheStatus {
        if self.in_flight.is_some() {
            CacheStatus::Fetching
        } else if self.current.is_some() {
            CacheStatus::Ready
        } else {
            CacheStatus::Empty
        }
    }

    fn fresh_snapshot(
        &self,
        stale_threshold: Duration,
        now: Instant,
    ) -> Option<Arc<RosterSnapshot>> {
        if self.invalidated {
            return None;
        }

        self.current
            .as_ref()
            .filter(|cached| cached.is_fresh(stale_threshold, now))
            .map(|cached| Arc::clone(&cached.snapshot))
    }
}

/// Staleness-gated, single-flight cache over a [`RosterFetcher`].
///
/// Entries are keyed by the full [`RosterRequest`], so different realms or product sets never
/// observe each other's data nor join each other's refreshes.
///
/// Refreshes run as spawned tasks, so the cache has to be used from within a tokio runtime.
/// A caller that stops waiting does not cancel the refresh for everyone else.
///
/// A fetcher that panics is reported to all waiters as [`FetchError::Aborted`] only when built
/// with `panic = "unwind"`. Under `panic = "abort"`, as in this workspace's dev and release
/// profiles, such a panic takes down the process, so fetchers should return [`FetchError`]s.
pub struct RosterCache<F> {
    inner: Arc<RosterCacheInner<F>>,
}

impl<F> Clone for RosterCache<F> {
    fn clone(&self) -> Self {
        RosterCache {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct RosterCacheInner<F> {
    config: Config,
    fetcher: F,
    entries: Mutex<HashMap<RosterRequest, CacheEntry>>,
}

impl<F> RosterCache<F>
where
    F: RosterFetcher + 'static,
{
    pub fn new(fetcher: F, config: Config) -> Self {
        RosterCache {
            inner: Arc::new(RosterCacheInner {
                config,
                fetcher,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the current roster for the request, refreshing it if the cached copy went stale.
    ///
    /// If a refresh for the same request is already running, its outcome is returned instead of
    /// starting another one. A failed refresh is reported as-is: the previous snapshot is never
    /// substituted for it, use [`RosterCache::cached_snapshot`] to explicitly fall back.
    pub async fn get_roster(&self, request: &RosterRequest) -> Result<Arc<RosterSnapshot>> {
        request.validate()?;

        let outcome = {
            let mut entries = self.inner.entries.lock();
            let entry = entries.entry(request.clone()).or_default();

            let (tx, rx) = oneshot::channel();
            if let Some(waiters) = entry.in_flight.as_mut() {
                debug!(
                    "joining in-flight roster refresh for realm {}",
                    request.realm_id
                );
                waiters.push(tx);
            } else if let Some(snapshot) =
                entry.fresh_snapshot(self.inner.config.stale_threshold, Instant::now())
            {
                debug!("serving cached roster for realm {}", request.realm_id);
                return Ok(snapshot);
            } else {
                info!("refreshing node roster for realm {}", request.realm_id);
                entry.in_flight = Some(vec![tx]);
                self.spawn_refresh(request.clone());
            }
            rx
        };

        outcome
            .await
            .map_err(|_| RosterCacheError::unavailable(request.realm_id, FetchError::Aborted))?
    }

    /// Node prices of the current roster, cheapest first.
    pub async fn get_node_prices(&self, request: &RosterRequest) -> Result<Vec<NodePrice>> {
        let roster = self.get_roster(request).await?;
        Ok(roster.node_prices.clone())
    }

    /// Last known-good snapshot for the request, regardless of its age. Never triggers a fetch.
    pub fn cached_snapshot(&self, request: &RosterRequest) -> Option<CachedRoster> {
        self.inner
            .entries
            .lock()
            .get(request)
            .and_then(|entry| entry.current.clone())
    }

    pub fn status(&self, request: &RosterRequest) -> CacheStatus {
        self.inner
            .entries
            .lock()
            .get(request)
            .map(CacheEntry::status)
            .unwrap_or(CacheStatus::Empty)
    }

    /// Force the next lookup of the request to go to the fetcher.
    /// The current snapshot remains available through [`RosterCache::cached_snapshot`].
    pub fn invalidate(&self, request: &RosterRequest) {
        if let Some(entry) = self.inner.entries.lock().get_mut(request) {
            entry.invalidated = true;
        }
    }

    /// Remove all stored rosters. Refreshes that are still running are left untouched.
    pub fn clear(&self) {
        self.inner.entries.lock().retain(|_, entry| {
            entry.current = None;
            entry.invalidated = false;
            entry.in_flight.is_some()
        });
    }

    fn spawn_refresh(&self, request: RosterRequest) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            // catching the panic is only effective with `panic = "unwind"`
            let outcome = AssertUnwindSafe(inner.fetch_snapshot(&request))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    warn!(
                        "roster fetcher panicked while refreshing realm {}",
                        request.realm_id
                    );
                    Err(RosterCacheError::unavailable(
                        request.realm_id,
                        FetchError::Aborted,
                    ))
                });
            inner.complete_refresh(&request, outcome);
        });
    }
}

impl<F> RosterCacheInner<F>
where
    F: RosterFetcher,
{
    async fn fetch_snapshot(&self, request: &RosterRequest) -> RefreshOutcome {
        let raw = self
            .fetcher
            .fetch_roster(request.realm_id, &request.product_ids)
            .await
            .map_err(|err| RosterCacheError::unavailable(request.realm_id, err))?;

        let snapshot = RosterSnapshot::from_raw(request, raw)
            .map_err(|err| RosterCacheError::unavailable(request.realm_id, err))?;

        Ok(Arc::new(snapshot))
    }

    fn complete_refresh(&self, request: &RosterRequest, outcome: RefreshOutcome) {
        // clearing the in-flight marker and storing the snapshot happen under the same lock,
        // so no caller can observe one without the other
        let waiters = {
            let mut entries = self.entries.lock();
            let entry = entries.entry(request.clone()).or_default();
            if let Ok(snapshot) = &outcome {
                entry.current = Some(CachedRoster {
                    snapshot: Arc::clone(snapshot),
                    last_updated: Instant::now(),
                });
                entry.invalidated = false;
            }
            let waiters = entry.in_flight.take().unwrap_or_default();

            // don't keep empty entries around for requests that never succeeded
            if entry.current.is_none() {
                entries.remove(request);
            }
            waiters
        };

        match &outcome {
            Ok(snapshot) => info!(
                "refreshed node roster for realm {} at epoch {}: {} nodes (min {})",
                request.realm_id,
                snapshot.epoch_id,
                snapshot.node_prices.len(),
                snapshot.min_node_count
            ),
            Err(err) => match std::error::Error::source(err) {
                Some(source) => warn!("{err}: {source}"),
                None => warn!("{err}"),
            },
        }

        for waiter in waiters {
            // the waiter might have stopped caring about the result
            let _ = waiter.send(outcome.clone());
        }
    }
}
