//! Scan orchestration and the live tree.
//!
//! [`ScanOrchestrator`] wires discovery, staleness detection, status fetching and
//! the cache together and owns the live tree the presentation layer reads.
//!
//! # Lifecycle
//! `Idle → LoadingCache → DisplayingCached → Refreshing → Idle`, published on a
//! watch channel together with the tree itself.
//!
//! # Concurrency rules
//! - Scans queue behind each other through a single permit; an in-flight scan is
//!   never interrupted
//! - Repositories are fetched in batches; batch N+1 starts only after every
//!   fetch of batch N has finished
//! - Fetch results are applied to the tree one at a time by the scanning task;
//!   the tree lock is never held across an `.await`

use crate::core::cache::{CacheStore, SaveOutcome};
use crate::core::discovery::Discoverer;
use crate::core::error::{GitFleetError, Result};
use crate::core::fetcher::{FetchMode, StatusFetcher};
use crate::core::process::ProcessRunner;
use crate::core::staleness::StalenessDetector;
use crate::core::state::{self, StatusSnapshot, TreeNode};
use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    LoadingCache,
    DisplayingCached,
    Refreshing,
}

/// What the next discovery pass covers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSettings {
    pub root_paths: Vec<PathBuf>,
    pub ignored_paths: HashSet<PathBuf>,
    pub cache_max_age: Duration,
    pub batch_floor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheWrite {
    Written,
    Throttled,
    /// A newer tree was already on disk
    Superseded,
    Failed,
}

impl From<SaveOutcome> for CacheWrite {
    fn from(outcome: SaveOutcome) -> Self {
        match outcome {
            SaveOutcome::Written => CacheWrite::Written,
            SaveOutcome::Throttled => CacheWrite::Throttled,
            SaveOutcome::Superseded => CacheWrite::Superseded,
        }
    }
}

/// Summary of one full scan or light refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub repositories: usize,
    pub full_fetches: usize,
    pub light_fetches: usize,
    pub skipped_fresh: usize,
    pub batches: usize,
    pub cache: CacheWrite,
}

#[derive(Debug)]
pub enum StartupOutcome {
    /// A valid cache was published; a light refresh runs in the background
    FromCache(JoinHandle<Result<ScanReport>>),
    /// No usable cache, a full scan already ran
    FullScan(ScanReport),
}

pub struct ScanOrchestrator<R> {
    discoverer: Discoverer,
    fetcher: StatusFetcher<R>,
    staleness: StalenessDetector,
    cache: Arc<CacheStore>,
    settings: RwLock<ScanSettings>,
    tree: RwLock<Vec<TreeNode>>,
    scan_permit: Semaphore,
    state_tx: watch::Sender<ScanState>,
    tree_tx: watch::Sender<Arc<Vec<TreeNode>>>,
}

impl<R: ProcessRunner> ScanOrchestrator<R> {
    pub fn new(
        discoverer: Discoverer,
        fetcher: StatusFetcher<R>,
        staleness: StalenessDetector,
        cache: Arc<CacheStore>,
        settings: ScanSettings,
    ) -> Self {
        let (state_tx, _) = watch::channel(ScanState::Idle);
        let (tree_tx, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            discoverer,
            fetcher,
            staleness,
            cache,
            settings: RwLock::new(settings),
            tree: RwLock::new(Vec::new()),
            scan_permit: Semaphore::new(1),
            state_tx,
            tree_tx,
        }
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ScanState> {
        self.state_tx.subscribe()
    }

    pub fn subscribe_tree(&self) -> watch::Receiver<Arc<Vec<TreeNode>>> {
        self.tree_tx.subscribe()
    }

    pub fn state(&self) -> ScanState {
        *self.state_tx.borrow()
    }

    pub fn tree(&self) -> Vec<TreeNode> {
        self.read_tree().clone()
    }

    pub fn settings(&self) -> ScanSettings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Flat project list derived from the tree: `(path, snapshot)` per repository
    pub fn repositories(&self) -> Vec<(PathBuf, Option<Arc<StatusSnapshot>>)> {
        state::repositories(&self.read_tree())
            .into_iter()
            .map(|node| (node.path.clone(), node.snapshot.clone()))
            .collect()
    }

    /// Publish the cached tree when the cache on disk fits the current roots
    pub async fn restore_cached(&self) -> Result<bool> {
        self.set_state(ScanState::LoadingCache);
        let settings = self.settings();
        let cache = self.cache.clone();
        let record = tokio::task::spawn_blocking(move || cache.load()).await?;

        match record {
            Some(record)
                if self
                    .cache
                    .is_valid(&record, &settings.root_paths, settings.cache_max_age) =>
            {
                log::info!("Showing cached tree from {}", record.timestamp);
                *self.write_tree() = record.tree;
                self.publish_tree();
                self.set_state(ScanState::DisplayingCached);
                Ok(true)
            }
            _ => {
                self.set_state(ScanState::Idle);
                Ok(false)
            }
        }
    }

    /// Show the cached tree right away when possible, then bring it up to date
    pub async fn startup(self: &Arc<Self>) -> Result<StartupOutcome> {
        if self.restore_cached().await? {
            let this = Arc::clone(self);
            return Ok(StartupOutcome::FromCache(tokio::spawn(async move {
                this.light_refresh().await
            })));
        }
        log::info!("No usable cache, running full scan");
        Ok(StartupOutcome::FullScan(self.full_scan().await?))
    }

    /// Discover everything and fetch every repository from scratch
    pub async fn full_scan(&self) -> Result<ScanReport> {
        let _permit = self.acquire_scan_permit().await?;
        self.set_state(ScanState::Refreshing);
        log::info!("Starting full scan");

        self.rediscover().await;
        let work: Vec<(PathBuf, FetchMode, Option<Arc<StatusSnapshot>>)> =
            state::repositories(&self.read_tree())
                .into_iter()
                .map(|node| (node.path.clone(), FetchMode::Full, None))
                .collect();

        let report = self.run_batches(work, 0).await;
        self.set_state(ScanState::Idle);
        log::info!(
            "Full scan finished: {} repositories in {} batches",
            report.repositories,
            report.batches
        );
        Ok(report)
    }

    /// Fetch only repositories whose git metadata moved since they were observed
    pub async fn light_refresh(&self) -> Result<ScanReport> {
        let _permit = self.acquire_scan_permit().await?;
        self.set_state(ScanState::Refreshing);
        log::info!("Starting light refresh");

        self.rediscover().await;
        let candidates: Vec<(PathBuf, Option<DateTime<Utc>>, Option<Arc<StatusSnapshot>>)> =
            state::repositories(&self.read_tree())
                .into_iter()
                .map(|node| (node.path.clone(), node.last_observed, node.snapshot.clone()))
                .collect();

        let total = candidates.len();
        let work: Vec<_> = candidates
            .into_iter()
            .filter_map(|(path, observed, snapshot)| match snapshot {
                None => Some((path, FetchMode::Full, None)),
                Some(snapshot) if self.staleness.is_stale(&path, observed) => {
                    Some((path, FetchMode::Light, Some(snapshot)))
                }
                Some(_) => None,
            })
            .collect();
        let skipped = total - work.len();

        let report = self.run_batches(work, skipped).await;
        self.set_state(ScanState::Idle);
        log::info!(
            "Light refresh finished: {} refreshed, {} unchanged",
            report.light_fetches + report.full_fetches,
            report.skipped_fresh
        );
        Ok(report)
    }

    /// Switch branches in one repository and refetch it from scratch
    pub async fn switch_branch(&self, repo: &Path, branch: &str) -> Result<Arc<StatusSnapshot>> {
        self.fetcher.switch_branch(repo, branch).await?;
        let started = Utc::now();
        let snapshot = Arc::new(self.fetcher.fetch(repo, FetchMode::Full, None).await);
        self.apply(repo, snapshot.clone(), started);
        self.publish_tree();
        Ok(snapshot)
    }

    pub fn add_root(&self, root: PathBuf) {
        let mut settings = self.write_settings();
        if !settings.root_paths.contains(&root) {
            settings.root_paths.push(root);
        }
    }

    /// Stop monitoring a root; its subtree leaves the tree immediately
    pub fn remove_root(&self, root: &Path) -> bool {
        self.write_settings().root_paths.retain(|p| p != root);
        self.evict(root)
    }

    /// Exclude a path from discovery and drop it from the tree right away
    pub fn ignore_path(&self, path: PathBuf) -> bool {
        let evicted = self.evict(&path);
        self.write_settings().ignored_paths.insert(path);
        evicted
    }

    pub fn mark_reviewed(&self, path: &Path) -> Result<()> {
        {
            let mut tree = self.write_tree();
            let node = state::find_node_mut(&mut tree, path)
                .ok_or_else(|| GitFleetError::not_a_repository(path))?;
            node.last_reviewed = Some(Utc::now());
        }
        self.publish_tree();
        Ok(())
    }

    /// Persist the current tree; `force` bypasses the write throttle
    pub async fn persist(&self, force: bool) -> CacheWrite {
        let root_paths = self.settings().root_paths;
        // Stamped under the tree lock so record timestamps order like tree states
        let record = {
            let tree = self.read_tree();
            CacheStore::record_for(&root_paths, tree.clone())
        };
        let cache = self.cache.clone();
        match tokio::task::spawn_blocking(move || cache.save(&record, force)).await {
            Ok(Ok(outcome)) => outcome.into(),
            Ok(Err(e)) => {
                log::warn!("Failed to save cache: {e}");
                CacheWrite::Failed
            }
            Err(e) => {
                log::warn!("Cache writer task failed: {e}");
                CacheWrite::Failed
            }
        }
    }

    async fn acquire_scan_permit(&self) -> Result<tokio::sync::SemaphorePermit<'_>> {
        if self.scan_permit.available_permits() == 0 {
            log::debug!("Scan already running, queueing request");
        }
        self.scan_permit
            .acquire()
            .await
            .map_err(|e| GitFleetError::Io(std::io::Error::other(e)))
    }

    /// Replace the tree shape with a fresh discovery pass, keeping known snapshots
    async fn rediscover(&self) {
        let settings = self.settings();
        let fresh = self
            .discoverer
            .discover(&settings.root_paths, &settings.ignored_paths)
            .await;
        {
            let mut tree = self.write_tree();
            let merged = merge_skeleton(fresh, &tree);
            *tree = merged;
        }
        self.publish_tree();
    }

    async fn run_batches(
        &self,
        work: Vec<(PathBuf, FetchMode, Option<Arc<StatusSnapshot>>)>,
        skipped_fresh: usize,
    ) -> ScanReport {
        let batch_size = batch_size(self.settings().batch_floor);
        let mut report = ScanReport {
            repositories: work.len() + skipped_fresh,
            full_fetches: 0,
            light_fetches: 0,
            skipped_fresh,
            batches: 0,
            cache: CacheWrite::Throttled,
        };

        for batch in work.chunks(batch_size) {
            report.batches += 1;
            log::debug!("Batch {}: {} repositories", report.batches, batch.len());

            let mut in_flight: FuturesUnordered<_> = batch
                .iter()
                .cloned()
                .map(|(path, mode, previous)| async move {
                    let started = Utc::now();
                    let snapshot = self.fetcher.fetch(&path, mode, previous.as_deref()).await;
                    (path, mode, snapshot, started)
                })
                .collect();

            while let Some((path, mode, snapshot, started)) = in_flight.next().await {
                match mode {
                    FetchMode::Full => report.full_fetches += 1,
                    FetchMode::Light => report.light_fetches += 1,
                }
                self.apply(&path, Arc::new(snapshot), started);
            }
            self.publish_tree();
        }

        report.cache = self.persist(false).await;
        report
    }

    /// Single write path for fetch results.
    ///
    /// `observed_at` is when the fetch started: git metadata touched while it
    /// was running must still count as newer than the snapshot.
    fn apply(&self, path: &Path, snapshot: Arc<StatusSnapshot>, observed_at: DateTime<Utc>) {
        let mut tree = self.write_tree();
        match state::find_node_mut(&mut tree, path) {
            Some(node) => node.apply_snapshot(snapshot, observed_at),
            None => log::debug!("{} left the tree during fetch, dropping result", path.display()),
        }
    }

    fn evict(&self, path: &Path) -> bool {
        let removed = state::remove_node(&mut self.write_tree(), path);
        if removed {
            log::info!("Evicted {} from the tree", path.display());
            self.publish_tree();
        }
        removed
    }

    fn publish_tree(&self) {
        let snapshot = Arc::new(self.tree());
        self.tree_tx.send_replace(snapshot);
    }

    fn set_state(&self, state: ScanState) {
        self.state_tx.send_replace(state);
    }

    fn read_tree(&self) -> RwLockReadGuard<'_, Vec<TreeNode>> {
        self.tree.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_tree(&self) -> RwLockWriteGuard<'_, Vec<TreeNode>> {
        self.tree.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_settings(&self) -> RwLockWriteGuard<'_, ScanSettings> {
        self.settings.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Repositories fetched together: host parallelism, never below `floor`
pub fn batch_size(floor: usize) -> usize {
    let parallelism = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    parallelism.max(floor).max(1)
}

/// Overlay per-path state from the previous tree onto a fresh discovery result.
///
/// Nodes missing from `fresh` are gone afterwards; rediscovered repositories keep
/// their snapshot and observation time until a new fetch replaces them.
pub fn merge_skeleton(mut fresh: Vec<TreeNode>, previous: &[TreeNode]) -> Vec<TreeNode> {
    let mut known = HashMap::new();
    index_by_path(previous, &mut known);
    carry_over(&mut fresh, &known);
    fresh
}

fn index_by_path<'a>(nodes: &'a [TreeNode], index: &mut HashMap<&'a Path, &'a TreeNode>) {
    for node in nodes {
        index.insert(node.path.as_path(), node);
        index_by_path(&node.children, index);
    }
}

fn carry_over(nodes: &mut [TreeNode], known: &HashMap<&Path, &TreeNode>) {
    for node in nodes.iter_mut() {
        if let Some(old) = known.get(node.path.as_path()) {
            node.last_reviewed = old.last_reviewed;
            if node.is_repository() && old.is_repository() {
                node.snapshot = old.snapshot.clone();
                node.last_observed = old.last_observed;
            }
        }
        carry_over(&mut node.children, known);
    }
}
