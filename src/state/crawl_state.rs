//! Shared crawl state
//!
//! One `CrawlState` exists per crawl. It owns the visited map, the admission
//! gate that caps concurrent fetch+extract work, and the completion barrier.
//! Workers receive it as an `Arc` and touch the map only through the methods
//! below; the map lock is never held across an `.await`.

use crate::crawler::PageRecord;
use crate::state::completion::{CompletionBarrier, WorkGuard};
use crate::state::PageState;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// A held admission-gate slot; released when dropped
#[derive(Debug)]
pub struct AdmissionSlot {
    _permit: OwnedSemaphorePermit,
}

/// Single source of truth for what has been visited and how much work may run
#[derive(Debug)]
pub struct CrawlState {
    /// Visited map keyed by normalized URL
    pages: Mutex<HashMap<String, PageState>>,

    /// Page-count ceiling, fixed for the whole crawl
    max_pages: usize,

    /// Keys that reached `Processed`
    processed: AtomicUsize,

    /// Admission gate limiting concurrent fetch+extract sequences
    admission: Arc<Semaphore>,

    /// Number of registered units of work not yet finished
    outstanding: Arc<CompletionBarrier>,
}

impl CrawlState {
    /// Creates the state for a crawl
    ///
    /// # Arguments
    ///
    /// * `max_pages` - Page-count ceiling
    /// * `max_concurrency` - Capacity of the admission gate (clamped to at least 1)
    pub fn new(max_pages: usize, max_concurrency: usize) -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            max_pages,
            processed: AtomicUsize::new(0),
            admission: Arc::new(Semaphore::new(max_concurrency.max(1))),
            outstanding: CompletionBarrier::new(),
        }
    }

    fn pages(&self) -> MutexGuard<'_, HashMap<String, PageState>> {
        // A panicking worker cannot leave the map half-written: every
        // mutation below is a single insert.
        self.pages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims a key for fetching
    ///
    /// Check and insert happen under one lock, so exactly one caller per key
    /// ever sees `true`. The winner owns fetching that page.
    pub fn try_claim(&self, key: &str) -> bool {
        match self.pages().entry(key.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(PageState::Claimed);
                true
            }
        }
    }

    /// Stores the finished record for a key claimed by the caller
    pub fn record(&self, key: &str, record: PageRecord) {
        if self.finish(key, PageState::Processed(record)) {
            self.processed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Marks a claimed key as failed; it keeps counting towards the page limit
    pub fn mark_failed(&self, key: &str, reason: impl Into<String>) {
        self.finish(
            key,
            PageState::Failed {
                reason: reason.into(),
            },
        );
    }

    /// Moves a claimed key to a terminal state; returns false if it was not claimed
    fn finish(&self, key: &str, state: PageState) -> bool {
        let mut pages = self.pages();
        match pages.get_mut(key) {
            Some(existing) if !existing.is_terminal() => {
                *existing = state;
                true
            }
            Some(existing) => {
                tracing::warn!(
                    "Ignoring second write for {} (already {})",
                    key,
                    existing.label()
                );
                false
            }
            None => {
                tracing::warn!("Ignoring write for unclaimed key {}", key);
                false
            }
        }
    }

    /// Returns whether the visited map has reached the page limit
    ///
    /// This is an admission guard, not a hard guarantee: workers that passed
    /// it just before the limit was reached may still claim a page.
    pub fn is_over_capacity(&self) -> bool {
        self.pages().len() >= self.max_pages
    }

    /// Waits for one admission-gate slot
    pub async fn acquire_slot(&self) -> AdmissionSlot {
        let permit = Arc::clone(&self.admission)
            .acquire_owned()
            .await
            .unwrap_or_else(|_| unreachable!("admission semaphore is never closed"));
        AdmissionSlot { _permit: permit }
    }

    /// Returns the number of free admission-gate slots
    pub fn available_slots(&self) -> usize {
        self.admission.available_permits()
    }

    /// Registers one unit of outstanding work
    pub fn register_work(&self) -> WorkGuard {
        self.outstanding.register()
    }

    /// Returns the number of units of work not yet finished
    pub fn outstanding_work(&self) -> usize {
        self.outstanding.outstanding()
    }

    /// Waits until every registered unit of work has finished
    pub async fn wait_for_completion(&self) {
        self.outstanding.wait().await;
    }

    /// Number of keys in the visited map, claimed or finished
    pub fn len(&self) -> usize {
        self.pages().len()
    }

    /// Returns true if nothing has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.pages().is_empty()
    }

    /// Number of pages successfully processed so far
    pub fn processed_count(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }

    /// Page-count ceiling of this crawl
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Drains the visited map
    ///
    /// Intended for the driver once the completion barrier has cleared.
    pub fn take_pages(&self) -> HashMap<String, PageState> {
        std::mem::take(&mut *self.pages())
    }
}
