//! Mutation watcher
//!
//! Subscribes to child-list changes under the body and turns each delivered
//! batch into a delayed recolor pass. The delay gives the host time to resolve
//! styles for brand-new nodes; it is not a correctness mechanism.
//!
//! Delayed passes are plain entries in a [`WorkQueue`] keyed by due instant.
//! Nothing runs on its own: the owner drains batches and runs due passes when it
//! is pumped, which keeps execution single-threaded and lets tests step time
//! explicitly or flush everything at once.

use crate::core::error::{DarkModeError, Result};
use crate::page::{ChangeFeed, DocumentTree, MutationBatch, NodeId, ObserverId};
use crossbeam_channel::{Receiver, TryRecvError};
use log::{debug, info, trace};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

// =============================================================================
// Work Queue
// =============================================================================

/// A recolor pass waiting for its delay to elapse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPass {
    /// When the pass may run
    pub due: Instant,
    /// Element roots inserted by one mutation batch
    pub roots: Vec<NodeId>,
}

/// FIFO of delayed passes.
///
/// Batches are never coalesced: each one keeps its own entry even when several
/// arrive within the same delay window.
#[derive(Debug, Default)]
pub struct WorkQueue {
    pending: VecDeque<PendingPass>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, roots: Vec<NodeId>, due: Instant) {
        self.pending.push_back(PendingPass { due, roots });
    }

    /// Remove and return every pass due at or before `now`, oldest first
    pub fn take_due(&mut self, now: Instant) -> Vec<PendingPass> {
        let (due, waiting): (VecDeque<_>, VecDeque<_>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = waiting;
        due.into()
    }

    /// Remove and return every pass regardless of its due time
    pub fn drain_all(&mut self) -> Vec<PendingPass> {
        self.pending.drain(..).collect()
    }

    /// Drop every pending pass, returning how many were cancelled
    pub fn cancel(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    /// Earliest due time, if anything is pending
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|p| p.due).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// =============================================================================
// Mutation Watcher
// =============================================================================

/// Standing subscription to structural changes under the body
#[derive(Debug)]
pub struct MutationWatcher {
    observer: ObserverId,
    batches: Receiver<MutationBatch>,
    queue: WorkQueue,
    delay: Duration,
}

impl MutationWatcher {
    /// Subscribe to child-list changes anywhere under the body
    pub fn start<P>(page: &mut P, delay: Duration) -> Result<Self>
    where
        P: ChangeFeed + DocumentTree + ?Sized,
    {
        let body = page.body().ok_or(DarkModeError::NoBody)?;
        let (observer, batches) = page.observe_child_list(body)?;
        info!("Watching {} for inserted elements", body);

        Ok(Self {
            observer,
            batches,
            queue: WorkQueue::new(),
            delay,
        })
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Drain delivered batches and schedule a pass for each one that added elements.
    ///
    /// Returns the number of passes scheduled.
    pub fn collect<P>(&mut self, page: &P, now: Instant) -> usize
    where
        P: DocumentTree + ?Sized,
    {
        let mut scheduled = 0;
        loop {
            match self.batches.try_recv() {
                Ok(batch) => {
                    let roots: Vec<NodeId> = batch
                        .added
                        .into_iter()
                        .filter(|&node| page.is_element(node))
                        .collect();
                    if roots.is_empty() {
                        trace!("Ignoring batch without element nodes");
                        continue;
                    }
                    trace!("Scheduling pass over {} inserted roots", roots.len());
                    self.queue.schedule(roots, now + self.delay);
                    scheduled += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("Change feed closed by host");
                    break;
                }
            }
        }
        scheduled
    }

    /// Passes whose delay has elapsed by `now`
    pub fn take_due(&mut self, now: Instant) -> Vec<PendingPass> {
        self.queue.take_due(now)
    }

    /// Every pending pass, due or not
    pub fn flush(&mut self) -> Vec<PendingPass> {
        self.queue.drain_all()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.queue.next_due()
    }

    /// Disconnect from the host and cancel pending passes.
    ///
    /// Returns the number of passes that never ran.
    pub fn stop<P>(mut self, page: &mut P) -> usize
    where
        P: ChangeFeed + ?Sized,
    {
        page.disconnect(self.observer);
        let cancelled = self.queue.cancel();
        debug!("Watcher stopped, {} pending passes cancelled", cancelled);
        cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::NodeSnapshot;
    use crate::testdb::MockPage;

    const DELAY: Duration = Duration::from_millis(100);

    #[test]
    fn test_work_queue_take_due_keeps_order() {
        let t0 = Instant::now();
        let mut queue = WorkQueue::new();
        queue.schedule(vec![NodeId(1)], t0 + Duration::from_millis(10));
        queue.schedule(vec![NodeId(2)], t0 + Duration::from_millis(50));
        queue.schedule(vec![NodeId(3)], t0 + Duration::from_millis(20));

        let due = queue.take_due(t0 + Duration::from_millis(20));
        let roots: Vec<NodeId> = due.into_iter().flat_map(|p| p.roots).collect();
        assert_eq!(roots, vec![NodeId(1), NodeId(3)]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_due(), Some(t0 + Duration::from_millis(50)));
    }

    #[test]
    fn test_work_queue_cancel() {
        let mut queue = WorkQueue::new();
        queue.schedule(vec![NodeId(1)], Instant::now());
        queue.schedule(vec![NodeId(2)], Instant::now());
        assert_eq!(queue.cancel(), 2);
        assert!(queue.is_empty());
        assert_eq!(queue.next_due(), None);
    }

    #[test]
    fn test_start_requires_body() {
        let mut page = MockPage::new();
        let body = page.body().unwrap();
        page.remove_node(body).unwrap();

        let err = MutationWatcher::start(&mut page, DELAY).unwrap_err();
        assert!(matches!(err, DarkModeError::NoBody));
    }

    #[test]
    fn test_each_batch_gets_its_own_pass() {
        let mut page = MockPage::new();
        let body = page.body().unwrap();
        let mut watcher = MutationWatcher::start(&mut page, DELAY).unwrap();

        page.insert_subtree(body, &NodeSnapshot::element("div"))
            .unwrap();
        page.insert_subtree(body, &NodeSnapshot::element("div"))
            .unwrap();

        let t0 = Instant::now();
        assert_eq!(watcher.collect(&page, t0), 2);
        assert_eq!(watcher.pending(), 2);
        assert_eq!(watcher.next_due(), Some(t0 + DELAY));
    }

    #[test]
    fn test_text_only_batches_are_ignored() {
        let mut page = MockPage::new();
        let body = page.body().unwrap();
        let mut watcher = MutationWatcher::start(&mut page, DELAY).unwrap();

        page.insert_subtree(body, &NodeSnapshot::text()).unwrap();
        assert_eq!(watcher.collect(&page, Instant::now()), 0);
        assert_eq!(watcher.pending(), 0);
    }

    #[test]
    fn test_passes_wait_for_delay() {
        let mut page = MockPage::new();
        let body = page.body().unwrap();
        let mut watcher = MutationWatcher::start(&mut page, DELAY).unwrap();
        let added = page
            .insert_subtree(body, &NodeSnapshot::element("section"))
            .unwrap();

        let t0 = Instant::now();
        watcher.collect(&page, t0);
        assert!(watcher.take_due(t0 + Duration::from_millis(99)).is_empty());

        let due = watcher.take_due(t0 + DELAY);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].roots, vec![added]);
    }

    #[test]
    fn test_stop_disconnects_and_cancels() {
        let mut page = MockPage::new();
        let body = page.body().unwrap();
        let mut watcher = MutationWatcher::start(&mut page, DELAY).unwrap();
        page.insert_subtree(body, &NodeSnapshot::element("div"))
            .unwrap();
        watcher.collect(&page, Instant::now());

        assert_eq!(watcher.stop(&mut page), 1);
        assert_eq!(page.observer_count(), 0);
    }
}
