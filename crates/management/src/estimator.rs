//! Live audience-size estimate for the rule builders.
//!
//! Each edit schedules a recount after a settling interval. A newer edit
//! aborts the pending recount, so only the last rule set in a burst of
//! edits is evaluated. Results are published on a watch channel.

use std::sync::Arc;
use std::time::Duration;

use campaign_core::config::SegmentationConfig;
use campaign_segmentation::{count_matches, Clock, SegmentRuleSet};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::store::CustomerSource;

pub struct AudienceEstimator {
    source: Arc<dyn CustomerSource>,
    clock: Arc<dyn Clock>,
    settle: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
    tx: Arc<watch::Sender<Option<usize>>>,
}

impl AudienceEstimator {
    pub fn new(
        source: Arc<dyn CustomerSource>,
        clock: Arc<dyn Clock>,
        config: &SegmentationConfig,
    ) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            source,
            clock,
            settle: Duration::from_millis(config.recompute_debounce_ms),
            pending: Mutex::new(None),
            tx: Arc::new(tx),
        }
    }

    /// Latest published audience size; `None` until the first recount lands.
    pub fn subscribe(&self) -> watch::Receiver<Option<usize>> {
        self.tx.subscribe()
    }

    pub fn latest(&self) -> Option<usize> {
        *self.tx.borrow()
    }

    /// Schedules a recount for `rules`, superseding any pending one.
    /// An empty rule set only cancels. Must be called from within a Tokio runtime.
    pub fn schedule(&self, rules: SegmentRuleSet) {
        let mut pending = self.pending.lock();
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        if rules.is_empty() {
            return;
        }

        let source = Arc::clone(&self.source);
        let clock = Arc::clone(&self.clock);
        let tx = Arc::clone(&self.tx);
        let settle = self.settle;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(settle).await;
            let customers = source.customers();
            let audience_size = count_matches(&customers, &rules, clock.today());
            debug!(
                rules = rules.len(),
                audience_size, "Audience estimate refreshed"
            );
            tx.send_replace(Some(audience_size));
        }));
    }

    /// Drops any pending recount without publishing.
    pub fn cancel(&self) {
        if let Some(previous) = self.pending.lock().take() {
            previous.abort();
        }
    }
}

impl Drop for AudienceEstimator {
    fn drop(&mut self) {
        self.cancel();
    }
}
