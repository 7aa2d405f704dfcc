//! Dark-mode session
//!
//! A `DarkModeSession` is the single owner of everything activation leaves
//! behind on a page: the baseline style block and the mutation subscription.
//!
//! # Lifecycle
//!
//! 1. [`activate`](DarkModeSession::activate) installs the baseline block,
//!    rewrites custom properties, recolors every element and starts watching.
//! 2. [`pump`](DarkModeSession::pump) (or `pump_at` / `flush`) drains mutation
//!    batches and runs the delayed passes for inserted elements.
//! 3. [`stop`](DarkModeSession::stop) disconnects and cancels pending passes.
//!
//! Re-activating an active session replaces the style block and runs the
//! document pass again without subscribing twice.
//!
//! ```rust
//! use blab::core::config::SessionConfig;
//! use blab::core::session::DarkModeSession;
//! use blab::page::{ColorProperty, NodeSnapshot, PageSnapshot};
//! use blab::testdb::MockPage;
//!
//! let mut page = MockPage::from_snapshot(&PageSnapshot::with_body(
//!     NodeSnapshot::element("body").background("rgb(255, 255, 255)"),
//! ));
//! let mut session = DarkModeSession::new(SessionConfig::default());
//! session.activate(&mut page).unwrap();
//!
//! let body = page.first_by_tag("body").unwrap();
//! assert_eq!(page.override_of(body, ColorProperty::Background), Some("#2a2a2a"));
//! ```

use crate::core::config::SessionConfig;
use crate::core::error::{DarkModeError, Result};
use crate::core::scanner::{ScanStats, Scanner};
use crate::core::tracking::ProcessedNodes;
use crate::core::variables::{rewrite_document_variables, VariableStats};
use crate::core::watcher::{MutationWatcher, PendingPass};
use crate::page::Page;
use log::{debug, info};
use serde::Serialize;
use std::time::Instant;

/// What one activation did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivationReport {
    /// An earlier baseline block was removed first
    pub replaced_style: bool,
    pub variables: VariableStats,
    pub scan: ScanStats,
}

/// Running totals across the session's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub activations: usize,
    pub incremental_passes: usize,
    pub document: ScanStats,
    pub incremental: ScanStats,
}

/// CSS for the baseline block: forces the page canvas dark before any element
/// is processed
pub fn baseline_css(background: &str) -> String {
    format!(
        "html {{ background-color: {bg} !important; }}\nbody {{ background-color: {bg} !important; }}\n",
        bg = background
    )
}

/// An explicit dark-mode session over one page
#[derive(Debug)]
pub struct DarkModeSession {
    config: SessionConfig,
    watcher: Option<MutationWatcher>,
    processed: ProcessedNodes,
    stats: SessionStats,
}

impl DarkModeSession {
    pub fn new(config: SessionConfig) -> Self {
        let processed = ProcessedNodes::new(config.skip_processed);
        Self {
            config,
            watcher: None,
            processed,
            stats: SessionStats::default(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn is_active(&self) -> bool {
        self.watcher.is_some()
    }

    /// Number of elements this session has recolored (when tracking is on)
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Delayed passes not yet run
    pub fn pending_passes(&self) -> usize {
        self.watcher.as_ref().map_or(0, MutationWatcher::pending)
    }

    /// When the earliest pending pass becomes due
    pub fn next_due(&self) -> Option<Instant> {
        self.watcher.as_ref().and_then(MutationWatcher::next_due)
    }

    /// Run the full activation sequence against `page`
    pub fn activate<P: Page + ?Sized>(&mut self, page: &mut P) -> Result<ActivationReport> {
        if page.body().is_none() {
            return Err(DarkModeError::NoBody);
        }

        let replaced_style = self.install_baseline(page)?;

        let variables = if self.config.rewrite_variables {
            rewrite_document_variables(page)
        } else {
            VariableStats::default()
        };

        let scan = Scanner::full().scan_document(page, &mut self.processed);

        if self.watcher.is_none() {
            self.watcher = Some(MutationWatcher::start(
                page,
                self.config.mutation_delay(),
            )?);
        }

        self.stats.activations += 1;
        self.stats.document += scan;
        info!("🌙 {} - Dark mode activated", self.config.style_id);

        Ok(ActivationReport {
            replaced_style,
            variables,
            scan,
        })
    }

    fn install_baseline<P: Page + ?Sized>(&self, page: &mut P) -> Result<bool> {
        let replaced = page.remove_style_block(&self.config.style_id);
        page.append_style_block(
            &self.config.style_id,
            &baseline_css(&self.config.baseline_background),
        )?;
        if replaced {
            debug!("Replaced existing style block '{}'", self.config.style_id);
        }
        Ok(replaced)
    }

    /// Drain mutation batches and run every pass due by now
    pub fn pump<P: Page + ?Sized>(&mut self, page: &mut P) -> Result<ScanStats> {
        self.pump_at(page, Instant::now())
    }

    /// Drain mutation batches and run every pass due by `now`
    pub fn pump_at<P: Page + ?Sized>(&mut self, page: &mut P, now: Instant) -> Result<ScanStats> {
        let watcher = self.watcher.as_mut().ok_or(DarkModeError::NotActive)?;
        watcher.collect(&*page, now);
        let due = watcher.take_due(now);
        Ok(self.run_passes(page, due))
    }

    /// Drain mutation batches and run every pending pass immediately
    pub fn flush<P: Page + ?Sized>(&mut self, page: &mut P) -> Result<ScanStats> {
        let watcher = self.watcher.as_mut().ok_or(DarkModeError::NotActive)?;
        watcher.collect(&*page, Instant::now());
        let all = watcher.flush();
        Ok(self.run_passes(page, all))
    }

    fn run_passes<P: Page + ?Sized>(&mut self, page: &mut P, passes: Vec<PendingPass>) -> ScanStats {
        if !passes.is_empty() {
            self.processed
                .retain_live(|node| page.node_kind(node).is_some());
        }

        let scanner = Scanner::incremental(self.config.incremental_borders);
        let mut stats = ScanStats::default();
        for pass in passes {
            stats += scanner.process_subtree(page, &pass.roots, &mut self.processed);
            self.stats.incremental_passes += 1;
        }
        if stats.elements_visited > 0 {
            debug!(
                "Inserted elements: {} recolored, {} overrides",
                stats.elements_visited, stats.overrides_written
            );
        }
        self.stats.incremental += stats;
        stats
    }

    /// Disconnect from the page and cancel pending passes.
    ///
    /// Overrides and the baseline block stay in place. Returns the number of
    /// cancelled passes.
    pub fn stop<P: Page + ?Sized>(&mut self, page: &mut P) -> Result<usize> {
        let watcher = self.watcher.take().ok_or(DarkModeError::NotActive)?;
        let cancelled = watcher.stop(page);
        info!("{} - Dark mode watcher stopped", self.config.style_id);
        Ok(cancelled)
    }
}
