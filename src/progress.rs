//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::convert::ConversionPipeline::with_progress`] to receive events as
//! the pipeline walks the page selection.
//!
//! # Example
//!
//! ```rust
//! use darkpdf::ConversionProgressCallback;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, position: usize, total: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("[{position}/{total}] page {page_num} done");
//!     }
//! }
//! ```

use crate::error::SelectionError;
use std::sync::Arc;

/// Called by the conversion pipeline as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync` because the
/// async entry points run the pipeline on a blocking worker thread.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once, after the page spec is resolved and before any page is
    /// rendered.
    ///
    /// # Arguments
    /// * `total` — number of selected indices, including any that will be
    ///   skipped as out of range
    fn on_conversion_start(&self, total: usize) {
        let _ = total;
    }

    /// Called just before a page is rasterised.
    ///
    /// # Arguments
    /// * `page_num` — 1-indexed source page number
    /// * `position` — 1-indexed position within the selection
    /// * `total`    — selection length
    fn on_page_start(&self, page_num: usize, position: usize, total: usize) {
        let _ = (page_num, position, total);
    }

    /// Called once the page has been appended to the output document.
    fn on_page_complete(&self, page_num: usize, position: usize, total: usize) {
        let _ = (page_num, position, total);
    }

    /// Called for a selection notice: an unparsable spec (once, before
    /// `on_conversion_start`) or an out-of-range index (per skipped entry).
    fn on_page_skipped(&self, notice: &SelectionError) {
        let _ = notice;
    }

    /// Called once after every selected page has been processed and the
    /// output serialised. Not called when the conversion falls back.
    ///
    /// # Arguments
    /// * `total`     — selection length
    /// * `converted` — pages written to the output
    fn on_conversion_complete(&self, total: usize, converted: usize) {
        let _ = (total, converted);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
#[derive(Debug, Default)]
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in the pipeline.
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        skips: AtomicUsize,
        converted_total: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_page_start(&self, _page_num: usize, _position: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_complete(&self, _page_num: usize, _position: usize, _total: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_skipped(&self, _notice: &SelectionError) {
            self.skips.fetch_add(1, Ordering::SeqCst);
        }

        fn on_conversion_complete(&self, _total: usize, converted: usize) {
            self.converted_total.store(converted, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start(5);
        cb.on_page_start(1, 1, 5);
        cb.on_page_complete(1, 1, 5);
        cb.on_page_skipped(&SelectionError::PageIndexOutOfRange { index: 9, total: 5 });
        cb.on_conversion_complete(5, 4);
    }

    #[test]
    fn tracking_callback_through_arc_dyn() {
        let tracker = Arc::new(TrackingCallback::default());
        let cb: ProgressCallback = tracker.clone();

        cb.on_conversion_start(3);
        cb.on_page_start(1, 1, 3);
        cb.on_page_complete(1, 1, 3);
        cb.on_page_skipped(&SelectionError::PageIndexOutOfRange { index: 7, total: 2 });
        cb.on_page_start(2, 3, 3);
        cb.on_page_complete(2, 3, 3);
        cb.on_conversion_complete(3, 2);

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.skips.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.converted_total.load(Ordering::SeqCst), 2);
    }
}
