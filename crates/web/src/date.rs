//! Cached value for the `Date` response header.
//!
//! Formatting an HTTP date on every response is wasted work when the value only changes
//! once a second, so a background task refreshes a shared copy instead.

use arc_swap::ArcSwap;
use bytes::Bytes;
use http::HeaderValue;
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Duration;

/// Holds the current HTTP date and a task that refreshes it.
#[derive(Debug)]
pub struct DateService {
    current: Arc<ArcSwap<Bytes>>,
    handle: tokio::task::JoinHandle<()>,
}

static DATE_SERVICE: Lazy<DateService> = Lazy::new(|| DateService::new_with_update_interval(Duration::from_millis(800)));

impl DateService {
    /// The process-wide instance. The first call must happen inside a tokio runtime.
    pub fn get_global_instance() -> &'static DateService {
        &DATE_SERVICE
    }

    fn new_with_update_interval(update_interval: Duration) -> Self {
        let current = Arc::new(ArcSwap::from_pointee(format_now()));
        let current_arc = Arc::clone(&current);

        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(update_interval).await;
                current_arc.store(Arc::new(format_now()));
            }
        });

        DateService { current, handle }
    }

    pub fn header_value(&self) -> Option<HeaderValue> {
        let date = self.current.load().as_ref().clone();
        HeaderValue::from_maybe_shared(date).ok()
    }
}

fn format_now() -> Bytes {
    let mut buf = faf_http_date::get_date_buff_no_key();
    faf_http_date::get_date_no_key(&mut buf);
    Bytes::from_owner(buf)
}

impl Drop for DateService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
