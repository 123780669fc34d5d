//! One-shot hand-off of a new input source from the session to the reader.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

use crate::config::InputSpec;
use crate::trajectory::ParseOptions;

/// What the reader should open next.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRequest {
    pub input: InputSpec,
    pub options: ParseOptions,
    /// Store epoch after the reset that accompanied this request.
    pub epoch: u64,
}

#[derive(Debug, Default)]
struct Pending {
    request: Option<SourceRequest>,
    closed: bool,
}

#[derive(Debug, Default)]
pub struct FileSwap {
    pending: Mutex<Pending>,
    posted: Condvar,
}

impl FileSwap {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Post a request. A request that was not picked up yet is replaced.
    pub fn request(&self, request: SourceRequest) {
        let mut pending = self.lock();
        if pending.request.is_some() {
            log::debug!("replacing unclaimed source request");
        }
        pending.request = Some(request);
        self.posted.notify_all();
    }

    /// Claim the pending request, if any.
    pub fn take(&self) -> Option<SourceRequest> {
        self.lock().request.take()
    }

    /// Block until a request is pending, the swap is closed, or `timeout`
    /// passes. Returns true if a request is pending.
    pub fn wait_for_request(&self, timeout: Duration) -> bool {
        let pending = self.lock();
        let (pending, _) = self
            .posted
            .wait_timeout_while(pending, timeout, |p| p.request.is_none() && !p.closed)
            .unwrap_or_else(|e| e.into_inner());
        pending.request.is_some()
    }

    pub fn close(&self) {
        let mut pending = self.lock();
        pending.closed = true;
        self.posted.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn req(epoch: u64) -> SourceRequest {
        SourceRequest {
            input: InputSpec::Stdin,
            options: ParseOptions::default(),
            epoch,
        }
    }

    #[test]
    fn test_take_is_one_shot() {
        let swap = FileSwap::new();
        assert!(swap.take().is_none());
        swap.request(req(1));
        assert_eq!(swap.take().map(|r| r.epoch), Some(1));
        assert!(swap.take().is_none());
    }

    #[test]
    fn test_last_request_wins() {
        let swap = FileSwap::new();
        swap.request(req(1));
        swap.request(req(2));
        assert_eq!(swap.take().map(|r| r.epoch), Some(2));
    }

    #[test]
    fn test_wait_times_out_without_request() {
        let swap = FileSwap::new();
        assert!(!swap.wait_for_request(Duration::from_millis(10)));
    }

    #[test]
    fn test_wait_wakes_on_request() {
        let swap = Arc::new(FileSwap::new());
        let waiter = {
            let swap = Arc::clone(&swap);
            thread::spawn(move || swap.wait_for_request(Duration::from_secs(10)))
        };
        thread::sleep(Duration::from_millis(20));
        swap.request(req(3));
        assert!(waiter.join().unwrap());
    }

    #[test]
    fn test_close_wakes_waiter() {
        let swap = Arc::new(FileSwap::new());
        let waiter = {
            let swap = Arc::clone(&swap);
            thread::spawn(move || swap.wait_for_request(Duration::from_secs(10)))
        };
        thread::sleep(Duration::from_millis(20));
        swap.close();
        assert!(!waiter.join().unwrap());
        assert!(swap.is_closed());
    }
}
