use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: u64,
}

impl RequestTracker {
    pub fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }

    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn accept<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        self.is_current(ticket).then_some(value)
    }
}

pub struct Loader<T> {
    name: &'static str,
    tracker: RequestTracker,
    tx: Sender<(Ticket, T)>,
    rx: Receiver<(Ticket, T)>,
    pending: Option<Ticket>,
    stale_dropped: usize,
}

impl<T: Send + 'static> Loader<T> {
    pub fn new(name: &'static str) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            name,
            tracker: RequestTracker::default(),
            tx,
            rx,
            pending: None,
            stale_dropped: 0,
        }
    }

    pub fn request<F>(&mut self, job: F) -> Ticket
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let ticket = self.tracker.issue();
        self.pending = Some(ticket);
        let tx = self.tx.clone();

        thread::spawn(move || {
            let _ = tx.send((ticket, job()));
        });

        ticket
    }

    pub fn cancel(&mut self) {
        self.tracker.invalidate();
        self.pending = None;
    }

    pub fn poll(&mut self) -> Option<T> {
        let mut delivered = None;
        loop {
            match self.rx.try_recv() {
                Ok((ticket, value)) => match self.tracker.accept(ticket, value) {
                    Some(value) => {
                        self.pending = None;
                        delivered = Some(value);
                    }
                    None => {
                        self.stale_dropped += 1;
                        debug!(loader = self.name, ?ticket, "dropping stale response");
                    }
                },
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        delivered
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn stale_dropped(&self) -> usize {
        self.stale_dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_ticket_is_current() {
        let mut tracker = RequestTracker::default();
        let first = tracker.issue();
        let second = tracker.issue();

        assert!(!tracker.is_current(first));
        assert!(tracker.is_current(second));
        assert_eq!(tracker.accept(first, "a"), None);
        assert_eq!(tracker.accept(second, "b"), Some("b"));
    }

    #[test]
    fn invalidate_retires_outstanding_ticket() {
        let mut tracker = RequestTracker::default();
        let ticket = tracker.issue();
        tracker.invalidate();
        assert!(!tracker.is_current(ticket));
    }

    #[test]
    fn cancel_clears_pending() {
        let mut loader = Loader::<u32>::new("test");
        assert!(!loader.is_pending());
        loader.request(|| 1);
        assert!(loader.is_pending());
        loader.cancel();
        assert!(!loader.is_pending());
    }
}
