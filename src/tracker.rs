use std::sync::{Condvar, Mutex, PoisonError};

/// Counts dispatched lines that have not been retired yet.
///
/// The producer calls [`dispatch`](Self::dispatch) before handing a line to the queue, a
/// worker calls [`retire`](Self::retire) once per consumed line whatever the outcome, and
/// [`wait_drained`](Self::wait_drained) blocks until the two balance.
#[derive(Debug, Default)]
pub struct InFlight {
    outstanding: Mutex<u64>,
    drained: Condvar,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&self) {
        *self
            .outstanding
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
    }

    pub fn retire(&self) {
        let mut outstanding = self
            .outstanding
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *outstanding = outstanding.saturating_sub(1);
        if *outstanding == 0 {
            self.drained.notify_all();
        }
    }

    pub fn outstanding(&self) -> u64 {
        *self
            .outstanding
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn wait_drained(&self) {
        let outstanding = self
            .outstanding
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let _drained = self
            .drained
            .wait_while(outstanding, |outstanding| *outstanding > 0)
            .unwrap_or_else(PoisonError::into_inner);
    }
}

/// Retires one line when dropped, so a panicking worker still balances the count.
pub struct Retirement<'a>(&'a InFlight);

impl<'a> Retirement<'a> {
    pub fn new(tracker: &'a InFlight) -> Self {
        Self(tracker)
    }
}

impl Drop for Retirement<'_> {
    fn drop(&mut self) {
        self.0.retire();
    }
}
