//! Bookkeeping for stock reservations made by the order creation saga.

use domain::ProductId;

/// One applied stock decrement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Ordered record of the decrements applied so far.
///
/// Entries are only added after the catalog confirmed the decrement, so the
/// log never asks compensation to release stock that was not taken.
#[derive(Debug, Clone, Default)]
pub struct ReservationLog {
    entries: Vec<Reservation>,
}

impl ReservationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a confirmed decrement.
    pub fn record(&mut self, product_id: ProductId, quantity: u32) {
        self.entries.push(Reservation {
            product_id,
            quantity,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in application order.
    pub fn entries(&self) -> &[Reservation] {
        &self.entries
    }

    /// Consumes the log, yielding the newest reservation first.
    pub fn into_compensation_order(self) -> impl Iterator<Item = Reservation> {
        self.entries.into_iter().rev()
    }
}

/// Outcome of a best-effort compensation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompensationReport {
    pub restored: Vec<Reservation>,
    pub failed: Vec<Reservation>,
}

impl CompensationReport {
    /// True when every reservation was released.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
