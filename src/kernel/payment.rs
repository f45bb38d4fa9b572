use serde::{Deserialize, Serialize};
use tracing::info;

use crate::kernel::time::{Deadline, Tick};

/// How the customer pays. Decides which timed phase precedes processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Card,
    Coupon,
}

/// Simulated payment. Each timed phase owns its one deadline; leaving the
/// phase drops it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentState {
    #[default]
    Idle,
    SelectingMethod,
    ScanningBarcode { deadline: Deadline },
    CardInsert { deadline: Deadline },
    Processing { deadline: Deadline, method: PaymentMethod },
    Complete { method: PaymentMethod },
}

/// Content-free view of the state, for telemetry and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentPhase {
    Idle,
    SelectingMethod,
    ScanningBarcode,
    CardInsert,
    Processing,
    Complete,
}

impl PaymentState {
    pub fn phase(&self) -> PaymentPhase {
        match self {
            PaymentState::Idle => PaymentPhase::Idle,
            PaymentState::SelectingMethod => PaymentPhase::SelectingMethod,
            PaymentState::ScanningBarcode { .. } => PaymentPhase::ScanningBarcode,
            PaymentState::CardInsert { .. } => PaymentPhase::CardInsert,
            PaymentState::Processing { .. } => PaymentPhase::Processing,
            PaymentState::Complete { .. } => PaymentPhase::Complete,
        }
    }

    pub fn deadline(&self) -> Option<Deadline> {
        match self {
            PaymentState::ScanningBarcode { deadline }
            | PaymentState::CardInsert { deadline }
            | PaymentState::Processing { deadline, .. } => Some(*deadline),
            _ => None,
        }
    }

    pub fn method(&self) -> Option<PaymentMethod> {
        match self {
            PaymentState::ScanningBarcode { .. } => Some(PaymentMethod::Coupon),
            PaymentState::CardInsert { .. } => Some(PaymentMethod::Card),
            PaymentState::Processing { method, .. } | PaymentState::Complete { method } => {
                Some(*method)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum PaymentRequest {
    OpenMethodSelector,
    BeginCoupon,
    BeginCard,
    TimerElapsed,
    /// The order is done; a settled flow goes back to idle.
    Settle,
    Dismiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentTransition {
    pub from: PaymentPhase,
    pub to: PaymentPhase,
}

#[derive(Debug, Clone)]
pub struct PaymentFlow {
    state: PaymentState,
    barcode_scan_ms: u64,
    card_insert_ms: u64,
    processing_ms: u64,
}

impl PaymentFlow {
    pub fn new(barcode_scan_ms: u64, card_insert_ms: u64, processing_ms: u64) -> Self {
        Self {
            state: PaymentState::Idle,
            barcode_scan_ms,
            card_insert_ms,
            processing_ms,
        }
    }

    pub fn state(&self) -> PaymentState {
        self.state
    }

    pub fn phase(&self) -> PaymentPhase {
        self.state.phase()
    }

    pub fn method(&self) -> Option<PaymentMethod> {
        self.state.method()
    }

    /// Pure transition table. `None` means the request does not apply here.
    pub fn next(
        &self,
        current: PaymentState,
        request: PaymentRequest,
        now: Tick,
    ) -> Option<PaymentState> {
        use PaymentRequest::*;
        use PaymentState::*;

        match (current, request) {
            (Idle | Complete { .. }, OpenMethodSelector) => Some(SelectingMethod),
            (Idle | SelectingMethod | Complete { .. }, BeginCoupon) => Some(ScanningBarcode {
                deadline: Deadline::in_ms(now, self.barcode_scan_ms),
            }),
            (Idle | SelectingMethod | Complete { .. }, BeginCard) => Some(CardInsert {
                deadline: Deadline::in_ms(now, self.card_insert_ms),
            }),
            (ScanningBarcode { deadline } | CardInsert { deadline }, TimerElapsed)
                if deadline.is_due(now) =>
            {
                current.method().map(|method| Processing {
                    deadline: Deadline::in_ms(now, self.processing_ms),
                    method,
                })
            }
            (Processing { deadline, method }, TimerElapsed) if deadline.is_due(now) => {
                Some(Complete { method })
            }
            (SelectingMethod | Complete { .. }, Settle) => Some(Idle),
            (Idle, Dismiss) => None,
            (_, Dismiss) => Some(Idle),
            _ => None,
        }
    }

    pub fn request(&mut self, request: PaymentRequest, now: Tick) -> Option<PaymentTransition> {
        let to = self.next(self.state, request, now)?;
        let transition = PaymentTransition {
            from: self.state.phase(),
            to: to.phase(),
        };
        info!(from = ?transition.from, to = ?transition.to, "payment transition");
        self.state = to;
        Some(transition)
    }

    pub fn open_method_selector(&mut self, now: Tick) -> Option<PaymentTransition> {
        self.request(PaymentRequest::OpenMethodSelector, now)
    }

    pub fn begin_coupon(&mut self, now: Tick) -> Option<PaymentTransition> {
        self.request(PaymentRequest::BeginCoupon, now)
    }

    pub fn begin_card(&mut self, now: Tick) -> Option<PaymentTransition> {
        self.request(PaymentRequest::BeginCard, now)
    }

    /// Timed phases run out on their own; only a selector or a finished
    /// payment is closed by the order completing.
    pub fn settle(&mut self, now: Tick) -> Option<PaymentTransition> {
        self.request(PaymentRequest::Settle, now)
    }

    /// Fires the owned timer when due.
    pub fn tick(&mut self, now: Tick) -> Option<PaymentTransition> {
        match self.state.deadline() {
            Some(deadline) if deadline.is_due(now) => {
                self.request(PaymentRequest::TimerElapsed, now)
            }
            _ => None,
        }
    }

    /// Modal dismissed or session torn down. Cancels any pending timer.
    pub fn dismiss(&mut self, now: Tick) -> Option<PaymentTransition> {
        self.request(PaymentRequest::Dismiss, now)
    }
}
