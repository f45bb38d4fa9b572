use crate::kernel::event::TurnEpoch;
use crate::kernel::highlight::{ElementRef, HighlightStart};
use crate::kernel::payment::{PaymentPhase, PaymentTransition};
use crate::kernel::router::{Modal, RouteParams, Screen};
use crate::turn::types::TtsLocation;

/// What the driver must do after a tick. The reactor never performs I/O itself.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    Navigate(Screen, RouteParams),
    GoBack,
    OpenModal(Modal),
    CloseModal,
    SendText {
        epoch: TurnEpoch,
        session_id: String,
        text: String,
    },
    SendVoice {
        epoch: TurnEpoch,
        session_id: String,
        audio: Vec<u8>,
        delay_ms: u64,
    },
    HighlightStarted(HighlightStart),
    HighlightCleared(ElementRef),
    PlayTts(TtsLocation),
    /// Abort every request still in flight.
    CancelInFlight,
}

pub struct Scheduler;

impl Scheduler {
    /// Pure projection: payment transition -> modal effect.
    pub fn payment(transition: &PaymentTransition) -> SideEffect {
        match transition.to {
            PaymentPhase::Idle => SideEffect::CloseModal,
            PaymentPhase::SelectingMethod => SideEffect::OpenModal(Modal::PaymentMethod),
            PaymentPhase::ScanningBarcode => SideEffect::OpenModal(Modal::BarcodeScan),
            PaymentPhase::CardInsert => SideEffect::OpenModal(Modal::CardInsert),
            PaymentPhase::Processing => SideEffect::OpenModal(Modal::PaymentProcessing),
            PaymentPhase::Complete => SideEffect::OpenModal(Modal::PaymentComplete),
        }
    }
}
