use malo::kernel::payment::{
    PaymentFlow, PaymentMethod, PaymentPhase, PaymentRequest, PaymentState, PaymentTransition,
};
use malo::kernel::scheduler::{Scheduler, SideEffect};
use malo::kernel::router::Modal;
use malo::kernel::time::{Deadline, Tick};

fn at(frame: u64) -> Tick {
    Tick { frame }
}

fn flow() -> PaymentFlow {
    PaymentFlow::new(10_000, 3_000, 2_000)
}

#[test]
fn test_coupon_payment_runs_to_completion() {
    let mut payment = flow();

    // 1. Coupon opens the barcode scanner
    let opened = payment.begin_coupon(at(0)).unwrap();
    assert_eq!(
        opened,
        PaymentTransition { from: PaymentPhase::Idle, to: PaymentPhase::ScanningBarcode }
    );

    // 2. Scanning lasts 10 s
    assert_eq!(payment.tick(at(499)), None);
    let processing = payment.tick(at(500)).unwrap();
    assert_eq!(processing.to, PaymentPhase::Processing);

    // 3. Processing lasts 2 s
    assert_eq!(payment.tick(at(599)), None);
    let done = payment.tick(at(600)).unwrap();
    assert_eq!(done.to, PaymentPhase::Complete);
    assert_eq!(payment.tick(at(10_000)), None, "Complete has no timer");

    // 4. Closing the completion modal returns to idle
    assert_eq!(payment.dismiss(at(700)).map(|t| t.to), Some(PaymentPhase::Idle));
}

#[test]
fn test_method_selector_then_coupon() {
    let mut payment = flow();

    assert_eq!(
        payment.open_method_selector(at(0)).map(|t| t.to),
        Some(PaymentPhase::SelectingMethod)
    );
    assert!(payment.open_method_selector(at(1)).is_none(), "Already selecting");

    let scanning = payment.begin_coupon(at(10)).unwrap();
    assert_eq!(scanning.from, PaymentPhase::SelectingMethod);
    assert_eq!(payment.state().deadline().map(|d| d.due), Some(at(510)));
}

#[test]
fn test_dismiss_cancels_pending_timer() {
    let mut payment = flow();
    payment.begin_coupon(at(0));

    assert_eq!(payment.dismiss(at(100)).map(|t| t.to), Some(PaymentPhase::Idle));
    assert_eq!(payment.tick(at(500)), None, "No timer survives the dismissal");
    assert_eq!(payment.phase(), PaymentPhase::Idle);
    assert!(payment.dismiss(at(600)).is_none(), "Idle ignores dismiss");
}

#[test]
fn test_transition_table_is_pure() {
    let payment = flow();

    assert_eq!(
        payment.next(PaymentState::Idle, PaymentRequest::OpenMethodSelector, at(0)),
        Some(PaymentState::SelectingMethod)
    );
    assert_eq!(
        payment.next(
            PaymentState::Processing {
                deadline: Deadline::in_ms(at(0), 2_000),
                method: PaymentMethod::Card,
            },
            PaymentRequest::BeginCoupon,
            at(0)
        ),
        None,
        "A running payment cannot be restarted"
    );
    assert_eq!(
        payment.next(
            PaymentState::Complete { method: PaymentMethod::Card },
            PaymentRequest::Settle,
            at(0)
        ),
        Some(PaymentState::Idle)
    );
    assert_eq!(
        payment.next(PaymentState::Idle, PaymentRequest::TimerElapsed, at(0)),
        None,
        "Timers only fire inside timed phases"
    );
    assert_eq!(payment.phase(), PaymentPhase::Idle, "next() never mutates");
}

#[test]
fn test_transitions_map_to_modals() {
    let open = PaymentTransition { from: PaymentPhase::Idle, to: PaymentPhase::ScanningBarcode };
    assert_eq!(Scheduler::payment(&open), SideEffect::OpenModal(Modal::BarcodeScan));

    let close = PaymentTransition { from: PaymentPhase::Complete, to: PaymentPhase::Idle };
    assert_eq!(Scheduler::payment(&close), SideEffect::CloseModal);
}

#[test]
fn test_card_payment_runs_to_completion() {
    let mut payment = flow();

    // 1. Card prompt opens from the method selector
    payment.open_method_selector(at(0));
    let inserting = payment.begin_card(at(0)).unwrap();
    assert_eq!(
        inserting,
        PaymentTransition { from: PaymentPhase::SelectingMethod, to: PaymentPhase::CardInsert }
    );
    assert_eq!(Scheduler::payment(&inserting), SideEffect::OpenModal(Modal::CardInsert));

    // 2. The card counts as inserted after 3 s
    assert_eq!(payment.tick(at(149)), None);
    let processing = payment.tick(at(150)).unwrap();
    assert_eq!(processing.from, PaymentPhase::CardInsert);
    assert_eq!(processing.to, PaymentPhase::Processing);
    assert_eq!(payment.method(), Some(PaymentMethod::Card));

    // 3. Processing lasts 2 s
    assert_eq!(payment.tick(at(249)), None);
    assert_eq!(payment.tick(at(250)).map(|t| t.to), Some(PaymentPhase::Complete));
    assert_eq!(payment.method(), Some(PaymentMethod::Card), "Complete remembers the method");
}

#[test]
fn test_completed_payment_can_start_again() {
    let mut payment = flow();
    payment.begin_coupon(at(0));
    payment.tick(at(500));
    payment.tick(at(600));
    assert_eq!(payment.phase(), PaymentPhase::Complete);

    // 1. A new payment step is not dropped
    assert_eq!(
        payment.open_method_selector(at(700)).map(|t| t.to),
        Some(PaymentPhase::SelectingMethod)
    );

    // 2. Settling closes the selector
    assert_eq!(payment.settle(at(710)).map(|t| t.to), Some(PaymentPhase::Idle));
}

#[test]
fn test_settle_leaves_timed_phases_running() {
    let mut payment = flow();
    payment.begin_card(at(0));
    payment.tick(at(150));

    assert!(payment.settle(at(160)).is_none(), "Processing finishes on its own timer");
    assert_eq!(payment.tick(at(250)).map(|t| t.to), Some(PaymentPhase::Complete));
}
