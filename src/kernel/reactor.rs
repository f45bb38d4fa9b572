use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::cart::{CartMutation, CartSynchronizer, CartUpdate, MutationKey, MutationOutcome};
use super::event::{Admission, Channel, EpochGate, Event, TurnEpoch};
use super::highlight::{HighlightEngine, HighlightStart};
use super::intent::{Intent, IntentClassifier, Utterances};
use super::payment::{PaymentFlow, PaymentMethod, PaymentPhase, PaymentTransition};
use super::router::{self, param, Action, Modal, RouteContext, RouteParams, Screen};
use super::scheduler::{Scheduler, SideEffect};
use super::telemetry::event::{
    ActionKind, DiscardReason, HighlightEventKind, MutationKind, MutationResult,
};
use super::telemetry::{TelemetryEvent, TelemetryRecorder};
use super::time::{Tick, TICK_MS};
use crate::catalog::{Catalog, Category};
use crate::config::KioskConfig;
use crate::error::KioskError;
use crate::outputs::chat::{self, ChatLog};
use crate::turn::normalizer::{normalize, BackendSlots};
use crate::turn::types::{ItemRef, SlotSet, TurnResponse};

#[derive(Debug, Clone)]
pub struct ReactorConfig {
    pub quarantine_ms: u64,
    pub pulse_half_period_ms: u64,
    pub pulse_iterations: u32,
    pub barcode_scan_ms: u64,
    pub card_insert_ms: u64,
    pub payment_processing_ms: u64,
    pub voice_send_delay_ms: u64,
    /// Carry the chat log across screens in `previousMessages`.
    pub carry_messages: bool,
}

impl From<&KioskConfig> for ReactorConfig {
    fn from(config: &KioskConfig) -> Self {
        Self {
            quarantine_ms: config.quarantine_ms,
            pulse_half_period_ms: config.pulse_half_period_ms,
            pulse_iterations: config.pulse_iterations,
            barcode_scan_ms: config.barcode_scan_ms,
            card_insert_ms: config.card_insert_ms,
            payment_processing_ms: config.payment_processing_ms,
            voice_send_delay_ms: config.voice_send_delay_ms,
            carry_messages: true,
        }
    }
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self::from(&KioskConfig::default())
    }
}

#[derive(Debug, Clone)]
struct PendingTurn {
    epoch: TurnEpoch,
    sent_at: Tick,
    /// Chat entry to overwrite with the transcript once it arrives.
    voice_placeholder: Option<Uuid>,
}

/// Single-threaded orchestration core. Everything it decides comes out of
/// `tick_step` as side effects for the driver.
pub struct Reactor {
    pub tick: Tick,
    pub chat: ChatLog,
    pub cart: CartSynchronizer,
    pub highlight: HighlightEngine,
    pub payment: PaymentFlow,
    pub telemetry: TelemetryRecorder,
    pub screen: Screen,
    /// Item, temperature and size the guided screen on display already holds.
    pub screen_selection: SlotSet,
    config: ReactorConfig,
    catalog: Arc<dyn Catalog + Send + Sync>,
    classifier: IntentClassifier,
    session_id: Option<String>,
    epochs: EpochGate,
    pending: Option<PendingTurn>,
    /// Turn that told the backend the card went in.
    card_notice: Option<TurnEpoch>,
    /// The backend answered that turn with its own completion text.
    card_confirmed: bool,
}

impl Reactor {
    pub fn new(
        config: ReactorConfig,
        catalog: Arc<dyn Catalog + Send + Sync>,
    ) -> Result<Self, KioskError> {
        let classifier = IntentClassifier::new(&*catalog)?;
        Ok(Self {
            tick: Tick::new(),
            chat: ChatLog::new(),
            cart: CartSynchronizer::new(config.quarantine_ms),
            highlight: HighlightEngine::new(config.pulse_half_period_ms, config.pulse_iterations),
            payment: PaymentFlow::new(
                config.barcode_scan_ms,
                config.card_insert_ms,
                config.payment_processing_ms,
            ),
            telemetry: TelemetryRecorder::new(),
            screen: Screen::StartVoiceOrder,
            screen_selection: SlotSet::default(),
            config,
            catalog,
            classifier,
            session_id: None,
            epochs: EpochGate::default(),
            pending: None,
            card_notice: None,
            card_confirmed: false,
        })
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn latest_epoch(&self) -> Option<TurnEpoch> {
        self.epochs.latest()
    }

    /// Pure tick step: advances time, folds in events, fires due timers.
    /// MUST NOT await.
    ///
    /// The tick is advanced first; every event in the batch is handled at the
    /// new tick.
    pub fn tick_step(&mut self, events: Vec<Event>) -> Vec<SideEffect> {
        self.tick = self.tick.next();
        let mut effects = Vec::new();

        for event in events {
            self.handle(event, &mut effects);
        }

        // Timers
        self.cart.tick(self.tick);
        if let Some(cleared) = self.highlight.tick(self.tick) {
            self.telemetry.record(TelemetryEvent::Highlight {
                event: HighlightEventKind::Completed,
                tick: self.tick,
            });
            effects.push(SideEffect::HighlightCleared(cleared));
        }
        if let Some(transition) = self.payment.tick(self.tick) {
            self.payment_effect(transition, &mut effects);
        }

        effects
    }

    fn handle(&mut self, event: Event, effects: &mut Vec<SideEffect>) {
        match event {
            Event::SessionStarted {
                session_id,
                greeting,
            } => {
                info!(session = %session_id, "session started");
                self.session_id = Some(session_id);
                if let Some(greeting) = greeting.filter(|g| !g.trim().is_empty()) {
                    self.chat.assistant(greeting);
                }
            }
            Event::SessionFailed => {
                warn!("session start failed");
                self.chat.assistant(chat::SESSION_FAILED);
            }
            Event::UserText(text) => {
                self.submit_text(text, effects);
            }
            Event::VoiceCaptured(audio) => self.submit_voice(audio, effects),
            Event::VoiceFailed(message) => {
                self.chat.assistant(message);
            }
            Event::TurnReceived { epoch, turn } => {
                if self.admit(epoch) {
                    self.apply_turn(epoch, turn, effects);
                }
            }
            Event::TurnFailed { epoch, channel } => {
                if self.admit(epoch) {
                    warn!(%epoch, ?channel, "turn request failed");
                    self.telemetry
                        .record(TelemetryEvent::TurnFailed { epoch: epoch.seq });
                    self.chat.assistant(match channel {
                        Channel::Text => chat::TEXT_SEND_FAILED,
                        Channel::Voice => chat::VOICE_SEND_FAILED,
                    });
                }
            }
            Event::ScreenEntered { screen, params } => self.enter_screen(screen, &params),
            Event::ItemTapped { item_id } => self.tap(&item_id, effects),
            Event::SelectionMade(selection) => {
                if self.screen.is_guided() {
                    self.screen_selection.overlay(&selection);
                } else {
                    debug!(screen = self.screen.as_str(), "selection outside a guided screen");
                }
            }
            Event::ModalDismissed => {
                if let Some(transition) = self.payment.dismiss(self.tick) {
                    self.payment_effect(transition, effects);
                } else {
                    effects.push(SideEffect::CloseModal);
                }
            }
            Event::Teardown => self.teardown(effects),
        }
    }

    fn submit_text(&mut self, text: String, effects: &mut Vec<SideEffect>) -> Option<TurnEpoch> {
        let text = text.trim().to_string();
        if text.is_empty() {
            return None;
        }
        self.chat.user(text.clone());
        let Some(session_id) = self.session_id.clone() else {
            self.chat.assistant(chat::SESSION_FAILED);
            return None;
        };
        let epoch = self.begin_turn(None);
        effects.push(SideEffect::SendText {
            epoch,
            session_id,
            text,
        });
        Some(epoch)
    }

    fn submit_voice(&mut self, audio: Vec<u8>, effects: &mut Vec<SideEffect>) {
        let placeholder = self.chat.user(chat::VOICE_PLACEHOLDER);
        let Some(session_id) = self.session_id.clone() else {
            self.chat.assistant(chat::SESSION_FAILED);
            return;
        };
        let epoch = self.begin_turn(Some(placeholder));
        effects.push(SideEffect::SendVoice {
            epoch,
            session_id,
            audio,
            delay_ms: self.config.voice_send_delay_ms,
        });
    }

    fn begin_turn(&mut self, voice_placeholder: Option<Uuid>) -> TurnEpoch {
        let epoch = self.epochs.issue();
        if let Some(superseded) = self.pending.replace(PendingTurn {
            epoch,
            sent_at: self.tick,
            voice_placeholder,
        }) {
            debug!(superseded = %superseded.epoch, %epoch, "new turn supersedes pending one");
        }
        epoch
    }

    fn admit(&mut self, epoch: TurnEpoch) -> bool {
        let reason = match self.epochs.admit(epoch) {
            Admission::Accepted => return true,
            Admission::Stale => DiscardReason::Stale,
            Admission::Redelivered => DiscardReason::Redelivered,
        };
        info!(%epoch, ?reason, "discarded turn response");
        self.telemetry.record(TelemetryEvent::TurnDiscarded {
            epoch: epoch.seq,
            reason,
        });
        false
    }

    fn apply_turn(&mut self, epoch: TurnEpoch, turn: TurnResponse, effects: &mut Vec<SideEffect>) {
        let pending = self.pending.take().filter(|p| p.epoch == epoch);
        let latency_ticks = pending
            .as_ref()
            .map(|p| self.tick.frame.saturating_sub(p.sent_at.frame))
            .unwrap_or(0);
        self.telemetry.record(TelemetryEvent::TurnAccepted {
            epoch: epoch.seq,
            latency_ticks,
        });

        // 1. Transcript replaces the voice placeholder
        if let (Some(placeholder), Some(spoken)) = (
            pending.and_then(|p| p.voice_placeholder),
            turn.recognized_user_text.as_deref(),
        ) {
            self.chat.update_text(placeholder, spoken);
        }

        // 2. Reply
        if turn.text.trim().is_empty() {
            self.chat.assistant(chat::REPLY_WITHOUT_TEXT);
        } else {
            self.chat.assistant(turn.text.clone());
            if self.card_notice == Some(epoch) {
                self.card_confirmed = true;
            }
        }
        if let Some(tts) = turn.tts.clone() {
            effects.push(SideEffect::PlayTts(tts));
        }

        // 3. Classify
        let last_user = self.chat.last_user_text().map(str::to_string);
        let utterances = Utterances {
            user_text: last_user.as_deref(),
            stt_text: turn.recognized_user_text.as_deref(),
            reply_text: &turn.text,
            remove_flag: turn.raw_flags.remove_from_cart,
        };
        let families = self.classifier.families(&utterances);
        let intent = self.classifier.classify(&utterances);
        let coupon_requested = self
            .classifier
            .coupon_indicated(&utterances, turn.payment_method.as_deref());
        self.telemetry.record(TelemetryEvent::IntentClassified {
            intent,
            families: families.len(),
        });
        debug!(
            %epoch,
            intent = intent.as_str(),
            step = ?turn.step.as_ref().map(|s| s.as_str()),
            screen = self.screen.as_str(),
            "turn classified"
        );

        // 4. Intent overrides
        match intent {
            Intent::PreviousNavigationQuestion => {
                let start = self.highlight.focus_back(self.tick);
                self.highlight_effect(start, effects);
                return;
            }
            Intent::RemovalRequest => {
                let target = turn.remove_target.clone().or_else(|| {
                    let slots = &turn.slots;
                    (slots.item_id.is_some() || slots.item_name.is_some()).then(|| ItemRef {
                        item_id: slots.item_id.clone(),
                        item_name: slots.item_name.clone(),
                    })
                });
                match target {
                    Some(target) => {
                        let mutation = CartMutation::Remove(target);
                        let key = mutation.key(format!("turn-{}", epoch.seq));
                        self.apply_mutation(&mutation, key);
                    }
                    None => debug!("removal requested without a target"),
                }
                return;
            }
            Intent::LocationQuestion => {
                self.focus_turn(&turn, effects);
                return;
            }
            _ => {}
        }

        // 5. Route
        let previous_messages = if self.config.carry_messages {
            self.chat.to_route_param().ok()
        } else {
            None
        };
        let ctx = RouteContext {
            screen: self.screen,
            catalog: &*self.catalog,
            coupon_requested,
            add_flag: turn.raw_flags.add_to_cart,
            cart_inference_allowed: turn.focus_target.is_none(),
            nonce: format!("{}-{}", epoch.seq, self.tick.as_millis()),
            previous_messages,
            selection: self.screen_selection.clone(),
        };
        let action = router::route(turn.step.as_ref(), &turn.slots, intent, &ctx);
        info!(%epoch, action = action.kind(), "turn routed");
        self.execute(action, epoch, effects);

        if !intent.suppresses_highlight() {
            self.focus_turn(&turn, effects);
        }
    }

    fn execute(&mut self, action: Action, epoch: TurnEpoch, effects: &mut Vec<SideEffect>) {
        match action {
            Action::Stay => {}
            Action::Navigate(screen, params) => self.navigate(screen, params, effects),
            Action::NavigateAndAddToCart(screen, params, mutation) => {
                let nonce = params.get(param::TIMESTAMP).cloned().unwrap_or_default();
                self.apply_mutation(&mutation, mutation.key(nonce));
                self.navigate(screen, params, effects);
            }
            Action::AddToCart(mutation) => {
                let key = mutation.key(format!("turn-{}", epoch.seq));
                self.apply_mutation(&mutation, key);
            }
            Action::GoBack => {
                self.telemetry.record(TelemetryEvent::NavigationIssued {
                    action: ActionKind::GoBack,
                });
                effects.push(SideEffect::GoBack);
            }
            Action::OpenModal(Modal::PaymentMethod) => {
                match self.payment.open_method_selector(self.tick) {
                    Some(transition) => self.payment_effect(transition, effects),
                    None => debug!(phase = ?self.payment.phase(), "payment already under way"),
                }
            }
            Action::OpenModal(Modal::CardInsert) => match self.payment.begin_card(self.tick) {
                Some(transition) => self.payment_effect(transition, effects),
                None => debug!(phase = ?self.payment.phase(), "card payment not startable"),
            },
            Action::OpenModal(modal) => {
                self.telemetry.record(TelemetryEvent::NavigationIssued {
                    action: ActionKind::OpenModal,
                });
                effects.push(SideEffect::OpenModal(modal));
            }
            Action::BeginCouponPayment => match self.payment.begin_coupon(self.tick) {
                Some(transition) => self.payment_effect(transition, effects),
                None => debug!(phase = ?self.payment.phase(), "coupon payment not startable"),
            },
        }
    }

    fn navigate(&mut self, screen: Screen, params: RouteParams, effects: &mut Vec<SideEffect>) {
        self.telemetry.record(TelemetryEvent::NavigationIssued {
            action: ActionKind::Navigate,
        });
        self.screen = screen;
        self.screen_selection = selection_from_params(screen, &params);
        effects.push(SideEffect::Navigate(screen, params));
        if screen == Screen::OrderComplete {
            if let Some(transition) = self.payment.settle(self.tick) {
                self.payment_effect(transition, effects);
            }
        }
    }

    /// Menu list entry may carry a selection to add; the params' `_timestamp`
    /// is the nonce, so the add that travelled with the navigation is not repeated.
    fn enter_screen(&mut self, screen: Screen, params: &RouteParams) {
        self.screen = screen;
        self.screen_selection = selection_from_params(screen, params);
        if self.chat.is_empty() {
            if let Some(carried) = params.get(param::PREVIOUS_MESSAGES) {
                if !self.chat.restore_route_param(carried) {
                    warn!("carried chat log unreadable, starting empty");
                }
            }
        }
        if screen != Screen::MenuList {
            return;
        }
        let Some(mutation) = mutation_from_params(params) else {
            return;
        };
        let nonce = params.get(param::TIMESTAMP).cloned().unwrap_or_default();
        let key = mutation.key(nonce);
        self.apply_mutation(&mutation, key);
    }

    /// Desserts go straight into the cart; anything else is asked about.
    fn tap(&mut self, item_id: &str, effects: &mut Vec<SideEffect>) {
        let Some(item) = self.catalog.by_id(item_id).cloned() else {
            debug!(item_id, "tap on unknown item");
            return;
        };
        if item.category == Category::Dessert {
            let mutation = CartMutation::Add {
                item_id: item.id.clone(),
                item_name: item.name.clone(),
                quantity: 1,
                options: Default::default(),
            };
            let key = mutation.key(format!("tap-{}", Uuid::new_v4()));
            self.apply_mutation(&mutation, key);
        } else {
            self.submit_text(item.name, effects);
        }
    }

    fn apply_mutation(&mut self, mutation: &CartMutation, key: MutationKey) -> CartUpdate {
        let update = self
            .cart
            .apply(mutation, key, self.tick, &*self.catalog, &mut self.chat);
        let kind = match mutation {
            CartMutation::Add { .. } => MutationKind::Add,
            CartMutation::Remove(_) => MutationKind::Remove,
        };
        let outcome = match update.outcome {
            MutationOutcome::Added { .. } | MutationOutcome::Removed { .. } => MutationResult::Applied,
            MutationOutcome::Duplicate => MutationResult::Duplicate,
            MutationOutcome::NotInCart => MutationResult::NotInCart,
        };
        self.telemetry.record(TelemetryEvent::Mutation { kind, outcome });
        update
    }

    fn focus_turn(&mut self, turn: &TurnResponse, effects: &mut Vec<SideEffect>) {
        let Some(token) = &turn.focus_target else {
            return;
        };
        if let Some(start) = self.highlight.focus(token, &*self.catalog, self.tick) {
            self.highlight_effect(start, effects);
        }
    }

    fn highlight_effect(&mut self, start: HighlightStart, effects: &mut Vec<SideEffect>) {
        if start.preempted.is_some() {
            self.telemetry.record(TelemetryEvent::Highlight {
                event: HighlightEventKind::Preempted,
                tick: self.tick,
            });
        }
        self.telemetry.record(TelemetryEvent::Highlight {
            event: HighlightEventKind::Started,
            tick: self.tick,
        });
        effects.push(SideEffect::HighlightStarted(start));
    }

    fn payment_effect(&mut self, transition: PaymentTransition, effects: &mut Vec<SideEffect>) {
        self.telemetry.record(TelemetryEvent::PaymentTransition {
            from: transition.from,
            to: transition.to,
            tick: self.tick,
        });
        effects.push(Scheduler::payment(&transition));

        match (transition.from, transition.to) {
            (PaymentPhase::CardInsert, PaymentPhase::Processing) => {
                self.card_notice = self.submit_text(chat::CARD_INSERTED.to_string(), effects);
                self.card_confirmed = false;
            }
            (PaymentPhase::Processing, PaymentPhase::Complete) => {
                if !self.card_confirmed {
                    self.chat.assistant(chat::PAYMENT_COMPLETE);
                }
                self.card_notice = None;
                self.card_confirmed = false;
                if self.payment.method() == Some(PaymentMethod::Coupon) {
                    self.submit_text(chat::COUPON_SETTLED.to_string(), effects);
                }
            }
            _ => {}
        }
    }

    /// Cancels every timer this reactor owns and any request in flight.
    fn teardown(&mut self, effects: &mut Vec<SideEffect>) {
        info!(ticks = self.tick.frame, "teardown");
        if let Some(cleared) = self.highlight.cancel() {
            self.telemetry.record(TelemetryEvent::Highlight {
                event: HighlightEventKind::Cancelled,
                tick: self.tick,
            });
            effects.push(SideEffect::HighlightCleared(cleared));
        }
        if let Some(transition) = self.payment.dismiss(self.tick) {
            self.payment_effect(transition, effects);
        }
        self.cart.clear_quarantine();
        self.pending = None;
        self.card_notice = None;
        self.card_confirmed = false;
        self.screen_selection = SlotSet::default();
        effects.push(SideEffect::CancelInFlight);
    }

    pub fn session_duration_ms(&self) -> u64 {
        self.tick.frame * TICK_MS
    }
}

/// Rebuilds the selection a navigation carried. Needs `addToCart=true` with an
/// item, or a complete item + temperature + size selection.
pub fn mutation_from_params(params: &RouteParams) -> Option<CartMutation> {
    let get = |key: &str| {
        params
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    let flagged = params
        .get(param::ADD_TO_CART)
        .is_some_and(|v| v.trim() == "true");
    let complete = get(param::TEMPERATURE).is_some() && get(param::SIZE).is_some();
    if !(flagged || complete) {
        return None;
    }

    CartMutation::add_from_slots(&slots_from_params(params))
}

/// The selection a guided screen was opened with. Other screens hold none.
pub fn selection_from_params(screen: Screen, params: &RouteParams) -> SlotSet {
    if screen.is_guided() {
        slots_from_params(params)
    } else {
        SlotSet::default()
    }
}

fn slots_from_params(params: &RouteParams) -> SlotSet {
    let get = |key: &str| {
        params
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    normalize(&BackendSlots {
        menu_id: get(param::ITEM_ID),
        menu_name: get(param::ITEM_NAME),
        temp: get(param::TEMPERATURE),
        size: get(param::SIZE),
        bean: get(param::BEAN),
        add_ons: get(param::ADD_ONS).map(serde_json::Value::String),
    })
}
