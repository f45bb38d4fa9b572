//! Dialogue step + slots + screen -> exactly one UI action.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::catalog::{Catalog, Category};
use crate::kernel::cart::CartMutation;
use crate::kernel::intent::Intent;
use crate::turn::normalizer::denormalize;
use crate::turn::types::{DialogueStep, SlotSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Screen {
    StartVoiceOrder,
    EatOrTake,
    MenuList,
    TemperatureSelection,
    SizeSelection,
    OptionSelection,
    OrderComplete,
}

impl Screen {
    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::StartVoiceOrder => "StartVoiceOrder",
            Screen::EatOrTake => "EatOrTake",
            Screen::MenuList => "MenuList",
            Screen::TemperatureSelection => "TemperatureSelection",
            Screen::SizeSelection => "SizeSelection",
            Screen::OptionSelection => "OptionSelection",
            Screen::OrderComplete => "OrderComplete",
        }
    }

    /// The size and option screens end the guided flow back on the menu list.
    pub fn closes_guided_flow(&self) -> bool {
        matches!(self, Screen::SizeSelection | Screen::OptionSelection)
    }

    /// Screens that build up one item's selection.
    pub fn is_guided(&self) -> bool {
        matches!(
            self,
            Screen::TemperatureSelection | Screen::SizeSelection | Screen::OptionSelection
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modal {
    PaymentMethod,
    BarcodeScan,
    PaymentProcessing,
    PaymentComplete,
    CardInsert,
    PhoneInput,
}

/// Flat string bag handed to the screen router.
pub type RouteParams = BTreeMap<String, String>;

pub mod param {
    pub const ITEM_ID: &str = "itemId";
    pub const ITEM_NAME: &str = "itemName";
    pub const TEMPERATURE: &str = "temperature";
    pub const SIZE: &str = "size";
    pub const BEAN: &str = "bean";
    pub const ADD_ONS: &str = "addOns";
    pub const PREVIOUS_MESSAGES: &str = "previousMessages";
    pub const TIMESTAMP: &str = "_timestamp";
    pub const ADD_TO_CART: &str = "addToCart";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Stay,
    Navigate(Screen, RouteParams),
    /// Apply the mutation, then navigate. The params carry the same nonce so the
    /// destination's own entry handling cannot add it twice.
    NavigateAndAddToCart(Screen, RouteParams, CartMutation),
    AddToCart(CartMutation),
    /// Pop one screen; the router knows where that is.
    GoBack,
    OpenModal(Modal),
    BeginCouponPayment,
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Stay => "stay",
            Action::Navigate(..) => "navigate",
            Action::NavigateAndAddToCart(..) => "navigate_and_add",
            Action::AddToCart(_) => "add_to_cart",
            Action::GoBack => "go_back",
            Action::OpenModal(_) => "open_modal",
            Action::BeginCouponPayment => "begin_coupon_payment",
        }
    }
}

/// Everything about the moment of the turn that is not in the turn itself.
pub struct RouteContext<'a> {
    pub screen: Screen,
    pub catalog: &'a dyn Catalog,
    pub coupon_requested: bool,
    /// Backend asked explicitly for an add.
    pub add_flag: bool,
    /// False when a focus token is present: the turn is about pointing, not ordering.
    pub cart_inference_allowed: bool,
    /// Stamped into `_timestamp` for navigations that carry a cart add.
    pub nonce: String,
    pub previous_messages: Option<String>,
    /// What the guided screen on display already holds (its route params plus
    /// on-screen taps). Turn slots fill in on top of it.
    pub selection: SlotSet,
}

/// Route one turn. Pure; logging is the only effect.
pub fn route(
    step: Option<&DialogueStep>,
    slots: &SlotSet,
    intent: Intent,
    ctx: &RouteContext<'_>,
) -> Action {
    let merged = slots.backed_by(&ctx.selection);
    let slots = &merged;

    if intent.suppresses_navigation() {
        debug!(intent = intent.as_str(), "intent suppresses routing");
        return Action::Stay;
    }

    if intent == Intent::PreviousStepRequest {
        if let Some(action) = step_back(step, slots, ctx) {
            return action;
        }
        if step.is_none() && ctx.screen != Screen::StartVoiceOrder {
            return Action::GoBack;
        }
    }

    let may_add = ctx.cart_inference_allowed && !intent.suppresses_cart_inference();

    if ctx.add_flag && may_add && slots.has_item() {
        let complete = is_dessert(slots, ctx.catalog) || slots.has_size();
        if complete {
            if let Some(action) = close_with_add(slots, ctx) {
                return action;
            }
        }
    }

    let Some(step) = step else {
        return if ctx.coupon_requested {
            Action::BeginCouponPayment
        } else {
            debug!("turn carried no step, staying");
            Action::Stay
        };
    };

    match step {
        DialogueStep::Greeting => Action::Stay,
        DialogueStep::DineType => match ctx.screen {
            Screen::StartVoiceOrder => Action::Navigate(Screen::EatOrTake, base_params(ctx)),
            _ => Action::Stay,
        },
        DialogueStep::MenuItem => match ctx.screen {
            Screen::StartVoiceOrder | Screen::EatOrTake | Screen::TemperatureSelection => {
                Action::Navigate(Screen::MenuList, base_params(ctx))
            }
            screen if screen.closes_guided_flow() => close_guided_flow(slots, may_add, ctx),
            _ => choose_item(slots, may_add, ctx),
        },
        DialogueStep::Temperature => match ctx.screen {
            Screen::TemperatureSelection => Action::Stay,
            _ => choose_item(slots, may_add, ctx),
        },
        DialogueStep::Size => {
            if ctx.screen == Screen::SizeSelection {
                Action::Stay
            } else if slots.has_temperature() {
                Action::Navigate(Screen::SizeSelection, slot_params(slots, ctx))
            } else {
                warn!(step = step.as_str(), "size step without item and temperature, staying");
                Action::Stay
            }
        }
        DialogueStep::Options => {
            if ctx.screen == Screen::OptionSelection {
                Action::Stay
            } else if slots.has_size() {
                Action::Navigate(Screen::OptionSelection, slot_params(slots, ctx))
            } else {
                warn!(step = step.as_str(), "options step without a full selection, staying");
                Action::Stay
            }
        }
        DialogueStep::AddMore | DialogueStep::Review => {
            if ctx.screen.closes_guided_flow() && slots.has_size() && may_add {
                close_with_add(slots, ctx).unwrap_or(Action::Stay)
            } else {
                Action::Stay
            }
        }
        DialogueStep::Payment | DialogueStep::Coupon if ctx.coupon_requested => {
            Action::BeginCouponPayment
        }
        DialogueStep::Payment => Action::OpenModal(Modal::PaymentMethod),
        DialogueStep::Coupon => Action::BeginCouponPayment,
        DialogueStep::Card => Action::OpenModal(Modal::CardInsert),
        DialogueStep::Phone => Action::OpenModal(Modal::PhoneInput),
        DialogueStep::Done => Action::Navigate(Screen::OrderComplete, RouteParams::new()),
        DialogueStep::Unknown(raw) => {
            debug!(step = raw.as_str(), "unknown step, staying");
            Action::Stay
        }
    }
}

/// Menu list behaviour for a named item: desserts go straight into the cart,
/// everything else opens the temperature screen.
fn choose_item(slots: &SlotSet, may_add: bool, ctx: &RouteContext<'_>) -> Action {
    if !slots.has_item() {
        debug!("item step without id and name, staying");
        return Action::Stay;
    }
    if is_dessert(slots, ctx.catalog) {
        if !may_add {
            return Action::Stay;
        }
        return CartMutation::add_from_slots(slots)
            .map(Action::AddToCart)
            .unwrap_or(Action::Stay);
    }
    Action::Navigate(Screen::TemperatureSelection, item_params(slots, ctx))
}

fn close_guided_flow(slots: &SlotSet, may_add: bool, ctx: &RouteContext<'_>) -> Action {
    if slots.has_size() && may_add {
        if let Some(action) = close_with_add(slots, ctx) {
            return action;
        }
    }
    Action::Navigate(Screen::MenuList, base_params(ctx))
}

/// On a size/option screen the add travels with the navigation; elsewhere it
/// applies in place.
fn close_with_add(slots: &SlotSet, ctx: &RouteContext<'_>) -> Option<Action> {
    let mutation = CartMutation::add_from_slots(slots)?;
    if ctx.screen.closes_guided_flow() {
        let mut params = slot_params(slots, ctx);
        params.insert(param::ADD_TO_CART.to_string(), "true".to_string());
        params.insert(param::TIMESTAMP.to_string(), ctx.nonce.clone());
        Some(Action::NavigateAndAddToCart(Screen::MenuList, params, mutation))
    } else {
        Some(Action::AddToCart(mutation))
    }
}

/// One screen back along the guided flow.
fn step_back(step: Option<&DialogueStep>, slots: &SlotSet, ctx: &RouteContext<'_>) -> Option<Action> {
    let target = match step? {
        DialogueStep::Temperature => (Screen::MenuList, base_params(ctx)),
        DialogueStep::Size => (Screen::TemperatureSelection, item_params(slots, ctx)),
        DialogueStep::Options => (Screen::SizeSelection, temperature_params(slots, ctx)),
        DialogueStep::MenuItem | DialogueStep::AddMore | DialogueStep::Review
            if ctx.screen.closes_guided_flow() =>
        {
            (Screen::MenuList, base_params(ctx))
        }
        _ => return None,
    };
    if target.0 == ctx.screen {
        return Some(Action::Stay);
    }
    Some(Action::Navigate(target.0, target.1))
}

pub fn is_dessert(slots: &SlotSet, catalog: &dyn Catalog) -> bool {
    if slots.category.as_deref() == Some(Category::Dessert.as_str()) {
        return true;
    }
    catalog
        .resolve(slots.item_id.as_deref(), slots.item_name.as_deref())
        .is_some_and(|item| item.category == Category::Dessert)
}

fn base_params(ctx: &RouteContext<'_>) -> RouteParams {
    let mut params = RouteParams::new();
    if let Some(messages) = &ctx.previous_messages {
        params.insert(param::PREVIOUS_MESSAGES.to_string(), messages.clone());
    }
    params
}

fn item_params(slots: &SlotSet, ctx: &RouteContext<'_>) -> RouteParams {
    let mut params = base_params(ctx);
    if let Some(id) = &slots.item_id {
        params.insert(param::ITEM_ID.to_string(), id.clone());
    }
    if let Some(name) = &slots.item_name {
        params.insert(param::ITEM_NAME.to_string(), name.clone());
    }
    params
}

fn temperature_params(slots: &SlotSet, ctx: &RouteContext<'_>) -> RouteParams {
    let mut params = item_params(slots, ctx);
    if let Some(temperature) = &slots.temperature {
        params.insert(param::TEMPERATURE.to_string(), temperature.as_str().to_string());
    }
    params
}

/// Every slot the selection has, in client vocabulary.
pub fn slot_params(slots: &SlotSet, ctx: &RouteContext<'_>) -> RouteParams {
    let mut params = temperature_params(slots, ctx);
    if let Some(size) = &slots.size {
        params.insert(param::SIZE.to_string(), size.as_str().to_string());
    }
    if let Some(bean) = &slots.bean {
        params.insert(param::BEAN.to_string(), bean.clone());
    }
    if let Some(add_ons) = denormalize(slots).add_ons {
        params.insert(param::ADD_ONS.to_string(), add_ons.to_string());
    }
    params
}
