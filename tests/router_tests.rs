use malo::catalog::MenuCatalog;
use malo::kernel::cart::CartMutation;
use malo::kernel::intent::Intent;
use malo::kernel::router::{param, route, Action, Modal, RouteContext, RouteParams, Screen};
use malo::turn::types::{DialogueStep, Size, SlotSet, Temperature};

fn ctx(screen: Screen, catalog: &MenuCatalog) -> RouteContext<'_> {
    RouteContext {
        screen,
        catalog,
        coupon_requested: false,
        add_flag: false,
        cart_inference_allowed: true,
        nonce: "n-1".to_string(),
        previous_messages: None,
        selection: SlotSet::default(),
    }
}

fn item(id: &str, name: &str) -> SlotSet {
    SlotSet {
        item_id: Some(id.to_string()),
        item_name: Some(name.to_string()),
        ..SlotSet::default()
    }
}

fn latte_complete() -> SlotSet {
    SlotSet {
        temperature: Some(Temperature::Cold),
        size: Some(Size::Large),
        ..item("cafe-latte", "카페 라떼")
    }
}

#[test]
fn test_coffee_item_opens_temperature_screen() {
    let catalog = MenuCatalog::kiosk_default();
    let action = route(
        Some(&DialogueStep::MenuItem),
        &item("americano", "아메리카노"),
        Intent::None,
        &ctx(Screen::MenuList, &catalog),
    );

    let expected = RouteParams::from([
        (param::ITEM_ID.to_string(), "americano".to_string()),
        (param::ITEM_NAME.to_string(), "아메리카노".to_string()),
    ]);
    assert_eq!(action, Action::Navigate(Screen::TemperatureSelection, expected));
}

#[test]
fn test_dessert_item_adds_one() {
    let catalog = MenuCatalog::kiosk_default();
    let action = route(
        Some(&DialogueStep::MenuItem),
        &item("tiramisu", "티라미수"),
        Intent::None,
        &ctx(Screen::MenuList, &catalog),
    );

    match action {
        Action::AddToCart(CartMutation::Add { item_id, quantity, .. }) => {
            assert_eq!(item_id, "tiramisu");
            assert_eq!(quantity, 1);
        }
        other => panic!("expected AddToCart, got {other:?}"),
    }
}

#[test]
fn test_location_question_does_nothing() {
    let catalog = MenuCatalog::kiosk_default();
    let action = route(
        Some(&DialogueStep::MenuItem),
        &item("americano", "아메리카노"),
        Intent::LocationQuestion,
        &ctx(Screen::MenuList, &catalog),
    );
    assert_eq!(action, Action::Stay);
}

#[test]
fn test_dessert_with_focus_token_is_not_added() {
    let catalog = MenuCatalog::kiosk_default();
    let mut context = ctx(Screen::MenuList, &catalog);
    context.cart_inference_allowed = false;

    let action = route(
        Some(&DialogueStep::MenuItem),
        &item("tiramisu", "티라미수"),
        Intent::None,
        &context,
    );
    assert_eq!(action, Action::Stay);
}

#[test]
fn test_guided_steps_need_their_slots() {
    let catalog = MenuCatalog::kiosk_default();
    let on_temperature = ctx(Screen::TemperatureSelection, &catalog);

    // 1. Size without temperature stays
    let action = route(Some(&DialogueStep::Size), &item("cafe-latte", "카페 라떼"), Intent::None, &on_temperature);
    assert_eq!(action, Action::Stay);

    // 2. Options without size stays
    let mut slots = item("cafe-latte", "카페 라떼");
    slots.temperature = Some(Temperature::Hot);
    let action = route(Some(&DialogueStep::Options), &slots, Intent::None, &on_temperature);
    assert_eq!(action, Action::Stay);

    // 3. Size with temperature moves on
    let action = route(Some(&DialogueStep::Size), &slots, Intent::None, &on_temperature);
    match action {
        Action::Navigate(Screen::SizeSelection, params) => {
            assert_eq!(params.get(param::TEMPERATURE).map(String::as_str), Some("hot"));
        }
        other => panic!("expected size screen, got {other:?}"),
    }

    // 4. The screen that already shows the step stays
    let on_size = ctx(Screen::SizeSelection, &catalog);
    assert_eq!(route(Some(&DialogueStep::Size), &slots, Intent::None, &on_size), Action::Stay);
}

#[test]
fn test_add_more_closes_guided_flow() {
    let catalog = MenuCatalog::kiosk_default();

    let action = route(
        Some(&DialogueStep::AddMore),
        &latte_complete(),
        Intent::None,
        &ctx(Screen::OptionSelection, &catalog),
    );
    match action {
        Action::NavigateAndAddToCart(Screen::MenuList, params, CartMutation::Add { item_id, .. }) => {
            assert_eq!(item_id, "cafe-latte");
            assert_eq!(params.get(param::ADD_TO_CART).map(String::as_str), Some("true"));
            assert_eq!(params.get(param::TIMESTAMP).map(String::as_str), Some("n-1"));
            assert_eq!(params.get(param::SIZE).map(String::as_str), Some("large"));
        }
        other => panic!("expected NavigateAndAddToCart, got {other:?}"),
    }

    let on_menu = route(
        Some(&DialogueStep::Review),
        &latte_complete(),
        Intent::None,
        &ctx(Screen::MenuList, &catalog),
    );
    assert_eq!(on_menu, Action::Stay, "No automatic navigation from the menu list");
}

#[test]
fn test_screen_selection_fills_turn_gaps() {
    let catalog = MenuCatalog::kiosk_default();

    // 1. Size screen opened with item and temperature
    let mut on_size = ctx(Screen::SizeSelection, &catalog);
    on_size.selection = SlotSet {
        temperature: Some(Temperature::Cold),
        ..item("cafe-latte", "카페 라떼")
    };

    // 2. Turn names only the size
    let turn = SlotSet {
        size: Some(Size::Large),
        ..SlotSet::default()
    };
    let action = route(Some(&DialogueStep::AddMore), &turn, Intent::None, &on_size);

    // 3. The screen's selection completes it
    match action {
        Action::NavigateAndAddToCart(Screen::MenuList, params, CartMutation::Add { item_id, .. }) => {
            assert_eq!(item_id, "cafe-latte");
            assert_eq!(params.get(param::TEMPERATURE).map(String::as_str), Some("cold"));
            assert_eq!(params.get(param::SIZE).map(String::as_str), Some("large"));
        }
        other => panic!("expected NavigateAndAddToCart, got {other:?}"),
    }
}

#[test]
fn test_screen_selection_ignored_for_other_item() {
    let catalog = MenuCatalog::kiosk_default();
    let mut on_size = ctx(Screen::SizeSelection, &catalog);
    on_size.selection = SlotSet {
        temperature: Some(Temperature::Cold),
        ..item("cafe-latte", "카페 라떼")
    };

    let turn = SlotSet {
        size: Some(Size::Large),
        ..item("americano", "아메리카노")
    };
    let action = route(Some(&DialogueStep::AddMore), &turn, Intent::None, &on_size);

    assert_eq!(action, Action::Stay, "Latte temperature must not complete an americano");
}

#[test]
fn test_screen_specific_transitions() {
    let catalog = MenuCatalog::kiosk_default();
    let empty = SlotSet::default();

    let action = route(Some(&DialogueStep::DineType), &empty, Intent::None, &ctx(Screen::StartVoiceOrder, &catalog));
    assert_eq!(action, Action::Navigate(Screen::EatOrTake, RouteParams::new()));

    let action = route(Some(&DialogueStep::MenuItem), &empty, Intent::None, &ctx(Screen::EatOrTake, &catalog));
    assert_eq!(action, Action::Navigate(Screen::MenuList, RouteParams::new()));

    let action = route(
        Some(&DialogueStep::MenuItem),
        &item("americano", "아메리카노"),
        Intent::None,
        &ctx(Screen::TemperatureSelection, &catalog),
    );
    assert_eq!(action, Action::Navigate(Screen::MenuList, RouteParams::new()));
}

#[test]
fn test_payment_steps() {
    let catalog = MenuCatalog::kiosk_default();
    let empty = SlotSet::default();
    let on_menu = ctx(Screen::MenuList, &catalog);

    assert_eq!(
        route(Some(&DialogueStep::Payment), &empty, Intent::None, &on_menu),
        Action::OpenModal(Modal::PaymentMethod)
    );
    assert_eq!(
        route(Some(&DialogueStep::Card), &empty, Intent::None, &on_menu),
        Action::OpenModal(Modal::CardInsert)
    );
    assert_eq!(
        route(Some(&DialogueStep::Coupon), &empty, Intent::None, &on_menu),
        Action::BeginCouponPayment
    );

    let mut coupon = ctx(Screen::MenuList, &catalog);
    coupon.coupon_requested = true;
    assert_eq!(
        route(Some(&DialogueStep::Payment), &empty, Intent::PaymentRequest, &coupon),
        Action::BeginCouponPayment
    );
    assert_eq!(route(None, &empty, Intent::None, &coupon), Action::BeginCouponPayment);
}

#[test]
fn test_unknown_or_missing_step_stays() {
    let catalog = MenuCatalog::kiosk_default();
    let on_menu = ctx(Screen::MenuList, &catalog);

    assert_eq!(
        route(Some(&DialogueStep::Unknown("mystery".into())), &latte_complete(), Intent::None, &on_menu),
        Action::Stay
    );
    assert_eq!(route(None, &latte_complete(), Intent::None, &on_menu), Action::Stay);
}

#[test]
fn test_previous_step_goes_back_one_screen() {
    let catalog = MenuCatalog::kiosk_default();
    let action = route(
        Some(&DialogueStep::Options),
        &latte_complete(),
        Intent::PreviousStepRequest,
        &ctx(Screen::OptionSelection, &catalog),
    );
    match action {
        Action::Navigate(Screen::SizeSelection, params) => {
            assert_eq!(params.get(param::ITEM_ID).map(String::as_str), Some("cafe-latte"));
            assert!(params.get(param::SIZE).is_none());
        }
        other => panic!("expected size screen, got {other:?}"),
    }
}

#[test]
fn test_explicit_add_flag() {
    let catalog = MenuCatalog::kiosk_default();
    let mut context = ctx(Screen::MenuList, &catalog);
    context.add_flag = true;

    let action = route(Some(&DialogueStep::AddMore), &latte_complete(), Intent::None, &context);
    assert!(matches!(action, Action::AddToCart(_)), "got {action:?}");

    let action = route(Some(&DialogueStep::AddMore), &latte_complete(), Intent::PaymentRequest, &context);
    assert_eq!(action, Action::Stay, "Payment talk suppresses add inference");
}

#[test]
fn test_previous_step_without_step_pops_screen() {
    let catalog = MenuCatalog::kiosk_default();
    let empty = SlotSet::default();

    assert_eq!(
        route(None, &empty, Intent::PreviousStepRequest, &ctx(Screen::SizeSelection, &catalog)),
        Action::GoBack
    );
    assert_eq!(
        route(None, &empty, Intent::PreviousStepRequest, &ctx(Screen::StartVoiceOrder, &catalog)),
        Action::Stay,
        "Nothing to go back to"
    );
}
