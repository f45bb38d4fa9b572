use malo::catalog::MenuCatalog;
use malo::kernel::cart::{CartMutation, CartSynchronizer, MutationKey, MutationOutcome};
use malo::kernel::time::Tick;
use malo::outputs::chat::ChatLog;
use malo::outputs::realizer;
use malo::turn::types::{ItemRef, Size, SlotSet, Temperature};

fn tiramisu() -> CartMutation {
    CartMutation::add_from_slots(&SlotSet {
        item_id: Some("tiramisu".into()),
        item_name: Some("티라미수".into()),
        ..SlotSet::default()
    })
    .unwrap()
}

fn latte(temperature: Temperature, size: Size) -> CartMutation {
    CartMutation::add_from_slots(&SlotSet {
        item_id: Some("cafe-latte".into()),
        item_name: Some("카페 라떼".into()),
        temperature: Some(temperature),
        size: Some(size),
        ..SlotSet::default()
    })
    .unwrap()
}

fn at(frame: u64) -> Tick {
    Tick { frame }
}

#[test]
fn test_same_key_applies_once_inside_window() {
    let catalog = MenuCatalog::kiosk_default();
    let mut chat = ChatLog::new();
    let mut sync = CartSynchronizer::new(5_000);
    let add = tiramisu();

    // 1. First delivery applies
    let first = sync.apply(&add, add.key("turn-1"), at(0), &catalog, &mut chat);
    assert_eq!(
        first.outcome,
        MutationOutcome::Added { item_id: "tiramisu".into(), quantity: 1 }
    );

    // 2. Redelivery 1 s later is dropped
    let again = sync.apply(&add, add.key("turn-1"), at(50), &catalog, &mut chat);
    assert_eq!(again.outcome, MutationOutcome::Duplicate);
    assert_eq!(again.state.quantity_of("tiramisu"), 1, "Duplicate must not change the cart");

    // 3. A different nonce is a different request
    let other = sync.apply(&add, add.key("turn-2"), at(60), &catalog, &mut chat);
    assert_eq!(other.state.quantity_of("tiramisu"), 2);
    assert_eq!(other.state.total_price(), 2 * 5_200);
}

#[test]
fn test_key_evicted_after_window() {
    let catalog = MenuCatalog::kiosk_default();
    let mut chat = ChatLog::new();
    let mut sync = CartSynchronizer::new(5_000);
    let add = tiramisu();

    sync.apply(&add, add.key("tap-1"), at(0), &catalog, &mut chat);
    assert_eq!(sync.pending_keys(), 1);

    sync.tick(at(249));
    assert_eq!(sync.pending_keys(), 1, "Still quarantined just before 5 s");

    sync.tick(at(250));
    assert_eq!(sync.pending_keys(), 0, "Evicted once the window closes");

    let later = sync.apply(&add, add.key("tap-1"), at(251), &catalog, &mut chat);
    assert_eq!(later.state.quantity_of("tiramisu"), 2);
}

#[test]
fn test_key_identity_includes_options() {
    let hot = latte(Temperature::Hot, Size::Small);
    let cold = latte(Temperature::Cold, Size::Small);

    assert_ne!(hot.key("n"), cold.key("n"));
    assert_eq!(hot.key("n"), MutationKey::new("cafe-latte", "hot|small||", "n"));
}

#[test]
fn test_add_merges_options_and_messages() {
    let catalog = MenuCatalog::kiosk_default();
    let mut chat = ChatLog::new();
    let mut sync = CartSynchronizer::new(5_000);

    let first = latte(Temperature::Hot, Size::Small);
    sync.apply(&first, first.key("a"), at(0), &catalog, &mut chat);
    let second = latte(Temperature::Cold, Size::Large);
    let update = sync.apply(&second, second.key("b"), at(1), &catalog, &mut chat);

    assert_eq!(update.state.lines.len(), 1, "One line per item");
    let line = &update.state.lines[0];
    assert_eq!(line.quantity, 2);
    assert_eq!(line.options.temperature, Some(Temperature::Cold));
    assert_eq!(line.options.size, Some(Size::Large));
    assert_eq!(line.unit_price, 3_800);

    let texts: Vec<&str> = chat.messages().iter().map(|m| m.text.as_str()).collect();
    assert!(texts.contains(&"카페 라떼가 담겼습니다."));
    assert!(texts.contains(&"카페 라떼를 차갑게, 큰 사이즈로 준비할게요."));
}

#[test]
fn test_remove_deletes_whole_line() {
    let catalog = MenuCatalog::kiosk_default();
    let mut chat = ChatLog::new();
    let mut sync = CartSynchronizer::new(5_000);
    let add = tiramisu();

    sync.apply(&add, add.key("1"), at(0), &catalog, &mut chat);
    sync.apply(&add, add.key("2"), at(1), &catalog, &mut chat);
    assert_eq!(sync.state().quantity_of("tiramisu"), 2);

    let remove = CartMutation::Remove(ItemRef {
        item_id: Some("DESSERT_TIRAMISU".into()),
        item_name: None,
    });
    let update = sync.apply(&remove, remove.key("turn-3"), at(2), &catalog, &mut chat);

    assert_eq!(update.outcome, MutationOutcome::Removed { item_id: "tiramisu".into() });
    assert!(update.state.is_empty());
    assert_eq!(
        chat.last().map(|m| m.text.as_str()),
        Some("티라미수가 장바구니에서 빠졌어요.")
    );
}

#[test]
fn test_remove_by_name_and_missing_item() {
    let catalog = MenuCatalog::kiosk_default();
    let mut chat = ChatLog::new();
    let mut sync = CartSynchronizer::new(5_000);

    let add = latte(Temperature::Hot, Size::Medium);
    sync.apply(&add, add.key("1"), at(0), &catalog, &mut chat);

    let by_name = CartMutation::Remove(ItemRef {
        item_id: None,
        item_name: Some("카페라떼".into()),
    });
    let update = sync.apply(&by_name, by_name.key("2"), at(1), &catalog, &mut chat);
    assert!(update.outcome.applied(), "Whitespace is ignored in names");

    let absent = CartMutation::Remove(ItemRef {
        item_id: Some("tiramisu".into()),
        item_name: None,
    });
    let update = sync.apply(&absent, absent.key("3"), at(2), &catalog, &mut chat);
    assert_eq!(update.outcome, MutationOutcome::NotInCart);
    assert_eq!(sync.pending_keys(), 2, "Unapplied removals are not remembered");
}

#[test]
fn test_reset_and_particles() {
    let catalog = MenuCatalog::kiosk_default();
    let mut chat = ChatLog::new();
    let mut sync = CartSynchronizer::new(5_000);
    let add = tiramisu();

    sync.apply(&add, add.key("1"), at(0), &catalog, &mut chat);
    sync.reset();
    assert!(sync.state().is_empty());
    assert_eq!(sync.pending_keys(), 0);

    assert_eq!(realizer::added("크루아상"), "크루아상이 담겼습니다.");
    assert_eq!(realizer::with_particle("espresso", "을", "를"), "espresso를");
}
