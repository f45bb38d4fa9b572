use malo::turn::normalizer::{
    denormalize, denormalize_menu_id, normalize, normalize_add_ons, normalize_size,
    normalize_temperature, split_menu_id, BackendSlots,
};
use malo::turn::types::{SlotSet, Size, Temperature};
use serde_json::json;

fn backend(menu_id: &str, name: Option<&str>, temp: Option<&str>, size: Option<&str>) -> BackendSlots {
    BackendSlots {
        menu_id: Some(menu_id.to_string()),
        menu_name: name.map(str::to_string),
        temp: temp.map(str::to_string),
        size: size.map(str::to_string),
        ..BackendSlots::default()
    }
}

#[test]
fn test_composite_menu_id_split() {
    let slots = normalize(&backend("COFFEE_CAFE_LATTE", Some("카페 라떼"), None, None));

    assert_eq!(slots.item_id.as_deref(), Some("cafe-latte"));
    assert_eq!(slots.category.as_deref(), Some("coffee"));
    assert_eq!(slots.item_name.as_deref(), Some("카페 라떼"));
}

#[test]
fn test_bare_menu_id_doubles_as_name() {
    let slots = normalize(&backend("Americano", None, None, None));

    assert_eq!(slots.item_id.as_deref(), Some("americano"));
    assert_eq!(slots.item_name.as_deref(), Some("americano"), "Bare id is the name fallback");
    assert_eq!(slots.category, None);
}

#[test]
fn test_backend_vocabulary_maps_to_canonical() {
    assert_eq!(normalize_temperature("ice"), Temperature::Cold);
    assert_eq!(normalize_temperature("HOT"), Temperature::Hot);
    assert_eq!(normalize_temperature("cold"), Temperature::Cold);
    assert_eq!(normalize_size("tall"), Size::Small);
    assert_eq!(normalize_size("Grande"), Size::Medium);
    assert_eq!(normalize_size("venti"), Size::Large);
    assert_eq!(normalize_size("large"), Size::Large);
}

#[test]
fn test_unknown_values_pass_through_hyphenated() {
    assert_eq!(
        normalize_temperature("Extra Hot"),
        Temperature::Other("extra-hot".to_string())
    );
    assert_eq!(normalize_size("TRENTA_CUP"), Size::Other("trenta-cup".to_string()));
}

#[test]
fn test_round_trip_over_temperature_and_size() {
    for temperature in [Temperature::Hot, Temperature::Cold] {
        for size in [Size::Small, Size::Medium, Size::Large] {
            let canonical = SlotSet {
                item_id: Some("cafe-latte".to_string()),
                item_name: Some("카페 라떼".to_string()),
                category: Some("coffee".to_string()),
                temperature: Some(temperature.clone()),
                size: Some(size.clone()),
                ..SlotSet::default()
            };
            let back = normalize(&denormalize(&canonical));
            assert_eq!(back, canonical, "{temperature}/{size} must survive a round trip");
        }
    }
}

#[test]
fn test_round_trip_without_category_keeps_item() {
    // 1. A hyphenated id with no category
    let canonical = SlotSet {
        item_id: Some("cafe-latte".to_string()),
        item_name: Some("카페 라떼".to_string()),
        size: Some(Size::Large),
        ..SlotSet::default()
    };

    // 2. Goes out as one bare token
    let raw = denormalize(&canonical);
    assert_eq!(raw.menu_id.as_deref(), Some("CAFE-LATTE"));

    // 3. Comes back without a made-up category
    let back = normalize(&raw);
    assert_eq!(back.category, None, "First word must not become a category");
    assert_eq!(back, canonical);
}

#[test]
fn test_denormalize_menu_id() {
    assert_eq!(denormalize_menu_id("cafe-latte", Some("coffee")), "COFFEE_CAFE_LATTE");
    assert_eq!(denormalize_menu_id("americano", None), "AMERICANO");
    assert_eq!(denormalize_menu_id("cafe-latte", None), "CAFE-LATTE");
    assert_eq!(split_menu_id("DESSERT_TIRAMISU").item_id, "tiramisu");
}

#[test]
fn test_add_on_shapes() {
    let from_array = normalize_add_ons(&json!(["shot", "Syrup"]));
    let from_string = normalize_add_ons(&json!("[\"shot\", \"syrup\"]"));
    let single = normalize_add_ons(&json!("whipping"));

    assert_eq!(from_array, from_string);
    assert!(from_array.contains("syrup"));
    assert_eq!(single.len(), 1);
    assert!(normalize_add_ons(&json!(null)).is_empty());
}
