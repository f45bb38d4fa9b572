use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The backend's declared phase of the ordering conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialogueStep {
    Greeting,
    DineType,
    MenuItem,
    Temperature,
    Size,
    Options,
    AddMore,
    Review,
    Payment,
    Coupon,
    Card,
    Phone,
    Done,
    /// Anything the client does not know. Routes to "stay".
    Unknown(String),
}

impl DialogueStep {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "greeting" => DialogueStep::Greeting,
            "dine_type" => DialogueStep::DineType,
            "menu_item" => DialogueStep::MenuItem,
            "temperature" | "temp" => DialogueStep::Temperature,
            "size" => DialogueStep::Size,
            "options" | "option" => DialogueStep::Options,
            "add_more" => DialogueStep::AddMore,
            "review" | "confirm" => DialogueStep::Review,
            "payment" => DialogueStep::Payment,
            "coupon" => DialogueStep::Coupon,
            "card" => DialogueStep::Card,
            "phone" => DialogueStep::Phone,
            "done" => DialogueStep::Done,
            other => DialogueStep::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DialogueStep::Greeting => "greeting",
            DialogueStep::DineType => "dine_type",
            DialogueStep::MenuItem => "menu_item",
            DialogueStep::Temperature => "temperature",
            DialogueStep::Size => "size",
            DialogueStep::Options => "options",
            DialogueStep::AddMore => "add_more",
            DialogueStep::Review => "review",
            DialogueStep::Payment => "payment",
            DialogueStep::Coupon => "coupon",
            DialogueStep::Card => "card",
            DialogueStep::Phone => "phone",
            DialogueStep::Done => "done",
            DialogueStep::Unknown(raw) => raw.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Temperature {
    Hot,
    Cold,
    /// Unrecognised backend value, lower-cased and hyphenated.
    Other(String),
}

impl Temperature {
    pub fn as_str(&self) -> &str {
        match self {
            Temperature::Hot => "hot",
            Temperature::Cold => "cold",
            Temperature::Other(raw) => raw.as_str(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Temperature::Hot => "따뜻하게",
            Temperature::Cold => "차갑게",
            Temperature::Other(raw) => raw.as_str(),
        }
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Size {
    Small,
    Medium,
    Large,
    Other(String),
}

impl Size {
    pub fn as_str(&self) -> &str {
        match self {
            Size::Small => "small",
            Size::Medium => "medium",
            Size::Large => "large",
            Size::Other(raw) => raw.as_str(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Size::Small => "작은 사이즈",
            Size::Medium => "중간 사이즈",
            Size::Large => "큰 사이즈",
            Size::Other(raw) => raw.as_str(),
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slots in client vocabulary. Nothing past the normalizer sees backend spellings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSet {
    pub item_id: Option<String>,
    pub item_name: Option<String>,
    /// Category token cut from a composite backend id, if there was one.
    pub category: Option<String>,
    pub temperature: Option<Temperature>,
    pub size: Option<Size>,
    pub bean: Option<String>,
    pub add_ons: BTreeSet<String>,
}

impl SlotSet {
    pub fn has_item(&self) -> bool {
        self.item_id.is_some() && self.item_name.is_some()
    }

    pub fn has_temperature(&self) -> bool {
        self.has_item() && self.temperature.is_some()
    }

    pub fn has_size(&self) -> bool {
        self.has_temperature() && self.size.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.item_id.is_none()
            && self.item_name.is_none()
            && self.temperature.is_none()
            && self.size.is_none()
            && self.bean.is_none()
            && self.add_ons.is_empty()
    }

    /// Overwrites every field `incoming` has set. Add-ons are replaced only
    /// when `incoming` names some.
    pub fn overlay(&mut self, incoming: &SlotSet) {
        if incoming.item_id.is_some() {
            self.item_id = incoming.item_id.clone();
        }
        if incoming.item_name.is_some() {
            self.item_name = incoming.item_name.clone();
        }
        if incoming.category.is_some() {
            self.category = incoming.category.clone();
        }
        if incoming.temperature.is_some() {
            self.temperature = incoming.temperature.clone();
        }
        if incoming.size.is_some() {
            self.size = incoming.size.clone();
        }
        if incoming.bean.is_some() {
            self.bean = incoming.bean.clone();
        }
        if !incoming.add_ons.is_empty() {
            self.add_ons = incoming.add_ons.clone();
        }
    }

    /// These slots with gaps filled from `base`. A turn that names a different
    /// item than `base` keeps only its own slots.
    pub fn backed_by(&self, base: &SlotSet) -> SlotSet {
        if let (Some(mine), Some(theirs)) = (&self.item_id, &base.item_id) {
            if mine != theirs {
                return self.clone();
            }
        }
        let mut merged = base.clone();
        merged.overlay(self);
        merged
    }
}

/// Opaque `target_element_id` from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FocusToken(pub String);

impl FocusToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFlags {
    pub add_to_cart: bool,
    pub remove_from_cart: bool,
}

/// Item named by a removal payload, already normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    pub item_id: Option<String>,
    pub item_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TtsLocation {
    Url(String),
    Path(String),
}

/// One backend reply to one user utterance, in canonical form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnResponse {
    pub text: String,
    /// `None` when the reply carried no step at all.
    pub step: Option<DialogueStep>,
    pub slots: SlotSet,
    pub focus_target: Option<FocusToken>,
    pub raw_flags: RawFlags,
    pub recognized_user_text: Option<String>,
    pub remove_target: Option<ItemRef>,
    pub payment_method: Option<String>,
    pub tts: Option<TtsLocation>,
}

impl TurnResponse {
    pub fn with_step(step: DialogueStep) -> Self {
        Self {
            step: Some(step),
            ..Self::default()
        }
    }
}
