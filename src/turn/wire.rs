use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::normalizer::{normalize, split_menu_id, BackendSlots};
use super::types::{DialogueStep, FocusToken, ItemRef, RawFlags, TtsLocation, TurnResponse};

/// Keys the backend has used for the assistant reply, in priority order.
const RESPONSE_TEXT_KEYS: [&str; 8] = [
    "response_text",
    "response",
    "message",
    "text",
    "answer",
    "reply",
    "content",
    "data",
];

/// Keys that have carried the transcribed user utterance.
const USER_SPEECH_KEYS: [&str; 17] = [
    "stt_text",
    "user_text",
    "userText",
    "user_message",
    "userMessage",
    "user",
    "user_input",
    "userInput",
    "transcript",
    "transcription",
    "recognized_text",
    "recognizedText",
    "speech_text",
    "speechText",
    "spoken_text",
    "spokenText",
    "utterance",
];

/// `POST /session/start` reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionStart {
    #[serde(default, deserialize_with = "lenient_string")]
    pub session_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub response_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tts_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tts_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireContext {
    #[serde(default, deserialize_with = "lenient_string")]
    pub step: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub menu_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub menu_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub temp: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub size: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub bean: Option<String>,
    #[serde(default)]
    pub add_ons: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireMenuRef {
    #[serde(default, deserialize_with = "lenient_string")]
    pub menu_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub menu_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WirePayload {
    #[serde(default)]
    pub add_to_cart: Option<Value>,
    /// Either a flag or an object naming the item to remove.
    #[serde(default)]
    pub remove_from_cart: Option<Value>,
    #[serde(default)]
    pub remove_menu: Option<WireMenuRef>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub menu_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub menu_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub temp: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub size: Option<String>,
}

/// A turn exactly as `/session/text` and `/session/voice` return it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireTurn {
    #[serde(default)]
    pub context: Option<WireContext>,
    #[serde(default)]
    pub backend_payload: Option<WirePayload>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub target_element_id: Option<String>,
    #[serde(default)]
    pub add_to_cart: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WireTurn {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn response_text(&self) -> Option<String> {
        first_string(&self.extra, &RESPONSE_TEXT_KEYS)
    }

    pub fn user_speech(&self) -> Option<String> {
        user_speech_in(&self.extra)
    }

    pub fn tts_location(&self) -> Option<TtsLocation> {
        tts_in(&self.extra)
    }

    /// Canonicalize: pick the slot sources, run the normalizer, derive flags.
    pub fn into_turn(self) -> TurnResponse {
        let text = self.response_text().unwrap_or_default();
        let recognized_user_text = self.user_speech();
        let tts = self.tts_location();

        let context = self.context.unwrap_or_default();
        let payload = self.backend_payload.unwrap_or_default();

        let backend_slots = BackendSlots {
            menu_id: context.menu_id.clone().or_else(|| payload.menu_id.clone()),
            menu_name: context.menu_name.clone().or_else(|| payload.menu_name.clone()),
            temp: context.temp.clone().or_else(|| payload.temp.clone()),
            size: context.size.clone().or_else(|| payload.size.clone()),
            bean: context.bean.clone(),
            add_ons: context.add_ons.clone(),
        };

        let remove_flag = payload.remove_from_cart.as_ref().is_some_and(truthy);
        let raw_flags = RawFlags {
            add_to_cart: self.add_to_cart.as_ref().is_some_and(truthy)
                || payload.add_to_cart.as_ref().is_some_and(truthy),
            remove_from_cart: remove_flag,
        };

        let remove_target = if remove_flag {
            removal_target(&payload, &context)
        } else {
            None
        };

        TurnResponse {
            text,
            step: context
                .step
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(DialogueStep::parse),
            slots: normalize(&backend_slots),
            focus_target: self
                .target_element_id
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .map(FocusToken),
            raw_flags,
            recognized_user_text,
            remove_target,
            payment_method: context.payment_method.map(|m| m.trim().to_lowercase()),
            tts,
        }
    }
}

/// Removal names its item in `remove_from_cart`, then `remove_menu`, then the context.
fn removal_target(payload: &WirePayload, context: &WireContext) -> Option<ItemRef> {
    let from_flag = payload
        .remove_from_cart
        .as_ref()
        .and_then(|v| serde_json::from_value::<WireMenuRef>(v.clone()).ok())
        .filter(|r| r.menu_id.is_some() || r.menu_name.is_some());

    let source = from_flag
        .or_else(|| payload.remove_menu.clone())
        .filter(|r| r.menu_id.is_some() || r.menu_name.is_some())
        .unwrap_or_else(|| WireMenuRef {
            menu_id: context.menu_id.clone().or_else(|| payload.menu_id.clone()),
            menu_name: context.menu_name.clone().or_else(|| payload.menu_name.clone()),
        });

    let item_id = source.menu_id.as_deref().map(|id| split_menu_id(id).item_id);
    let item_name = source.menu_name.filter(|n| !n.trim().is_empty());
    if item_id.is_none() && item_name.is_none() {
        return None;
    }
    Some(ItemRef { item_id, item_name })
}

fn first_string(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(Value::String(s)) = map.get(*key) {
            if !s.trim().is_empty() {
                return Some(s.clone());
            }
        }
    }
    None
}

fn user_speech_in(map: &Map<String, Value>) -> Option<String> {
    first_string(map, &USER_SPEECH_KEYS).or_else(|| match map.get("data") {
        Some(Value::Object(nested)) => user_speech_in(nested),
        _ => None,
    })
}

fn tts_in(map: &Map<String, Value>) -> Option<TtsLocation> {
    if let Some(url) = first_string(map, &["tts_url", "ttsUrl"]) {
        return Some(TtsLocation::Url(url));
    }
    if let Some(path) = first_string(map, &["tts_path", "ttsPath"]) {
        return Some(TtsLocation::Path(path));
    }
    match map.get("data") {
        Some(Value::Object(nested)) => tts_in(nested),
        _ => None,
    }
}

/// Loose truthiness for flag fields that arrive as bools, strings or objects.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            !s.is_empty() && !s.eq_ignore_ascii_case("false") && s != "0"
        }
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}
