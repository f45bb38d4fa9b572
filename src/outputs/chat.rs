use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const VOICE_PLACEHOLDER: &str = "음성 메시지를 전송했어요.";
pub const TEXT_SEND_FAILED: &str = "메시지 전송에 실패했습니다. 다시 시도해주세요.";
pub const VOICE_SEND_FAILED: &str = "음성 메시지 전송에 실패했습니다. 다시 시도해주세요.";
pub const SESSION_FAILED: &str = "AI 서비스 연결에 실패했습니다. 잠시 후 다시 시도해주세요.";
pub const REPLY_WITHOUT_TEXT: &str = "응답을 받았습니다.";
/// Sent for the customer once the card-insert prompt runs out.
pub const CARD_INSERTED: &str = "카드 넣었어요";
/// Sent when a coupon payment completes, so the backend can close the order.
pub const COUPON_SETTLED: &str = "결제 완료";
pub const PAYMENT_COMPLETE: &str = "결제가 완료되었어요. 주문 번호 104번을 확인해 주세요.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
}

/// The session transcript shown next to the kiosk screens.
#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, role: Role, text: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.messages.push(ChatMessage {
            id,
            role,
            text: text.into(),
        });
        id
    }

    pub fn assistant(&mut self, text: impl Into<String>) -> Uuid {
        self.append(Role::Assistant, text)
    }

    pub fn user(&mut self, text: impl Into<String>) -> Uuid {
        self.append(Role::User, text)
    }

    /// Returns false when the message is gone (log cleared in between).
    pub fn update_text(&mut self, id: Uuid, text: impl Into<String>) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.text = text.into();
                true
            }
            None => false,
        }
    }

    pub fn last_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.text.as_str())
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// JSON form carried across screens in the `previousMessages` route param.
    pub fn to_route_param(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.messages)
    }

    /// Restores a log from a route param. Bad input leaves the log as it was.
    pub fn restore_route_param(&mut self, raw: &str) -> bool {
        match serde_json::from_str::<Vec<ChatMessage>>(raw) {
            Ok(messages) => {
                self.messages = messages;
                true
            }
            Err(_) => false,
        }
    }
}
