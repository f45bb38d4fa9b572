use serde::{Deserialize, Serialize};

/// What the user (or the reply) was really asking for, when that differs from
/// what the dialogue step alone would suggest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// "How do I get back?" Highlight the back button and nothing else.
    PreviousNavigationQuestion,
    /// Take something out of the cart.
    RemovalRequest,
    /// "Where is the cart?" Never navigate or mutate because of it.
    LocationQuestion,
    PaymentRequest,
    /// "Do you have tiramisu?" A question, not an order.
    DessertExistenceQuestion,
    /// Utterance or reply mentions going back one step.
    PreviousStepRequest,
    #[default]
    None,
}

impl Intent {
    /// Precedence order, first match wins.
    pub const PRECEDENCE: [Intent; 6] = [
        Intent::PreviousNavigationQuestion,
        Intent::RemovalRequest,
        Intent::LocationQuestion,
        Intent::PaymentRequest,
        Intent::DessertExistenceQuestion,
        Intent::PreviousStepRequest,
    ];

    pub fn suppresses_navigation(&self) -> bool {
        matches!(
            self,
            Intent::PreviousNavigationQuestion
                | Intent::RemovalRequest
                | Intent::LocationQuestion
                | Intent::DessertExistenceQuestion
        )
    }

    /// Whether the router may infer an add-to-cart from the step and slots.
    pub fn suppresses_cart_inference(&self) -> bool {
        !matches!(self, Intent::None | Intent::PreviousStepRequest)
    }

    /// Removal owns the turn; a focus token on it is ignored.
    pub fn suppresses_highlight(&self) -> bool {
        matches!(self, Intent::RemovalRequest)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::PreviousNavigationQuestion => "previous_navigation_question",
            Intent::RemovalRequest => "removal_request",
            Intent::LocationQuestion => "location_question",
            Intent::PaymentRequest => "payment_request",
            Intent::DessertExistenceQuestion => "dessert_existence_question",
            Intent::PreviousStepRequest => "previous_step_request",
            Intent::None => "none",
        }
    }
}

/// The texts and flags one classification looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utterances<'a> {
    pub user_text: Option<&'a str>,
    pub stt_text: Option<&'a str>,
    pub reply_text: &'a str,
    pub remove_flag: bool,
}

impl<'a> Utterances<'a> {
    /// The user-side texts, typed or transcribed, that are present.
    pub fn user_side(&self) -> impl Iterator<Item = &'a str> {
        [self.user_text, self.stt_text]
            .into_iter()
            .flatten()
            .filter(|t| !t.trim().is_empty())
    }
}
