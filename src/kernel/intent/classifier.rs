use regex::Regex;
use tracing::debug;

use super::types::{Intent, Utterances};
use crate::catalog::{Catalog, Category};

const PREVIOUS_QUESTION: &str =
    r"이전.*(?:가려면.*어떻게|어떻게.*가|돌아가.*어떻게|어떻게.*돌아가|방법|어떡해)";
const REMOVAL_USER: &str = r"장바구니.*(?:빼|제거|삭제)";
const REMOVAL_REPLY: &str = r"제거.*했습니다";
const LOCATION_USER: &str = r"어딨어|어디|위치|장바구니.*영역";
const LOCATION_REPLY: &str = r"(?:화면|영역|위치).*에";
const PAYMENT: &str = r"결제";
const PREVIOUS_STEP: &str = r"이전";
const COUPON_REPLY: &str = r"쿠폰|바코드";

/// Pattern families over the user's words and the backend reply. Patterns are
/// compiled once; dessert names come from the catalog at construction.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    previous_question: Regex,
    removal_user: Regex,
    removal_reply: Regex,
    location_user: Regex,
    location_reply: Regex,
    payment: Regex,
    dessert_existence: Option<Regex>,
    previous_step: Regex,
    coupon_reply: Regex,
}

impl IntentClassifier {
    pub fn new(catalog: &dyn Catalog) -> Result<Self, regex::Error> {
        let desserts: Vec<String> = catalog
            .names_in(Category::Dessert)
            .into_iter()
            .map(regex::escape)
            .collect();
        let dessert_existence = if desserts.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(
                r"(?:{})\s*(?:있어|있나|있니|있습니다|있어요)",
                desserts.join("|")
            ))?)
        };

        Ok(Self {
            previous_question: Regex::new(PREVIOUS_QUESTION)?,
            removal_user: Regex::new(REMOVAL_USER)?,
            removal_reply: Regex::new(REMOVAL_REPLY)?,
            location_user: Regex::new(LOCATION_USER)?,
            location_reply: Regex::new(LOCATION_REPLY)?,
            payment: Regex::new(PAYMENT)?,
            dessert_existence,
            previous_step: Regex::new(PREVIOUS_STEP)?,
            coupon_reply: Regex::new(COUPON_REPLY)?,
        })
    }

    /// Every family that matches, in precedence order.
    pub fn families(&self, input: &Utterances<'_>) -> Vec<Intent> {
        Intent::PRECEDENCE
            .into_iter()
            .filter(|intent| self.matches(*intent, input))
            .collect()
    }

    pub fn classify(&self, input: &Utterances<'_>) -> Intent {
        let matched = self.families(input);
        if matched.len() > 1 {
            let names: Vec<&str> = matched.iter().map(Intent::as_str).collect();
            debug!(families = ?names, "several intent families matched, taking the first");
        }
        matched.first().copied().unwrap_or(Intent::None)
    }

    /// Coupon or barcode payment: the reply mentions it, the backend context
    /// says so, or the user asked for it.
    pub fn coupon_indicated(&self, input: &Utterances<'_>, payment_method: Option<&str>) -> bool {
        self.coupon_reply.is_match(input.reply_text)
            || payment_method == Some("coupon")
            || input.user_side().any(|t| t.contains("쿠폰"))
    }

    fn matches(&self, intent: Intent, input: &Utterances<'_>) -> bool {
        let user = |re: &Regex| input.user_side().any(|t| re.is_match(t));
        match intent {
            Intent::PreviousNavigationQuestion => user(&self.previous_question),
            Intent::RemovalRequest => {
                input.remove_flag
                    || user(&self.removal_user)
                    || self.removal_reply.is_match(input.reply_text)
            }
            Intent::LocationQuestion => {
                user(&self.location_user) || self.location_reply.is_match(input.reply_text)
            }
            Intent::PaymentRequest => user(&self.payment),
            Intent::DessertExistenceQuestion => {
                self.dessert_existence.as_ref().is_some_and(|re| user(re))
            }
            Intent::PreviousStepRequest => {
                user(&self.previous_step) || self.previous_step.is_match(input.reply_text)
            }
            Intent::None => false,
        }
    }
}
