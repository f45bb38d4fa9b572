//! Cart mutation, de-duplication and storage.
//!
//! Only the [`CartSynchronizer`] writes to a [`CartStore`]. Everything else
//! hands it a [`CartMutation`] and a [`MutationKey`].

pub mod key;
pub mod store;
pub mod sync;

pub use key::{MutationKey, MutationKeyCache};
pub use store::{CartStore, InMemoryCartStore};
pub use sync::{CartSynchronizer, CartUpdate, MutationOutcome};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::turn::types::{ItemRef, Size, SlotSet, Temperature};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartOptions {
    pub temperature: Option<Temperature>,
    pub size: Option<Size>,
    pub bean: Option<String>,
    pub add_ons: BTreeSet<String>,
}

impl CartOptions {
    pub fn from_slots(slots: &SlotSet) -> Self {
        Self {
            temperature: slots.temperature.clone(),
            size: slots.size.clone(),
            bean: slots.bean.clone(),
            add_ons: slots.add_ons.clone(),
        }
    }

    /// Supplied fields overwrite, absent ones are kept. Add-ons are replaced
    /// only by a non-empty set.
    pub fn merge(&mut self, incoming: &CartOptions) {
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

    /// Stable text form used inside mutation keys.
    pub fn signature(&self) -> String {
        let add_ons: Vec<&str> = self.add_ons.iter().map(String::as_str).collect();
        format!(
            "{}|{}|{}|{}",
            self.temperature.as_ref().map(Temperature::as_str).unwrap_or(""),
            self.size.as_ref().map(Size::as_str).unwrap_or(""),
            self.bean.as_deref().unwrap_or(""),
            add_ons.join(",")
        )
    }

    pub fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.size.is_none()
            && self.bean.is_none()
            && self.add_ons.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartMutation {
    Add {
        item_id: String,
        item_name: String,
        quantity: u32,
        options: CartOptions,
    },
    /// Removes the whole line.
    Remove(ItemRef),
}

impl CartMutation {
    /// One unit of the item the slots describe, or `None` without an item.
    pub fn add_from_slots(slots: &SlotSet) -> Option<Self> {
        let item_id = slots.item_id.clone()?;
        let item_name = slots.item_name.clone()?;
        Some(CartMutation::Add {
            item_id,
            item_name,
            quantity: 1,
            options: CartOptions::from_slots(slots),
        })
    }

    /// Key material for de-duplication: who, and with which options.
    pub fn identity(&self) -> (String, String) {
        match self {
            CartMutation::Add {
                item_id, options, ..
            } => (item_id.clone(), options.signature()),
            CartMutation::Remove(target) => (
                target
                    .item_id
                    .clone()
                    .or_else(|| target.item_name.clone())
                    .unwrap_or_default(),
                "remove".to_string(),
            ),
        }
    }

    pub fn key(&self, nonce: impl Into<String>) -> MutationKey {
        let (item_id, option_signature) = self.identity();
        MutationKey::new(item_id, option_signature, nonce)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: String,
    pub item_name: String,
    pub unit_price: u32,
    pub quantity: u32,
    pub options: CartOptions,
}

/// Snapshot of the cart after a mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    pub lines: Vec<CartLine>,
}

impl CartState {
    pub fn quantity_of(&self, item_id: &str) -> u32 {
        self.lines
            .iter()
            .find(|line| line.item_id == item_id)
            .map(|line| line.quantity)
            .unwrap_or(0)
    }

    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    pub fn total_price(&self) -> u32 {
        self.lines
            .iter()
            .map(|line| line.unit_price * line.quantity)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
