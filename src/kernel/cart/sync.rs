use tracing::{debug, info};

use super::key::{MutationKey, MutationKeyCache};
use super::store::{CartStore, InMemoryCartStore};
use super::{CartLine, CartMutation, CartState};
use crate::catalog::Catalog;
use crate::kernel::time::Tick;
use crate::outputs::chat::ChatLog;
use crate::outputs::realizer;
use crate::turn::normalizer::split_menu_id;
use crate::turn::types::ItemRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Added { item_id: String, quantity: u32 },
    Removed { item_id: String },
    /// Same key inside the quarantine window.
    Duplicate,
    /// Removal of something that is not in the cart.
    NotInCart,
}

impl MutationOutcome {
    pub fn applied(&self) -> bool {
        matches!(self, MutationOutcome::Added { .. } | MutationOutcome::Removed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartUpdate {
    pub outcome: MutationOutcome,
    pub state: CartState,
}

/// Applies cart mutations at most once per key within the quarantine window.
pub struct CartSynchronizer {
    store: Box<dyn CartStore>,
    recent: MutationKeyCache,
}

impl CartSynchronizer {
    pub fn new(quarantine_ms: u64) -> Self {
        Self::with_store(Box::new(InMemoryCartStore::new()), quarantine_ms)
    }

    pub fn with_store(store: Box<dyn CartStore>, quarantine_ms: u64) -> Self {
        Self {
            store,
            recent: MutationKeyCache::new(quarantine_ms),
        }
    }

    pub fn apply(
        &mut self,
        mutation: &CartMutation,
        key: MutationKey,
        now: Tick,
        catalog: &dyn Catalog,
        chat: &mut ChatLog,
    ) -> CartUpdate {
        if self.recent.seen(&key, now) {
            debug!(key = %key, "duplicate cart mutation dropped");
            return self.update(MutationOutcome::Duplicate);
        }

        let outcome = match mutation {
            CartMutation::Add {
                item_id,
                item_name,
                quantity,
                options,
            } => {
                let mut line = self.store.line(item_id).cloned().unwrap_or_else(|| CartLine {
                    item_id: item_id.clone(),
                    item_name: item_name.clone(),
                    unit_price: catalog
                        .resolve(Some(item_id), Some(item_name))
                        .map(|item| item.price)
                        .unwrap_or(0),
                    quantity: 0,
                    options: Default::default(),
                });
                line.quantity += (*quantity).max(1);
                line.options.merge(options);

                chat.assistant(realizer::added(item_name));
                if let Some(summary) = realizer::option_summary(
                    item_name,
                    options.temperature.as_ref(),
                    options.size.as_ref(),
                    options.bean.as_deref(),
                    &options.add_ons,
                ) {
                    chat.assistant(summary);
                }

                let outcome = MutationOutcome::Added {
                    item_id: item_id.clone(),
                    quantity: line.quantity,
                };
                self.store.put(line);
                outcome
            }
            CartMutation::Remove(target) => match self.locate(target, catalog) {
                Some(item_id) => {
                    // Whole line goes, options with it.
                    match self.store.remove(&item_id) {
                        Some(line) => {
                            chat.assistant(realizer::removed(&line.item_name));
                            MutationOutcome::Removed { item_id }
                        }
                        None => MutationOutcome::NotInCart,
                    }
                }
                None => MutationOutcome::NotInCart,
            },
        };

        if outcome.applied() {
            info!(key = %key, ?outcome, "cart mutation applied");
            self.recent.remember(key, now);
        } else {
            debug!(key = %key, "removal target not in cart");
        }
        self.update(outcome)
    }

    /// Closes expired quarantine windows. Called once per tick.
    pub fn tick(&mut self, now: Tick) {
        let evicted = self.recent.evict_expired(now);
        if evicted > 0 {
            debug!(evicted, "mutation keys evicted");
        }
    }

    pub fn state(&self) -> CartState {
        self.store.snapshot()
    }

    pub fn pending_keys(&self) -> usize {
        self.recent.len()
    }

    /// Forgets every remembered key; the cart contents stay.
    pub fn clear_quarantine(&mut self) {
        self.recent.clear();
    }

    pub fn reset(&mut self) {
        self.store.clear();
        self.recent.clear();
    }

    fn locate(&self, target: &ItemRef, catalog: &dyn Catalog) -> Option<String> {
        if let Some(id) = target.item_id.as_deref() {
            let id = split_menu_id(id).item_id;
            if self.store.line(&id).is_some() {
                return Some(id);
            }
        }
        if let Some(name) = target.item_name.as_deref() {
            if let Some(line) = self.store.find_by_name(name) {
                return Some(line.item_id.clone());
            }
        }
        catalog
            .resolve(target.item_id.as_deref(), target.item_name.as_deref())
            .map(|item| item.id.clone())
            .filter(|id| self.store.line(id).is_some())
    }

    fn update(&self, outcome: MutationOutcome) -> CartUpdate {
        CartUpdate {
            outcome,
            state: self.store.snapshot(),
        }
    }
}
