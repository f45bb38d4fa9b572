use std::collections::BTreeMap;

use super::{CartLine, CartState};

/// Holds line items. Written only by the synchronizer.
pub trait CartStore: Send {
    fn line(&self, item_id: &str) -> Option<&CartLine>;

    /// Inserts or replaces. A zero quantity removes the line instead.
    fn put(&mut self, line: CartLine);

    fn remove(&mut self, item_id: &str) -> Option<CartLine>;

    fn lines(&self) -> Vec<CartLine>;

    fn clear(&mut self);

    fn snapshot(&self) -> CartState {
        CartState {
            lines: self.lines(),
        }
    }

    /// Finds a line by display name, ignoring whitespace.
    fn find_by_name(&self, name: &str) -> Option<&CartLine>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCartStore {
    lines: BTreeMap<String, CartLine>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStore for InMemoryCartStore {
    fn line(&self, item_id: &str) -> Option<&CartLine> {
        self.lines.get(item_id)
    }

    fn put(&mut self, line: CartLine) {
        if line.quantity == 0 {
            self.lines.remove(&line.item_id);
        } else {
            self.lines.insert(line.item_id.clone(), line);
        }
    }

    fn remove(&mut self, item_id: &str) -> Option<CartLine> {
        self.lines.remove(item_id)
    }

    fn lines(&self) -> Vec<CartLine> {
        self.lines.values().cloned().collect()
    }

    fn clear(&mut self) {
        self.lines.clear();
    }

    fn find_by_name(&self, name: &str) -> Option<&CartLine> {
        let wanted: String = name.chars().filter(|c| !c.is_whitespace()).collect();
        self.lines.values().find(|line| {
            line.item_name
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                == wanted
        })
    }
}
