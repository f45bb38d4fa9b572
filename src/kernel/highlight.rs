use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::catalog::Catalog;
use crate::kernel::time::{Deadline, Tick};
use crate::turn::types::FocusToken;

/// A highlightable element on the kiosk screens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementRef {
    Menu(String),
    Cart,
    Home,
    Pay,
    Back,
    Next,
}

impl ElementRef {
    pub fn element_type(&self) -> &'static str {
        match self {
            ElementRef::Menu(_) => "menu",
            ElementRef::Cart => "cart",
            ElementRef::Home => "home",
            ElementRef::Pay => "pay",
            ElementRef::Back => "back",
            ElementRef::Next => "next",
        }
    }

    pub fn element_id(&self) -> String {
        self.to_string()
    }

    /// Classifies a backend focus token. `None` means "do not highlight".
    pub fn classify(token: &FocusToken, catalog: &dyn Catalog) -> Option<Self> {
        let token = token.as_str().trim().to_lowercase();
        if token.is_empty() {
            return None;
        }

        if let Some(rest) = token.strip_prefix("menu_item_") {
            return menu(&rest.replace('_', "-"), catalog);
        }
        if token.contains("cart") {
            return Some(ElementRef::Cart);
        }
        if token.contains("home") {
            return Some(ElementRef::Home);
        }
        if ["pay", "checkout", "결제"].iter().any(|k| token.contains(k)) {
            return Some(ElementRef::Pay);
        }
        if ["back", "prev", "이전"].iter().any(|k| token.contains(k)) {
            return Some(ElementRef::Back);
        }
        if ["next", "다음"].iter().any(|k| token.contains(k)) {
            return Some(ElementRef::Next);
        }
        if let Some((_, last)) = token.rsplit_once('_') {
            return menu(last, catalog);
        }
        menu(&token, catalog)
    }
}

fn menu(fragment: &str, catalog: &dyn Catalog) -> Option<ElementRef> {
    catalog
        .match_fragment(fragment)
        .map(|item| ElementRef::Menu(item.id.clone()))
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementRef::Menu(id) => write!(f, "menu:{id}"),
            other => f.write_str(other.element_type()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ActiveHighlight {
    target: ElementRef,
    started: Tick,
    ends: Deadline,
}

/// Returned when a pulse starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightStart {
    pub target: ElementRef,
    /// The pulse this one cut short, if any.
    pub preempted: Option<ElementRef>,
}

/// One bounded pulse at a time. A new `focus` always replaces the running one.
#[derive(Debug, Clone)]
pub struct HighlightEngine {
    half_period_ms: u64,
    iterations: u32,
    active: Option<ActiveHighlight>,
}

impl HighlightEngine {
    pub fn new(half_period_ms: u64, iterations: u32) -> Self {
        Self {
            half_period_ms: half_period_ms.max(1),
            iterations,
            active: None,
        }
    }

    pub fn pulse_duration_ms(&self) -> u64 {
        self.half_period_ms * 2 * u64::from(self.iterations)
    }

    /// Unclassifiable tokens are a no-op and leave any running pulse alone.
    pub fn focus(
        &mut self,
        token: &FocusToken,
        catalog: &dyn Catalog,
        now: Tick,
    ) -> Option<HighlightStart> {
        match ElementRef::classify(token, catalog) {
            Some(target) => Some(self.start(target, now)),
            None => {
                debug!(token = token.as_str(), "focus token not classifiable");
                None
            }
        }
    }

    pub fn focus_back(&mut self, now: Tick) -> HighlightStart {
        self.start(ElementRef::Back, now)
    }

    /// Ends the pulse once its deadline passes and returns the cleared element.
    pub fn tick(&mut self, now: Tick) -> Option<ElementRef> {
        if self.active.as_ref().is_some_and(|a| a.ends.is_due(now)) {
            return self.active.take().map(|a| a.target);
        }
        None
    }

    pub fn cancel(&mut self) -> Option<ElementRef> {
        self.active.take().map(|a| a.target)
    }

    pub fn active(&self) -> Option<&ElementRef> {
        self.active.as_ref().map(|a| &a.target)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Triangle wave in `[0, 1]`: rises for one half period, falls for the next.
    pub fn intensity(&self, now: Tick) -> f32 {
        let Some(active) = &self.active else {
            return 0.0;
        };
        if active.ends.is_due(now) {
            return 0.0;
        }
        let period = self.half_period_ms * 2;
        let phase = now.elapsed_ms(active.started) % period;
        let rising = if phase <= self.half_period_ms {
            phase
        } else {
            period - phase
        };
        (rising as f32 / self.half_period_ms as f32).clamp(0.0, 1.0)
    }

    fn start(&mut self, target: ElementRef, now: Tick) -> HighlightStart {
        let preempted = self.active.take().map(|a| a.target);
        if let Some(previous) = &preempted {
            debug!(%previous, next = %target, "highlight preempted");
        }
        self.active = Some(ActiveHighlight {
            target: target.clone(),
            started: now,
            ends: Deadline::in_ms(now, self.pulse_duration_ms()),
        });
        HighlightStart { target, preempted }
    }
}
