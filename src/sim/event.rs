//! Narrative negotiation and decision events with bounded logs.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::catalog::{Catalog, DecisionTemplate, NegotiationTemplate};
use crate::config::EventsConfig;

use super::clock::WallTime;
use super::rng::RandomSource;

/// Newest-first log holding at most `capacity` entries.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct BoundedLog<T> {
    #[serde(skip)]
    capacity: usize,
    entries: VecDeque<T>,
}

impl<T> BoundedLog<T> {
    /// Creates an empty log.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "log capacity must be at least 1");
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Prepends `entry`, evicting the oldest entry when full.
    pub fn push(&mut self, entry: T) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry.
    pub fn front(&self) -> Option<&T> {
        self.entries.front()
    }

    /// Iterates newest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}

impl<T: Clone> BoundedLog<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}

/// A negotiation vignette emitted at some tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NegotiationEvent {
    pub id: u64,
    pub timestamp: WallTime,
    pub template: Arc<NegotiationTemplate>,
}

/// A coordination decision emitted at some tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionEvent {
    pub id: u64,
    pub timestamp: WallTime,
    pub template: Arc<DecisionTemplate>,
    /// Efficiency label such as `"+12.3% efficiency"`.
    pub impact: String,
}

/// Probabilistically emits events from the catalog into two bounded logs.
///
/// Negotiation and decision rolls are independent; both may fire on the same
/// tick.
#[derive(Debug, Clone)]
pub struct EventGenerator {
    negotiations: Vec<Arc<NegotiationTemplate>>,
    decisions: Vec<Arc<DecisionTemplate>>,
    config: EventsConfig,
    negotiation_log: BoundedLog<NegotiationEvent>,
    decision_log: BoundedLog<DecisionEvent>,
    next_negotiation_id: u64,
    next_decision_id: u64,
}

impl EventGenerator {
    /// Creates a generator with empty logs.
    ///
    /// `config.max_log_entries` must be at least 1; a validated
    /// configuration guarantees it.
    pub fn new(catalog: &Catalog, config: EventsConfig) -> Self {
        let capacity = config.max_log_entries.max(1);
        Self {
            negotiations: catalog.negotiations().to_vec(),
            decisions: catalog.decisions().to_vec(),
            config,
            negotiation_log: BoundedLog::new(capacity),
            decision_log: BoundedLog::new(capacity),
            next_negotiation_id: 1,
            next_decision_id: 1,
        }
    }

    /// Rolls for a negotiation; on success picks a template and logs it.
    ///
    /// Draws one value for the roll and, on success, one for the pick.
    pub fn maybe_emit_negotiation(
        &mut self,
        now: WallTime,
        rng: &mut dyn RandomSource,
    ) -> Option<NegotiationEvent> {
        if !rng.chance(self.config.negotiation_probability) {
            return None;
        }
        let template = Arc::clone(&self.negotiations[rng.pick_index(self.negotiations.len())]);
        let event = NegotiationEvent {
            id: self.next_negotiation_id,
            timestamp: now,
            template,
        };
        self.next_negotiation_id += 1;
        info!(id = event.id, time = %now, "negotiation: {}", event.template.message);
        self.negotiation_log.push(event.clone());
        Some(event)
    }

    /// Rolls for a decision; on success picks a template, draws an impact
    /// percentage and logs it.
    ///
    /// Draws one value for the roll and, on success, one for the pick and
    /// one for the impact.
    pub fn maybe_emit_decision(
        &mut self,
        now: WallTime,
        rng: &mut dyn RandomSource,
    ) -> Option<DecisionEvent> {
        if !rng.chance(self.config.decision_probability) {
            return None;
        }
        let template = Arc::clone(&self.decisions[rng.pick_index(self.decisions.len())]);
        let [lo, hi] = self.config.impact_range_pct;
        let impact = format!("+{:.1}% efficiency", rng.uniform(lo, hi));
        let event = DecisionEvent {
            id: self.next_decision_id,
            timestamp: now,
            template,
            impact,
        };
        self.next_decision_id += 1;
        info!(id = event.id, time = %now, impact = %event.impact, "decision: {}", event.template.summary);
        self.decision_log.push(event.clone());
        Some(event)
    }

    pub fn negotiation_log(&self) -> &BoundedLog<NegotiationEvent> {
        &self.negotiation_log
    }

    pub fn decision_log(&self) -> &BoundedLog<DecisionEvent> {
        &self.decision_log
    }
}
