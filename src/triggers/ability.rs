//! Triggered abilities and the registry that collects them.
//!
//! Cards register their triggered abilities here, keyed by the event types
//! they listen for. When a window evaluates a batch, it asks the registry to
//! [`collect`](AbilityRegistry::collect) every ability of its class that is
//! eligible to respond.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use tracing::trace;

use crate::core::{AbilityId, CardId, GameState, Location, StepError};

use super::batch::{EventBatch, EventStore};
use super::choice::{AbilityChoice, ResolvedAbilityRecord};
use super::condition::{ConditionContext, ConditionEvaluator, CustomEval, TriggerCondition};
use super::event::{EventTypeId, GameEvent};

/// When an ability may be used relative to its triggering events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityClass {
    /// An interrupt that would cancel the event ("would-interrupt").
    CancelInterrupt,
    /// Optional, before the events resolve.
    Interrupt,
    /// Optional, after the events resolve.
    Reaction,
    /// Mandatory, before the events resolve.
    ForcedInterrupt,
    /// Mandatory, after the events resolve.
    ForcedReaction,
}

impl AbilityClass {
    /// Must the ability resolve whenever it is eligible?
    #[must_use]
    pub const fn is_forced(self) -> bool {
        matches!(self, AbilityClass::ForcedInterrupt | AbilityClass::ForcedReaction)
    }

    /// Does the ability fire before the events resolve?
    #[must_use]
    pub const fn is_interrupt(self) -> bool {
        !matches!(self, AbilityClass::Reaction | AbilityClass::ForcedReaction)
    }

    /// The word players see in window titles.
    #[must_use]
    pub const fn word(self) -> &'static str {
        match self {
            AbilityClass::CancelInterrupt | AbilityClass::Interrupt => "interrupt",
            AbilityClass::Reaction => "reaction",
            AbilityClass::ForcedInterrupt => "forced interrupt",
            AbilityClass::ForcedReaction => "forced reaction",
        }
    }
}

impl std::fmt::Display for AbilityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AbilityClass::CancelInterrupt => "cancel-interrupt",
            AbilityClass::Interrupt => "interrupt",
            AbilityClass::Reaction => "reaction",
            AbilityClass::ForcedInterrupt => "forced-interrupt",
            AbilityClass::ForcedReaction => "forced-reaction",
        };
        f.write_str(name)
    }
}

/// A triggered ability printed on a card.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TriggeredAbility {
    /// Assigned by the registry when zero.
    pub id: AbilityId,

    /// Button text for the ability prompt.
    pub title: String,

    /// The card the ability is printed on.
    pub source: CardId,

    pub class: AbilityClass,

    /// Event types this ability listens for.
    pub event_types: SmallVec<[EventTypeId; 2]>,

    /// Additional conditions beyond event type.
    pub condition: TriggerCondition,

    /// Where the source must be for the ability to be used.
    pub locations: SmallVec<[Location; 2]>,

    /// Resolves once for the whole batch instead of once per event.
    pub collective: bool,

    /// Is this ability currently active?
    pub enabled: bool,
}

impl TriggeredAbility {
    /// Create an ability usable while its source is in play.
    pub fn new(
        title: impl Into<String>,
        source: CardId,
        class: AbilityClass,
        event_type: EventTypeId,
    ) -> Self {
        Self {
            id: AbilityId::new(0),
            title: title.into(),
            source,
            class,
            event_types: smallvec![event_type],
            condition: TriggerCondition::Always,
            locations: smallvec![Location::Play],
            collective: false,
            enabled: true,
        }
    }

    /// Add an event type to listen for (builder pattern).
    #[must_use]
    pub fn also_on(mut self, event_type: EventTypeId) -> Self {
        if !self.event_types.contains(&event_type) {
            self.event_types.push(event_type);
        }
        self
    }

    /// Set the condition (builder pattern).
    #[must_use]
    pub fn with_condition(mut self, condition: TriggerCondition) -> Self {
        self.condition = condition;
        self
    }

    /// Replace the valid source locations (builder pattern).
    #[must_use]
    pub fn from_locations(mut self, locations: impl IntoIterator<Item = Location>) -> Self {
        self.locations = locations.into_iter().collect();
        self
    }

    /// Make the ability collective (builder pattern).
    #[must_use]
    pub fn collective(mut self) -> Self {
        self.collective = true;
        self
    }

    /// Is the source in a location the ability can be used from?
    #[must_use]
    pub fn source_is_valid(&self, state: &GameState) -> bool {
        state.is_in_location(self.source, &self.locations)
    }
}

/// Registry for triggered abilities.
///
/// Stores abilities and indexes them by event type. Collection walks the
/// batch in order and, for each event, the listening abilities in
/// registration order, so the same state always yields the same choices.
#[derive(Clone, Default)]
pub struct AbilityRegistry {
    /// All registered abilities.
    abilities: FxHashMap<AbilityId, TriggeredAbility>,

    /// Index by event type, in registration order.
    by_event_type: FxHashMap<EventTypeId, Vec<AbilityId>>,

    /// Last ability ID allocated.
    next_id: u32,

    custom_eval: Option<Rc<CustomEval>>,
}

impl AbilityRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the evaluator for [`TriggerCondition::Custom`] conditions.
    pub fn set_custom_eval(&mut self, eval: Rc<CustomEval>) {
        self.custom_eval = Some(eval);
    }

    /// Register an ability, returns its ID.
    pub fn register(&mut self, mut ability: TriggeredAbility) -> AbilityId {
        if ability.id.raw() == 0 {
            self.next_id += 1;
            ability.id = AbilityId::new(self.next_id);
        } else if ability.id.raw() > self.next_id {
            self.next_id = ability.id.raw();
        }

        let id = ability.id;
        for event_type in &ability.event_types {
            self.by_event_type.entry(*event_type).or_default().push(id);
        }

        trace!(
            ability = %id,
            source = %ability.source,
            class = %ability.class,
            "registered ability"
        );
        self.abilities.insert(id, ability);
        id
    }

    /// Unregister an ability.
    pub fn unregister(&mut self, id: AbilityId) -> Option<TriggeredAbility> {
        let ability = self.abilities.remove(&id)?;
        let mut empty_types = Vec::new();
        for event_type in &ability.event_types {
            if let Some(list) = self.by_event_type.get_mut(event_type) {
                list.retain(|&other| other != id);
                if list.is_empty() {
                    empty_types.push(*event_type);
                }
            }
        }
        for event_type in empty_types {
            self.by_event_type.remove(&event_type);
        }
        Some(ability)
    }

    /// Remove all abilities printed on a card.
    pub fn remove_for_source(&mut self, source: CardId) {
        let to_remove: Vec<_> = self
            .abilities
            .values()
            .filter(|ability| ability.source == source)
            .map(|ability| ability.id)
            .collect();

        for id in to_remove {
            self.unregister(id);
        }
    }

    /// Get an ability by ID.
    #[must_use]
    pub fn get(&self, id: AbilityId) -> Option<&TriggeredAbility> {
        self.abilities.get(&id)
    }

    /// Enable or disable an ability.
    pub fn set_enabled(&mut self, id: AbilityId, enabled: bool) {
        if let Some(ability) = self.abilities.get_mut(&id) {
            ability.enabled = enabled;
        }
    }

    /// Get total ability count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }

    /// Every ability of `class` eligible to respond to the live events of
    /// `batch`, skipping what `resolved` already holds.
    ///
    /// Collective abilities produce one choice covering every event they
    /// matched. Read-only on the state.
    pub fn collect(
        &self,
        events: &EventStore,
        batch: &EventBatch,
        class: AbilityClass,
        resolved: &ResolvedAbilityRecord,
        state: &GameState,
    ) -> Vec<AbilityChoice> {
        let mut choices: Vec<AbilityChoice> = Vec::new();
        let mut collective_at: FxHashMap<AbilityId, usize> = FxHashMap::default();

        for event in events.live(batch) {
            let Some(ids) = self.by_event_type.get(&event.event_type) else {
                continue;
            };

            for &id in ids {
                let Some(ability) = self.abilities.get(&id) else {
                    continue;
                };
                if ability.class != class {
                    continue;
                }
                let already = if ability.collective {
                    resolved.contains_collective(id)
                } else {
                    resolved.contains(id, event.id)
                };
                if already || !self.is_eligible(ability, event, state) {
                    continue;
                }

                let Some(card) = state.card(ability.source) else {
                    continue;
                };
                if ability.collective {
                    if let Some(&at) = collective_at.get(&id) {
                        choices[at].cover_event(event.id);
                        continue;
                    }
                    collective_at.insert(id, choices.len());
                }

                let mut choice =
                    AbilityChoice::new(id, ability.source, event.id, card.controller, class)
                        .with_event_card(event.card);
                if ability.collective {
                    choice = choice.collective();
                }
                choices.push(choice);
            }
        }

        trace!(class = %class, count = choices.len(), "collected ability choices");
        choices
    }

    /// Check that a choice could still be resolved right now.
    ///
    /// Fails when the ability is gone or disabled, its source left every
    /// valid location, or none of its events are still live.
    pub fn validate(
        &self,
        choice: &AbilityChoice,
        events: &EventStore,
        state: &GameState,
    ) -> Result<(), StepError> {
        let ability = self
            .abilities
            .get(&choice.ability)
            .filter(|ability| ability.enabled)
            .ok_or(StepError::UnknownAbility(choice.ability))?;
        if !ability.source_is_valid(state) {
            return Err(StepError::StaleReference(ability.source));
        }
        if !choice.batch_events.iter().any(|id| events.is_live(*id)) {
            return Err(StepError::MissingEvent(choice.event));
        }
        Ok(())
    }

    fn is_eligible(
        &self,
        ability: &TriggeredAbility,
        event: &GameEvent,
        state: &GameState,
    ) -> bool {
        if !ability.enabled {
            return false;
        }
        let Some(card) = state.card(ability.source) else {
            return false;
        };
        if !ability.locations.contains(&card.location) {
            return false;
        }

        let ctx = ConditionContext::new(event, state).with_source(ability.source, card.controller);
        let ctx = match self.custom_eval.as_deref() {
            Some(eval) => ctx.with_custom_eval(eval),
            None => ctx,
        };
        ConditionEvaluator::evaluate(&ability.condition, &ctx)
    }
}

impl std::fmt::Debug for AbilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbilityRegistry")
            .field("abilities", &self.abilities)
            .field("custom_eval", &self.custom_eval.is_some())
            .finish_non_exhaustive()
    }
}
