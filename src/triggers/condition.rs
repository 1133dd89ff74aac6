//! Trigger conditions.
//!
//! Conditions narrow which events an ability responds to beyond the event
//! type it listens for. The core provides common condition types; games can
//! use custom conditions for game-specific logic.

use serde::{Deserialize, Serialize};

use crate::core::{CardId, GameState, PhaseId, PlayerId, RingId};

use super::event::{EventTypeId, GameEvent};

/// Game-supplied evaluator for [`TriggerCondition::Custom`].
pub type CustomEval = dyn Fn(&str, &GameEvent, &GameState) -> bool;

/// A condition that must be met for an ability to become eligible.
///
/// Conditions are checked against the event, the game state and the
/// ability's own source card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerCondition {
    // === Event Type Matching ===

    /// Match a specific event type.
    EventType(EventTypeId),

    /// Match any of the specified event types.
    AnyEventType(Vec<EventTypeId>),

    // === Card Filters ===

    /// The event happened to a specific card.
    CardIs(CardId),

    /// The event happened to the ability's own source card.
    CardIsSource,

    /// The event was caused by a specific card.
    SourceIs(CardId),

    /// The event's card is controlled by the specified player.
    CardControlledBy(PlayerId),

    /// The event's card is controlled by the ability's controller.
    CardControlledBySelf,

    // === Player Filters ===

    /// The event was initiated by the specified player.
    ForPlayer(PlayerId),

    /// The event was initiated by the ability controller's opponent.
    InitiatedByOpponent,

    // === Ring and Phase Filters ===

    /// The event concerns a specific ring.
    RingIs(RingId),

    /// The event concerns a specific phase.
    PhaseIs(PhaseId),

    // === Tag Filters ===

    /// Event must have specified tag.
    HasTag(String),

    /// Event must not have specified tag.
    NotTag(String),

    // === Combinators ===

    /// All conditions must be true.
    All(Vec<TriggerCondition>),

    /// At least one condition must be true.
    Any(Vec<TriggerCondition>),

    /// Condition must be false.
    Not(Box<TriggerCondition>),

    // === Special ===

    /// Always matches (no filter).
    Always,

    /// Never matches.
    Never,

    /// Custom condition (evaluated by game-specific code).
    Custom(String),
}

impl TriggerCondition {
    /// Create an event type condition.
    pub fn event(event_type: EventTypeId) -> Self {
        Self::EventType(event_type)
    }

    /// Create a condition for events initiated by a specific player.
    pub fn for_player(player: PlayerId) -> Self {
        Self::ForPlayer(player)
    }

    /// Create a custom condition.
    pub fn custom(key: impl Into<String>) -> Self {
        Self::Custom(key.into())
    }

    /// Create an AND condition.
    pub fn all(conditions: impl IntoIterator<Item = TriggerCondition>) -> Self {
        Self::All(conditions.into_iter().collect())
    }

    /// Create an OR condition.
    pub fn any(conditions: impl IntoIterator<Item = TriggerCondition>) -> Self {
        Self::Any(conditions.into_iter().collect())
    }

    /// Negate this condition.
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Add another condition with AND.
    pub fn and(self, other: TriggerCondition) -> Self {
        match self {
            Self::All(mut conditions) => {
                conditions.push(other);
                Self::All(conditions)
            }
            _ => Self::All(vec![self, other]),
        }
    }

    /// Add another condition with OR.
    pub fn or(self, other: TriggerCondition) -> Self {
        match self {
            Self::Any(mut conditions) => {
                conditions.push(other);
                Self::Any(conditions)
            }
            _ => Self::Any(vec![self, other]),
        }
    }
}

/// Context for evaluating trigger conditions.
pub struct ConditionContext<'a> {
    /// The event being checked.
    pub event: &'a GameEvent,
    /// Current game state.
    pub state: &'a GameState,
    /// The card that owns the ability.
    pub source: Option<CardId>,
    /// The player controlling the ability's source.
    pub controller: Option<PlayerId>,
    /// Custom condition evaluator (provided by game).
    pub eval_custom: Option<&'a CustomEval>,
}

impl<'a> ConditionContext<'a> {
    /// Create a new context.
    pub fn new(event: &'a GameEvent, state: &'a GameState) -> Self {
        Self {
            event,
            state,
            source: None,
            controller: None,
            eval_custom: None,
        }
    }

    /// Set the ability's source card and its controller.
    #[must_use]
    pub fn with_source(mut self, source: CardId, controller: PlayerId) -> Self {
        self.source = Some(source);
        self.controller = Some(controller);
        self
    }

    /// Add a custom condition evaluator.
    #[must_use]
    pub fn with_custom_eval(mut self, eval: &'a CustomEval) -> Self {
        self.eval_custom = Some(eval);
        self
    }

    fn card_controller(&self) -> Option<PlayerId> {
        let card = self.event.card?;
        self.state.card(card).map(|card| card.controller)
    }
}

/// Evaluator for trigger conditions.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Check if a condition is satisfied.
    pub fn evaluate(condition: &TriggerCondition, ctx: &ConditionContext) -> bool {
        match condition {
            TriggerCondition::EventType(expected) => ctx.event.event_type == *expected,

            TriggerCondition::AnyEventType(types) => types.contains(&ctx.event.event_type),

            TriggerCondition::CardIs(card) => ctx.event.card == Some(*card),

            TriggerCondition::CardIsSource => {
                ctx.source.is_some() && ctx.event.card == ctx.source
            }

            TriggerCondition::SourceIs(card) => ctx.event.source == Some(*card),

            TriggerCondition::CardControlledBy(player) => ctx.card_controller() == Some(*player),

            TriggerCondition::CardControlledBySelf => {
                ctx.controller.is_some() && ctx.card_controller() == ctx.controller
            }

            TriggerCondition::ForPlayer(player) => ctx.event.player == Some(*player),

            TriggerCondition::InitiatedByOpponent => match (ctx.event.player, ctx.controller) {
                (Some(initiator), Some(controller)) => initiator != controller,
                _ => false,
            },

            TriggerCondition::RingIs(ring) => ctx.event.ring == Some(*ring),

            TriggerCondition::PhaseIs(phase) => ctx.event.phase == Some(*phase),

            TriggerCondition::HasTag(tag) => ctx.event.has_tag(tag),

            TriggerCondition::NotTag(tag) => !ctx.event.has_tag(tag),

            TriggerCondition::All(conditions) => {
                conditions.iter().all(|c| Self::evaluate(c, ctx))
            }

            TriggerCondition::Any(conditions) => {
                conditions.iter().any(|c| Self::evaluate(c, ctx))
            }

            TriggerCondition::Not(inner) => !Self::evaluate(inner, ctx),

            TriggerCondition::Always => true,

            TriggerCondition::Never => false,

            // No evaluator provided, custom conditions fail
            TriggerCondition::Custom(key) => ctx
                .eval_custom
                .is_some_and(|eval| eval(key, ctx.event, ctx.state)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Location;

    const PLAYED: EventTypeId = EventTypeId::new(1);
    const LEAVES_PLAY: EventTypeId = EventTypeId::new(2);

    fn eval(condition: &TriggerCondition, ctx: &ConditionContext) -> bool {
        ConditionEvaluator::evaluate(condition, ctx)
    }

    #[test]
    fn test_event_type_conditions() {
        let state = GameState::new(2);
        let event = GameEvent::new(PLAYED);
        let ctx = ConditionContext::new(&event, &state);

        assert!(eval(&TriggerCondition::event(PLAYED), &ctx));
        assert!(!eval(&TriggerCondition::event(LEAVES_PLAY), &ctx));
        assert!(eval(&TriggerCondition::AnyEventType(vec![LEAVES_PLAY, PLAYED]), &ctx));
    }

    #[test]
    fn test_card_conditions() {
        let mut state = GameState::new(2);
        let mine = state.create_card("Doji Whisperer", PlayerId::new(0), Location::Play);
        let theirs = state.create_card("Bayushi Manipulator", PlayerId::new(1), Location::Play);
        let event = GameEvent::for_card(LEAVES_PLAY, mine).with_source(theirs);

        let ctx = ConditionContext::new(&event, &state).with_source(mine, PlayerId::new(0));
        assert!(eval(&TriggerCondition::CardIs(mine), &ctx));
        assert!(eval(&TriggerCondition::CardIsSource, &ctx));
        assert!(eval(&TriggerCondition::SourceIs(theirs), &ctx));
        assert!(eval(&TriggerCondition::CardControlledBy(PlayerId::new(0)), &ctx));
        assert!(eval(&TriggerCondition::CardControlledBySelf, &ctx));

        let other = ConditionContext::new(&event, &state).with_source(theirs, PlayerId::new(1));
        assert!(!eval(&TriggerCondition::CardIsSource, &other));
        assert!(!eval(&TriggerCondition::CardControlledBySelf, &other));
    }

    #[test]
    fn test_source_conditions_need_a_source() {
        let mut state = GameState::new(2);
        let card = state.create_card("Kaiu Envoy", PlayerId::new(0), Location::Play);
        let event = GameEvent::for_card(PLAYED, card);
        let ctx = ConditionContext::new(&event, &state);

        assert!(!eval(&TriggerCondition::CardIsSource, &ctx));
        assert!(!eval(&TriggerCondition::CardControlledBySelf, &ctx));
        assert!(!eval(&TriggerCondition::InitiatedByOpponent, &ctx));
    }

    #[test]
    fn test_player_conditions() {
        let state = GameState::new(2);
        let event = GameEvent::new(PLAYED).with_player(PlayerId::new(1));

        let ctx =
            ConditionContext::new(&event, &state).with_source(CardId::new(1), PlayerId::new(0));
        assert!(eval(&TriggerCondition::for_player(PlayerId::new(1)), &ctx));
        assert!(eval(&TriggerCondition::InitiatedByOpponent, &ctx));

        let own =
            ConditionContext::new(&event, &state).with_source(CardId::new(2), PlayerId::new(1));
        assert!(!eval(&TriggerCondition::InitiatedByOpponent, &own));
    }

    #[test]
    fn test_ring_and_phase_conditions() {
        let state = GameState::new(2);
        let event = GameEvent::new(PLAYED)
            .with_ring(RingId::new(3))
            .with_phase(PhaseId::new(2));
        let ctx = ConditionContext::new(&event, &state);

        assert!(eval(&TriggerCondition::RingIs(RingId::new(3)), &ctx));
        assert!(!eval(&TriggerCondition::RingIs(RingId::new(1)), &ctx));
        assert!(eval(&TriggerCondition::PhaseIs(PhaseId::new(2)), &ctx));
    }

    #[test]
    fn test_combinators() {
        let state = GameState::new(2);
        let event = GameEvent::new(PLAYED).with_tag("conflict");
        let ctx = ConditionContext::new(&event, &state);

        let tagged = TriggerCondition::HasTag("conflict".into());
        let duel = TriggerCondition::HasTag("duel".into());

        assert!(eval(&tagged.clone().and(TriggerCondition::Always), &ctx));
        assert!(!eval(&tagged.clone().and(duel.clone()), &ctx));
        assert!(eval(&duel.clone().or(tagged.clone()), &ctx));
        assert!(eval(&duel.clone().negate(), &ctx));
        assert!(eval(&TriggerCondition::NotTag("duel".into()), &ctx));
        assert!(!eval(&TriggerCondition::Never, &ctx));
        assert!(eval(&TriggerCondition::all([tagged.clone(), TriggerCondition::Always]), &ctx));
        assert!(eval(&TriggerCondition::any([duel, tagged]), &ctx));
    }

    #[test]
    fn test_custom_condition() {
        let state = GameState::new(2);
        let event = GameEvent::new(PLAYED).with_tag("honored");
        let custom = |key: &str, event: &GameEvent, _: &GameState| {
            key == "honored" && event.has_tag("honored")
        };

        let without = ConditionContext::new(&event, &state);
        assert!(!eval(&TriggerCondition::custom("honored"), &without));

        let with = ConditionContext::new(&event, &state).with_custom_eval(&custom);
        assert!(eval(&TriggerCondition::custom("honored"), &with));
        assert!(!eval(&TriggerCondition::custom("dishonored"), &with));
    }
}
