//! Prompt titles for windows.
//!
//! Event descriptions come from the event type's `title` template, buttons
//! for choosing between events from its `action` template. Templates may
//! use `{card}`, `{player}`, `{ring}` and `{phase}`.

use crate::core::GameState;
use crate::triggers::{AbilityClass, EventBatch, EventStore, GameEvent};

/// Fill an event template from the event and the state.
pub fn fill_template(template: &str, event: &GameEvent, state: &GameState) -> String {
    let mut text = template.to_string();
    if text.contains("{card}") {
        let card = match event.card {
            Some(id) => state
                .card(id)
                .map_or_else(|| id.to_string(), |card| card.name.clone()),
            None => String::from("a card"),
        };
        text = text.replace("{card}", &card);
    }
    if text.contains("{player}") {
        let player = event.player.map_or_else(|| String::from("a player"), |p| p.to_string());
        text = text.replace("{player}", &player);
    }
    if text.contains("{ring}") {
        let ring = event.ring.map_or_else(|| String::from("a ring"), |r| r.to_string());
        text = text.replace("{ring}", &ring);
    }
    if text.contains("{phase}") {
        let phase = event.phase.map_or_else(|| String::from("a phase"), |p| p.to_string());
        text = text.replace("{phase}", &phase);
    }
    text
}

/// How an event reads inside a window title, if its type has a template.
pub fn event_description(
    event: &GameEvent,
    events: &EventStore,
    state: &GameState,
) -> Option<String> {
    let template = events.type_config(event.event_type)?.title.as_deref()?;
    Some(fill_template(template, event, state))
}

/// Button text for choosing this event.
///
/// Falls back to the event type's name when it has no action template.
pub fn event_action(event: &GameEvent, events: &EventStore, state: &GameState) -> String {
    match events.type_config(event.event_type) {
        Some(config) => match &config.action {
            Some(template) => fill_template(template, event, state),
            None => config.name.clone(),
        },
        None => event.event_type.to_string(),
    }
}

/// Join descriptions the way the game always has: the first two as
/// "A or B", every later one in front, "C, A or B".
pub fn join_descriptions<S: AsRef<str>>(descriptions: &[S]) -> String {
    let mut joined = String::new();
    for (i, description) in descriptions.iter().enumerate() {
        let description = description.as_ref();
        joined = match i {
            0 => description.to_string(),
            1 => format!("{joined} or {description}"),
            _ => format!("{description}, {joined}"),
        };
    }
    joined
}

/// Title for a window of `class` over already-joined event descriptions.
pub fn window_title(class: AbilityClass, events: Option<&str>) -> String {
    let word = class.word();
    match (class.is_forced(), events) {
        (true, Some(events)) => format!("Choose {word} order for {events}"),
        (true, None) => format!("Choose {word} order"),
        (false, Some(events)) => format!("Any {word}s to {events}?"),
        (false, None) => format!("Any {word}s?"),
    }
}

/// Title for a window of `class` over the live events of `batch`.
pub fn batch_title(
    class: AbilityClass,
    batch: &EventBatch,
    events: &EventStore,
    state: &GameState,
) -> String {
    let descriptions: Vec<String> = events
        .live(batch)
        .filter_map(|event| event_description(event, events, state))
        .collect();
    if descriptions.is_empty() {
        window_title(class, None)
    } else {
        let joined = join_descriptions(&descriptions);
        window_title(class, Some(joined.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Location, PhaseId, PlayerId, RingId};
    use crate::triggers::{EventTypeConfig, EventTypeId};

    const PLAYED: EventTypeId = EventTypeId::new(1);
    const CLAIMED: EventTypeId = EventTypeId::new(2);
    const UNTITLED: EventTypeId = EventTypeId::new(3);

    fn store() -> EventStore {
        let mut events = EventStore::new();
        events.register_type(
            EventTypeConfig::new(PLAYED, "onCardPlayed")
                .with_title("{card} being played")
                .with_action("{card} played by {player}"),
        );
        events.register_type(
            EventTypeConfig::new(CLAIMED, "onClaimRing")
                .with_title("{ring} being claimed in {phase}"),
        );
        events.register_type(EventTypeConfig::new(UNTITLED, "onNothing"));
        events
    }

    #[test]
    fn test_join_descriptions() {
        assert_eq!(join_descriptions::<&str>(&[]), "");
        assert_eq!(join_descriptions(&["A"]), "A");
        assert_eq!(join_descriptions(&["A", "B"]), "A or B");
        assert_eq!(join_descriptions(&["A", "B", "C"]), "C, A or B");
        assert_eq!(join_descriptions(&["A", "B", "C", "D"]), "D, C, A or B");
    }

    #[test]
    fn test_window_titles() {
        assert_eq!(
            window_title(AbilityClass::ForcedReaction, Some("X")),
            "Choose forced reaction order for X"
        );
        assert_eq!(
            window_title(AbilityClass::ForcedInterrupt, None),
            "Choose forced interrupt order"
        );
        assert_eq!(window_title(AbilityClass::Reaction, Some("X")), "Any reactions to X?");
        assert_eq!(window_title(AbilityClass::CancelInterrupt, None), "Any interrupts?");
    }

    #[test]
    fn test_templates() {
        let mut state = GameState::new(2);
        let card = state.create_card("Kaiu Envoy", PlayerId::new(0), Location::Play);
        let events = store();

        let played = GameEvent::for_card(PLAYED, card).with_player(PlayerId::new(1));
        assert_eq!(
            event_description(&played, &events, &state).as_deref(),
            Some("Kaiu Envoy being played")
        );
        assert_eq!(event_action(&played, &events, &state), "Kaiu Envoy played by Player 1");

        let claimed = GameEvent::new(CLAIMED).with_ring(RingId::new(2)).with_phase(PhaseId::new(4));
        assert_eq!(
            event_description(&claimed, &events, &state).as_deref(),
            Some("ring 2 being claimed in phase 4")
        );
        assert_eq!(event_action(&claimed, &events, &state), "onClaimRing");

        let untitled = GameEvent::new(UNTITLED);
        assert_eq!(event_description(&untitled, &events, &state), None);
    }

    #[test]
    fn test_batch_title_skips_untemplated_and_cancelled() {
        let mut state = GameState::new(2);
        let a = state.create_card("A", PlayerId::new(0), Location::Play);
        let b = state.create_card("B", PlayerId::new(0), Location::Play);
        let mut events = store();
        let batch = events.open_batch([
            GameEvent::for_card(PLAYED, a),
            GameEvent::new(UNTITLED),
            GameEvent::for_card(PLAYED, b),
        ]);

        assert_eq!(
            batch_title(AbilityClass::Reaction, &batch, &events, &state),
            "Any reactions to A being played or B being played?"
        );

        events.cancel(batch.events()[0]);
        events.cancel(batch.events()[2]);
        assert_eq!(batch_title(AbilityClass::Reaction, &batch, &events, &state), "Any reactions?");
    }
}
