//! Descriptions of pending decisions.
//!
//! A [`Prompt`] is what a suspended step is waiting on, in a form the
//! surrounding game can render: who decides, the title, which cards are
//! selectable, which buttons exist, and when a timer runs out. Rendering
//! itself is not the core's business.

use serde::{Deserialize, Serialize};

use crate::core::{CardId, PlayerId};

/// A button on a prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuButton {
    /// Label shown to the player.
    pub text: String,
    /// Value sent back in [`StepInput::MenuButton`](crate::pipeline::StepInput).
    pub arg: String,
}

impl MenuButton {
    /// Create a button.
    pub fn new(text: impl Into<String>, arg: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            arg: arg.into(),
        }
    }
}

/// What kind of answer the prompt wants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptKind {
    /// Click one of the listed cards (buttons may also be offered).
    SelectCard { selectable: Vec<CardId> },

    /// Press one of the buttons.
    Menu,
}

/// A decision a player must make before the game can continue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// The deciding player.
    pub player: PlayerId,

    /// Prompt title.
    pub title: String,

    /// What the prompt is about, for the UI's grouping.
    pub source: String,

    /// Card selection or plain menu.
    pub kind: PromptKind,

    /// Buttons, in display order.
    pub buttons: Vec<MenuButton>,

    /// Clock time at which the prompt times out.
    pub deadline: Option<u64>,
}

impl Prompt {
    /// A prompt to click one of `selectable`.
    pub fn select_card(
        player: PlayerId,
        title: impl Into<String>,
        selectable: Vec<CardId>,
    ) -> Self {
        Self {
            player,
            title: title.into(),
            source: String::new(),
            kind: PromptKind::SelectCard { selectable },
            buttons: Vec::new(),
            deadline: None,
        }
    }

    /// A prompt to press a button.
    pub fn menu(player: PlayerId, title: impl Into<String>) -> Self {
        Self {
            player,
            title: title.into(),
            source: String::new(),
            kind: PromptKind::Menu,
            buttons: Vec::new(),
            deadline: None,
        }
    }

    /// Set the prompt source (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Add a button (builder pattern).
    #[must_use]
    pub fn with_button(mut self, text: impl Into<String>, arg: impl Into<String>) -> Self {
        self.buttons.push(MenuButton::new(text, arg));
        self
    }

    /// Set a timeout (builder pattern).
    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<u64>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Does the prompt offer a button with this arg?
    #[must_use]
    pub fn has_button(&self, arg: &str) -> bool {
        self.buttons.iter().any(|button| button.arg == arg)
    }

    /// Can this card be clicked?
    #[must_use]
    pub fn is_selectable(&self, card: CardId) -> bool {
        match &self.kind {
            PromptKind::SelectCard { selectable } => selectable.contains(&card),
            PromptKind::Menu => false,
        }
    }

    /// Cards that can be clicked, empty for menus.
    #[must_use]
    pub fn selectable(&self) -> &[CardId] {
        match &self.kind {
            PromptKind::SelectCard { selectable } => selectable,
            PromptKind::Menu => &[],
        }
    }

    /// Button labels, in display order.
    #[must_use]
    pub fn button_texts(&self) -> Vec<&str> {
        self.buttons.iter().map(|button| button.text.as_str()).collect()
    }
}
