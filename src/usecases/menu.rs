//! Menu catalog and dispatcher. Maps a tapped button title to an action.

use crate::domain::{Button, OutboundReply};
use crate::usecases::classifier::Action;

const MENU_PROMPT: &str = "Choose an option:";

/// Flows that a menu option can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Appointment,
    Assistant,
}

/// What selecting a menu option does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Reply(&'static str),
    StartFlow(FlowKind),
}

/// Static catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct MenuOption {
    pub id: &'static str,
    /// Title as shown on the button. Matched case-insensitively.
    pub title: &'static str,
    pub action: MenuAction,
    /// Shown in the top-level menu. The provider allows at most three buttons.
    pub in_main_menu: bool,
}

pub const MENU_OPTIONS: &[MenuOption] = &[
    MenuOption {
        id: "option_1",
        title: "Sheduled ✅",
        action: MenuAction::StartFlow(FlowKind::Appointment),
        in_main_menu: true,
    },
    MenuOption {
        id: "option_2",
        title: "Request 🤔",
        action: MenuAction::StartFlow(FlowKind::Assistant),
        in_main_menu: true,
    },
    MenuOption {
        id: "option_3",
        title: "Location 📍",
        action: MenuAction::Reply("This is our location"),
        in_main_menu: true,
    },
    MenuOption {
        id: "option_6",
        title: "Emergency 🚨",
        action: MenuAction::Reply(
            "If this is an emergency, we invite you to call our attention line",
        ),
        in_main_menu: false,
    },
];

/// Look up a normalized (trimmed, lowercased) title. Exact match only.
pub fn dispatch(option_title: &str) -> Action {
    MENU_OPTIONS
        .iter()
        .find(|o| o.title.to_lowercase() == option_title)
        .map(|o| Action::Menu(o.action))
        .unwrap_or_else(|| Action::UnknownOption(option_title.to_string()))
}

/// The top-level menu.
pub fn main_menu() -> OutboundReply {
    OutboundReply::Buttons {
        prompt: MENU_PROMPT.to_string(),
        options: MENU_OPTIONS
            .iter()
            .filter(|o| o.in_main_menu)
            .map(|o| Button {
                id: o.id.to_string(),
                title: o.title.to_string(),
            })
            .collect(),
    }
}
