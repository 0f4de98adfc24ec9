//! Resolve a display name for a sender.

use crate::domain::SenderProfile;

const ANONYMOUS: &str = "User";

/// First whitespace-delimited token of a full name, if any.
pub fn first_name(full_name: Option<&str>) -> Option<&str> {
    full_name?.split_whitespace().next()
}

/// Display name for greetings: first name, else the raw sender id, else "User".
pub fn sender_name(profile: &SenderProfile) -> String {
    if let Some(name) = first_name(profile.name.as_deref()) {
        return name.to_string();
    }
    let wa_id = profile.wa_id.trim();
    if wa_id.is_empty() {
        ANONYMOUS.to_string()
    } else {
        wa_id.to_string()
    }
}
