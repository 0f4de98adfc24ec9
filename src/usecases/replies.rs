//! Reply composer. Fixed texts, the welcome message and the media catalog.

use crate::domain::{DomainError, MediaCatalogEntry, MediaKind, OutboundReply};
use std::collections::HashMap;

pub const UNKNOWN_OPTION_TEXT: &str = "Sorry, we didn't understand that option";
pub const ASSISTANT_UNAVAILABLE_TEXT: &str =
    "Sorry, I couldn't get an answer right now. Please try again later.";
pub const MEDIA_UNAVAILABLE_TEXT: &str = "Sorry, we couldn't send that file right now.";

/// Personalized greeting for `name`.
pub fn welcome_text(name: &str) -> String {
    format!(
        "Hello {}, Welcome to Medpet, your online Pet Shop 🐕🐈🦜. How can I help you, today?",
        name
    )
}

pub fn echo_text(body: &str) -> String {
    format!("Echo: {}", body)
}

/// Sample files sent for the media keywords. Keyed by [`MediaKind`].
#[derive(Debug, Clone, Default)]
pub struct MediaCatalog {
    entries: HashMap<MediaKind, MediaCatalogEntry>,
}

impl MediaCatalog {
    pub fn new(entries: HashMap<MediaKind, MediaCatalogEntry>) -> Self {
        Self { entries }
    }

    /// Standard Medpet catalog served from `cdn_base_url`.
    pub fn medpet(cdn_base_url: &str) -> Self {
        let base = cdn_base_url.trim_end_matches('/');
        let entry = |file: &str, caption: &str| MediaCatalogEntry {
            url: format!("{}/{}", base, file),
            caption: caption.to_string(),
        };
        let entries = HashMap::from([
            (MediaKind::Audio, entry("medpet-audio.aac", "Welcome 🔉")),
            (
                MediaKind::Image,
                entry("medpet-imagen.png", "¡This is an image! 🏞️"),
            ),
            (
                MediaKind::Video,
                entry("medpet-video.mp4", "¡This is a video! 🎥"),
            ),
            (
                MediaKind::Document,
                entry("medpet-file.pdf", "¡This is a PDF! 📄"),
            ),
        ]);
        Self { entries }
    }

    pub fn lookup(&self, kind: MediaKind) -> Result<&MediaCatalogEntry, DomainError> {
        self.entries
            .get(&kind)
            .ok_or_else(|| DomainError::UnknownMediaKind(kind.to_string()))
    }

    /// Media reply for `kind`.
    pub fn reply(&self, kind: MediaKind) -> Result<OutboundReply, DomainError> {
        let entry = self.lookup(kind)?;
        Ok(OutboundReply::Media {
            kind,
            url: entry.url.clone(),
            caption: entry.caption.clone(),
        })
    }
}
