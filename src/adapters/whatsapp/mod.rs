//! WhatsApp Cloud API adapters: outbound client, webhook payload mapper, webhook routes.

pub mod client;
pub mod mapper;
pub mod webhook;

pub use client::WhatsAppClient;
pub use webhook::{WebhookState, router};
