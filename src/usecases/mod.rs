//! Application use cases. Classify inbound messages and drive the conversation flows.

pub mod appointment_flow;
pub mod assistant_flow;
pub mod classifier;
pub mod menu;
pub mod message_handler;
pub mod replies;
pub mod sender_directory;
pub mod sender_locks;

pub use classifier::{Action, classify};
pub use message_handler::MessageHandler;
pub use replies::MediaCatalog;
