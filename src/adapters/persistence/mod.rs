//! Persistence adapters: conversation state and the appointment log.

pub mod appointment_log;
pub mod memory_store;

pub use appointment_log::JsonAppointmentLog;
pub use memory_store::MemoryConversationStore;
