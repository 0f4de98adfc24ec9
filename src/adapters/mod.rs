//! Infrastructure adapters. Implement outbound ports.
//!
//! WhatsApp Cloud API, assistant LLM, in-memory state, JSON appointment log.
//! Map errors to DomainError.

pub mod ai;
pub mod diagnostics;
pub mod persistence;
pub mod whatsapp;
