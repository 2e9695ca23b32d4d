//! Application layer for Concise.
//!
//! This crate wires user intents to the conversation store, attachment
//! extraction and the AI response pipeline.

pub mod chat_controller;
pub mod notice;

pub use chat_controller::{ChatController, ChatSnapshot, Lane, SendOutcome};
pub use notice::{Notice, NoticeLevel};
