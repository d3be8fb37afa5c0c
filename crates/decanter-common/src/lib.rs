//! Types shared by every stage of the decanter pipeline.
//!
//! Collectors produce [`event::Event`]s, the checker turns them into
//! [`types::AlertEvent`]s, and alerters consume those.

pub mod event;
pub mod id;
pub mod types;
