#![forbid(unsafe_code)]

//! Core domain model and business logic for The Coach.
//!
//! This crate provides:
//! - Domain types (exercise kinds, difficulty levels, stats)
//! - Daily schedule generation
//! - Exercise timer state machine
//! - Persistence gateway trait with memory and file-backed stores
//! - The `Coach` context tying a user's day together

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod schedule;
pub mod timer;
pub mod gateway;
pub mod completions;
pub mod stats_file;
pub mod file_gateway;
pub mod identity;
pub mod export;
pub mod coach;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use schedule::{generate_schedule, has_start_stop, DayRelation};
pub use timer::{format_time, Phase, TimerEvent, TimerSession, TimerState};
pub use gateway::{IdentityProvider, MemoryGateway, PersistenceGateway};
pub use file_gateway::FileGateway;
pub use identity::SessionFile;
pub use coach::{Coach, CompletionOutcome};
