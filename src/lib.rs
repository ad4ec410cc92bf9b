//! # Quizroom Library
//!
//! This library provides the session engine of a timed multiple-choice quiz.
//! It sequences questions, runs the per-question countdown and scoring,
//! reveals answers in stages, and keeps shared quiz rooms in sync with a
//! remote store while a quiz is being played.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::ignored_unit_patterns)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]
use serde::{Deserialize, Serialize};

pub mod config;
pub mod constants;

pub mod driver;
pub mod game;
pub mod poller;
pub mod quiz;
pub mod record_id;
pub mod room;
pub mod scheduler;
pub mod scorecard;
pub mod session;
pub mod store;

/// Messages describing the whole state of a session
///
/// Sent when a view attaches to a running session or explicitly asks to be
/// synchronized.
#[derive(Debug, Serialize, Clone, PartialEq, Eq, derive_more::From)]
pub enum SyncMessage {
    /// Session level synchronization
    Game(game::SyncMessage),
    /// Synchronization of the round being played
    Round(quiz::round::SyncMessage),
}

impl SyncMessage {
    /// Converts the sync message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Messages describing a single change of the session state
#[derive(Debug, Serialize, Clone, PartialEq, Eq, derive_more::From)]
pub enum UpdateMessage {
    /// Session level updates
    Game(game::UpdateMessage),
    /// Updates of the round being played
    Round(quiz::round::UpdateMessage),
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Alarm messages for timed events
///
/// Every alarm is stamped with the generation or round that armed it, so
/// the session can discard alarms that outlived their phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::From, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Session level alarms
    Game(game::AlarmMessage),
    /// Alarms of a round
    Round(quiz::round::AlarmMessage),
}
