//! Questions and rounds
//!
//! This module contains the question model, the sets of questions a
//! session plays through, and the per-question round logic: countdown,
//! submission, scoring and staged reveal.

pub mod config;
pub mod question;
pub mod reveal;
pub mod round;
