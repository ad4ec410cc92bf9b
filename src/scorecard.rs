//! Score keeping
//!
//! This module records the outcome of every finished round of a session
//! and derives the final summary shown once the last question is done.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::record_id::RecordId;

/// Points earned by one submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Points for answering correctly
    pub base: u64,
    /// Points for answering quickly
    pub bonus: u64,
}

impl ScoreBreakdown {
    /// Returns the sum of both parts
    pub fn total(&self) -> u64 {
        self.base + self.bonus
    }
}

/// Result of a single finished round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    /// The question that was asked
    pub question_id: RecordId,
    /// The choice that was submitted, if any
    pub submitted_answer: Option<String>,
    /// Whether the submitted choice was correct
    pub correct: bool,
    /// Points for correctness
    pub base: u64,
    /// Points for speed
    pub bonus: u64,
}

impl RoundOutcome {
    /// Returns the points earned in this round
    pub fn points(&self) -> u64 {
        self.base + self.bonus
    }
}

/// Summary of a completed session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Total points earned
    pub total: u64,
    /// Number of questions answered correctly
    pub correct_count: usize,
    /// Number of questions played
    pub question_count: usize,
    /// Points earned on each question, in order
    pub points: Vec<u64>,
}

/// Outcomes of the rounds played so far
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scorecard {
    outcomes: Vec<RoundOutcome>,
}

impl Scorecard {
    /// Records the outcome of a finished round
    pub fn record(&mut self, outcome: RoundOutcome) {
        self.outcomes.push(outcome);
    }

    /// Returns the recorded outcomes in play order
    pub fn outcomes(&self) -> &[RoundOutcome] {
        &self.outcomes
    }

    /// Returns the total points over all recorded rounds
    pub fn total(&self) -> u64 {
        self.outcomes.iter().map(RoundOutcome::points).sum()
    }

    /// Returns the number of correctly answered rounds
    pub fn correct_count(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.correct).count()
    }

    /// Builds the summary of the recorded rounds
    pub fn summary(&self) -> Summary {
        Summary {
            total: self.total(),
            correct_count: self.correct_count(),
            question_count: self.outcomes.len(),
            points: self.outcomes.iter().map(RoundOutcome::points).collect_vec(),
        }
    }
}
