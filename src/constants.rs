//! Configuration constants for the quiz engine
//!
//! This module contains the scoring rules, timing defaults and the
//! validation limits used throughout the crate to keep questions,
//! rooms and sessions within consistent boundaries.

/// Scoring constants
pub mod scoring {
    /// Points awarded for a correct answer regardless of speed
    pub const BASE_POINTS: u64 = 600;
    /// Upper bound of the speed bonus awarded for a correct answer
    pub const MAX_TIME_BONUS: u64 = 400;
}

/// Round and reveal timing defaults
pub mod timing {
    use web_time::Duration;

    /// Interval between two countdown ticks
    pub const TICK_INTERVAL: Duration = Duration::from_millis(100);
    /// Remaining time at or below which the countdown counts as expired
    pub const EXPIRY_EPSILON: Duration = Duration::from_millis(1);
    /// Number of reveal stages shown after the answer is revealed
    pub const REVEAL_STAGES: u8 = 3;
    /// Delay between two reveal stages
    pub const REVEAL_STEP: Duration = Duration::from_secs(2);
    /// Delay between the last reveal stage and the next question
    pub const REVEAL_TRAILING: Duration = Duration::from_secs(2);
    /// Number of seconds counted down before the first question of a solo quiz
    pub const START_COUNTDOWN: u8 = 3;
    /// Delay between two start countdown steps
    pub const START_COUNTDOWN_STEP: Duration = Duration::from_secs(1);

    /// Lower bound for configurable ticker and reveal delays, in milliseconds
    pub const MIN_DELAY_MILLIS: u64 = 10;
    /// Upper bound for configurable ticker and reveal delays, in milliseconds
    pub const MAX_DELAY_MILLIS: u64 = 60_000;
}

/// Question configuration constants
pub mod question {
    /// Minimum time limit in seconds for answering a question
    pub const MIN_TIME_LIMIT: u64 = 1;
    /// Maximum time limit in seconds for answering a question
    pub const MAX_TIME_LIMIT: u64 = 240;
    /// Time limit in seconds used when the stored value cannot be parsed
    pub const DEFAULT_TIME_LIMIT: u64 = 10;
    /// Number of answer choices every question carries
    pub const CHOICE_COUNT: usize = 4;
    /// Maximum length of the question text
    pub const MAX_TEXT_LENGTH: usize = 500;
    /// Maximum length of a single answer choice
    pub const MAX_CHOICE_LENGTH: usize = 200;
    /// Maximum number of questions in one set
    pub const MAX_QUESTION_COUNT: usize = 200;
    /// Maximum length of a question set title
    pub const MAX_TITLE_LENGTH: usize = 200;
}

/// Room configuration constants
pub mod room {
    use web_time::Duration;

    /// Smallest capacity a room may be created with
    pub const MIN_PARTICIPANTS: u32 = 1;
    /// Largest capacity a room may be created with
    pub const MAX_PARTICIPANTS: u32 = 50;
    /// Maximum length of a room name
    pub const MAX_NAME_LENGTH: usize = 100;
    /// Maximum length of a room description
    pub const MAX_DESCRIPTION_LENGTH: usize = 500;
    /// Occupancy ratio from which a room is shown as busy
    pub const BUSY_RATIO: f64 = 0.7;
    /// Default delay between two room metadata refreshes
    pub const POLL_INTERVAL: Duration = Duration::from_secs(5);
}

/// Room store defaults
pub mod store {
    use web_time::Duration;

    /// Base URL of the room store when none is configured
    pub const DEFAULT_URL: &str = "http://localhost:3001";
    /// Timeout applied to every store request
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
}
