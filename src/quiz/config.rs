//! Question sets and play modes
//!
//! A [`QuestionSet`] is the ordered list of questions a session plays
//! through. It is built from store records, dropping the ones whose correct
//! answer is not among their choices after logging them.

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{config::Timing, constants, record_id::RecordId};

use super::question::{Question, QuestionRecord};

/// Where a session's questions come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// The shared question pool, preceded by a start countdown
    Solo,
    /// A fixed set of questions bundled with the application
    Static,
    /// The questions attached to a room
    Room(RecordId),
}

impl Mode {
    /// Number of start countdown steps played before the first question
    pub fn start_countdown(&self, timing: &Timing) -> u8 {
        match self {
            Self::Solo => timing.start_countdown,
            Self::Static | Self::Room(_) => 0,
        }
    }
}

/// An ordered set of questions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct QuestionSet {
    /// Display title of the set
    #[garde(length(max = constants::question::MAX_TITLE_LENGTH))]
    title: String,

    /// The questions, in play order
    #[garde(length(max = constants::question::MAX_QUESTION_COUNT), dive)]
    questions: Vec<Question>,
}

impl QuestionSet {
    /// Creates a set from already validated questions
    pub fn new(title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            title: title.into(),
            questions,
        }
    }

    /// Builds a set from store records, skipping invalid ones
    pub fn from_records<I: IntoIterator<Item = QuestionRecord>>(
        title: impl Into<String>,
        records: I,
    ) -> Self {
        let questions = records
            .into_iter()
            .enumerate()
            .filter_map(|(position, record)| match Question::try_from(record) {
                Ok(question) => Some(question),
                Err(e) => {
                    tracing::warn!("skipping question at position {position}: {e}");
                    None
                }
            })
            .take(constants::question::MAX_QUESTION_COUNT)
            .collect();

        Self::new(title, questions)
    }

    /// Returns the title of the set
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the question at `index`
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Returns the number of questions
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Returns `true` if the set holds no question
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::quiz::question::tests::capital_record;

    #[test]
    fn test_from_records_skips_invalid() {
        let broken = QuestionRecord {
            correct_answer: "Nice".to_string(),
            ..capital_record()
        };
        let set = QuestionSet::from_records("Capitals", vec![capital_record(), broken]);

        assert_eq!(set.len(), 1);
        assert_eq!(set.title(), "Capitals");
        assert!(set.validate().is_ok());
    }

    #[test]
    fn test_from_records_keeps_out_of_range_times() {
        let short = QuestionRecord {
            time: "0.5".to_string(),
            ..capital_record()
        };
        let long = QuestionRecord {
            id: Some(RecordId::Number(2)),
            time: "300".to_string(),
            ..capital_record()
        };
        let set = QuestionSet::from_records("Capitals", vec![short, long]);

        assert_eq!(set.len(), 2);
        assert!(set.validate().is_ok());
        assert_eq!(set.get(0).unwrap().time_limit, web_time::Duration::from_secs(1));
        assert_eq!(set.get(1).unwrap().time_limit, web_time::Duration::from_secs(240));
    }

    #[test]
    fn test_empty_set() {
        let set = QuestionSet::from_records("Nothing", Vec::new());
        assert!(set.is_empty());
        assert!(set.get(0).is_none());
    }

    #[test]
    fn test_set_title_too_long() {
        let set = QuestionSet::new("x".repeat(constants::question::MAX_TITLE_LENGTH + 1), Vec::new());
        assert!(set.validate().is_err());
    }

    #[test]
    fn test_mode_start_countdown() {
        let timing = Timing::default();
        assert_eq!(Mode::Solo.start_countdown(&timing), 3);
        assert_eq!(Mode::Static.start_countdown(&timing), 0);
        assert_eq!(Mode::Room(RecordId::Number(1)).start_countdown(&timing), 0);
    }
}
