//! Multiple choice questions
//!
//! A [`Question`] is the immutable form used by running sessions. The
//! store keeps questions as [`QuestionRecord`]s, whose time limit is a
//! free-form string. Records written by other clients are played as they
//! are: the time limit is parsed and clamped into range, and only a record
//! whose correct answer is missing from its choices is refused. The
//! authoring form, [`NewQuestion`], is held to the full set of rules
//! before anything reaches the store.

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;
use web_time::Duration;

use crate::{constants::question as limits, record_id::RecordId};

/// Errors raised while building a question
#[derive(Debug, Error)]
pub enum Error {
    /// The question form is incomplete
    #[error("please fill out all fields and select the correct answer")]
    MissingFields,
    /// The declared correct answer matches none of the choices
    #[error("correct answer {0:?} is not one of the choices")]
    UnknownCorrectAnswer(String),
    /// A field is outside of its allowed bounds
    #[error(transparent)]
    Invalid(#[from] garde::Report),
}

fn time_limit_bounds() -> (Duration, Duration) {
    (
        Duration::from_secs(limits::MIN_TIME_LIMIT),
        Duration::from_secs(limits::MAX_TIME_LIMIT),
    )
}

fn out_of_bounds() -> garde::Error {
    garde::Error::new(format!(
        "time_limit is outside of the bounds [{},{}]",
        limits::MIN_TIME_LIMIT,
        limits::MAX_TIME_LIMIT,
    ))
}

/// Validates the answer time limit against the configured bounds
fn validate_time_limit(val: &Duration) -> garde::Result {
    let (min, max) = time_limit_bounds();
    if (min..=max).contains(val) {
        Ok(())
    } else {
        Err(out_of_bounds())
    }
}

/// Validates the time typed in the authoring form; blank means the default
fn validate_form_time(val: &str) -> garde::Result {
    if val.trim().is_empty() {
        return Ok(());
    }
    match parse_seconds(val) {
        Some(time_limit) => validate_time_limit(&time_limit),
        None => Err(garde::Error::new("time must be a positive number of seconds")),
    }
}

/// Validates that every choice is present and distinct
fn validate_choices(choices: &[String; limits::CHOICE_COUNT]) -> garde::Result {
    if let Some(position) = choices.iter().position(|c| c.trim().is_empty()) {
        return Err(garde::Error::new(format!("choice {} is empty", position + 1)));
    }
    if let Some(choice) = choices.iter().find(|c| c.chars().count() > limits::MAX_CHOICE_LENGTH) {
        return Err(garde::Error::new(format!(
            "choice {choice:?} is longer than {} characters",
            limits::MAX_CHOICE_LENGTH
        )));
    }
    for (i, choice) in choices.iter().enumerate() {
        if choices[..i].contains(choice) {
            return Err(garde::Error::new(format!("choice {choice:?} appears twice")));
        }
    }
    Ok(())
}

/// Reads the longest leading decimal number of `time`, exponent included
fn leading_number(time: &str) -> Option<f64> {
    let time = time.trim_start();
    let end = time
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')))
        .unwrap_or(time.len());
    let prefix = &time[..end];

    (1..=prefix.len())
        .rev()
        .find_map(|len| prefix[..len].parse::<f64>().ok())
}

/// Parses a positive, finite number of seconds
fn parse_seconds(time: &str) -> Option<Duration> {
    leading_number(time)
        .filter(|seconds| seconds.is_finite() && *seconds > 0.)
        .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
}

/// Parses a stored time limit
///
/// The leading decimal number of `time` (`"20s"`, `"1e2"`) is read as
/// seconds. Zero, negative and unreadable values fall back to the default
/// limit. The result is clamped into the allowed bounds, so `"0.5"` plays
/// for the minimum and `"300"` for the maximum.
pub fn parse_time_limit(time: &str) -> Duration {
    let (min, max) = time_limit_bounds();
    parse_seconds(time)
        .unwrap_or(Duration::from_secs(limits::DEFAULT_TIME_LIMIT))
        .clamp(min, max)
}

/// A multiple choice question ready to be played
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Question {
    /// Identifier of the stored record
    #[garde(skip)]
    pub id: RecordId,
    /// The question text shown to the player
    #[garde(skip)]
    pub text: String,
    /// The four answer choices, in display order
    #[garde(skip)]
    pub choices: [String; limits::CHOICE_COUNT],
    /// The choice that earns points
    #[garde(skip)]
    pub correct_answer: String,
    /// Time available to answer
    #[garde(custom(|v, _| validate_time_limit(v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub time_limit: Duration,
}

impl Question {
    /// Checks that the question can be played
    ///
    /// # Errors
    ///
    /// Returns an error if the time limit is out of bounds or the correct
    /// answer is not one of the choices.
    pub fn check(&self) -> Result<(), Error> {
        self.validate()?;
        if self.is_choice(&self.correct_answer) {
            Ok(())
        } else {
            Err(Error::UnknownCorrectAnswer(self.correct_answer.clone()))
        }
    }

    /// Returns `true` if `answer` is one of the four choices
    pub fn is_choice(&self, answer: &str) -> bool {
        self.choices.iter().any(|choice| choice == answer)
    }

    /// Returns `true` if `answer` is the correct choice
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }
}

/// A question as kept by the room store
///
/// Every field is optional on the wire; a record whose correct answer
/// matches none of its choices is refused when converted into a
/// [`Question`].
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuestionRecord {
    /// Identifier assigned by the store
    pub id: Option<RecordId>,
    /// The question text
    pub question: String,
    /// First answer choice
    pub choices1: String,
    /// Second answer choice
    pub choices2: String,
    /// Third answer choice
    pub choices3: String,
    /// Fourth answer choice
    pub choices4: String,
    /// The correct choice
    pub correct_answer: String,
    /// Time limit in seconds, as typed by the author
    pub time: String,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = Error;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        let question = Question {
            id: record.id.unwrap_or_else(RecordId::random),
            time_limit: parse_time_limit(&record.time),
            text: record.question,
            choices: [
                record.choices1,
                record.choices2,
                record.choices3,
                record.choices4,
            ],
            correct_answer: record.correct_answer,
        };
        question.check()?;
        Ok(question)
    }
}

impl From<&Question> for QuestionRecord {
    fn from(question: &Question) -> Self {
        let [choices1, choices2, choices3, choices4] = question.choices.clone();
        Self {
            id: Some(question.id.clone()),
            question: question.text.clone(),
            choices1,
            choices2,
            choices3,
            choices4,
            correct_answer: question.correct_answer.clone(),
            time: format!("{}", question.time_limit.as_secs_f64()),
        }
    }
}

/// The question authoring form
///
/// The correct answer is chosen by position, as the author marks one of
/// the four choices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewQuestion {
    /// The question text
    #[garde(length(min = 1, max = limits::MAX_TEXT_LENGTH))]
    pub text: String,
    /// The four answer choices
    #[garde(custom(|v, _| validate_choices(v)))]
    pub choices: [String; limits::CHOICE_COUNT],
    /// Position of the correct choice, if one was marked
    #[garde(skip)]
    pub correct_index: Option<usize>,
    /// Time limit in seconds; empty means the default
    #[garde(custom(|v: &String, _| validate_form_time(v)))]
    pub time: String,
}

impl NewQuestion {
    /// Turns the form into a record ready to be stored
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingFields`] if the text or any choice is blank
    /// or no correct choice was marked, and a validation error if a choice
    /// is repeated or too long, or the time is not a number of seconds
    /// within bounds.
    pub fn into_record(self) -> Result<QuestionRecord, Error> {
        let correct_index = self
            .correct_index
            .filter(|&i| i < limits::CHOICE_COUNT)
            .ok_or(Error::MissingFields)?;
        if self.text.trim().is_empty() || self.choices.iter().any(|c| c.trim().is_empty()) {
            return Err(Error::MissingFields);
        }
        self.validate()?;

        let time = if self.time.trim().is_empty() {
            limits::DEFAULT_TIME_LIMIT.to_string()
        } else {
            self.time
        };
        let correct_answer = self.choices[correct_index].clone();
        let [choices1, choices2, choices3, choices4] = self.choices;
        Ok(QuestionRecord {
            id: None,
            question: self.text,
            choices1,
            choices2,
            choices3,
            choices4,
            correct_answer,
            time,
        })
    }
}
