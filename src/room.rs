//! Rooms
//!
//! A room groups participants around a shared question list. This module
//! holds the room model as the store returns it, the derived occupancy
//! badge and directory statistics, the patches sent to join or edit a room,
//! and the metadata view refreshed by the room poller.

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::{
    constants::room as limits,
    quiz::{config::QuestionSet, question::QuestionRecord},
    record_id::RecordId,
};

/// Errors raised by room operations
#[derive(Debug, Error)]
pub enum Error {
    /// The room has no free seat left
    #[error("room is full")]
    Full,
    /// The room form is invalid
    #[error(transparent)]
    Invalid(#[from] garde::Report),
}

/// A room as kept by the store
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Identifier assigned by the store
    pub id: RecordId,
    /// Display name
    pub name: String,
    /// Short description
    #[serde(default)]
    pub description: String,
    /// Capacity of the room
    pub max_participants: u32,
    /// Number of participants currently inside
    #[serde(default)]
    pub participants: u32,
    /// Questions attached to the room
    pub questions: Option<Vec<QuestionRecord>>,
}

/// How crowded a room is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupancy {
    /// Plenty of seats left
    Open,
    /// At least `BUSY_RATIO` of the seats are taken
    Busy,
    /// No seat left
    Full,
}

impl Room {
    /// Returns `true` if no seat is left
    pub fn is_full(&self) -> bool {
        self.participants >= self.max_participants
    }

    /// Classifies how crowded the room is
    pub fn occupancy(&self) -> Occupancy {
        if self.is_full() {
            Occupancy::Full
        } else if f64::from(self.participants) / f64::from(self.max_participants) >= limits::BUSY_RATIO
        {
            Occupancy::Busy
        } else {
            Occupancy::Open
        }
    }

    /// Builds the patch that adds one participant
    ///
    /// # Errors
    ///
    /// Returns [`Error::Full`] if the room has no free seat.
    pub fn join(&self) -> Result<RoomPatch, Error> {
        if self.is_full() {
            return Err(Error::Full);
        }
        Ok(RoomPatch {
            participants: Some(self.participants + 1),
            ..RoomPatch::default()
        })
    }

    /// Returns the valid questions attached to the room
    pub fn question_set(&self) -> QuestionSet {
        QuestionSet::from_records(
            self.name.clone(),
            self.questions.iter().flatten().cloned(),
        )
    }

    /// Returns the number of attached question records
    pub fn question_count(&self) -> usize {
        self.questions.as_ref().map_or(0, Vec::len)
    }
}

/// Aggregate figures over a list of rooms
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryStats {
    /// Rooms that still have a free seat
    pub active_rooms: usize,
    /// Participants over all rooms
    pub online_users: u64,
}

impl DirectoryStats {
    /// Computes the figures of `rooms`
    pub fn from_rooms(rooms: &[Room]) -> Self {
        Self {
            active_rooms: rooms.iter().filter(|room| !room.is_full()).count(),
            online_users: rooms.iter().map(|room| u64::from(room.participants)).sum(),
        }
    }
}

/// A partial update of a room
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPatch {
    /// New display name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New capacity
    pub max_participants: Option<u32>,
    /// New participant count
    pub participants: Option<u32>,
    /// New question list
    pub questions: Option<Vec<QuestionRecord>>,
}

impl RoomPatch {
    /// Applies the patch to `room`
    pub fn apply(self, room: &mut Room) {
        if let Some(name) = self.name {
            room.name = name;
        }
        if let Some(description) = self.description {
            room.description = description;
        }
        if let Some(max_participants) = self.max_participants {
            room.max_participants = max_participants;
        }
        if let Some(participants) = self.participants {
            room.participants = participants;
        }
        if let Some(questions) = self.questions {
            room.questions = Some(questions);
        }
    }
}

/// The room creation form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewRoom {
    /// Display name
    #[garde(length(min = 1, max = limits::MAX_NAME_LENGTH))]
    pub name: String,
    /// Short description
    #[garde(length(min = 1, max = limits::MAX_DESCRIPTION_LENGTH))]
    pub description: String,
    /// Capacity of the room
    #[garde(range(min = limits::MIN_PARTICIPANTS, max = limits::MAX_PARTICIPANTS))]
    pub max_participants: u32,
    /// Questions attached at creation
    #[garde(skip)]
    #[serde(default)]
    pub questions: Vec<QuestionRecord>,
}

impl NewRoom {
    /// Checks the form and trims its text fields
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invalid`] if a field is blank or out of bounds.
    pub fn checked(mut self) -> Result<Self, Error> {
        self.name = self.name.trim().to_owned();
        self.description = self.description.trim().to_owned();
        self.validate()?;
        Ok(self)
    }

    /// Turns the form into a room with the given identifier and no participant
    pub fn into_room(self, id: RecordId) -> Room {
        Room {
            id,
            name: self.name,
            description: self.description,
            max_participants: self.max_participants,
            participants: 0,
            questions: Some(self.questions),
        }
    }
}

/// The part of a room shown while its quiz runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMetadata {
    /// Identifier of the room
    pub id: RecordId,
    /// Display name
    pub name: String,
    /// Short description
    pub description: String,
    /// Capacity of the room
    pub max_participants: u32,
    /// Number of participants currently inside
    pub participants: u32,
}

impl From<&Room> for RoomMetadata {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.clone(),
            name: room.name.clone(),
            description: room.description.clone(),
            max_participants: room.max_participants,
            participants: room.participants,
        }
    }
}

impl RoomMetadata {
    /// Takes the displayed fields from a refreshed room
    ///
    /// Questions are never taken from the refresh; the running quiz keeps
    /// the list it started with.
    ///
    /// # Returns
    ///
    /// `true` if any field changed
    pub fn merge(&mut self, room: &Room) -> bool {
        let refreshed = Self::from(room);
        if *self == refreshed {
            false
        } else {
            *self = refreshed;
            true
        }
    }
}
