//! Room and question store
//!
//! Rooms and the shared question pool live in an external store. This
//! module defines the [`RoomStore`] contract, the errors it surfaces, and
//! the few multi-step operations (joining a room, appending questions,
//! publishing forms) built on top of it. Forms are always validated before
//! any request is made.

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    quiz::question::{self, NewQuestion, QuestionRecord},
    record_id::RecordId,
    room::{self, NewRoom, Room, RoomPatch},
};

pub mod http;
pub mod memory;

pub use http::HttpStore;
pub use memory::MemoryStore;

/// Errors emitted by store operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The store answered with an unexpected status
    #[error("store request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    /// The request could not be completed
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// No record has the requested identifier
    #[error("record {0} not found")]
    NotFound(RecordId),
    /// The store cannot be reached
    #[error("store is unavailable")]
    Unavailable,
    /// A room operation was refused
    #[error(transparent)]
    Room(#[from] room::Error),
    /// A question form was refused
    #[error(transparent)]
    Question(#[from] question::Error),
}

/// Repository contract for rooms and questions
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Fetches every room
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be queried.
    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError>;

    /// Fetches one room
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no room has this identifier.
    async fn get_room(&self, id: &RecordId) -> Result<Room, StoreError>;

    /// Creates a room with no participant
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the room cannot be stored.
    async fn create_room(&self, room: &NewRoom) -> Result<Room, StoreError>;

    /// Updates some fields of a room
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no room has this identifier.
    async fn patch_room(&self, id: &RecordId, patch: &RoomPatch) -> Result<Room, StoreError>;

    /// Replaces a whole room
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no room has this identifier.
    async fn replace_room(&self, room: &Room) -> Result<Room, StoreError>;

    /// Fetches the shared question pool
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be queried.
    async fn list_questions(&self) -> Result<Vec<QuestionRecord>, StoreError>;

    /// Adds a question to the shared pool
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the question cannot be stored.
    async fn create_question(&self, question: &QuestionRecord) -> Result<QuestionRecord, StoreError>;
}

/// Takes a seat in a room
///
/// The room is fetched first so the seat count is checked against its
/// current occupancy.
///
/// # Errors
///
/// Returns [`room::Error::Full`] (wrapped) if no seat is left, or the
/// error of the failed request.
pub async fn join_room<St: RoomStore + ?Sized>(store: &St, id: &RecordId) -> Result<Room, StoreError> {
    let room = store.get_room(id).await?;
    let patch = room.join()?;
    let joined = store.patch_room(id, &patch).await?;
    tracing::info!(room = %id, participants = joined.participants, "joined room");
    Ok(joined)
}

/// Appends questions to the list of a room
///
/// # Errors
///
/// Returns the error of the failed request.
pub async fn append_room_questions<St: RoomStore + ?Sized>(
    store: &St,
    id: &RecordId,
    questions: Vec<QuestionRecord>,
) -> Result<Room, StoreError> {
    let mut room = store.get_room(id).await?;
    room.questions.get_or_insert_with(Vec::new).extend(questions);
    store.replace_room(&room).await
}

/// Validates a question form and adds it to the shared pool
///
/// # Errors
///
/// Returns [`StoreError::Question`] without contacting the store if the
/// form is incomplete or invalid.
pub async fn publish_question<St: RoomStore + ?Sized>(
    store: &St,
    form: NewQuestion,
) -> Result<QuestionRecord, StoreError> {
    let record = form.into_record()?;
    store.create_question(&record).await
}

/// Validates a room form and creates the room
///
/// # Errors
///
/// Returns [`StoreError::Room`] without contacting the store if the form
/// is invalid.
pub async fn publish_room<St: RoomStore + ?Sized>(store: &St, form: NewRoom) -> Result<Room, StoreError> {
    let form = form.checked()?;
    let room = store.create_room(&form).await?;
    tracing::info!(room = %room.id, "created room");
    Ok(room)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::quiz::question::tests::capital_record;

    fn form(max_participants: u32) -> NewRoom {
        NewRoom {
            name: "Trivia".to_string(),
            description: "Weekly".to_string(),
            max_participants,
            questions: vec![capital_record()],
        }
    }

    fn question_form() -> NewQuestion {
        NewQuestion {
            text: "2 + 2?".to_string(),
            choices: ["3".to_string(), "4".to_string(), "5".to_string(), "22".to_string()],
            correct_index: Some(1),
            time: String::new(),
        }
    }

    #[tokio::test]
    async fn test_join_room_until_full() {
        let store = MemoryStore::new();
        let room = publish_room(&store, form(2)).await.unwrap();

        assert_eq!(join_room(&store, &room.id).await.unwrap().participants, 1);
        assert_eq!(join_room(&store, &room.id).await.unwrap().participants, 2);
        assert!(matches!(
            join_room(&store, &room.id).await,
            Err(StoreError::Room(room::Error::Full))
        ));
        assert_eq!(store.get_room(&room.id).await.unwrap().participants, 2);
    }

    #[tokio::test]
    async fn test_join_missing_room() {
        let store = MemoryStore::new();
        let id = RecordId::Number(42);
        assert!(matches!(
            join_room(&store, &id).await,
            Err(StoreError::NotFound(missing)) if missing == id
        ));
    }

    #[tokio::test]
    async fn test_publish_invalid_room_sends_nothing() {
        let store = MemoryStore::new();
        assert!(matches!(
            publish_room(&store, form(0)).await,
            Err(StoreError::Room(room::Error::Invalid(_)))
        ));
        assert!(store.list_rooms().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_room_questions() {
        let store = MemoryStore::new();
        let room = publish_room(&store, form(5)).await.unwrap();

        let extra = QuestionRecord {
            id: None,
            question: "Capital of Spain?".to_string(),
            correct_answer: "Madrid".to_string(),
            ..capital_record()
        };
        let updated = append_room_questions(&store, &room.id, vec![extra]).await.unwrap();

        assert_eq!(updated.question_count(), 2);
        assert_eq!(store.get_room(&room.id).await.unwrap().question_set().len(), 2);
    }

    #[tokio::test]
    async fn test_publish_question_defaults_time() {
        let store = MemoryStore::new();
        let record = publish_question(&store, question_form()).await.unwrap();

        assert_eq!(record.correct_answer, "4");
        assert_eq!(record.time, "10");
        assert!(record.id.is_some());
        assert_eq!(store.list_questions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_publish_incomplete_question_sends_nothing() {
        let store = MemoryStore::new();
        let incomplete = NewQuestion {
            correct_index: None,
            ..question_form()
        };

        assert!(matches!(
            publish_question(&store, incomplete).await,
            Err(StoreError::Question(question::Error::MissingFields))
        ));
        assert!(store.list_questions().await.unwrap().is_empty());
    }
}
