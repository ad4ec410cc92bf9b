//! In-process store
//!
//! Keeps rooms and questions in memory. Used by tests and by front ends
//! that run without a backing service.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{
    quiz::question::QuestionRecord,
    record_id::RecordId,
    room::{NewRoom, Room, RoomPatch},
};

use super::{RoomStore, StoreError};

#[derive(Debug, Default)]
struct Records {
    rooms: Vec<Room>,
    questions: Vec<QuestionRecord>,
    next_room: u64,
    offline: bool,
}

impl Records {
    fn room_mut(&mut self, id: &RecordId) -> Result<&mut Room, StoreError> {
        self.rooms
            .iter_mut()
            .find(|room| room.id == *id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn next_room_id(&mut self) -> RecordId {
        loop {
            self.next_room += 1;
            let id = RecordId::Number(self.next_room);
            if self.rooms.iter().all(|room| room.id != id) {
                return id;
            }
        }
    }
}

/// Store keeping every record in memory
///
/// Clones share the same records. Rooms get increasing numeric
/// identifiers, questions get random ones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Records>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given rooms and questions
    pub fn with_records(rooms: Vec<Room>, questions: Vec<QuestionRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(Records {
                rooms,
                questions,
                ..Records::default()
            })),
        }
    }

    /// Makes every subsequent request fail with [`StoreError::Unavailable`]
    /// until called again with `false`
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut records) = self.records.lock() {
            records.offline = offline;
        }
    }

    fn access<R>(&self, f: impl FnOnce(&mut Records) -> Result<R, StoreError>) -> Result<R, StoreError> {
        let mut records = self.records.lock().map_err(|_| StoreError::Unavailable)?;
        if records.offline {
            return Err(StoreError::Unavailable);
        }
        f(&mut records)
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
        self.access(|records| Ok(records.rooms.clone()))
    }

    async fn get_room(&self, id: &RecordId) -> Result<Room, StoreError> {
        self.access(|records| records.room_mut(id).map(|room| room.clone()))
    }

    async fn create_room(&self, room: &NewRoom) -> Result<Room, StoreError> {
        self.access(|records| {
            let created = room.clone().into_room(records.next_room_id());
            records.rooms.push(created.clone());
            Ok(created)
        })
    }

    async fn patch_room(&self, id: &RecordId, patch: &RoomPatch) -> Result<Room, StoreError> {
        self.access(|records| {
            let room = records.room_mut(id)?;
            patch.clone().apply(room);
            Ok(room.clone())
        })
    }

    async fn replace_room(&self, room: &Room) -> Result<Room, StoreError> {
        self.access(|records| {
            let stored = records.room_mut(&room.id)?;
            *stored = room.clone();
            Ok(room.clone())
        })
    }

    async fn list_questions(&self) -> Result<Vec<QuestionRecord>, StoreError> {
        self.access(|records| Ok(records.questions.clone()))
    }

    async fn create_question(&self, question: &QuestionRecord) -> Result<QuestionRecord, StoreError> {
        self.access(|records| {
            let mut created = question.clone();
            created.id.get_or_insert_with(RecordId::random);
            records.questions.push(created.clone());
            Ok(created)
        })
    }
}
