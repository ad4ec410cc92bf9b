//! REST store client
//!
//! Talks to a JSON store exposing `/rooms` and `/questions` collections.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    config::Config,
    constants,
    quiz::question::QuestionRecord,
    record_id::RecordId,
    room::{NewRoom, Room, RoomPatch},
};

use super::{RoomStore, StoreError};

/// Body of a room creation request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRoom<'a> {
    #[serde(flatten)]
    room: &'a NewRoom,
    participants: u32,
}

/// Store reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    /// Creates a client for the store at `base_url`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(constants::store::REQUEST_TIMEOUT)
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { client, base_url })
    }

    /// Creates a client for the configured store
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        Self::new(config.store_url.clone())
    }

    /// Returns the base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn rooms_url(&self) -> String {
        format!("{}/rooms", self.base_url)
    }

    fn room_url(&self, id: &RecordId) -> String {
        format!("{}/rooms/{id}", self.base_url)
    }

    fn questions_url(&self) -> String {
        format!("{}/questions", self.base_url)
    }
}

/// Decodes a JSON response, mapping a 404 on a single record to [`StoreError::NotFound`]
async fn decode<T: DeserializeOwned>(response: Response, id: Option<&RecordId>) -> Result<T, StoreError> {
    let status = response.status();
    if let (StatusCode::NOT_FOUND, Some(id)) = (status, id) {
        return Err(StoreError::NotFound(id.clone()));
    }
    if !status.is_success() {
        tracing::debug!(%status, url = %response.url(), "store request rejected");
        return Err(StoreError::HttpStatus(status));
    }
    Ok(response.json().await?)
}

#[async_trait]
impl RoomStore for HttpStore {
    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
        let response = self.client.get(self.rooms_url()).send().await?;
        decode(response, None).await
    }

    async fn get_room(&self, id: &RecordId) -> Result<Room, StoreError> {
        let response = self.client.get(self.room_url(id)).send().await?;
        decode(response, Some(id)).await
    }

    async fn create_room(&self, room: &NewRoom) -> Result<Room, StoreError> {
        let body = CreateRoom { room, participants: 0 };
        let response = self.client.post(self.rooms_url()).json(&body).send().await?;
        decode(response, None).await
    }

    async fn patch_room(&self, id: &RecordId, patch: &RoomPatch) -> Result<Room, StoreError> {
        let response = self.client.patch(self.room_url(id)).json(patch).send().await?;
        decode(response, Some(id)).await
    }

    async fn replace_room(&self, room: &Room) -> Result<Room, StoreError> {
        let response = self.client.put(self.room_url(&room.id)).json(room).send().await?;
        decode(response, Some(&room.id)).await
    }

    async fn list_questions(&self) -> Result<Vec<QuestionRecord>, StoreError> {
        let response = self.client.get(self.questions_url()).send().await?;
        decode(response, None).await
    }

    async fn create_question(&self, question: &QuestionRecord) -> Result<QuestionRecord, StoreError> {
        let response = self.client.post(self.questions_url()).json(question).send().await?;
        decode(response, None).await
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let store = HttpStore::new("http://localhost:3001/").unwrap();
        assert_eq!(store.base_url(), "http://localhost:3001");
        assert_eq!(store.rooms_url(), "http://localhost:3001/rooms");
        assert_eq!(store.room_url(&RecordId::Number(7)), "http://localhost:3001/rooms/7");
        assert_eq!(
            store.room_url(&RecordId::Text("a1b2".to_string())),
            "http://localhost:3001/rooms/a1b2"
        );
        assert_eq!(store.questions_url(), "http://localhost:3001/questions");
    }

    #[test]
    fn test_from_config() {
        let store = HttpStore::from_config(&Config::default()).unwrap();
        assert_eq!(store.base_url(), constants::store::DEFAULT_URL);
    }

    #[test]
    fn test_create_room_body() {
        let room = NewRoom {
            name: "Trivia".to_string(),
            description: "Weekly".to_string(),
            max_participants: 8,
            questions: Vec::new(),
        };
        let body = serde_json::to_value(CreateRoom {
            room: &room,
            participants: 0,
        })
        .unwrap();

        assert_eq!(body["name"], "Trivia");
        assert_eq!(body["maxParticipants"], 8);
        assert_eq!(body["participants"], 0);
        assert!(body["questions"].as_array().unwrap().is_empty());
    }
}
