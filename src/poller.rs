//! Room metadata refresh
//!
//! While a room quiz runs, the room itself keeps changing: people join,
//! the owner edits the description. The [`RoomPoller`] fetches the room
//! periodically and publishes its metadata on a `watch` channel. It never
//! touches the question list of a running session.

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use web_time::Duration;

use crate::{
    record_id::RecordId,
    room::{Room, RoomMetadata},
    store::RoomStore,
};

/// Periodically refreshes the metadata of one room
#[derive(Debug)]
pub struct RoomPoller<St> {
    store: St,
    room_id: RecordId,
    interval: Duration,
    updates: watch::Sender<RoomMetadata>,
}

impl<St: RoomStore> RoomPoller<St> {
    /// Creates a poller for `room`
    ///
    /// # Returns
    ///
    /// The poller and a receiver that starts with the metadata of `room`
    pub fn new(store: St, room: &Room, interval: Duration) -> (Self, watch::Receiver<RoomMetadata>) {
        let (updates, receiver) = watch::channel(RoomMetadata::from(room));
        let poller = Self {
            store,
            room_id: room.id.clone(),
            interval,
            updates,
        };
        (poller, receiver)
    }

    /// Fetches the room once and publishes its metadata if it changed
    ///
    /// Store failures are logged and leave the published metadata as is.
    ///
    /// # Returns
    ///
    /// `true` if new metadata was published
    pub async fn poll_once(&self) -> bool {
        match self.store.get_room(&self.room_id).await {
            Ok(room) => self.updates.send_if_modified(|metadata| metadata.merge(&room)),
            Err(e) => {
                tracing::warn!(room = %self.room_id, "failed to refresh room: {e}");
                false
            }
        }
    }

    /// Polls until every receiver is dropped
    pub async fn run(self) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately and the room was just fetched
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
                () = self.updates.closed() => break,
            }
        }
        tracing::debug!(room = %self.room_id, "room poller stopped");
    }
}

impl<St: RoomStore + 'static> RoomPoller<St> {
    /// Runs the poller on its own task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{
        room::{RoomPatch, tests::room},
        store::MemoryStore,
    };

    const INTERVAL: Duration = Duration::from_secs(5);

    fn seeded() -> (MemoryStore, Room) {
        let room = room(2, 10);
        (MemoryStore::with_records(vec![room.clone()], Vec::new()), room)
    }

    #[tokio::test]
    async fn test_poll_once_publishes_changes() {
        let (store, room) = seeded();
        let (poller, receiver) = RoomPoller::new(store.clone(), &room, INTERVAL);

        assert!(!poller.poll_once().await);

        let patch = RoomPatch {
            participants: Some(6),
            ..RoomPatch::default()
        };
        store.patch_room(&room.id, &patch).await.unwrap();

        assert!(poller.poll_once().await);
        assert_eq!(receiver.borrow().participants, 6);
    }

    #[tokio::test]
    async fn test_question_changes_are_not_published() {
        let (store, room) = seeded();
        let (poller, receiver) = RoomPoller::new(store.clone(), &room, INTERVAL);

        let patch = RoomPatch {
            questions: Some(Vec::new()),
            ..RoomPatch::default()
        };
        store.patch_room(&room.id, &patch).await.unwrap();

        assert!(!poller.poll_once().await);
        assert_eq!(*receiver.borrow(), RoomMetadata::from(&room));
    }

    #[tokio::test]
    async fn test_store_failure_keeps_metadata() {
        let (store, room) = seeded();
        let (poller, receiver) = RoomPoller::new(store.clone(), &room, INTERVAL);

        store.set_offline(true);
        assert!(!poller.poll_once().await);
        assert_eq!(receiver.borrow().participants, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_poller_refreshes_periodically() {
        let (store, room) = seeded();
        let (poller, mut receiver) = RoomPoller::new(store.clone(), &room, INTERVAL);
        let handle = poller.spawn();

        let patch = RoomPatch {
            name: Some("Renamed".to_string()),
            ..RoomPatch::default()
        };
        store.patch_room(&room.id, &patch).await.unwrap();

        time::timeout(Duration::from_secs(6), receiver.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(receiver.borrow_and_update().name, "Renamed");

        drop(receiver);
        handle.await.unwrap();
    }
}
