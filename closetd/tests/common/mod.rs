//! Mock collaborators shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use closet_common::model::Closet;
use closet_common::{Error, Result};
use closetd::bridge::{ChannelEvent, LabelPublisher, MessageChannel, MessageStream};
use closetd::repo::{ClosetRepository, FileHandler, FileRepository};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::io::{AsyncRead, AsyncReadExt};
use uuid::Uuid;

/// In-memory closet store that records which repository calls were made.
#[derive(Default)]
pub struct MockClosetRepo {
    pub closets: Mutex<HashMap<String, Closet>>,
    /// Sequence of "create"/"replace" calls, in order
    pub writes: Mutex<Vec<&'static str>>,
    /// When set, every fetch reports the repository as unreachable
    pub unavailable: bool,
}

impl MockClosetRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn with_closet(closet: Closet) -> Self {
        let repo = Self::default();
        repo.closets
            .lock()
            .unwrap()
            .insert(closet.user.clone(), closet);
        repo
    }

    pub fn closet(&self, user: &str) -> Option<Closet> {
        self.closets.lock().unwrap().get(user).cloned()
    }

    pub fn write_calls(&self, kind: &str) -> usize {
        self.writes.lock().unwrap().iter().filter(|w| **w == kind).count()
    }
}

#[async_trait]
impl ClosetRepository for MockClosetRepo {
    async fn create(&self, user: &str, closet: &Closet) -> Result<()> {
        self.writes.lock().unwrap().push("create");
        self.closets
            .lock()
            .unwrap()
            .insert(user.to_string(), closet.clone());
        Ok(())
    }

    async fn fetch(&self, user: &str) -> Result<Closet> {
        if self.unavailable {
            return Err(Error::RepositoryUnavailable {
                server: "someserver:57400".into(),
            });
        }
        self.closets
            .lock()
            .unwrap()
            .get(user)
            .cloned()
            .ok_or(Error::UserNotFound { user: user.into() })
    }

    async fn replace(&self, user: &str, closet: &Closet) -> Result<()> {
        self.writes.lock().unwrap().push("replace");
        self.closets
            .lock()
            .unwrap()
            .insert(user.to_string(), closet.clone());
        Ok(())
    }

    async fn remove_all(&self, user: &str) -> Result<()> {
        self.closets.lock().unwrap().remove(user);
        Ok(())
    }
}

/// In-memory blob store that records deletions.
#[derive(Default)]
pub struct MockFileRepo {
    pub files: Mutex<HashMap<String, Vec<u8>>>,
    pub deleted: Mutex<Vec<String>>,
    /// Pretend a blob already exists under every key
    pub always_exists: bool,
    /// Fail every delete with an io error
    pub fail_deletes: bool,
}

impl MockFileRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blob_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileRepository for MockFileRepo {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn put_from_reader(
        &self,
        key: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<()> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        self.put(key, &bytes).await
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        if self.always_exists {
            return Ok(Vec::new());
        }
        self.files
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or(Error::NoSuchFileOrDirectory { file: key.into() })
    }

    async fn get_via_handler(&self, _key: &str, _handler: FileHandler<'_>) -> Result<()> {
        unimplemented!("handler retrieval is exercised against the real file repository")
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(key.to_string());
        if self.fail_deletes {
            return Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into());
        }
        self.files
            .lock()
            .unwrap()
            .remove(key)
            .map(|_| ())
            .ok_or(Error::NoSuchFileOrDirectory { file: key.into() })
    }
}

/// Publisher that records every recognition request.
#[derive(Default)]
pub struct MockPublisher {
    pub requests: Mutex<Vec<(String, Uuid, String)>>,
    pub fail: bool,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LabelPublisher for MockPublisher {
    async fn publish_label(&self, user: &str, id: Uuid, raw_image: &str) -> Result<()> {
        if self.fail {
            return Err(Error::Channel("publish failed".into()));
        }
        self.requests
            .lock()
            .unwrap()
            .push((user.to_string(), id, raw_image.to_string()));
        Ok(())
    }
}

/// Channel whose subscription replays a scripted event sequence, then
/// blocks forever.
pub struct ScriptedChannel {
    events: Mutex<Option<VecDeque<Result<ChannelEvent>>>>,
    pub published: Mutex<Vec<(String, Vec<u8>)>>,
}

impl ScriptedChannel {
    pub fn new(events: Vec<Result<ChannelEvent>>) -> Self {
        Self {
            events: Mutex::new(Some(events.into())),
            published: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MessageChannel for ScriptedChannel {
    async fn publish(&self, channel: &str, payload: &[u8]) -> Result<()> {
        self.published
            .lock()
            .unwrap()
            .push((channel.to_string(), payload.to_vec()));
        Ok(())
    }

    async fn subscribe(&self, _channel: &str) -> Result<Box<dyn MessageStream>> {
        let events = self
            .events
            .lock()
            .unwrap()
            .take()
            .expect("subscribe called twice");
        Ok(Box::new(ScriptedStream { events }))
    }
}

pub struct ScriptedStream {
    events: VecDeque<Result<ChannelEvent>>,
}

#[async_trait]
impl MessageStream for ScriptedStream {
    async fn next_event(&mut self) -> Result<ChannelEvent> {
        match self.events.pop_front() {
            Some(event) => event,
            // Script exhausted: behave like a quiet channel.
            None => std::future::pending().await,
        }
    }
}
