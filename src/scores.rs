//! Remote high score, exchanged as a device-shadow JSON document:
//!
//! ```json
//! {"state":{"desired":{"high-score":15,"name":"nadav"}}}
//! ```
//!
//! The transport (HTTP, TLS, retries) belongs to the caller. This module only
//! encodes and decodes the document and remembers whether the network has
//! failed, in which case the leaderboard stays offline for the rest of the
//! power cycle.

use alloc::{
    string::String,
    vec::Vec,
};

use serde::{
    Deserialize,
    Serialize,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    #[serde(rename = "high-score")]
    pub score: u32,
    pub name: String,
}

impl HighScore {
    pub fn new(score: u32, name: impl Into<String>) -> Self {
        Self {
            score,
            name: name.into(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ShadowDocument {
    state: ShadowState,
}

#[derive(Serialize, Deserialize)]
struct ShadowState {
    desired: HighScore,
}

pub fn encode(entry: &HighScore) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ShadowDocument {
        state: ShadowState {
            desired: entry.clone(),
        },
    })
}

/// Decode a shadow document. Unknown fields (metadata, version, ...) are ignored.
pub fn decode(body: &[u8]) -> Result<HighScore, serde_json::Error> {
    serde_json::from_slice::<ShadowDocument>(body).map(|doc| doc.state.desired)
}

#[derive(Debug, thiserror::Error)]
pub enum ScoreError<E: core::fmt::Debug> {
    #[error("score transport failed: {0:?}")]
    Transport(E),
    #[error("malformed shadow document: {0}")]
    Codec(serde_json::Error),
}

/// Where the high score lives.
#[allow(async_fn_in_trait)]
pub trait ScoreService {
    type Error;

    async fn fetch(&mut self) -> Result<HighScore, Self::Error>;

    async fn submit(&mut self, entry: &HighScore) -> Result<(), Self::Error>;
}

/// Raw document exchange with the shadow endpoint.
#[allow(async_fn_in_trait)]
pub trait ShadowTransport {
    type Error: core::fmt::Debug;

    /// Fetch the current document body.
    async fn get(&mut self) -> Result<Vec<u8>, Self::Error>;

    /// Replace the document with `body`.
    async fn post(&mut self, body: &str) -> Result<(), Self::Error>;
}

/// [`ScoreService`] speaking the shadow document over any transport.
pub struct ShadowScores<T> {
    transport: T,
}

impl<T: ShadowTransport> ShadowScores<T> {
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn into_inner(self) -> T {
        self.transport
    }
}

impl<T: ShadowTransport> ScoreService for ShadowScores<T> {
    type Error = ScoreError<T::Error>;

    async fn fetch(&mut self) -> Result<HighScore, Self::Error> {
        let body = self.transport.get().await.map_err(ScoreError::Transport)?;
        decode(&body).map_err(ScoreError::Codec)
    }

    async fn submit(&mut self, entry: &HighScore) -> Result<(), Self::Error> {
        let body = encode(entry).map_err(ScoreError::Codec)?;
        self.transport.post(&body).await.map_err(ScoreError::Transport)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Submission {
    /// The score beat the stored one and was uploaded.
    NewHigh,
    NotImproved,
    Offline,
}

/// Last known high score plus the sticky offline flag.
pub struct Leaderboard<S> {
    service: S,
    best: Option<HighScore>,
    offline: bool,
}

impl<S: ScoreService> Leaderboard<S> {
    pub const fn new(service: S) -> Self {
        Self {
            service,
            best: None,
            offline: false,
        }
    }

    pub const fn is_offline(&self) -> bool {
        self.offline
    }

    /// Last high score seen, possibly stale.
    pub const fn best(&self) -> Option<&HighScore> {
        self.best.as_ref()
    }

    /// Refresh from the service unless offline.
    pub async fn refresh(&mut self) -> Option<&HighScore> {
        if !self.offline {
            match self.service.fetch().await {
                Ok(entry) => {
                    info!("leaderboard: high score {=u32}", entry.score);
                    self.best = Some(entry);
                }
                Err(_) => self.go_offline(),
            }
        }
        self.best.as_ref()
    }

    /// Upload `score` if it beats the stored high score.
    pub async fn submit_if_better(&mut self, score: u32, name: &str) -> Submission {
        self.refresh().await;
        if self.offline {
            return Submission::Offline;
        }
        if self.best.as_ref().is_some_and(|best| best.score >= score) {
            return Submission::NotImproved;
        }

        let entry = HighScore::new(score, name);
        match self.service.submit(&entry).await {
            Ok(()) => {
                info!("leaderboard: new high score {=u32}", score);
                self.best = Some(entry);
                Submission::NewHigh
            }
            Err(_) => {
                self.go_offline();
                Submission::Offline
            }
        }
    }

    fn go_offline(&mut self) {
        warn!("leaderboard: network unavailable, switching to offline mode");
        self.offline = true;
    }
}
