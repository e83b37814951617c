//! Mock mixer for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::content::AudioRef;
use crate::mixer::{MixError, MixRequest, Mixer};

/// Mock implementation of the Mixer trait.
///
/// Records every request and answers with a fresh reference under
/// `/mock/final/`.
#[derive(Debug, Clone, Default)]
pub struct MockMixer {
    requests: Arc<RwLock<Vec<MixRequest>>>,
    next_error: Arc<RwLock<Option<MixError>>>,
    always_fail: Arc<RwLock<Option<String>>>,
}

impl MockMixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all mix requests received so far.
    pub async fn recorded_requests(&self) -> Vec<MixRequest> {
        self.requests.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: MixError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every call fail until cleared with `None`.
    pub async fn set_always_fail(&self, reason: Option<&str>) {
        *self.always_fail.write().await = reason.map(str::to_string);
    }
}

#[async_trait]
impl Mixer for MockMixer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn mix(&self, request: MixRequest) -> Result<AudioRef, MixError> {
        let call = {
            let mut requests = self.requests.write().await;
            requests.push(request);
            requests.len()
        };

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if let Some(reason) = self.always_fail.read().await.as_ref() {
            return Err(MixError::mix_failed(reason.clone(), None));
        }

        AudioRef::try_from(format!("/mock/final/mix-{}.mp3", call))
            .map_err(|e| MixError::mix_failed(e.to_string(), None))
    }
}
