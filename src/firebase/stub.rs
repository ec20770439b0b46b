use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;

use super::{IdentityClaim, TokenVerifier, VerifyError};

/// Verifier that knows a fixed table of tokens.
#[derive(Default)]
pub struct StubVerifier {
    tokens: HashMap<String, IdentityClaim>,
    calls: AtomicUsize,
}

impl StubVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, token: &str, email: &str, sub: &str) -> Self {
        self.tokens.insert(
            token.to_string(),
            IdentityClaim {
                email: email.to_string(),
                subject_id: sub.to_string(),
                display_name: None,
                picture_url: None,
            },
        );
        self
    }

    pub fn with_claim(mut self, token: &str, claim: IdentityClaim) -> Self {
        self.tokens.insert(token.to_string(), claim);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenVerifier for StubVerifier {
    async fn verify(&self, token: &str) -> Result<IdentityClaim, VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if token.is_empty() {
            return Err(VerifyError::Empty);
        }
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| VerifyError::UnknownKey("stub".into()))
    }
}
