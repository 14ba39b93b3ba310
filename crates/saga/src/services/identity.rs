//! Identity validation contract and in-memory implementation.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::UserId;
use thiserror::Error;
use tokio::time::error::Elapsed;

/// Failures reported by an identity validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The service could not be reached or did not answer in time.
    #[error("identity service unavailable: {0}")]
    Unavailable(String),

    /// The service refused the request itself.
    #[error("identity request rejected: {0}")]
    Rejected(String),
}

impl From<Elapsed> for IdentityError {
    fn from(_: Elapsed) -> Self {
        IdentityError::Unavailable("identity call timed out".to_string())
    }
}

/// Answers whether a user exists.
#[async_trait]
pub trait IdentityValidator: Send + Sync {
    /// Returns `Ok(false)` for an unknown user and `Err` when no answer could
    /// be obtained.
    async fn validate(&self, user_id: &UserId) -> Result<bool, IdentityError>;
}

#[async_trait]
impl<T: IdentityValidator + ?Sized> IdentityValidator for Arc<T> {
    async fn validate(&self, user_id: &UserId) -> Result<bool, IdentityError> {
        (**self).validate(user_id).await
    }
}

#[derive(Debug, Default)]
struct InMemoryIdentityState {
    known: HashSet<UserId>,
    unavailable: bool,
    calls: usize,
}

/// In-memory identity validator for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityValidator {
    state: Arc<RwLock<InMemoryIdentityState>>,
}

impl InMemoryIdentityValidator {
    /// Creates a validator that knows no users.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `add_user`.
    pub fn with_user(self, user_id: impl Into<UserId>) -> Self {
        self.add_user(user_id);
        self
    }

    /// Registers a known user.
    pub fn add_user(&self, user_id: impl Into<UserId>) {
        self.state.write().unwrap().known.insert(user_id.into());
    }

    /// Makes every call fail with `Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unwrap().unavailable = unavailable;
    }

    /// Number of validation calls received.
    pub fn call_count(&self) -> usize {
        self.state.read().unwrap().calls
    }
}

#[async_trait]
impl IdentityValidator for InMemoryIdentityValidator {
    async fn validate(&self, user_id: &UserId) -> Result<bool, IdentityError> {
        let mut state = self.state.write().unwrap();
        state.calls += 1;
        if state.unavailable {
            return Err(IdentityError::Unavailable("identity service offline".to_string()));
        }
        Ok(state.known.contains(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_and_unknown_users() {
        let validator = InMemoryIdentityValidator::new().with_user("U1");

        assert!(validator.validate(&UserId::from("U1")).await.unwrap());
        assert!(!validator.validate(&UserId::from("U2")).await.unwrap());
        assert_eq!(validator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_validator_errors() {
        let validator = InMemoryIdentityValidator::new().with_user("U1");
        validator.set_unavailable(true);

        let err = validator.validate(&UserId::from("U1")).await.unwrap_err();
        assert!(matches!(err, IdentityError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_shared_validator_through_arc() {
        let validator = Arc::new(InMemoryIdentityValidator::new().with_user("U1"));
        let shared: Arc<dyn IdentityValidator> = validator.clone();

        assert!(shared.validate(&UserId::from("U1")).await.unwrap());
        assert_eq!(validator.call_count(), 1);
    }
}
