//! Identity validation over gRPC.
//!
//! Calls the unary `user.UserService/ValidateUser` method through the client
//! generated from `proto/user.proto`.

use std::time::Duration;

use async_trait::async_trait;
use domain::UserId;
use tonic::Code;
use tonic::transport::{Channel, Endpoint};

use super::identity::{IdentityError, IdentityValidator};

/// Generated messages and stubs of the user service.
pub mod proto {
    tonic::include_proto!("user");
}

use proto::ValidateUserRequest;
use proto::user_service_client::UserServiceClient;

/// gRPC client for the user service.
///
/// The channel connects lazily, so construction never blocks and an
/// unreachable service surfaces as `IdentityError::Unavailable` on first use.
#[derive(Debug, Clone)]
pub struct GrpcIdentityValidator {
    client: UserServiceClient<Channel>,
}

impl GrpcIdentityValidator {
    /// Creates a client for `addr`. A bare `host:port` is treated as plaintext HTTP/2.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect_lazy(addr: &str, timeout: Duration) -> Result<Self, IdentityError> {
        let uri = if addr.contains("://") {
            addr.to_string()
        } else {
            format!("http://{addr}")
        };
        let endpoint = Endpoint::from_shared(uri)
            .map_err(|e| IdentityError::Unavailable(format!("invalid identity address '{addr}': {e}")))?
            .connect_timeout(timeout)
            .timeout(timeout);
        Ok(Self {
            client: UserServiceClient::new(endpoint.connect_lazy()),
        })
    }
}

#[async_trait]
impl IdentityValidator for GrpcIdentityValidator {
    async fn validate(&self, user_id: &UserId) -> Result<bool, IdentityError> {
        let request = ValidateUserRequest {
            id: user_id.as_str().to_string(),
        };

        match self.client.clone().validate_user(request).await {
            Ok(response) => Ok(response.into_inner().ok),
            Err(status) if status.code() == Code::NotFound => Ok(false),
            Err(status) if status.code() == Code::InvalidArgument => {
                Err(IdentityError::Rejected(status.message().to_string()))
            }
            Err(status) => Err(IdentityError::Unavailable(format!(
                "{:?}: {}",
                status.code(),
                status.message()
            ))),
        }
    }
}
