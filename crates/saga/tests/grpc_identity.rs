//! gRPC identity client tests against an in-process user service.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

use domain::{PlaceOrder, UserId};
use order_store::InMemoryOrderRepository;
use saga::services::grpc_identity::proto::user_service_server::{UserService, UserServiceServer};
use saga::services::grpc_identity::proto::{ValidateUserRequest, ValidateUserResponse};
use saga::{
    GrpcIdentityValidator, IdentityError, IdentityValidator, InMemoryStockCatalog, OrderSaga,
    SagaError,
};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic::{Request, Response, Status};

struct TestUserService {
    known: HashSet<String>,
}

#[tonic::async_trait]
impl UserService for TestUserService {
    async fn validate_user(
        &self,
        request: Request<ValidateUserRequest>,
    ) -> Result<Response<ValidateUserResponse>, Status> {
        let id = request.into_inner().id;
        match id.as_str() {
            "gone" => Err(Status::not_found("no such user")),
            "bad id" => Err(Status::invalid_argument("malformed user id")),
            "crash" => Err(Status::internal("user store down")),
            _ => Ok(Response::new(ValidateUserResponse {
                ok: self.known.contains(&id),
            })),
        }
    }
}

async fn start_user_service(known: &[&str]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let service = TestUserService {
        known: known.iter().map(|id| id.to_string()).collect(),
    };

    tokio::spawn(async move {
        Server::builder()
            .add_service(UserServiceServer::new(service))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    addr
}

async fn validator(known: &[&str]) -> GrpcIdentityValidator {
    let addr = start_user_service(known).await;
    GrpcIdentityValidator::connect_lazy(&addr.to_string(), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_known_and_unknown_users() {
    let identity = validator(&["U1"]).await;

    assert!(identity.validate(&UserId::from("U1")).await.unwrap());
    assert!(!identity.validate(&UserId::from("U2")).await.unwrap());
}

#[tokio::test]
async fn test_not_found_status_means_unknown_user() {
    let identity = validator(&[]).await;

    assert!(!identity.validate(&UserId::from("gone")).await.unwrap());
}

#[tokio::test]
async fn test_invalid_argument_is_rejected() {
    let identity = validator(&[]).await;

    let err = identity.validate(&UserId::from("bad id")).await.unwrap_err();
    assert!(matches!(err, IdentityError::Rejected(ref msg) if msg == "malformed user id"));
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let identity = validator(&[]).await;

    let err = identity.validate(&UserId::from("crash")).await.unwrap_err();
    assert!(matches!(err, IdentityError::Unavailable(_)));
}

#[tokio::test]
async fn test_saga_rejects_user_unknown_to_grpc_service() {
    let identity = validator(&["U1"]).await;
    let catalog = InMemoryStockCatalog::new().with_product("P1", "15.00".parse().unwrap(), 5);
    let saga = OrderSaga::new(InMemoryOrderRepository::new(), identity, catalog.clone());

    let record = saga
        .create_order(PlaceOrder::new("U1").item("P1", 1))
        .await
        .unwrap();
    assert_eq!(record.order.total.to_string(), "15.00");

    let err = saga
        .create_order(PlaceOrder::new("U2").item("P1", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, SagaError::InvalidUser { .. }));
    assert_eq!(catalog.stock("P1"), Some(4));
}
