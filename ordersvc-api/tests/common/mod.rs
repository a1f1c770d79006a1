#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{Request, StatusCode},
    response::Response,
    routing::{self, post},
    Router,
};
use http_body_util::BodyExt;
use ordersvc_api::{app, AppState};
use ordersvc_catalog::{Catalog, OrderSelector, RandomSelector};
use ordersvc_core::{
    LogErrorReporter, MessageBroker, OutboundMessage, PaymentGateway, StageError, StageOutcome,
};
use ordersvc_order::{EventPublisher, HttpPaymentGateway, OrderOrchestrator};
use ordersvc_shared::{Order, TraceContext};
use tower::ServiceExt; // oneshot

/// Broker that records every message and optionally fails the send.
#[derive(Default)]
pub struct RecordingBroker {
    pub fail: bool,
    pub sent: Mutex<Vec<OutboundMessage>>,
}

impl RecordingBroker {
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageBroker for RecordingBroker {
    async fn send(&self, message: OutboundMessage) -> Result<(), StageError> {
        self.sent.lock().unwrap().push(message);
        if self.fail {
            return Err(StageError::Publish("broker unreachable".into()));
        }
        Ok(())
    }
}

/// In-process gateway answering from a script, then succeeding.
#[derive(Default)]
pub struct ScriptedGateway {
    pub script: Mutex<VecDeque<StageOutcome>>,
    pub charged: Mutex<Vec<Order>>,
}

impl ScriptedGateway {
    pub fn answering(outcomes: Vec<StageOutcome>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(outcomes.into()),
            charged: Mutex::default(),
        })
    }

    pub fn count(&self) -> usize {
        self.charged.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn charge(&self, _ctx: &TraceContext, order: &Order) -> StageOutcome {
        self.charged.lock().unwrap().push(order.clone());
        self.script.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

/// Payment service over real HTTP, answering every call with `status` and `{}`.
#[derive(Clone)]
pub struct PaymentService {
    pub url: String,
    status: StatusCode,
    pub received: Arc<Mutex<Vec<Bytes>>>,
}

impl PaymentService {
    pub fn count(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

async fn payment(State(service): State<PaymentService>, body: Bytes) -> (StatusCode, &'static str) {
    service.received.lock().unwrap().push(body);
    (service.status, "{}")
}

pub async fn spawn_payment_service(status: StatusCode) -> PaymentService {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let service = PaymentService {
        url: format!("http://{}", listener.local_addr().unwrap()),
        status,
        received: Arc::default(),
    };
    let router = Router::new()
        .route("/payment", routing::get(payment))
        .with_state(service.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    service
}

async fn stall() {
    tokio::time::sleep(Duration::from_secs(3)).await;
}

/// APM server that holds every intake request for 3s; returns its base URL.
pub async fn spawn_stalled_apm() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let router = Router::new().route("/intake/v2/events", post(stall));
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    url
}

pub fn http_gateway(service: &PaymentService) -> Arc<HttpPaymentGateway> {
    Arc::new(
        HttpPaymentGateway::new(&service.url, Duration::from_secs(5), Arc::new(LogErrorReporter))
            .unwrap(),
    )
}

/// Router over the default nine-item catalog.
pub fn make_router(gateway: Arc<dyn PaymentGateway>, broker: Arc<RecordingBroker>) -> (Router, Catalog) {
    make_router_with(gateway, broker, Arc::new(RandomSelector::new()))
}

pub fn make_router_with(
    gateway: Arc<dyn PaymentGateway>,
    broker: Arc<RecordingBroker>,
    selector: Arc<dyn OrderSelector>,
) -> (Router, Catalog) {
    let catalog = Catalog::with_default_orders();
    let orchestrator =
        OrderOrchestrator::new(catalog.clone(), selector, gateway, EventPublisher::new(broker));
    (app(AppState::new(Arc::new(orchestrator))), catalog)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Drive the router with a single request.
pub async fn call(router: Router, req: Request<Body>) -> (Response<()>, Bytes) {
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let (parts, body) = resp.into_parts();
    let body = body
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (Response::from_parts(parts, ()), body)
}

pub fn header<'a>(resp: &'a Response<()>, name: &str) -> Option<&'a str> {
    resp.headers().get(name).and_then(|v| v.to_str().ok())
}
