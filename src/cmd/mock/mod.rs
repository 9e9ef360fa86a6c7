use std::{
    convert::Infallible,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use rama::{
    Layer as _, Service,
    error::{ErrorContext as _, OpaqueError},
    graceful::ShutdownGuard,
    http::{
        BodyExtractExt as _, HeaderValue, Method, Request, Response, StatusCode,
        layer::{required_header::AddRequiredResponseHeadersLayer, trace::TraceLayer},
        server::HttpServer,
        service::web::response::{IntoResponse, Json},
    },
    layer::TimeoutLayer,
    net::socket::Interface,
    rt::Executor,
    tcp::server::TcpListener,
    telemetry::tracing,
};

use clap::Args;
use serde_json::Value;
use tokio::time::Instant;

/// run a local in-memory mock of the fleet API
///
/// Serves the kafka + service-account surface, the cloud-provider metadata,
/// the metrics endpoints, the config sink and a token endpoint, so a perf
/// run can be exercised end to end without a real fleet manager.
#[derive(Debug, Clone, Args)]
pub struct MockCommand {
    /// network interface to bind to
    #[arg(
        long,
        short = 'b',
        value_name = "INTERFACE",
        default_value = "127.0.0.1:8000"
    )]
    pub bind: Interface,

    /// seconds before a created kafka reports ready
    #[arg(long, value_name = "SECONDS", default_value_t = 5.)]
    pub provision_latency: f64,

    /// base processing latency per request
    #[arg(long, value_name = "SECONDS", default_value_t = 0.)]
    pub base_latency: f64,

    /// probability that a request answers with a 500
    #[arg(long, value_name = "RATE", default_value_t = 0.)]
    pub error_rate: f32,
}

pub async fn exec(guard: ShutdownGuard, args: MockCommand) -> Result<(), OpaqueError> {
    let exec = Executor::graceful(guard);
    let tcp_listener = TcpListener::bind(args.bind.clone(), exec.clone())
        .await
        .map_err(OpaqueError::from_boxed)
        .context("bind mock fleet api server")?;

    let http_svc = (
        TraceLayer::new_for_http(),
        AddRequiredResponseHeadersLayer::new()
            .with_server_header_value(HeaderValue::from_static("fleetbench-mock")),
    )
        .into_layer(Arc::new(MockFleetApi::new(MockConfig {
            provision_latency: Duration::from_secs_f64(args.provision_latency.max(0.)),
            base_latency: Duration::from_secs_f64(args.base_latency.max(0.)),
            error_rate: args.error_rate.clamp(0., 1.),
        })));

    let http_server = HttpServer::auto(exec).service(Arc::new(http_svc));

    let server_addr = tcp_listener
        .local_addr()
        .context("get bound address for mock fleet api server")?;
    tracing::info!("mock fleet api server bound to: {server_addr}");

    let tcp_svc = TimeoutLayer::new(Duration::from_secs(60)).into_layer(http_server);
    tcp_listener.serve(tcp_svc).await;

    Ok(())
}

#[derive(Debug, Clone)]
struct MockKafka {
    id: String,
    name: String,
    created_at: Instant,
}

#[derive(Debug, Clone)]
struct MockServiceAccount {
    id: String,
    name: String,
}

#[derive(Debug, Default)]
struct FleetState {
    next_id: u64,
    kafkas: Vec<MockKafka>,
    service_accounts: Vec<MockServiceAccount>,
}

#[derive(Debug, Clone, Copy)]
struct MockConfig {
    provision_latency: Duration,
    base_latency: Duration,
    error_rate: f32,
}

/// In-memory fleet API.
///
/// Kafkas go through the async lifecycle the harness polls for: created in
/// `accepted` status, flipping to `ready` (with a bootstrap host) once the
/// configured provisioning latency passed.
#[derive(Debug)]
struct MockFleetApi {
    cfg: MockConfig,
    state: Mutex<FleetState>,
}

impl MockFleetApi {
    fn new(cfg: MockConfig) -> Self {
        Self {
            cfg,
            state: Mutex::new(FleetState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, FleetState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_id(state: &mut FleetState, kind: &str) -> String {
        state.next_id += 1;
        format!("mock-{kind}-{:06}", state.next_id)
    }

    fn kafka_body(&self, kafka: &MockKafka) -> Value {
        if kafka.created_at.elapsed() >= self.cfg.provision_latency {
            serde_json::json!({
                "id": kafka.id,
                "name": kafka.name,
                "status": "ready",
                "bootstrapServerHost": format!("{}.kafka.mock.local:443", kafka.id),
            })
        } else {
            serde_json::json!({
                "id": kafka.id,
                "name": kafka.name,
                "status": "accepted",
            })
        }
    }

    fn collection(items: Vec<Value>) -> Response {
        let total = items.len();
        Json(serde_json::json!({ "items": items, "total": total })).into_response()
    }
}

impl Service<Request> for MockFleetApi {
    type Output = Response;
    type Error = Infallible;

    async fn serve(&self, req: Request) -> Result<Self::Output, Self::Error> {
        if self.cfg.base_latency > Duration::ZERO {
            tokio::time::sleep(self.cfg.base_latency).await;
        }
        if self.cfg.error_rate > 0. && rand::random::<f32>() < self.cfg.error_rate {
            return Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response());
        }

        let method = req.method().clone();
        let path = req.uri().path().to_owned();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        // the API base path prefix is irrelevant for routing, match the tail
        Ok(match segments.as_slice() {
            [.., "kafkas"] if method == Method::POST => {
                let name = json_body_name(req).await;
                let mut state = self.state();
                let id = Self::next_id(&mut state, "kafka");
                let kafka = MockKafka {
                    id: id.clone(),
                    name: name.unwrap_or_else(|| id.clone()),
                    created_at: Instant::now(),
                };
                state.kafkas.push(kafka);
                (
                    StatusCode::ACCEPTED,
                    Json(serde_json::json!({ "id": id, "status": "accepted" })),
                )
                    .into_response()
            }
            [.., "kafkas"] if method == Method::GET => {
                let state = self.state();
                let items = state
                    .kafkas
                    .iter()
                    .map(|kafka| self.kafka_body(kafka))
                    .collect();
                Self::collection(items)
            }
            [.., "kafkas", _id, "metrics", "query"] if method == Method::GET => {
                Json(serde_json::json!({ "kind": "MetricsInstantQueryList", "items": [] }))
                    .into_response()
            }
            [.., "kafkas", _id, "metrics", "query_range"] if method == Method::GET => {
                Json(serde_json::json!({ "kind": "MetricsRangeQueryList", "items": [] }))
                    .into_response()
            }
            [.., "kafkas", id] if method == Method::GET => {
                let state = self.state();
                match state.kafkas.iter().find(|kafka| kafka.id == **id) {
                    Some(kafka) => Json(self.kafka_body(kafka)).into_response(),
                    None => StatusCode::NOT_FOUND.into_response(),
                }
            }
            [.., "kafkas", id] if method == Method::DELETE => {
                let mut state = self.state();
                match state.kafkas.iter().position(|kafka| kafka.id == **id) {
                    Some(index) => {
                        state.kafkas.remove(index);
                        StatusCode::NO_CONTENT.into_response()
                    }
                    None => StatusCode::NOT_FOUND.into_response(),
                }
            }
            [.., "serviceaccounts"] if method == Method::POST => {
                let name = json_body_name(req).await;
                let mut state = self.state();
                let id = Self::next_id(&mut state, "svc-acc");
                let account = MockServiceAccount {
                    id: id.clone(),
                    name: name.unwrap_or_else(|| id.clone()),
                };
                let body = serde_json::json!({ "id": account.id, "name": account.name });
                state.service_accounts.push(account);
                (StatusCode::CREATED, Json(body)).into_response()
            }
            [.., "serviceaccounts"] if method == Method::GET => {
                let state = self.state();
                let items = state
                    .service_accounts
                    .iter()
                    .map(|account| serde_json::json!({ "id": account.id, "name": account.name }))
                    .collect();
                Self::collection(items)
            }
            [.., "serviceaccounts", id, "reset-credentials"] if method == Method::POST => {
                let state = self.state();
                match state.service_accounts.iter().find(|acc| acc.id == **id) {
                    Some(account) => Json(serde_json::json!({
                        "id": account.id,
                        "name": account.name,
                        "clientSecret": "rotated-by-mock",
                    }))
                    .into_response(),
                    None => StatusCode::NOT_FOUND.into_response(),
                }
            }
            [.., "serviceaccounts", id] if method == Method::DELETE => {
                let mut state = self.state();
                match state.service_accounts.iter().position(|acc| acc.id == **id) {
                    Some(index) => {
                        state.service_accounts.remove(index);
                        StatusCode::NO_CONTENT.into_response()
                    }
                    None => StatusCode::NOT_FOUND.into_response(),
                }
            }
            [.., "cloud_providers"] if method == Method::GET => Self::collection(vec![
                serde_json::json!({ "id": "aws", "display_name": "Amazon Web Services", "enabled": true }),
                serde_json::json!({ "id": "gcp", "display_name": "Google Cloud Platform", "enabled": false }),
            ]),
            [.., "cloud_providers", _provider, "regions"] if method == Method::GET => {
                Self::collection(vec![
                    serde_json::json!({ "id": "us-east-1", "enabled": true }),
                    serde_json::json!({ "id": "eu-west-1", "enabled": true }),
                ])
            }
            [.., "openapi"] if method == Method::GET => Json(serde_json::json!({
                "openapi": "3.0.0",
                "info": { "title": "Mock Fleet API", "version": "0.0.0" },
                "paths": {},
            }))
            .into_response(),
            ["write_kafka_config"] if method == Method::POST => {
                StatusCode::NO_CONTENT.into_response()
            }
            ["auth", "token"] if method == Method::POST => Json(serde_json::json!({
                "access_token": "mock-access-token",
                "token_type": "Bearer",
                "expires_in": 3600,
            }))
            .into_response(),
            _ => StatusCode::NOT_FOUND.into_response(),
        })
    }
}

async fn json_body_name(req: Request) -> Option<String> {
    let body = req.try_into_json::<Value>().await.ok()?;
    body.get("name").and_then(Value::as_str).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rama::http::Body;
    use tokio::time;

    fn mock_api(provision_latency: Duration) -> MockFleetApi {
        MockFleetApi::new(MockConfig {
            provision_latency,
            base_latency: Duration::ZERO,
            error_rate: 0.,
        })
    }

    fn request(method: Method, uri: &str, body: Option<Value>) -> Request {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(value) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&value).expect("encode")))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        }
    }

    async fn body_json(resp: Response) -> Value {
        resp.try_into_json().await.expect("json body")
    }

    const BASE: &str = "http://mock.local/api/managed-services-api/v1";

    #[tokio::test(flavor = "current_thread")]
    async fn kafkas_provision_asynchronously() {
        time::pause();

        let api = mock_api(Duration::from_secs(5));

        let resp = api
            .serve(request(
                Method::POST,
                &format!("{BASE}/kafkas?async=true"),
                Some(serde_json::json!({ "name": "perf-test-kafka-x" })),
            ))
            .await
            .expect("serve");
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let id = body_json(resp).await["id"].as_str().expect("id").to_owned();

        let resp = api
            .serve(request(Method::GET, &format!("{BASE}/kafkas/{id}"), None))
            .await
            .expect("serve");
        let body = body_json(resp).await;
        assert_eq!(body["status"], "accepted");
        assert!(body.get("bootstrapServerHost").is_none());

        time::advance(Duration::from_secs(5)).await;

        let resp = api
            .serve(request(Method::GET, &format!("{BASE}/kafkas/{id}"), None))
            .await
            .expect("serve");
        let body = body_json(resp).await;
        assert_eq!(body["status"], "ready");
        assert_eq!(body["name"], "perf-test-kafka-x");
        assert!(body["bootstrapServerHost"].as_str().expect("host").len() > 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn kafka_deletion_is_terminal() {
        let api = mock_api(Duration::ZERO);

        let resp = api
            .serve(request(
                Method::POST,
                &format!("{BASE}/kafkas?async=true"),
                Some(serde_json::json!({ "name": "doomed" })),
            ))
            .await
            .expect("serve");
        let id = body_json(resp).await["id"].as_str().expect("id").to_owned();

        let resp = api
            .serve(request(
                Method::DELETE,
                &format!("{BASE}/kafkas/{id}?async=true"),
                None,
            ))
            .await
            .expect("serve");
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = api
            .serve(request(
                Method::DELETE,
                &format!("{BASE}/kafkas/{id}?async=true"),
                None,
            ))
            .await
            .expect("serve");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn config_sink_and_token_endpoints_answer() {
        let api = mock_api(Duration::ZERO);

        let resp = api
            .serve(request(
                Method::POST,
                "http://api:8099/write_kafka_config",
                Some(serde_json::json!({
                    "bootstrapURL": "b:443", "username": "u", "password": "p",
                })),
            ))
            .await
            .expect("serve");
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = api
            .serve(request(Method::POST, "http://sso.local/auth/token", None))
            .await
            .expect("serve");
        let body = body_json(resp).await;
        assert_eq!(body["access_token"], "mock-access-token");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn service_account_lifecycle_round_trips() {
        let api = mock_api(Duration::ZERO);

        let resp = api
            .serve(request(
                Method::POST,
                &format!("{BASE}/serviceaccounts"),
                Some(serde_json::json!({ "name": "perf-test-svc-acc-a" })),
            ))
            .await
            .expect("serve");
        assert_eq!(resp.status(), StatusCode::CREATED);
        let id = body_json(resp).await["id"].as_str().expect("id").to_owned();

        let resp = api
            .serve(request(
                Method::POST,
                &format!("{BASE}/serviceaccounts/{id}/reset-credentials"),
                Some(serde_json::json!({ "name": "perf-test-svc-acc-a" })),
            ))
            .await
            .expect("serve");
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = api
            .serve(request(Method::GET, &format!("{BASE}/serviceaccounts"), None))
            .await
            .expect("serve");
        let body = body_json(resp).await;
        assert_eq!(body["items"].as_array().expect("items").len(), 1);

        let resp = api
            .serve(request(
                Method::DELETE,
                &format!("{BASE}/serviceaccounts/{id}"),
                None,
            ))
            .await
            .expect("serve");
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }
}
