use std::time::{Duration, SystemTime};

use rama::{
    Service as _,
    error::{ErrorContext as _, OpaqueError},
    http::{
        Body, BodyExtractExt as _, Method, Request, Response,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    service::BoxService,
    telemetry::tracing,
};
use serde::Serialize;
use serde_json::Value;
use tokio::{sync::mpsc, time::Instant};

pub mod payload;

/// Connection details persisted to the external config sink once a kafka
/// reports ready.
#[derive(Debug, Clone, Serialize)]
pub struct KafkaConnectionConfig {
    #[serde(rename = "bootstrapURL")]
    pub bootstrap_url: String,
    pub username: String,
    pub password: String,
}

/// Outcome of a single API request.
#[derive(Debug)]
pub struct RequestOutcome {
    pub ok: bool,
    pub status: Option<u16>,
    pub failure: Option<FailureKind>,
}

#[derive(Debug)]
pub enum FailureKind {
    HttpStatus,
    Other,
}

/// One measured API request, as consumed by the run reporter.
#[derive(Debug)]
pub struct RequestEvent {
    pub ts: SystemTime,
    pub elapsed: Duration,
    /// stable label of the endpoint, with IDs collapsed (e.g. `/kafkas/[id]`)
    pub endpoint: &'static str,
    pub latency: Duration,
    pub outcome: RequestOutcome,
}

/// Emits one [`RequestEvent`] per issued request towards the report worker.
#[derive(Debug, Clone)]
pub struct Recorder {
    start: Instant,
    tx: mpsc::Sender<RequestEvent>,
}

impl Recorder {
    pub fn new(start: Instant, tx: mpsc::Sender<RequestEvent>) -> Self {
        Self { start, tx }
    }

    async fn record(&self, endpoint: &'static str, latency: Duration, outcome: RequestOutcome) {
        let ev = RequestEvent {
            ts: SystemTime::now(),
            elapsed: self.start.elapsed(),
            endpoint,
            latency,
            outcome,
        };
        if let Err(err) = self.tx.send(ev).await {
            tracing::debug!("failed to send request event msg: {err}");
        }
    }
}

/// HTTP collaborator for the fleet API and the config sink.
///
/// Every helper is tolerant: an API failure is recorded and logged, never
/// propagated. A virtual user slows down and retries, it does not abort.
pub struct ApiClient {
    http: BoxService<Request, Response, OpaqueError>,
    base: String,
    sink_url: String,
    token: Option<String>,
    recorder: Option<Recorder>,
}

impl ApiClient {
    pub fn new(
        http: BoxService<Request, Response, OpaqueError>,
        target: &str,
        base_api_path: &str,
        sink_url: String,
        recorder: Option<Recorder>,
    ) -> Self {
        let base = format!("{}{}", target.trim_end_matches('/'), base_api_path);
        Self {
            http,
            base,
            sink_url,
            token: None,
            recorder,
        }
    }

    /// Acquire a bearer token via the client-credentials grant.
    ///
    /// Tolerant: on failure the client stays unauthenticated and the run
    /// proceeds (the target may not require auth at all).
    pub async fn fetch_token(&mut self, sso: &crate::config::SsoConfig) {
        #[derive(Serialize)]
        struct TokenForm<'a> {
            grant_type: &'a str,
            client_id: &'a str,
            client_secret: &'a str,
        }

        let form = match serde_html_form::to_string(&TokenForm {
            grant_type: "client_credentials",
            client_id: &sso.client_id,
            client_secret: &sso.client_secret,
        }) {
            Ok(form) => form,
            Err(err) => {
                tracing::warn!("failed to encode token request form: {err}");
                return;
            }
        };

        let req = match Request::builder()
            .method(Method::POST)
            .uri(sso.token_url.as_str())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .context("build token request")
        {
            Ok(req) => req,
            Err(err) => {
                tracing::warn!("failed to build token request: {err}");
                return;
            }
        };

        let Some(resp) = self.dispatch("/auth/token", req).await else {
            tracing::warn!("token endpoint unreachable, continue unauthenticated");
            return;
        };
        if !resp.status().is_success() {
            tracing::warn!(
                "token endpoint answered {}, continue unauthenticated",
                resp.status()
            );
            return;
        }
        match resp.try_into_json::<Value>().await {
            Ok(body) => {
                self.token = body
                    .get("access_token")
                    .and_then(Value::as_str)
                    .map(str::to_owned);
                if self.token.is_none() {
                    tracing::warn!("token response carried no access_token");
                }
            }
            Err(err) => tracing::warn!("failed to parse token response: {err}"),
        }
    }

    pub async fn create_kafka(&self, body: &Value) -> Option<String> {
        self.handle_post(format!("{}/kafkas?async=true", self.base), body, "/kafkas")
            .await
    }

    pub async fn list_kafkas(&self) {
        self.handle_get(format!("{}/kafkas", self.base), "/kafkas")
            .await;
    }

    pub async fn list_kafkas_json(&self) -> Option<Value> {
        self.handle_get_json(format!("{}/kafkas", self.base), "/kafkas")
            .await
    }

    pub async fn search_kafkas(&self, term: &str) {
        self.handle_get(
            format!("{}/kafkas?search={term}", self.base),
            "/kafkas?search",
        )
        .await;
    }

    pub async fn get_kafka(&self, id: &str) {
        self.handle_get(format!("{}/kafkas/{id}", self.base), "/kafkas/[id]")
            .await;
    }

    pub async fn get_kafka_json(&self, id: &str) -> Option<Value> {
        self.handle_get_json(format!("{}/kafkas/{id}", self.base), "/kafkas/[id]")
            .await
    }

    pub async fn delete_kafka(&self, id: &str) -> Option<u16> {
        self.handle_delete(
            format!("{}/kafkas/{id}?async=true", self.base),
            "/kafkas/[id]",
        )
        .await
    }

    pub async fn kafka_metrics_query(&self, id: &str) {
        self.handle_get(
            format!("{}/kafkas/{id}/metrics/query", self.base),
            "/kafkas/[id]/metrics/query",
        )
        .await;
    }

    pub async fn kafka_metrics_query_range(&self, id: &str) {
        self.handle_get(
            format!(
                "{}/kafkas/{id}/metrics/query_range?duration=5&interval=30",
                self.base
            ),
            "/kafkas/[id]/metrics/query_range",
        )
        .await;
    }

    pub async fn list_service_accounts(&self) {
        self.handle_get(format!("{}/serviceaccounts", self.base), "/serviceaccounts")
            .await;
    }

    pub async fn list_service_accounts_json(&self) -> Option<Value> {
        self.handle_get_json(format!("{}/serviceaccounts", self.base), "/serviceaccounts")
            .await
    }

    pub async fn create_service_account(
        &self,
        body: &payload::ServiceAccountRequest,
    ) -> Option<String> {
        self.handle_post(
            format!("{}/serviceaccounts", self.base),
            body,
            "/serviceaccounts",
        )
        .await
    }

    pub async fn reset_service_account_credentials(
        &self,
        id: &str,
        body: &payload::ServiceAccountRequest,
    ) -> Option<String> {
        self.handle_post(
            format!("{}/serviceaccounts/{id}/reset-credentials", self.base),
            body,
            "/serviceaccounts/[id]/reset-credentials",
        )
        .await
    }

    pub async fn delete_service_account(&self, id: &str) -> Option<u16> {
        self.handle_delete(
            format!("{}/serviceaccounts/{id}", self.base),
            "/serviceaccounts/[id]",
        )
        .await
    }

    pub async fn list_cloud_providers(&self) {
        self.handle_get(format!("{}/cloud_providers", self.base), "/cloud_providers")
            .await;
    }

    pub async fn list_cloud_provider_regions(&self) {
        self.handle_get(
            format!("{}/cloud_providers/aws/regions", self.base),
            "/cloud_providers/aws/regions",
        )
        .await;
    }

    pub async fn get_openapi(&self) {
        self.handle_get(format!("{}/openapi", self.base), "/openapi")
            .await;
    }

    /// Persist a kafka connection config to the external sink.
    /// Returns the answered status code, 204 meaning accepted.
    pub async fn write_kafka_config(&self, config: &KafkaConnectionConfig) -> Option<u16> {
        self.handle_post_status(self.sink_url.clone(), config, "/write_kafka_config")
            .await
    }

    /// GET that only observes the status; the body is discarded.
    async fn handle_get(&self, url: String, endpoint: &'static str) {
        let Some(req) = self.new_request(Method::GET, &url, Body::empty(), None, endpoint) else {
            return;
        };
        self.dispatch(endpoint, req).await;
    }

    /// GET returning the parsed JSON body of a successful response.
    async fn handle_get_json(&self, url: String, endpoint: &'static str) -> Option<Value> {
        let req = self.new_request(Method::GET, &url, Body::empty(), None, endpoint)?;
        let resp = self.dispatch(endpoint, req).await?;
        if !resp.status().is_success() {
            return None;
        }
        match resp.try_into_json::<Value>().await {
            Ok(body) => Some(body),
            Err(err) => {
                tracing::debug!(%endpoint, "failed to parse response body: {err}");
                None
            }
        }
    }

    /// POST a JSON payload; a successful response yields the created ID.
    /// Any non-2xx answer or unparsable body counts as "no ID produced".
    async fn handle_post<T: Serialize>(
        &self,
        url: String,
        body: &T,
        endpoint: &'static str,
    ) -> Option<String> {
        let resp = self.post_json(url, body, endpoint).await?;
        if !resp.status().is_success() {
            return None;
        }
        match resp.try_into_json::<Value>().await {
            Ok(body) => body
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_owned),
            Err(err) => {
                tracing::debug!(%endpoint, "failed to parse creation response: {err}");
                None
            }
        }
    }

    /// POST a JSON payload and surface only the answered status code.
    async fn handle_post_status<T: Serialize>(
        &self,
        url: String,
        body: &T,
        endpoint: &'static str,
    ) -> Option<u16> {
        let resp = self.post_json(url, body, endpoint).await?;
        Some(resp.status().as_u16())
    }

    async fn handle_delete(&self, url: String, endpoint: &'static str) -> Option<u16> {
        let req = self.new_request(Method::DELETE, &url, Body::empty(), None, endpoint)?;
        let resp = self.dispatch(endpoint, req).await?;
        Some(resp.status().as_u16())
    }

    async fn post_json<T: Serialize>(
        &self,
        url: String,
        body: &T,
        endpoint: &'static str,
    ) -> Option<Response> {
        let bytes = match serde_json::to_vec(body) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::debug!(%endpoint, "failed to encode request payload: {err}");
                return None;
            }
        };
        let req = self.new_request(
            Method::POST,
            &url,
            Body::from(bytes),
            Some("application/json"),
            endpoint,
        )?;
        self.dispatch(endpoint, req).await
    }

    fn new_request(
        &self,
        method: Method,
        url: &str,
        body: Body,
        content_type: Option<&'static str>,
        endpoint: &'static str,
    ) -> Option<Request> {
        let mut builder = Request::builder().method(method).uri(url);
        if let Some(token) = &self.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        match builder.body(body).context("build api request") {
            Ok(req) => Some(req),
            Err(err) => {
                tracing::debug!(%endpoint, "failed to build request: {err}");
                None
            }
        }
    }

    /// Issue the request, record its measurement, and hand back the response.
    /// Transport errors surface as `None`.
    async fn dispatch(&self, endpoint: &'static str, req: Request) -> Option<Response> {
        let req_start = Instant::now();
        let result = self.http.serve(req).await;
        let latency = req_start.elapsed();

        match result {
            Ok(resp) => {
                let status = resp.status().as_u16();
                let ok = (200..400).contains(&status);
                self.record(
                    endpoint,
                    latency,
                    RequestOutcome {
                        ok,
                        status: Some(status),
                        failure: (!ok).then_some(FailureKind::HttpStatus),
                    },
                )
                .await;
                Some(resp)
            }
            Err(err) => {
                tracing::debug!(%endpoint, "api request failed: {err}");
                self.record(
                    endpoint,
                    latency,
                    RequestOutcome {
                        ok: false,
                        status: None,
                        failure: Some(FailureKind::Other),
                    },
                )
                .await;
                None
            }
        }
    }

    async fn record(&self, endpoint: &'static str, latency: Duration, outcome: RequestOutcome) {
        if let Some(recorder) = &self.recorder {
            recorder.record(endpoint, latency, outcome).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rama::{
        http::{StatusCode, service::web::response::{IntoResponse, Json}},
        service::service_fn,
    };
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    fn client_with(svc: BoxService<Request, Response, OpaqueError>) -> ApiClient {
        ApiClient::new(
            svc,
            "http://api.local",
            "/api/managed-services-api/v1",
            "http://sink.local/write_kafka_config".to_owned(),
            None,
        )
    }

    #[tokio::test(flavor = "current_thread")]
    async fn create_extracts_the_id_from_the_response() {
        let svc = service_fn(|_req: Request| async move {
            Ok::<_, OpaqueError>(
                (
                    StatusCode::ACCEPTED,
                    Json(serde_json::json!({ "id": "kafka-42", "status": "accepted" })),
                )
                    .into_response(),
            )
        });
        let client = client_with(svc.boxed());
        let id = client
            .create_kafka(&serde_json::json!({ "name": "x" }))
            .await;
        assert_eq!(id.as_deref(), Some("kafka-42"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn create_treats_non_2xx_as_no_id() {
        let svc = service_fn(|_req: Request| async move {
            Ok::<_, OpaqueError>(StatusCode::INTERNAL_SERVER_ERROR.into_response())
        });
        let client = client_with(svc.boxed());
        assert!(
            client
                .create_kafka(&serde_json::json!({ "name": "x" }))
                .await
                .is_none()
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn get_json_is_none_for_missing_resources() {
        let svc = service_fn(|_req: Request| async move {
            Ok::<_, OpaqueError>(StatusCode::NOT_FOUND.into_response())
        });
        let client = client_with(svc.boxed());
        assert!(client.get_kafka_json("gone").await.is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn requests_carry_the_base_path_and_async_delete_flag() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let svc = {
            let seen = seen.clone();
            service_fn(move |req: Request| {
                let seen = seen.clone();
                async move {
                    seen.lock()
                        .expect("collect uris")
                        .push(req.uri().to_string());
                    Ok::<_, OpaqueError>(StatusCode::NO_CONTENT.into_response())
                }
            })
        };
        let client = client_with(svc.boxed());
        client.list_kafkas().await;
        client.delete_kafka("abc").await;
        client.delete_service_account("def").await;

        let seen = seen.lock().expect("read uris");
        assert_eq!(
            seen.as_slice(),
            [
                "http://api.local/api/managed-services-api/v1/kafkas",
                "http://api.local/api/managed-services-api/v1/kafkas/abc?async=true",
                "http://api.local/api/managed-services-api/v1/serviceaccounts/def",
            ]
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn transport_errors_surface_as_none_not_panics() {
        let calls = Arc::new(AtomicUsize::new(0));
        let svc = {
            let calls = calls.clone();
            service_fn(move |_req: Request| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<Response, _>(OpaqueError::from_display("connection refused"))
                }
            })
        };
        let client = client_with(svc.boxed());
        assert!(client.delete_kafka("abc").await.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
