//! Authenticated request gateway for the copilot backend.
//!
//! Endpoints are either bare action names (`seed`) rewritten into the `/api/`
//! namespace, or absolute paths already rooted there. Outgoing headers merge
//! in a fixed precedence: default content-type first, caller headers next,
//! the credential-derived authorization header last. A caller can therefore
//! never shadow the credential.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Response, Url};
use serde::Serialize;
use serde_json::Value;

use crate::error::{GatewayError, GatewayResult};
use crate::store::Credential;

const API_PREFIX: &str = "/api/";
const DELIVERABLES_SEGMENT: &str = "deliverables";

/// Request description accepted by [`Gateway::send`].
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method for the call.
    pub method: Method,
    /// Bare action name, or an absolute path already rooted at `/api/`.
    pub endpoint: String,
    /// Caller-supplied headers. The gateway layers its default content-type
    /// beneath these and the authorization header above them.
    pub headers: HeaderMap,
    /// JSON body, when the action sends one.
    pub body: Option<Value>,
}

impl ApiRequest {
    /// `POST` request with no body.
    #[must_use]
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            endpoint: endpoint.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// `GET` request.
    #[must_use]
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            endpoint: endpoint.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Attaches a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EncodePayload`] when `payload` cannot be
    /// represented as JSON.
    pub fn with_json<T: Serialize>(mut self, payload: &T) -> GatewayResult<Self> {
        let value = serde_json::to_value(payload)
            .map_err(|source| GatewayError::EncodePayload { source })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Adds a caller header. Gateway-derived authorization still wins on
    /// conflict.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Builds and sends requests, attaching the bearer credential when held.
///
/// The gateway never pre-empts unauthenticated calls and never interprets
/// responses; callers receive the raw response for any HTTP status.
#[derive(Debug, Clone)]
pub struct Gateway {
    http: Client,
    base_url: Url,
}

impl Gateway {
    /// Gateway over `http` aimed at `base_url`.
    #[must_use]
    pub const fn new(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Base URL requests resolve against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Sends `request` with `credential` attached as a bearer header.
    ///
    /// Without a credential the request still goes out, just unauthenticated;
    /// the backend is the sole enforcer of access control.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] on network failure; no retry is
    /// attempted and a `401` is returned to the caller like any response.
    pub async fn send(
        &self,
        request: ApiRequest,
        credential: Option<&Credential>,
    ) -> GatewayResult<Response> {
        let ApiRequest {
            method,
            endpoint,
            headers: caller_headers,
            body,
        } = request;

        let path = normalize_endpoint(&endpoint);
        let url = self
            .base_url
            .join(&path)
            .map_err(|_| GatewayError::InvalidEndpoint {
                endpoint: endpoint.clone(),
            })?;
        let headers = compose_headers(&caller_headers, credential)?;

        let mut builder = self.http.request(method, url).headers(headers);
        if let Some(body) = body {
            let bytes = serde_json::to_vec(&body)
                .map_err(|source| GatewayError::EncodePayload { source })?;
            builder = builder.body(bytes);
        }

        builder
            .send()
            .await
            .map_err(|source| GatewayError::Transport { endpoint, source })
    }

    /// Fetches a deliverable from the static file path at the server root.
    ///
    /// The filename travels as a single percent-encoded path segment, so a
    /// name containing `/` cannot escape the deliverables directory. This
    /// path sits outside the `/api` namespace: the rewrite rule does not
    /// apply and no content-type default is sent, but the authorization
    /// header is still attached when a credential is held.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] on network failure. Non-success
    /// statuses are returned in the response for the caller to interpret.
    pub async fn fetch_deliverable(
        &self,
        filename: &str,
        credential: Option<&Credential>,
    ) -> GatewayResult<Response> {
        let url = self.deliverable_url(filename)?;
        let mut headers = HeaderMap::new();
        if let Some(credential) = credential {
            headers.insert(AUTHORIZATION, bearer_value(credential)?);
        }

        self.http
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|source| GatewayError::Transport {
                endpoint: format!("/{DELIVERABLES_SEGMENT}/{filename}"),
                source,
            })
    }

    fn deliverable_url(&self, filename: &str) -> GatewayResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments =
                url.path_segments_mut()
                    .map_err(|()| GatewayError::InvalidEndpoint {
                        endpoint: format!("/{DELIVERABLES_SEGMENT}/{filename}"),
                    })?;
            segments.clear();
            segments.push(DELIVERABLES_SEGMENT);
            segments.push(filename);
        }
        Ok(url)
    }
}

/// Decodes a JSON body independent of HTTP status; the backend reports
/// logical failures in-band with `ok:false` bodies on error statuses.
///
/// # Errors
///
/// Returns [`GatewayError::UnexpectedPayload`] when the body is not valid
/// JSON for `T`.
pub async fn decode_json<T>(endpoint: &str, response: Response) -> GatewayResult<T>
where
    T: serde::de::DeserializeOwned,
{
    response
        .json::<T>()
        .await
        .map_err(|source| GatewayError::UnexpectedPayload {
            endpoint: endpoint.to_string(),
            source,
        })
}

fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.starts_with(API_PREFIX) {
        endpoint.to_string()
    } else {
        format!("{API_PREFIX}{endpoint}")
    }
}

fn compose_headers(
    caller: &HeaderMap,
    credential: Option<&Credential>,
) -> GatewayResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in caller {
        headers.insert(name, value.clone());
    }
    if let Some(credential) = credential {
        headers.insert(AUTHORIZATION, bearer_value(credential)?);
    }
    Ok(headers)
}

fn bearer_value(credential: &Credential) -> GatewayResult<HeaderValue> {
    HeaderValue::from_str(&format!("Bearer {}", credential.expose()))
        .map_err(|_| GatewayError::CredentialHeader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn gateway(server: &MockServer) -> Gateway {
        Gateway::new(Client::new(), server.base_url().parse().expect("valid URL"))
    }

    fn credential(token: &str) -> Credential {
        Credential::new(token).expect("non-blank token")
    }

    #[test]
    fn normalize_endpoint_prefixes_bare_names() {
        assert_eq!(normalize_endpoint("seed"), "/api/seed");
        assert_eq!(normalize_endpoint("/api/login"), "/api/login");
    }

    #[test]
    fn deliverable_url_encodes_one_segment() {
        let gateway = Gateway::new(Client::new(), "http://127.0.0.1:5000".parse().expect("url"));

        let spaced = gateway
            .deliverable_url("relatório final.pdf")
            .expect("deliverable url");
        assert_eq!(spaced.path(), "/deliverables/relat%C3%B3rio%20final.pdf");

        let traversal = gateway
            .deliverable_url("../escape.txt")
            .expect("deliverable url");
        assert_eq!(traversal.path(), "/deliverables/..%2Fescape.txt");
    }

    #[tokio::test]
    async fn send_applies_default_content_type_and_namespace() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/seed")
                .header("content-type", "application/json")
                .header_missing("authorization");
            then.status(200).json_body(json!({"ok": true}));
        });

        gateway(&server)
            .send(ApiRequest::post("seed"), None)
            .await
            .expect("request should succeed");
        mock.assert();
    }

    #[tokio::test]
    async fn caller_headers_override_the_default_content_type() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/seed")
                .header("content-type", "text/plain");
            then.status(200);
        });

        let request = ApiRequest::post("seed")
            .with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        gateway(&server)
            .send(request, None)
            .await
            .expect("request should succeed");
        mock.assert();
    }

    #[tokio::test]
    async fn derived_authorization_wins_over_caller_header() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/seed")
                .header("authorization", "Bearer T");
            then.status(200);
        });

        let request = ApiRequest::post("seed")
            .with_header(AUTHORIZATION, HeaderValue::from_static("Bearer FAKE"));
        gateway(&server)
            .send(request, Some(&credential("T")))
            .await
            .expect("request should succeed");
        mock.assert();
    }

    #[tokio::test]
    async fn send_carries_json_payload() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/generate_proposal")
                .json_body(json!({"id_cliente": 1, "valor": 19990, "id_responsavel": 7}));
            then.status(200).json_body(json!({"ok": true}));
        });

        let request = ApiRequest::post("generate_proposal")
            .with_json(&json!({"id_cliente": 1, "valor": 19990, "id_responsavel": 7}))
            .expect("encodable payload");
        gateway(&server)
            .send(request, Some(&credential("T")))
            .await
            .expect("request should succeed");
        mock.assert();
    }

    #[tokio::test]
    async fn pre_rooted_paths_pass_through_unchanged() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/deliverables");
            then.status(200).json_body(json!({"ok": true, "files": []}));
        });

        gateway(&server)
            .send(ApiRequest::get("/api/deliverables"), None)
            .await
            .expect("request should succeed");
        mock.assert();
    }

    #[tokio::test]
    async fn fetch_deliverable_attaches_bearer_without_content_type() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/deliverables/a.pdf")
                .header("authorization", "Bearer T")
                .header_missing("content-type");
            then.status(200).body("binary");
        });

        gateway(&server)
            .fetch_deliverable("a.pdf", Some(&credential("T")))
            .await
            .expect("request should succeed");
        mock.assert();
    }

    #[tokio::test]
    async fn transport_failures_surface_as_errors() {
        let gateway = Gateway::new(Client::new(), "http://127.0.0.1:9".parse().expect("url"));
        let err = gateway
            .send(ApiRequest::post("seed"), None)
            .await
            .expect_err("unreachable server should fail");
        assert!(matches!(err, GatewayError::Transport { .. }));
    }

    #[tokio::test]
    async fn decode_json_rejects_non_json_bodies() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/seed");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html>login page</html>");
        });

        let response = gateway(&server)
            .send(ApiRequest::post("seed"), None)
            .await
            .expect("request should succeed");
        let err = decode_json::<serde_json::Value>("seed", response)
            .await
            .expect_err("html body should not decode");
        assert!(matches!(err, GatewayError::UnexpectedPayload { .. }));
    }
}
