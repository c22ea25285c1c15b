//! REST API definitions.

pub mod sale;
pub mod vehicle;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::{context::Authenticator, define_error, Service};

pub use self::{sale::Sale, vehicle::Vehicle};

/// Builds the [`Router`] serving the REST API over the provided [`Service`].
pub fn router(service: Service, authenticator: Authenticator) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/vehicles", post(vehicle::create).get(vehicle::list))
        .route("/vehicles/:id", get(vehicle::get).patch(vehicle::update))
        .route("/vehicles/:id/buy", post(vehicle::buy))
        .route("/sales", get(sale::list))
        .layer(Extension(service))
        .layer(Extension(authenticator))
}

/// Liveness probe.
#[expect(clippy::unused_async, reason = "`async` is required by `axum`")]
async fn health() -> http::StatusCode {
    http::StatusCode::OK
}

define_error! {
    enum PrivilegeError {
        #[code = "PERMISSION_DENIED"]
        #[status = FORBIDDEN]
        #[message = "Authenticated user has no permission for this action"]
        PermissionDenied,
    }
}

#[cfg(test)]
pub(crate) mod spec {
    use axum::{
        body::{self, Body},
        Router,
    };
    use serde_json::{json, Value};
    use service::infra::{Memory, Storage};
    use tower::ServiceExt as _;

    use crate::{context::spec::token, Authenticator, Service};

    /// Builds the [`Router`] over a fresh in-memory [`Service`].
    pub(crate) fn app() -> Router {
        super::router(
            Service::new(
                service::Config::default(),
                Storage::Memory(Memory::new()),
            ),
            Authenticator::new(crate::context::spec::SECRET),
        )
    }

    /// Token of an administrator.
    pub(crate) fn admin() -> String {
        token(&json!({"user_id": "admin-1", "role": "ADMIN"}))
    }

    /// Token of a regular client.
    pub(crate) fn client(id: &str) -> String {
        token(&json!({"user_id": id, "role": "CLIENT"}))
    }

    /// Sends a request to the `app`, returning the status and the JSON body
    /// of its response.
    pub(crate) async fn call(
        app: &Router,
        method: http::Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (http::StatusCode, Value) {
        let mut req = http::Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req
                .header(http::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => req
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();

        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Creates a new vehicle of the provided `price`, returning its ID.
    pub(crate) async fn create_vehicle(app: &Router, price: u32) -> String {
        let (status, body) = call(
            app,
            http::Method::POST,
            "/vehicles",
            Some(&admin()),
            Some(json!({
                "brand": "Ford",
                "model": "Ka",
                "year": 2022,
                "color": "Preto",
                "price": price,
            })),
        )
        .await;
        assert_eq!(status, http::StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_owned()
    }

    #[tokio::test]
    async fn responds_to_health_checks() {
        let (status, _) =
            call(&app(), http::Method::GET, "/health", None, None).await;

        assert_eq!(status, http::StatusCode::OK);
    }
}
