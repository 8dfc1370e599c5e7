use salvo::Depot;
use salvo::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, HeaderValue,
};
use salvo::http::{Method, StatusCode};

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "authorization, content-type, x-client-info, apikey";
const MAX_AGE_SECONDS: &str = "86400";

/// ## Summary
/// Adds CORS headers to every response and answers preflight requests.
///
/// Attach it to the `Service` rather than a `Router` so it also runs for
/// `OPTIONS` requests no route matches.
pub struct CorsHandler {
    allow_origin: HeaderValue,
}

impl CorsHandler {
    /// An origin that is not a valid header value falls back to `*`.
    #[must_use]
    pub fn new(allow_origin: &str) -> Self {
        let allow_origin = HeaderValue::from_str(allow_origin).unwrap_or_else(|_err| {
            tracing::warn!(origin = %allow_origin, "Invalid CORS origin, allowing any");
            HeaderValue::from_static("*")
        });
        Self { allow_origin }
    }

    fn apply(&self, res: &mut salvo::Response) {
        let headers = res.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE_SECONDS));
    }
}

#[salvo::async_trait]
impl salvo::Handler for CorsHandler {
    #[tracing::instrument(skip_all)]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        if req.method() == Method::OPTIONS {
            self.apply(res);
            res.status_code(StatusCode::NO_CONTENT);
            ctrl.skip_rest();
            return;
        }

        ctrl.call_next(req, depot, res).await;
        self.apply(res);
    }
}
