//! Request-scoped cookie jar used by the session store's mirror cookie.
//!
//! `session_cookie_middleware` parses the incoming `Cookie` header into a
//! [`SessionCookies`] request extension and, once the handler has run,
//! appends a `Set-Cookie` header for every cookie that was added or removed.

use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    extract::Request,
    http::{
        HeaderValue,
        header::{COOKIE, SET_COOKIE},
    },
    middleware::Next,
    response::Response,
};
use tower_sessions::cookie::{Cookie, CookieJar};

/// Shared handle to the current request's cookies.
#[derive(Clone, Default)]
pub struct SessionCookies {
    jar: Arc<Mutex<CookieJar>>,
}

impl std::fmt::Debug for SessionCookies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCookies").finish_non_exhaustive()
    }
}

impl SessionCookies {
    /// Build a jar from a raw `Cookie` header value. Unparseable pairs are skipped.
    #[must_use]
    pub fn from_header(header: &str) -> Self {
        let mut jar = CookieJar::new();
        for cookie in Cookie::split_parse(header.to_owned()).flatten() {
            jar.add_original(cookie.into_owned());
        }
        Self {
            jar: Arc::new(Mutex::new(jar)),
        }
    }

    fn with_jar<T>(&self, f: impl FnOnce(&mut CookieJar) -> T) -> T {
        let mut jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut jar)
    }

    /// Current value of a cookie, including changes made during this request.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.with_jar(|jar| jar.get(name).map(|c| c.value().to_string()))
    }

    /// Add or replace a cookie.
    pub fn add(&self, cookie: Cookie<'static>) {
        self.with_jar(|jar| jar.add(cookie));
    }

    /// Delete a cookie set on `path`.
    pub fn remove(&self, name: &'static str, path: &'static str) {
        self.with_jar(|jar| jar.remove(Cookie::build(name).path(path)));
    }

    /// `Set-Cookie` values for every change made during this request.
    #[must_use]
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.with_jar(|jar| jar.delta().map(ToString::to_string).collect())
    }
}

/// Expose the request's cookies as [`SessionCookies`] and write changes back.
pub async fn session_cookie_middleware(mut request: Request, next: Next) -> Response {
    let header = request
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");

    let cookies = SessionCookies::from_header(&header);
    request.extensions_mut().insert(cookies.clone());

    let mut response = next.run(request).await;

    for value in cookies.set_cookie_headers() {
        match HeaderValue::from_str(&value) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(error = %e, "Dropping unencodable Set-Cookie header"),
        }
    }

    response
}
