use http::header::{self, HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode, Uri};
use serde::de::DeserializeOwned;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::warn;

use super::payload::MAX_INLINE_PARAMS;
use crate::error::HttpError;
use crate::ids::{RequestId, REQUEST_ID_HEADER};

/// Query string pairs in order of appearance.
pub type QueryVec = SmallVec<[(String, String); MAX_INLINE_PARAMS]>;

/// Inbound request handle, immutable once the transport built it.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Path component of the target, without the query string
    pub path: String,
    /// Raw query string, without the leading `?`
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Request {
    /// Build a request from a method and an origin-form target (`/path?query`)
    ///
    /// # Errors
    ///
    /// Returns the URI parse error when `target` is not a valid request target.
    pub fn new(method: Method, target: &str) -> Result<Self, http::uri::InvalidUri> {
        let uri: Uri = target.parse()?;
        Ok(Self {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            headers: HeaderMap::new(),
            body: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Get a header value by name, if present and valid UTF-8
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decoded query string pairs
    #[must_use]
    pub fn query_params(&self) -> QueryVec {
        self.query
            .as_deref()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get a query parameter by name
    ///
    /// Uses "last write wins" semantics for repeated keys (`?limit=10&limit=20`).
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query_params()
            .into_iter()
            .rfind(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Parse the body as JSON
    ///
    /// # Errors
    ///
    /// A 400 [`HttpError`] when the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| HttpError::bad_request(format!("invalid JSON body: {e}")))
    }
}

/// Outbound response state.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    ended: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
            ended: false,
        }
    }
}

/// Shared handle to the response of one request.
///
/// Every context of the request points at the same response. Once
/// [`ResponseHandle::end`] has been called all further writes are dropped with a
/// warning, so a stray step can never alter a finished response.
#[derive(Debug, Clone, Default)]
pub struct ResponseHandle(Rc<RefCell<Response>>);

impl ResponseHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.0.borrow().status
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.0.borrow().ended
    }

    pub fn set_status(&self, status: StatusCode) {
        if let Some(mut res) = self.writable("set_status") {
            res.status = status;
        }
    }

    /// Add or replace a header
    pub fn insert_header(&self, name: HeaderName, value: HeaderValue) {
        if let Some(mut res) = self.writable("insert_header") {
            res.headers.insert(name, value);
        }
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<HeaderValue> {
        self.0.borrow().headers.get(name).cloned()
    }

    /// Append bytes to the body
    pub fn write(&self, bytes: &[u8]) {
        if let Some(mut res) = self.writable("write") {
            res.body.extend_from_slice(bytes);
        }
    }

    /// Mark the response finished
    ///
    /// Sets `content-length` from the body when no handler set one.
    pub fn end(&self) {
        if let Some(mut res) = self.writable("end") {
            if !res.headers.contains_key(header::CONTENT_LENGTH) {
                let len = HeaderValue::from(res.body.len());
                res.headers.insert(header::CONTENT_LENGTH, len);
            }
            res.ended = true;
        }
    }

    /// Copy of the body written so far
    #[must_use]
    pub fn body(&self) -> Vec<u8> {
        self.0.borrow().body.clone()
    }

    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow().body).into_owned()
    }

    fn writable(&self, op: &'static str) -> Option<std::cell::RefMut<'_, Response>> {
        let res = self.0.borrow_mut();
        if res.ended {
            warn!(operation = op, "Write to an ended response ignored");
            return None;
        }
        Some(res)
    }
}

/// Everything one request shares across all of its chain steps.
#[derive(Debug)]
pub struct Exchange {
    id: RequestId,
    request: Request,
    response: ResponseHandle,
    failed: Cell<bool>,
}

impl Exchange {
    /// Wrap a request, reusing an inbound `x-request-id` when it is a valid ULID
    #[must_use]
    pub fn new(request: Request) -> Rc<Self> {
        let id = RequestId::from_header_or_new(request.header(REQUEST_ID_HEADER));
        Rc::new(Self {
            id,
            request,
            response: ResponseHandle::new(),
            failed: Cell::new(false),
        })
    }

    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    #[must_use]
    pub fn response(&self) -> &ResponseHandle {
        &self.response
    }

    /// Mark the request failed; returns whether it already was
    pub(crate) fn mark_failed(&self) -> bool {
        self.failed.replace(true)
    }

    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.failed.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_splits_path_and_query() {
        let req = Request::new(Method::GET, "/hello/world?time=now&time=later").unwrap();
        assert_eq!(req.path, "/hello/world");
        assert_eq!(req.query.as_deref(), Some("time=now&time=later"));
        assert_eq!(req.query_param("time").as_deref(), Some("later"));
        assert_eq!(req.query_params().len(), 2);
    }

    #[test]
    fn test_request_json_body() {
        #[derive(Debug, serde::Deserialize)]
        struct Character {
            name: String,
        }
        let req = Request::new(Method::POST, "/character")
            .unwrap()
            .with_body(r#"{"name":"t800"}"#);
        let c: Character = req.json().unwrap();
        assert_eq!(c.name, "t800");

        let bad = Request::new(Method::POST, "/character").unwrap().with_body("{");
        let err = bad.json::<Character>().unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_writes_after_end_are_ignored() {
        let res = ResponseHandle::new();
        res.write(b"hello");
        res.end();
        res.write(b" world");
        res.set_status(StatusCode::IM_A_TEAPOT);
        assert!(res.is_ended());
        assert_eq!(res.body_text(), "hello");
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.header("content-length").unwrap(), "5");
    }

    #[test]
    fn test_exchange_reuses_inbound_request_id() {
        let id = RequestId::new();
        let req = Request::new(Method::GET, "/")
            .unwrap()
            .with_header(
                HeaderName::from_static(REQUEST_ID_HEADER),
                HeaderValue::from_str(&id.to_string()).unwrap(),
            );
        let exchange = Exchange::new(req);
        assert_eq!(exchange.id(), id);
        assert!(!exchange.mark_failed());
        assert!(exchange.mark_failed());
    }
}
