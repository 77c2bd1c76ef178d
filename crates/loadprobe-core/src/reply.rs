//! Handler result: the only shape an endpoint may hand back to the dispatcher.

use bytes::Bytes;

/// Plain text, UTF-8.
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";
/// JSON documents.
pub const CONTENT_TYPE_JSON: &str = "application/json";
/// Prometheus text exposition format, version 0.0.4.
pub const CONTENT_TYPE_METRICS: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Response body, status code and content type produced by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub body: Bytes,
    pub status: u16,
    pub content_type: &'static str,
}

impl Reply {
    pub fn new(body: impl Into<Bytes>, status: u16, content_type: &'static str) -> Self {
        Self {
            body: body.into(),
            status,
            content_type,
        }
    }

    /// 200 with a plain text body.
    pub fn text(body: impl Into<Bytes>) -> Self {
        Self::new(body, 200, CONTENT_TYPE_TEXT)
    }

    /// 200 with a JSON body.
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::new(body, 200, CONTENT_TYPE_JSON)
    }

    /// 500 with a plain text body. Only the dispatcher builds these.
    pub fn fault(body: impl Into<Bytes>) -> Self {
        Self::new(body, 500, CONTENT_TYPE_TEXT)
    }

    /// Byte length advertised in `Content-Length`.
    pub fn content_length(&self) -> usize {
        self.body.len()
    }
}
