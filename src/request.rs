//! Incoming HTTP request type.

use bytes::Bytes;

use crate::method::Method;

/// An incoming HTTP request with its body fully read.
///
/// hyper enforces `Content-Length` framing, so `body()` holds exactly the
/// declared number of bytes.
pub struct Request {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Request {
    /// Builds a request from already-parsed parts. Header names are matched
    /// case-insensitively.
    pub fn new(
        method: Method,
        path: impl Into<String>,
        headers: Vec<(String, String)>,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            headers,
            body: body.into(),
        }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The declared `Content-Length`, if present and numeric.
    pub fn content_length(&self) -> Option<usize> {
        self.header("content-length")?.trim().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(headers: &[(&str, &str)]) -> Request {
        let headers = headers.iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Request::new(Method::Post, "/", headers, "a=1")
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = post(&[("Content-Type", "application/x-www-form-urlencoded")]);
        assert_eq!(req.header("content-type"), Some("application/x-www-form-urlencoded"));
    }

    #[test]
    fn content_length_requires_a_number() {
        assert_eq!(post(&[("Content-Length", "3")]).content_length(), Some(3));
        assert_eq!(post(&[("Content-Length", "three")]).content_length(), None);
        assert_eq!(post(&[]).content_length(), None);
    }
}
