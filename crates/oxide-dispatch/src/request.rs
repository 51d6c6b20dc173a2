//! HTTP request type.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::RouterError;

/// HTTP request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    /// GET method
    Get,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// PATCH method
    Patch,
    /// DELETE method
    Delete,
    /// HEAD method
    Head,
    /// OPTIONS method
    Options,
}

impl Method {
    /// Returns the method as an uppercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl FromStr for Method {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(RouterError::InvalidMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An incoming HTTP request, as handed over by the transport layer.
///
/// The router only ever reads [`Request::uri`] and [`Request::method`];
/// headers, query and body ride along for the handler.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: String,
    /// Query string parameters.
    pub query: HashMap<String, String>,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Vec<u8>,
}

impl Request {
    /// Creates a new request for an already-decoded path.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            query: HashMap::new(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Builds a request from a raw request target such as `/users/a%20b?page=2`.
    ///
    /// The query string is split off and parsed; the path is percent-decoded.
    pub fn from_target(method: Method, target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let mut request = Self::new(method, percent_decode(path, false));
        if !query.is_empty() {
            request.query = Self::parse_query_string(query);
        }
        request
    }

    /// Creates a GET request.
    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::Get, uri)
    }

    /// Creates a POST request.
    pub fn post(uri: impl Into<String>) -> Self {
        Self::new(Method::Post, uri)
    }

    /// Creates a PUT request.
    pub fn put(uri: impl Into<String>) -> Self {
        Self::new(Method::Put, uri)
    }

    /// Creates a DELETE request.
    pub fn delete(uri: impl Into<String>) -> Self {
        Self::new(Method::Delete, uri)
    }

    /// The raw, decoded request path. No deployment prefix is stripped.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The request method.
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Gets a header value, ignoring case.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Gets a query parameter.
    pub fn get_query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Parses query parameters from a query string.
    pub fn parse_query_string(query: &str) -> HashMap<String, String> {
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (percent_decode(key, true), percent_decode(value, true))
            })
            .collect()
    }
}

/// Percent-decodes `s`. With `plus_as_space`, `+` becomes a space (form encoding).
///
/// Invalid escapes are kept verbatim; invalid UTF-8 is replaced lossily.
fn percent_decode(s: &str, plus_as_space: bool) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let escaped = bytes
                    .get(i + 1..i + 3)
                    .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))
                    .and_then(|hex| std::str::from_utf8(hex).ok())
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                if let Some(byte) = escaped {
                    out.push(byte);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            b'+' if plus_as_space => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("post".parse::<Method>().unwrap(), Method::Post);
        assert!(matches!(
            "BREW".parse::<Method>(),
            Err(RouterError::InvalidMethod(m)) if m == "BREW"
        ));
    }

    #[test]
    fn test_request_builder() {
        let req = Request::get("/users").header("Content-Type", "application/json");

        assert_eq!(req.method(), Method::Get);
        assert_eq!(req.uri(), "/users");
        assert_eq!(req.get_header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_from_target_splits_and_decodes() {
        let req = Request::from_target(
            Method::Get,
            "/files/my%20doc+v2?name=John+Doe&city=New%20York",
        );
        assert_eq!(req.uri(), "/files/my doc+v2");
        assert_eq!(req.get_query("name"), Some("John Doe"));
        assert_eq!(req.get_query("city"), Some("New York"));
    }

    #[test]
    fn test_invalid_escape_is_kept() {
        let req = Request::from_target(Method::Get, "/100%/x%zz%4");
        assert_eq!(req.uri(), "/100%/x%zz%4");
    }

    #[test]
    fn test_query_string_parsing() {
        let query = Request::parse_query_string("a=1&&flag&b=x%3Dy");
        assert_eq!(query.get("a"), Some(&"1".to_string()));
        assert_eq!(query.get("flag"), Some(&String::new()));
        assert_eq!(query.get("b"), Some(&"x=y".to_string()));
        assert_eq!(query.len(), 3);
    }
}
