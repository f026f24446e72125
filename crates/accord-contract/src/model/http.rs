//! HTTP request and response sections.

use serde::Serialize;

use super::body::{Body, BodyMatchers};
use super::value::DualValue;
use crate::error::ContractError;

/// A named header entry. Header lists are ordered and may repeat names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub name: String,
    pub value: DualValue<String>,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<DualValue<String>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && self.value.is_set()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cookie {
    pub name: String,
    pub value: DualValue<String>,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<DualValue<String>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && self.value.is_set()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryParameter {
    pub name: String,
    pub value: DualValue<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UrlKind {
    /// Full URL, query string allowed.
    Url,
    /// Path only, query parameters given separately.
    UrlPath,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Url {
    pub kind: UrlKind,
    pub value: DualValue<String>,
    pub query_parameters: Vec<QueryParameter>,
}

impl Url {
    pub fn is_set(&self) -> bool {
        self.value.is_set()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub method: DualValue<String>,
    pub url: Option<Url>,
    pub headers: Vec<Header>,
    pub cookies: Vec<Cookie>,
    pub body: Option<Body>,
    pub body_matchers: BodyMatchers,
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&Header> {
        find_header(&self.headers, name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    method: DualValue<String>,
    url: Option<DualValue<String>>,
    url_path: Option<DualValue<String>>,
    query_parameters: Vec<QueryParameter>,
    headers: Vec<Header>,
    cookies: Vec<Cookie>,
    body: Option<Body>,
    body_matchers: BodyMatchers,
}

impl RequestBuilder {
    pub fn method(mut self, method: impl Into<DualValue<String>>) -> Self {
        self.method = method.into();
        self
    }

    pub fn url(mut self, url: impl Into<DualValue<String>>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn url_path(mut self, path: impl Into<DualValue<String>>) -> Self {
        self.url_path = Some(path.into());
        self
    }

    pub fn query_parameter(
        mut self,
        name: impl Into<String>,
        value: impl Into<DualValue<String>>,
    ) -> Self {
        self.query_parameters.push(QueryParameter {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<DualValue<String>>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    /// Add a header without a value. The contract will fail validation.
    pub fn header_name(mut self, name: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, DualValue::<String>::Unset));
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<DualValue<String>>) -> Self {
        self.cookies.push(Cookie::new(name, value));
        self
    }

    /// Add a cookie without a value. The contract will fail validation.
    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookies.push(Cookie::new(name, DualValue::<String>::Unset));
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn body_matchers(mut self, matchers: BodyMatchers) -> Self {
        self.body_matchers = matchers;
        self
    }

    pub fn build(self) -> Result<Request, ContractError> {
        let url = match (self.url, self.url_path) {
            (Some(_), Some(_)) => {
                return Err(ContractError::definition(
                    "url and url path are mutually exclusive",
                ))
            }
            (Some(value), None) => Some(Url {
                kind: UrlKind::Url,
                value,
                query_parameters: self.query_parameters,
            }),
            (None, Some(value)) => Some(Url {
                kind: UrlKind::UrlPath,
                value,
                query_parameters: self.query_parameters,
            }),
            (None, None) if !self.query_parameters.is_empty() => {
                return Err(ContractError::definition(
                    "query parameters require a url or url path",
                ))
            }
            (None, None) => None,
        };

        Ok(Request {
            method: self.method,
            url,
            headers: self.headers,
            cookies: self.cookies,
            body: self.body,
            body_matchers: self.body_matchers,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status: DualValue<u16>,
    /// Fixed delay in milliseconds.
    pub delay: DualValue<u64>,
    pub headers: Vec<Header>,
    pub cookies: Vec<Cookie>,
    pub body: Option<Body>,
    pub body_matchers: BodyMatchers,
    pub asynchronous: bool,
}

impl Response {
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::default()
    }

    pub fn header(&self, name: &str) -> Option<&Header> {
        find_header(&self.headers, name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResponseBuilder {
    response: Response,
}

impl ResponseBuilder {
    pub fn status(mut self, status: impl Into<DualValue<u16>>) -> Self {
        self.response.status = status.into();
        self
    }

    pub fn delay(mut self, millis: impl Into<DualValue<u64>>) -> Self {
        self.response.delay = millis.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<DualValue<String>>) -> Self {
        self.response.headers.push(Header::new(name, value));
        self
    }

    pub fn header_name(mut self, name: impl Into<String>) -> Self {
        self.response.headers.push(Header::new(name, DualValue::<String>::Unset));
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<DualValue<String>>) -> Self {
        self.response.cookies.push(Cookie::new(name, value));
        self
    }

    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.response.cookies.push(Cookie::new(name, DualValue::<String>::Unset));
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.response.body = Some(body.into());
        self
    }

    pub fn body_matchers(mut self, matchers: BodyMatchers) -> Self {
        self.response.body_matchers = matchers;
        self
    }

    pub fn asynchronous(mut self) -> Self {
        self.response.asynchronous = true;
        self
    }

    pub fn build(self) -> Response {
        self.response
    }
}

pub(crate) fn find_header<'a>(headers: &'a [Header], name: &str) -> Option<&'a Header> {
    headers.iter().find(|h| h.name.eq_ignore_ascii_case(name))
}
