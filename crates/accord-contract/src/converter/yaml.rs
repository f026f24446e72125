//! Declarative YAML contract documents.
//!
//! A file may hold several `---` separated documents. Each mapping document
//! is one contract; null and scalar documents are skipped.
//!
//! ```yaml
//! request:
//!   method: PUT
//!   url: /fraudcheck
//!   body:
//!     clientId: "1234567890"
//!     loanAmount: 99999
//!   headers:
//!     Content-Type: application/vnd.fraud.v1+json
//!   matchers:
//!     body:
//!       - path: $.clientId
//!         type: by_regex
//!         value: "[0-9]{10}"
//! response:
//!   status: 200
//! ```
//!
//! Matchers on request and input sections constrain the consumer side; the
//! literal values are what the producer sees. Matchers on response and output
//! sections constrain the producer side.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::{Mapping, Value as YamlValue};

use super::{has_extension, read_document, sibling_path, ContractConverter};
use crate::config::LoaderConfig;
use crate::error::ContractError;
use crate::model::{
    patterns, Body, BodyMatchers, Contract, DualValue, Input, MatchingType, Multipart,
    NamedPart, OutputMessage, PathType, RegexPattern, Request, Response, Side,
};

/// Parses `*.yml` / `*.yaml` documents.
#[derive(Debug, Clone, Default)]
pub struct YamlContractConverter {
    config: LoaderConfig,
}

impl YamlContractConverter {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Parse `source` as if it were read from `path`.
    pub fn convert_source(&self, path: &Path, source: &str) -> Result<Vec<Contract>, ContractError> {
        let evaluation_error = |message: String| ContractError::ScriptEvaluation {
            path: path.to_path_buf(),
            message,
        };
        let context = DocumentContext {
            dir: path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };

        let mut contracts = Vec::new();
        for (index, document) in serde_yaml::Deserializer::from_str(source).enumerate() {
            let value =
                YamlValue::deserialize(document).map_err(|e| evaluation_error(e.to_string()))?;
            if value.is_null() {
                tracing::debug!("Skipping empty YAML document {} in {}", index, path.display());
                continue;
            }
            if !value.is_mapping() {
                tracing::warn!(
                    "Skipping YAML document {} in {}: not a mapping",
                    index,
                    path.display()
                );
                continue;
            }
            let raw: YamlContract = serde_yaml::from_value(value)
                .map_err(|e| evaluation_error(format!("document {index}: {e}")))?;
            let contract = context
                .contract(raw)
                .map_err(|e| evaluation_error(format!("document {index}: {e}")))?;
            contracts.push(contract);
        }
        Ok(contracts)
    }
}

impl ContractConverter for YamlContractConverter {
    fn name(&self) -> &str {
        "yaml"
    }

    fn is_accepted(&self, path: &Path) -> bool {
        has_extension(path, &self.config.yaml_extensions)
    }

    fn convert_from(&self, path: &Path) -> Result<Vec<Contract>, ContractError> {
        let source = read_document(path)?;
        self.convert_source(path, &source)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct YamlContract {
    name: Option<String>,
    label: Option<String>,
    description: Option<String>,
    priority: Option<u32>,
    #[serde(default)]
    ignored: bool,
    #[serde(default)]
    in_progress: bool,
    #[serde(default)]
    metadata: BTreeMap<String, serde_json::Value>,
    request: Option<YamlRequest>,
    response: Option<YamlResponse>,
    input: Option<YamlInput>,
    output_message: Option<YamlOutputMessage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct YamlRequest {
    method: Option<String>,
    url: Option<String>,
    url_path: Option<String>,
    #[serde(default)]
    query_parameters: Mapping,
    #[serde(default)]
    headers: Mapping,
    #[serde(default)]
    cookies: Mapping,
    body: Option<serde_json::Value>,
    body_from_file: Option<String>,
    multipart: Option<YamlMultipart>,
    #[serde(default)]
    matchers: YamlRequestMatchers,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct YamlRequestMatchers {
    url: Option<YamlValueMatcher>,
    #[serde(default)]
    headers: Vec<YamlKeyMatcher>,
    #[serde(default)]
    cookies: Vec<YamlKeyMatcher>,
    #[serde(default)]
    query_parameters: Vec<YamlQueryMatcher>,
    #[serde(default)]
    body: Vec<YamlBodyMatcher>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct YamlResponse {
    status: Option<u16>,
    #[serde(alias = "delay")]
    fixed_delay_milliseconds: Option<u64>,
    #[serde(default)]
    headers: Mapping,
    #[serde(default)]
    cookies: Mapping,
    body: Option<serde_json::Value>,
    body_from_file: Option<String>,
    #[serde(default, rename = "async")]
    asynchronous: bool,
    #[serde(default)]
    matchers: YamlSectionMatchers,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct YamlSectionMatchers {
    #[serde(default)]
    headers: Vec<YamlKeyMatcher>,
    #[serde(default)]
    cookies: Vec<YamlKeyMatcher>,
    #[serde(default)]
    body: Vec<YamlBodyMatcher>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct YamlInput {
    message_from: Option<String>,
    triggered_by: Option<String>,
    assert_that: Option<String>,
    #[serde(default)]
    message_headers: Mapping,
    message_body: Option<serde_json::Value>,
    message_body_from_file: Option<String>,
    #[serde(default)]
    matchers: YamlSectionMatchers,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct YamlOutputMessage {
    sent_to: Option<String>,
    #[serde(default)]
    headers: Mapping,
    body: Option<serde_json::Value>,
    body_from_file: Option<String>,
    assert_that: Option<String>,
    #[serde(default)]
    matchers: YamlSectionMatchers,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct YamlMultipart {
    #[serde(default)]
    params: Mapping,
    #[serde(default)]
    named: Vec<YamlNamedPart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct YamlNamedPart {
    param_name: String,
    file_name: Option<String>,
    file_content: Option<String>,
    content_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct YamlValueMatcher {
    regex: Option<String>,
    predefined: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct YamlKeyMatcher {
    key: String,
    regex: Option<String>,
    predefined: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct YamlQueryMatcher {
    key: String,
    #[serde(rename = "type")]
    kind: String,
    value: Option<YamlValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct YamlBodyMatcher {
    #[serde(default)]
    path: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    value: Option<String>,
    predefined: Option<String>,
    min_occurrence: Option<u32>,
    max_occurrence: Option<u32>,
    path_type: Option<YamlPathType>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
enum YamlPathType {
    JsonPath,
    #[serde(alias = "xpath")]
    XPath,
}

/// Which side a regex matcher constrains.
#[derive(Debug, Clone, Copy)]
enum PatternSide {
    Consumer,
    Producer,
}

struct DocumentContext {
    dir: PathBuf,
}

impl DocumentContext {
    fn contract(&self, raw: YamlContract) -> Result<Contract, ContractError> {
        let mut builder = Contract::builder();
        if let Some(name) = raw.name {
            builder = builder.name(name);
        }
        if let Some(label) = raw.label {
            builder = builder.label(label);
        }
        if let Some(description) = raw.description {
            builder = builder.description(description);
        }
        if let Some(priority) = raw.priority {
            builder = builder.priority(priority);
        }
        if raw.ignored {
            builder = builder.ignored();
        }
        if raw.in_progress {
            builder = builder.in_progress();
        }
        for (key, value) in raw.metadata {
            builder = builder.metadata(key, value);
        }
        if let Some(request) = raw.request {
            builder = builder.request(self.request(request)?);
        }
        if let Some(response) = raw.response {
            builder = builder.response(self.response(response)?);
        }
        if let Some(input) = raw.input {
            builder = builder.input(self.input(input)?);
        }
        if let Some(output) = raw.output_message {
            builder = builder.output_message(self.output_message(output)?);
        }
        builder.build()
    }

    fn request(&self, raw: YamlRequest) -> Result<Request, ContractError> {
        let side = PatternSide::Consumer;
        let matchers = raw.matchers;
        let mut builder = Request::builder();

        if let Some(method) = raw.method {
            builder = builder.method(method);
        }
        let url_pattern = match &matchers.url {
            Some(m) => resolve_pattern(m.regex.as_deref(), m.predefined.as_deref())?,
            None => None,
        };
        match (raw.url, raw.url_path) {
            (Some(url), Some(path)) => builder = builder.url(url).url_path(path),
            (Some(url), None) => builder = builder.url(dual(Some(url), url_pattern, side)),
            (None, Some(path)) => builder = builder.url_path(dual(Some(path), url_pattern, side)),
            (None, None) => {
                if let Some(pattern) = url_pattern {
                    builder = builder.url(DualValue::pattern(pattern));
                }
            }
        }

        for (name, value) in query_parameters(&raw.query_parameters, &matchers.query_parameters)? {
            builder = builder.query_parameter(name, value);
        }
        for (name, value) in entries(&raw.headers, &matchers.headers, side)? {
            builder = builder.header(name, value);
        }
        for (name, value) in entries(&raw.cookies, &matchers.cookies, side)? {
            builder = builder.cookie(name, value);
        }

        let body = self.body(raw.body, raw.body_from_file)?;
        match (body, raw.multipart) {
            (Some(_), Some(_)) => {
                return Err(ContractError::definition(
                    "request body and multipart are mutually exclusive",
                ))
            }
            (Some(body), None) => builder = builder.body(body),
            (None, Some(multipart)) => builder = builder.body(Body::Multipart(multipart_body(multipart))),
            (None, None) => {}
        }
        builder = builder.body_matchers(body_matchers(&matchers.body)?);
        builder.build()
    }

    fn response(&self, raw: YamlResponse) -> Result<Response, ContractError> {
        let side = PatternSide::Producer;
        let mut builder = Response::builder();
        if let Some(status) = raw.status {
            builder = builder.status(status);
        }
        if let Some(delay) = raw.fixed_delay_milliseconds {
            builder = builder.delay(delay);
        }
        for (name, value) in entries(&raw.headers, &raw.matchers.headers, side)? {
            builder = builder.header(name, value);
        }
        for (name, value) in entries(&raw.cookies, &raw.matchers.cookies, side)? {
            builder = builder.cookie(name, value);
        }
        if let Some(body) = self.body(raw.body, raw.body_from_file)? {
            builder = builder.body(body);
        }
        if raw.asynchronous {
            builder = builder.asynchronous();
        }
        Ok(builder.body_matchers(body_matchers(&raw.matchers.body)?).build())
    }

    fn input(&self, raw: YamlInput) -> Result<Input, ContractError> {
        let side = PatternSide::Consumer;
        let mut builder = Input::builder();
        if let Some(channel) = raw.message_from {
            builder = builder.message_from(channel);
        }
        if let Some(method) = raw.triggered_by {
            builder = builder.triggered_by(method);
        }
        if let Some(method) = raw.assert_that {
            builder = builder.assert_that(method);
        }
        for (name, value) in entries(&raw.message_headers, &raw.matchers.headers, side)? {
            builder = builder.header(name, value);
        }
        if let Some(body) = self.body(raw.message_body, raw.message_body_from_file)? {
            builder = builder.body(body);
        }
        Ok(builder.body_matchers(body_matchers(&raw.matchers.body)?).build())
    }

    fn output_message(&self, raw: YamlOutputMessage) -> Result<OutputMessage, ContractError> {
        let side = PatternSide::Producer;
        let mut builder = OutputMessage::builder();
        if let Some(channel) = raw.sent_to {
            builder = builder.sent_to(channel);
        }
        if let Some(method) = raw.assert_that {
            builder = builder.assert_that(method);
        }
        for (name, value) in entries(&raw.headers, &raw.matchers.headers, side)? {
            builder = builder.header(name, value);
        }
        if let Some(body) = self.body(raw.body, raw.body_from_file)? {
            builder = builder.body(body);
        }
        Ok(builder.body_matchers(body_matchers(&raw.matchers.body)?).build())
    }

    /// Inline body, or the content of a sibling file. JSON file content is
    /// parsed, anything else is kept as text.
    fn body(
        &self,
        inline: Option<serde_json::Value>,
        from_file: Option<String>,
    ) -> Result<Option<Body>, ContractError> {
        match (inline, from_file) {
            (Some(_), Some(_)) => Err(ContractError::definition(
                "body and bodyFromFile are mutually exclusive",
            )),
            (Some(value), None) => Ok(Some(Body::from(value))),
            (None, Some(relative)) => {
                let path = sibling_path(&self.dir, &relative).map_err(ContractError::definition)?;
                let text = read_document(&path)?;
                Ok(Some(match serde_json::from_str::<serde_json::Value>(&text) {
                    Ok(value) if value.is_object() || value.is_array() => Body::from(value),
                    _ => Body::Text(DualValue::Single(text)),
                }))
            }
            (None, None) => Ok(None),
        }
    }
}

fn dual(literal: Option<String>, pattern: Option<RegexPattern>, side: PatternSide) -> DualValue<String> {
    let literal = literal.map(Side::Concrete);
    let pattern = pattern.map(Side::Pattern);
    match side {
        PatternSide::Consumer => DualValue::from_parts(pattern, literal),
        PatternSide::Producer => DualValue::from_parts(literal, pattern),
    }
}

fn scalar(value: &YamlValue) -> Option<String> {
    match value {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Named entries in document order. Matchers for keys with no literal value
/// add a pattern-only entry.
fn entries(
    values: &Mapping,
    matchers: &[YamlKeyMatcher],
    side: PatternSide,
) -> Result<Vec<(String, DualValue<String>)>, ContractError> {
    let mut result = Vec::with_capacity(values.len());
    for (key, value) in values {
        let name = scalar(key).unwrap_or_default();
        let pattern = match matchers.iter().find(|m| m.key == name) {
            Some(m) => resolve_pattern(m.regex.as_deref(), m.predefined.as_deref())?,
            None => None,
        };
        result.push((name, dual(scalar(value), pattern, side)));
    }
    for matcher in matchers {
        if result.iter().any(|(name, _)| *name == matcher.key) {
            continue;
        }
        let pattern = resolve_pattern(matcher.regex.as_deref(), matcher.predefined.as_deref())?;
        result.push((matcher.key.clone(), dual(None, pattern, side)));
    }
    Ok(result)
}

fn query_parameters(
    values: &Mapping,
    matchers: &[YamlQueryMatcher],
) -> Result<Vec<(String, DualValue<String>)>, ContractError> {
    let mut result: Vec<(String, DualValue<String>)> = values
        .iter()
        .map(|(k, v)| {
            (
                scalar(k).unwrap_or_default(),
                scalar(v).map(DualValue::Single).unwrap_or_default(),
            )
        })
        .collect();

    for matcher in matchers {
        let literal = matcher.value.as_ref().and_then(scalar);
        let value = match matcher.kind.as_str() {
            "equal_to" => literal.map(DualValue::Single).unwrap_or_default(),
            "matching" => {
                let pattern = resolve_pattern(literal.as_deref(), None)?;
                let existing = result
                    .iter()
                    .find(|(name, _)| *name == matcher.key)
                    .and_then(|(_, v)| v.producer_value().cloned());
                dual(existing, pattern, PatternSide::Consumer)
            }
            other => {
                return Err(ContractError::definition(format!(
                    "unsupported query parameter matcher type '{other}'"
                )))
            }
        };
        match result.iter_mut().find(|(name, _)| *name == matcher.key) {
            Some(entry) => entry.1 = value,
            None => result.push((matcher.key.clone(), value)),
        }
    }
    Ok(result)
}

fn multipart_body(raw: YamlMultipart) -> Multipart {
    let mut builder = Multipart::builder();
    for (key, value) in &raw.params {
        builder = builder.param(
            scalar(key).unwrap_or_default(),
            scalar(value).map(DualValue::Single).unwrap_or_default(),
        );
    }
    for named in raw.named {
        let mut part = NamedPart::new(
            named.param_name,
            named.file_name.map(DualValue::Single).unwrap_or_default(),
            named.file_content.map(DualValue::Single).unwrap_or_default(),
        );
        if let Some(content_type) = named.content_type {
            part = part.with_content_type(content_type);
        }
        builder = builder.named(part);
    }
    builder.build()
}

fn body_matchers(raw: &[YamlBodyMatcher]) -> Result<BodyMatchers, ContractError> {
    let mut builder = BodyMatchers::builder();
    for matcher in raw {
        let path_type = match matcher.path_type {
            Some(YamlPathType::JsonPath) => PathType::JsonPath,
            Some(YamlPathType::XPath) => PathType::XPath,
            None if matcher.path.starts_with('/') => PathType::XPath,
            None => PathType::JsonPath,
        };
        builder = builder.entry(path_type, matcher.path.clone(), matching_type(matcher)?);
    }
    Ok(builder.build())
}

fn matching_type(matcher: &YamlBodyMatcher) -> Result<Option<MatchingType>, ContractError> {
    let Some(kind) = matcher.kind.as_deref() else {
        return Ok(None);
    };
    let matching = match kind {
        "by_equality" => MatchingType::by_equality(),
        "by_type" => MatchingType::by_type_bounded(matcher.min_occurrence, matcher.max_occurrence),
        "by_date" => MatchingType::by_date(),
        "by_time" => MatchingType::by_time(),
        "by_timestamp" => MatchingType::by_timestamp(),
        "by_regex" => {
            match resolve_pattern(matcher.value.as_deref(), matcher.predefined.as_deref())? {
                Some(pattern) => MatchingType::by_regex(pattern),
                None => {
                    return Err(ContractError::definition(format!(
                        "by_regex matcher for '{}' needs a value or a predefined pattern",
                        matcher.path
                    )))
                }
            }
        }
        other => {
            return Err(ContractError::definition(format!(
                "unsupported body matcher type '{other}'"
            )))
        }
    };
    Ok(Some(matching))
}

fn resolve_pattern(
    regex: Option<&str>,
    predefined: Option<&str>,
) -> Result<Option<RegexPattern>, ContractError> {
    match (regex, predefined) {
        (Some(regex), _) => RegexPattern::new(regex).map(Some),
        (None, Some(name)) => predefined_pattern(name).map(Some).ok_or_else(|| {
            ContractError::definition(format!("unknown predefined pattern '{name}'"))
        }),
        (None, None) => Ok(None),
    }
}

fn predefined_pattern(name: &str) -> Option<RegexPattern> {
    let pattern = match name {
        "only_alpha_unicode" => patterns::any_alpha_unicode(),
        "number" => patterns::any_number(),
        "any_double" => patterns::any_double(),
        "any_boolean" => patterns::a_boolean(),
        "ip_address" => patterns::any_ip_address(),
        "hostname" => patterns::any_hostname(),
        "email" => patterns::any_email(),
        "url" => patterns::any_url(),
        "uuid" => patterns::any_uuid(),
        "iso_date" => patterns::iso_date(),
        "iso_date_time" => patterns::iso_date_time(),
        "iso_time" => patterns::iso_time(),
        "iso_8601_with_offset" => patterns::iso8601_with_offset(),
        "non_empty" => patterns::non_empty(),
        "non_blank" => patterns::non_blank(),
        other => {
            return patterns::PREDEFINED
                .iter()
                .find(|(n, _)| *n == other)
                .map(|(_, make)| make())
        }
    };
    Some(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn convert(source: &str) -> Result<Vec<Contract>, ContractError> {
        YamlContractConverter::default().convert_source(Path::new("fraud.yml"), source)
    }

    #[test]
    fn test_fraud_check_document() {
        let contracts = convert(
            r#"
description: Should mark client as fraud
request:
  method: PUT
  url: /fraudcheck
  body:
    clientId: "1234567890"
    loanAmount: 99999
  headers:
    Content-Type: application/vnd.fraud.v1+json
  matchers:
    body:
      - path: $.clientId
        type: by_regex
        value: "[0-9]{10}"
response:
  status: 200
  body:
    fraudCheckStatus: FRAUD
    rejectionReason: Amount too high
  headers:
    Content-Type: application/vnd.fraud.v1+json
"#,
        )
        .unwrap();

        assert_eq!(contracts.len(), 1);
        let contract = &contracts[0];
        let request = contract.request().unwrap();
        assert_eq!(request.method, DualValue::Single("PUT".to_string()));
        assert_eq!(request.body_matchers.iter().count(), 1);
        assert_eq!(
            request.body.as_ref().unwrap().producer_view(),
            json!({"clientId": "1234567890", "loanAmount": 99999})
        );
        assert_eq!(contract.response().unwrap().status, DualValue::Single(200));
    }

    #[test]
    fn test_multiple_documents_and_skipped_scalars() {
        let contracts = convert(
            r#"
request: { method: GET, url: /frauds }
response: { status: 200 }
---
~
---
just a string
---
request: { method: GET, url: /drunks }
response: { status: 200 }
"#,
        )
        .unwrap();
        assert_eq!(contracts.len(), 2);
        let urls: Vec<_> = contracts
            .iter()
            .map(|c| c.request().unwrap().url.as_ref().unwrap().value.producer_value().cloned())
            .collect();
        assert_eq!(urls, vec![Some("/frauds".to_string()), Some("/drunks".to_string())]);
    }

    #[test]
    fn test_header_matcher_sets_consumer_pattern() {
        let contracts = convert(
            r#"
request:
  method: GET
  url: /
  headers:
    Authorization: Bearer abc
  matchers:
    headers:
      - key: Authorization
        regex: "Bearer .+"
      - key: X-Request-Id
        predefined: uuid
response:
  status: 200
"#,
        )
        .unwrap();
        let headers = &contracts[0].request().unwrap().headers;
        assert_eq!(headers.len(), 2);
        assert!(matches!(headers[0].value.consumer_side(), Some(Side::Pattern(_))));
        assert_eq!(
            headers[0].value.producer_value().map(String::as_str),
            Some("Bearer abc")
        );
        assert_eq!(headers[1].name, "X-Request-Id");
        assert!(headers[1].value.is_set());
    }

    #[test]
    fn test_response_matcher_sets_producer_pattern() {
        let contracts = convert(
            r#"
request: { method: GET, url: / }
response:
  status: 200
  headers:
    Location: /items/1
  matchers:
    headers:
      - key: Location
        regex: "/items/[0-9]+"
"#,
        )
        .unwrap();
        let header = &contracts[0].response().unwrap().headers[0];
        assert_eq!(header.value.consumer_value().map(String::as_str), Some("/items/1"));
        assert!(matches!(header.value.producer_side(), Some(Side::Pattern(_))));
    }

    #[test]
    fn test_null_header_value_is_unset() {
        let contracts = convert(
            r#"
request:
  method: GET
  url: /
  headers:
    X-Empty: ~
response: { status: 200 }
"#,
        )
        .unwrap();
        assert!(!contracts[0].request().unwrap().headers[0].is_complete());
    }

    #[test]
    fn test_url_and_url_path_conflict() {
        let err = convert("request: { method: GET, url: /a, urlPath: /b }").unwrap_err();
        assert!(matches!(err, ContractError::ScriptEvaluation { .. }));
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn test_malformed_yaml_is_an_evaluation_error() {
        let err = convert("request: [unclosed").unwrap_err();
        assert!(matches!(err, ContractError::ScriptEvaluation { .. }));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = convert("requets: { method: GET }").unwrap_err();
        assert!(err.to_string().contains("requets"));
    }

    #[test]
    fn test_messaging_document() {
        let contracts = convert(
            r#"
label: book_returned
input:
  triggeredBy: bookReturnedTriggered()
outputMessage:
  sentTo: output
  headers:
    BOOK-NAME: foo
  body:
    bookName: foo
  matchers:
    body:
      - path: $.bookName
        type: by_type
        minOccurrence: 1
"#,
        )
        .unwrap();
        let contract = &contracts[0];
        assert!(contract.is_messaging());
        let output = contract.output_message().unwrap();
        assert_eq!(
            output.body_matchers.iter().next().unwrap().matcher,
            Some(MatchingType::by_type_bounded(Some(1), None))
        );
    }

    #[test]
    fn test_query_parameters_and_matchers() {
        let contracts = convert(
            r#"
request:
  method: GET
  urlPath: /frauds
  queryParameters:
    limit: 10
  matchers:
    queryParameters:
      - key: limit
        type: matching
        value: "[0-9]+"
      - key: sort
        type: equal_to
        value: asc
response: { status: 200 }
"#,
        )
        .unwrap();
        let url = contracts[0].request().unwrap().url.clone().unwrap();
        assert_eq!(url.query_parameters.len(), 2);
        let limit = &url.query_parameters[0].value;
        assert!(matches!(limit.consumer_side(), Some(Side::Pattern(_))));
        assert_eq!(limit.producer_value().map(String::as_str), Some("10"));
        assert_eq!(url.query_parameters[1].value, DualValue::Single("asc".to_string()));
    }

    #[test]
    fn test_body_from_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("response.json"), r#"{"status": "OK"}"#).unwrap();
        let doc = dir.path().join("contract.yaml");
        fs::write(
            &doc,
            "request: { method: GET, url: / }\nresponse:\n  status: 200\n  bodyFromFile: response.json\n",
        )
        .unwrap();
        let contracts = YamlContractConverter::default().convert_from(&doc).unwrap();
        assert_eq!(
            contracts[0].response().unwrap().body.as_ref().unwrap().producer_view(),
            json!({"status": "OK"})
        );
    }

    #[test]
    fn test_body_from_file_outside_document_directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("contracts")).unwrap();
        fs::write(dir.path().join("secret.json"), r#"{"token": "x"}"#).unwrap();
        let doc = dir.path().join("contracts/contract.yaml");
        fs::write(
            &doc,
            "request: { method: GET, url: / }\nresponse:\n  status: 200\n  bodyFromFile: ../secret.json\n",
        )
        .unwrap();
        let err = YamlContractConverter::default().convert_from(&doc).unwrap_err();
        assert!(err.to_string().contains("outside the document directory"));
    }

    #[test]
    fn test_incomplete_body_matcher_is_kept_for_validation() {
        let contracts = convert(
            r#"
request: { method: GET, url: / }
response:
  status: 200
  matchers:
    body:
      - path: $.id
"#,
        )
        .unwrap();
        let matcher = contracts[0].response().unwrap().body_matchers.iter().next().cloned();
        assert!(!matcher.unwrap().is_complete());
    }

    #[test]
    fn test_accepted_extensions() {
        let converter = YamlContractConverter::default();
        assert!(converter.is_accepted(Path::new("a.yml")));
        assert!(converter.is_accepted(Path::new("a.YAML")));
        assert!(!converter.is_accepted(Path::new("a.json")));
    }
}
