//! Message bodies, multipart payloads and body matchers.

use serde::Serialize;
use serde_json::Value;

use super::patterns;
use super::value::{DualValue, RegexPattern, Side};

/// A request, response or message body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Body {
    /// Structured (JSON-like) body whose leaves may diverge per side.
    Json(BodyNode),
    /// Raw text body.
    Text(DualValue<String>),
    Multipart(Multipart),
}

impl Body {
    /// Consumer view of the body, patterns rendered as their source text.
    pub fn consumer_view(&self) -> Value {
        match self {
            Body::Json(node) => node.consumer_view(),
            Body::Text(text) => side_to_json(text.consumer_side()),
            Body::Multipart(multipart) => multipart.view(DualValue::<String>::consumer_side),
        }
    }

    /// Producer view of the body, patterns rendered as their source text.
    pub fn producer_view(&self) -> Value {
        match self {
            Body::Json(node) => node.producer_view(),
            Body::Text(text) => side_to_json(text.producer_side()),
            Body::Multipart(multipart) => multipart.view(DualValue::<String>::producer_side),
        }
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Body::Text(DualValue::Single(text)),
            other => Body::Json(BodyNode::from(other)),
        }
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(DualValue::from(text))
    }
}

impl From<BodyNode> for Body {
    fn from(node: BodyNode) -> Self {
        Body::Json(node)
    }
}

/// A node of a structured body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BodyNode {
    /// A literal shared by both sides.
    Value(Value),
    /// A leaf whose consumer and producer views differ.
    Dynamic(DualValue<Value>),
    Array(Vec<BodyNode>),
    /// Object entries in declaration order.
    Object(Vec<(String, BodyNode)>),
}

impl BodyNode {
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, BodyNode)>) -> Self {
        BodyNode::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn consumer_view(&self) -> Value {
        self.view(&DualValue::<Value>::consumer_side)
    }

    pub fn producer_view(&self) -> Value {
        self.view(&DualValue::<Value>::producer_side)
    }

    fn view(&self, pick: &dyn Fn(&DualValue<Value>) -> Option<Side<&Value>>) -> Value {
        match self {
            BodyNode::Value(value) => value.clone(),
            BodyNode::Dynamic(dual) => side_to_json(pick(dual)),
            BodyNode::Array(items) => Value::Array(items.iter().map(|i| i.view(pick)).collect()),
            BodyNode::Object(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, node)| (key.clone(), node.view(pick)))
                    .collect(),
            ),
        }
    }

    /// Whether any leaf diverges between the two sides.
    pub fn has_dynamic_values(&self) -> bool {
        match self {
            BodyNode::Value(_) => false,
            BodyNode::Dynamic(dual) => !dual.is_single(),
            BodyNode::Array(items) => items.iter().any(BodyNode::has_dynamic_values),
            BodyNode::Object(entries) => entries.iter().any(|(_, node)| node.has_dynamic_values()),
        }
    }
}

impl From<Value> for BodyNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => BodyNode::Array(items.into_iter().map(BodyNode::from).collect()),
            Value::Object(map) => {
                BodyNode::Object(map.into_iter().map(|(k, v)| (k, BodyNode::from(v))).collect())
            }
            scalar => BodyNode::Value(scalar),
        }
    }
}

fn side_to_json<T: Clone + Into<Value>>(side: Option<Side<&T>>) -> Value {
    match side {
        None => Value::Null,
        Some(Side::Concrete(value)) => value.clone().into(),
        Some(Side::Pattern(pattern)) => Value::String(pattern.as_str().to_string()),
    }
}

/// A multipart form body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Multipart {
    pub params: Vec<(String, DualValue<String>)>,
    pub named: Vec<NamedPart>,
}

impl Multipart {
    pub fn builder() -> MultipartBuilder {
        MultipartBuilder::default()
    }

    fn view(&self, pick: fn(&DualValue<String>) -> Option<Side<&String>>) -> Value {
        let mut object = serde_json::Map::new();
        for (name, value) in &self.params {
            object.insert(name.clone(), side_to_json(pick(value)));
        }
        for part in &self.named {
            let mut entry = serde_json::Map::new();
            entry.insert(
                "fileName".to_string(),
                side_to_json(pick(&part.file_name)),
            );
            entry.insert(
                "content".to_string(),
                side_to_json(pick(&part.content)),
            );
            if part.content_type.is_set() {
                entry.insert(
                    "contentType".to_string(),
                    side_to_json(pick(&part.content_type)),
                );
            }
            object.insert(part.param_name.clone(), Value::Object(entry));
        }
        Value::Object(object)
    }
}

/// One named (file) field of a multipart body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedPart {
    pub param_name: String,
    pub file_name: DualValue<String>,
    pub content: DualValue<String>,
    /// `Unset` when no content type was given.
    pub content_type: DualValue<String>,
}

impl NamedPart {
    pub fn new(
        param_name: impl Into<String>,
        file_name: impl Into<DualValue<String>>,
        content: impl Into<DualValue<String>>,
    ) -> Self {
        Self {
            param_name: param_name.into(),
            file_name: file_name.into(),
            content: content.into(),
            content_type: DualValue::Unset,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<DualValue<String>>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct MultipartBuilder {
    multipart: Multipart,
}

impl MultipartBuilder {
    pub fn param(mut self, name: impl Into<String>, value: impl Into<DualValue<String>>) -> Self {
        self.multipart.params.push((name.into(), value.into()));
        self
    }

    pub fn named(mut self, part: NamedPart) -> Self {
        self.multipart.named.push(part);
        self
    }

    pub fn build(self) -> Multipart {
        self.multipart
    }
}

/// Kind of path a body matcher addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PathType {
    JsonPath,
    XPath,
}

/// How the value at a body matcher's path is verified.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchingType {
    Equality,
    Type {
        #[serde(skip_serializing_if = "Option::is_none")]
        min_occurrence: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_occurrence: Option<u32>,
    },
    Date(RegexPattern),
    Time(RegexPattern),
    Timestamp(RegexPattern),
    Regex(RegexPattern),
}

impl MatchingType {
    pub fn by_equality() -> Self {
        MatchingType::Equality
    }

    pub fn by_type() -> Self {
        MatchingType::Type {
            min_occurrence: None,
            max_occurrence: None,
        }
    }

    pub fn by_type_bounded(min_occurrence: Option<u32>, max_occurrence: Option<u32>) -> Self {
        MatchingType::Type {
            min_occurrence,
            max_occurrence,
        }
    }

    pub fn by_date() -> Self {
        MatchingType::Date(patterns::iso_date())
    }

    pub fn by_time() -> Self {
        MatchingType::Time(patterns::iso_time())
    }

    pub fn by_timestamp() -> Self {
        MatchingType::Timestamp(patterns::iso_date_time())
    }

    pub fn by_regex(pattern: RegexPattern) -> Self {
        MatchingType::Regex(pattern)
    }

    /// The pattern a value must match, if the matcher carries one.
    pub fn pattern(&self) -> Option<&RegexPattern> {
        match self {
            MatchingType::Date(p)
            | MatchingType::Time(p)
            | MatchingType::Timestamp(p)
            | MatchingType::Regex(p) => Some(p),
            MatchingType::Equality | MatchingType::Type { .. } => None,
        }
    }
}

/// A path-addressed rule for one part of a body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyMatcher {
    pub path_type: PathType,
    pub path: String,
    pub matcher: Option<MatchingType>,
}

impl BodyMatcher {
    pub fn is_complete(&self) -> bool {
        !self.path.trim().is_empty() && self.matcher.is_some()
    }
}

/// Ordered body matchers of one section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BodyMatchers(pub Vec<BodyMatcher>);

impl BodyMatchers {
    pub fn builder() -> BodyMatchersBuilder {
        BodyMatchersBuilder::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BodyMatcher> {
        self.0.iter()
    }

    pub fn json_path_matchers(&self) -> impl Iterator<Item = &BodyMatcher> {
        self.0.iter().filter(|m| m.path_type == PathType::JsonPath)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BodyMatchersBuilder {
    matchers: Vec<BodyMatcher>,
}

impl BodyMatchersBuilder {
    pub fn json_path(self, path: impl Into<String>, matcher: MatchingType) -> Self {
        self.push(PathType::JsonPath, path.into(), Some(matcher))
    }

    pub fn xpath(self, path: impl Into<String>, matcher: MatchingType) -> Self {
        self.push(PathType::XPath, path.into(), Some(matcher))
    }

    /// Add a matcher that may be missing its matching type; incomplete
    /// entries are reported by validation.
    pub fn entry(
        self,
        path_type: PathType,
        path: impl Into<String>,
        matcher: Option<MatchingType>,
    ) -> Self {
        self.push(path_type, path.into(), matcher)
    }

    fn push(mut self, path_type: PathType, path: String, matcher: Option<MatchingType>) -> Self {
        self.matchers.push(BodyMatcher {
            path_type,
            path,
            matcher,
        });
        self
    }

    pub fn build(self) -> BodyMatchers {
        BodyMatchers(self.matchers)
    }
}
