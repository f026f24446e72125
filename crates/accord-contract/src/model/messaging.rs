//! Messaging sections: the input that triggers a contract and the message it
//! is expected to publish.

use serde::Serialize;

use super::body::{Body, BodyMatchers};
use super::http::{find_header, Header};
use super::value::DualValue;

/// Name of a method invoked on the test side, e.g. `bookReturnedTriggered()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Execution(pub String);

impl Execution {
    pub fn new(method: impl Into<String>) -> Self {
        Self(method.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    pub message_from: DualValue<String>,
    pub triggered_by: Option<Execution>,
    pub assert_that: Option<Execution>,
    pub headers: Vec<Header>,
    pub body: Option<Body>,
    pub body_matchers: BodyMatchers,
}

impl Input {
    pub fn builder() -> InputBuilder {
        InputBuilder::default()
    }

    pub fn header(&self, name: &str) -> Option<&Header> {
        find_header(&self.headers, name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputBuilder {
    input: Input,
}

impl InputBuilder {
    pub fn message_from(mut self, channel: impl Into<DualValue<String>>) -> Self {
        self.input.message_from = channel.into();
        self
    }

    pub fn triggered_by(mut self, method: impl Into<String>) -> Self {
        self.input.triggered_by = Some(Execution::new(method));
        self
    }

    pub fn assert_that(mut self, method: impl Into<String>) -> Self {
        self.input.assert_that = Some(Execution::new(method));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<DualValue<String>>) -> Self {
        self.input.headers.push(Header::new(name, value));
        self
    }

    pub fn header_name(mut self, name: impl Into<String>) -> Self {
        self.input
            .headers
            .push(Header::new(name, DualValue::<String>::Unset));
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.input.body = Some(body.into());
        self
    }

    pub fn body_matchers(mut self, matchers: BodyMatchers) -> Self {
        self.input.body_matchers = matchers;
        self
    }

    pub fn build(self) -> Input {
        self.input
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputMessage {
    pub sent_to: DualValue<String>,
    pub headers: Vec<Header>,
    pub body: Option<Body>,
    pub body_matchers: BodyMatchers,
    pub assert_that: Option<Execution>,
}

impl OutputMessage {
    pub fn builder() -> OutputMessageBuilder {
        OutputMessageBuilder::default()
    }

    pub fn header(&self, name: &str) -> Option<&Header> {
        find_header(&self.headers, name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutputMessageBuilder {
    output: OutputMessage,
}

impl OutputMessageBuilder {
    pub fn sent_to(mut self, channel: impl Into<DualValue<String>>) -> Self {
        self.output.sent_to = channel.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<DualValue<String>>) -> Self {
        self.output.headers.push(Header::new(name, value));
        self
    }

    pub fn header_name(mut self, name: impl Into<String>) -> Self {
        self.output
            .headers
            .push(Header::new(name, DualValue::<String>::Unset));
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.output.body = Some(body.into());
        self
    }

    pub fn body_matchers(mut self, matchers: BodyMatchers) -> Self {
        self.output.body_matchers = matchers;
        self
    }

    pub fn assert_that(mut self, method: impl Into<String>) -> Self {
        self.output.assert_that = Some(Execution::new(method));
        self
    }

    pub fn build(self) -> OutputMessage {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_input_builder() {
        let input = Input::builder()
            .message_from("jms:input")
            .triggered_by("bookReturnedTriggered()")
            .header("sample", "header")
            .body(json!({"bookName": "foo"}))
            .build();
        assert_eq!(
            input.message_from.consumer_value().map(String::as_str),
            Some("jms:input")
        );
        assert_eq!(
            input.triggered_by.as_ref().map(Execution::as_str),
            Some("bookReturnedTriggered()")
        );
        assert!(input.header("SAMPLE").is_some());
        assert!(input.assert_that.is_none());
    }

    #[test]
    fn test_output_message_builder() {
        let output = OutputMessage::builder()
            .sent_to("jms:output")
            .header("BOOK-NAME", "foo")
            .body(json!({"bookName": "foo"}))
            .assert_that("bookWasReturned()")
            .build();
        assert!(output.sent_to.is_set());
        assert_eq!(output.headers.len(), 1);
        assert_eq!(
            output.assert_that,
            Some(Execution::new("bookWasReturned()"))
        );
    }

    #[test]
    fn test_execution_serializes_as_plain_string() {
        let value = serde_json::to_value(Execution::new("check()")).unwrap();
        assert_eq!(value, json!("check()"));
    }
}
