//! Contract invariants checked before a contract is handed on.
//!
//! HTTP contracts must carry a URL, a method and a status. Header, cookie and
//! body matcher entries must be complete in every section. Messaging sections
//! have no mandatory fields.

use crate::error::ValidationError;
use crate::model::{BodyMatchers, Contract, Cookie, Header};

/// Report the first violated invariant.
pub fn validate(contract: &Contract) -> Result<(), ValidationError> {
    match violations(contract).into_iter().next() {
        Some(violation) => Err(violation),
        None => Ok(()),
    }
}

/// Every violated invariant, in check order.
pub fn violations(contract: &Contract) -> Vec<ValidationError> {
    let mut found = Vec::new();

    if let Some(request) = contract.request() {
        if !request.url.as_ref().is_some_and(|url| url.is_set()) {
            found.push(ValidationError::MissingUrl);
        }
        if !request.method.is_set() {
            found.push(ValidationError::MissingMethod);
        }
    }
    if let Some(response) = contract.response() {
        if !response.status.is_set() {
            found.push(ValidationError::MissingStatus);
        }
    }

    let sections = sections(contract);

    for (section, headers, _, _) in &sections {
        check_headers(section, headers, &mut found);
    }
    for (section, _, cookies, _) in &sections {
        check_cookies(section, cookies, &mut found);
    }
    for (section, _, _, matchers) in &sections {
        check_body_matchers(section, matchers, &mut found);
    }

    found
}

type Section<'a> = (&'static str, &'a [Header], &'a [Cookie], &'a BodyMatchers);

fn sections(contract: &Contract) -> Vec<Section<'_>> {
    let mut sections: Vec<Section<'_>> = Vec::with_capacity(2);
    if let Some(request) = contract.request() {
        sections.push((
            "request",
            &request.headers,
            &request.cookies,
            &request.body_matchers,
        ));
    }
    if let Some(response) = contract.response() {
        sections.push((
            "response",
            &response.headers,
            &response.cookies,
            &response.body_matchers,
        ));
    }
    if let Some(input) = contract.input() {
        sections.push(("input", &input.headers, &[], &input.body_matchers));
    }
    if let Some(output) = contract.output_message() {
        sections.push(("output message", &output.headers, &[], &output.body_matchers));
    }
    sections
}

fn check_headers(section: &'static str, headers: &[Header], found: &mut Vec<ValidationError>) {
    found.extend(
        headers
            .iter()
            .filter(|h| !h.is_complete())
            .map(|h| ValidationError::IncompleteHeader {
                section,
                name: h.name.clone(),
            }),
    );
}

fn check_cookies(section: &'static str, cookies: &[Cookie], found: &mut Vec<ValidationError>) {
    found.extend(
        cookies
            .iter()
            .filter(|c| !c.is_complete())
            .map(|c| ValidationError::IncompleteCookie {
                section,
                name: c.name.clone(),
            }),
    );
}

fn check_body_matchers(
    section: &'static str,
    matchers: &BodyMatchers,
    found: &mut Vec<ValidationError>,
) {
    found.extend(
        matchers
            .iter()
            .filter(|m| !m.is_complete())
            .map(|m| ValidationError::IncompleteBodyMatcher {
                section,
                path: m.path.clone(),
            }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        BodyMatchers, Input, MatchingType, OutputMessage, PathType, Request, Response,
    };

    fn http(request: Request, response: Response) -> Contract {
        Contract::builder()
            .request(request)
            .response(response)
            .build()
            .unwrap()
    }

    #[test]
    fn test_valid_http_contract() {
        let contract = http(
            Request::builder().method("PUT").url("/fraudcheck").build().unwrap(),
            Response::builder().status(200u16).build(),
        );
        assert!(validate(&contract).is_ok());
        // No hidden state: a second run gives the same answer.
        assert!(validate(&contract).is_ok());
    }

    #[test]
    fn test_missing_method() {
        let contract = http(
            Request::builder().url("/fraudcheck").build().unwrap(),
            Response::builder().status(200u16).build(),
        );
        let err = validate(&contract).unwrap_err();
        assert_eq!(err, ValidationError::MissingMethod);
        assert!(err.to_string().contains("method"));
    }

    #[test]
    fn test_url_is_reported_before_method() {
        let contract = http(
            Request::builder().build().unwrap(),
            Response::builder().build(),
        );
        assert_eq!(
            violations(&contract),
            vec![
                ValidationError::MissingUrl,
                ValidationError::MissingMethod,
                ValidationError::MissingStatus,
            ]
        );
        assert_eq!(validate(&contract), Err(ValidationError::MissingUrl));
    }

    #[test]
    fn test_request_only_contract_skips_status_check() {
        let contract = Contract::builder()
            .request(Request::builder().method("GET").url("/").build().unwrap())
            .build()
            .unwrap();
        assert!(validate(&contract).is_ok());
    }

    #[test]
    fn test_header_without_value() {
        let contract = http(
            Request::builder()
                .method("GET")
                .url("/")
                .header_name("Content-Type")
                .build()
                .unwrap(),
            Response::builder().status(200u16).build(),
        );
        let err = validate(&contract).unwrap_err();
        assert!(err.to_string().contains("header"));
        assert!(matches!(
            err,
            ValidationError::IncompleteHeader { section: "request", .. }
        ));
    }

    #[test]
    fn test_cookie_without_name() {
        let contract = http(
            Request::builder().method("GET").url("/").build().unwrap(),
            Response::builder().status(200u16).cookie("", "value").build(),
        );
        let err = validate(&contract).unwrap_err();
        assert!(err.to_string().contains("cookie"));
    }

    #[test]
    fn test_incomplete_body_matcher() {
        let matchers = BodyMatchers::builder()
            .json_path("$.id", MatchingType::by_equality())
            .entry(PathType::JsonPath, "", Some(MatchingType::by_type()))
            .build();
        let contract = http(
            Request::builder().method("GET").url("/").build().unwrap(),
            Response::builder()
                .status(200u16)
                .body_matchers(matchers)
                .build(),
        );
        let err = validate(&contract).unwrap_err();
        assert!(err.to_string().contains("body matcher"));
    }

    #[test]
    fn test_messaging_has_no_mandatory_fields() {
        let contract = Contract::builder()
            .input(Input::builder().build())
            .output_message(OutputMessage::builder().build())
            .build()
            .unwrap();
        assert!(validate(&contract).is_ok());
    }

    #[test]
    fn test_messaging_headers_are_still_checked() {
        let contract = Contract::builder()
            .output_message(OutputMessage::builder().sent_to("out").header_name("x").build())
            .build()
            .unwrap();
        assert_eq!(
            validate(&contract),
            Err(ValidationError::IncompleteHeader {
                section: "output message",
                name: "x".to_string(),
            })
        );
    }

    #[test]
    fn test_empty_contract_is_valid() {
        let contract = Contract::builder().build().unwrap();
        assert!(violations(&contract).is_empty());
    }
}
