//! The contract vocabulary exposed to Rhai documents.
//!
//! ```rhai
//! contract()
//!     .description("Should mark client as fraud")
//!     .request(request()
//!         .method("PUT")
//!         .url("/fraudcheck")
//!         .header("Content-Type", "application/vnd.fraud.v1+json")
//!         .body(#{
//!             clientId: value(consumer(regex("[0-9]{10}")), producer("8532032713")),
//!             loanAmount: 99999
//!         }))
//!     .response(response().status(200))
//! ```

use std::path::{Path, PathBuf};

use rhai::module_resolvers::FileModuleResolver;
use rhai::{Dynamic, Engine, INT};
use serde_json::Value;

use super::sibling_path;
use super::values::{
    combine_sides, dynamic_to_json, json_to_dynamic, to_body, to_dual_string, to_dual_u16,
    to_dual_u64, to_dual_value, to_side, ConsumerSide, ProducerSide, ScriptResult,
};
use crate::config::LoaderConfig;
use crate::error::ContractError;
use crate::model::{
    patterns, BodyMatchersBuilder, ContractBuilder, DualValue, Input, InputBuilder, MatchingType,
    MultipartBuilder, NamedPart, OutputMessage, OutputMessageBuilder, PathType, RegexPattern,
    Request, RequestBuilder, Response, ResponseBuilder,
};

/// Build a fresh engine for one document living in `base_dir`.
pub(super) fn create_engine(config: &LoaderConfig, base_dir: &Path) -> Engine {
    let mut engine = Engine::new();

    engine.set_max_operations(config.max_operations);
    engine.set_max_expr_depths(config.max_expr_depth, config.max_expr_depth);
    engine.set_max_call_levels(config.max_call_levels);
    engine.set_max_string_size(config.max_string_size);
    engine.set_max_array_size(config.max_array_size);
    engine.set_max_map_size(config.max_map_size);
    engine.set_module_resolver(FileModuleResolver::new_with_path(base_dir));

    register_values(&mut engine);
    register_files(&mut engine, base_dir.to_path_buf());
    register_contract(&mut engine);
    register_request(&mut engine);
    register_response(&mut engine);
    register_messaging(&mut engine);
    register_body_matchers(&mut engine);
    register_multipart(&mut engine);

    engine
}

fn script_error(err: ContractError) -> Box<rhai::EvalAltResult> {
    err.to_string().into()
}

fn non_negative(value: INT, what: &str) -> ScriptResult<u32> {
    u32::try_from(value).map_err(|_| format!("{what} must be a non-negative integer").into())
}

fn register_values(engine: &mut Engine) {
    engine
        .register_type_with_name::<DualValue<Value>>("Value")
        .register_type_with_name::<ConsumerSide>("ConsumerSide")
        .register_type_with_name::<ProducerSide>("ProducerSide")
        .register_type_with_name::<RegexPattern>("Regex")
        .register_fn("regex", |pattern: &str| -> ScriptResult<RegexPattern> {
            RegexPattern::new(pattern).map_err(script_error)
        })
        .register_fn("consumer", |value: Dynamic| ConsumerSide(to_side(value)))
        .register_fn("producer", |value: Dynamic| ProducerSide(to_side(value)))
        .register_fn("value", to_dual_value)
        .register_fn("value", combine_sides)
        .register_fn("to_string", |pattern: &mut RegexPattern| {
            pattern.as_str().to_string()
        });

    for (name, make) in patterns::PREDEFINED {
        engine.register_fn(*name, *make);
    }
}

fn register_files(engine: &mut Engine, base_dir: PathBuf) {
    let text_dir = base_dir.clone();
    engine.register_fn("file", move |relative: &str| -> ScriptResult<String> {
        read_sibling(&text_dir, relative)
    });

    engine.register_fn("json_file", move |relative: &str| -> ScriptResult<Dynamic> {
        let text = read_sibling(&base_dir, relative)?;
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| format!("file '{relative}' is not valid JSON: {e}"))?;
        Ok(json_to_dynamic(value))
    });
}

fn read_sibling(base_dir: &Path, relative: &str) -> ScriptResult<String> {
    let path = sibling_path(base_dir, relative)?;
    std::fs::read_to_string(&path)
        .map_err(|e| format!("failed to read file '{}': {e}", path.display()).into())
}

fn register_contract(engine: &mut Engine) {
    engine
        .register_type_with_name::<ContractBuilder>("Contract")
        .register_fn("contract", ContractBuilder::default)
        .register_fn("name", |c: ContractBuilder, name: &str| c.name(name))
        .register_fn("label", |c: ContractBuilder, label: &str| c.label(label))
        .register_fn("description", |c: ContractBuilder, text: &str| {
            c.description(text)
        })
        .register_fn(
            "priority",
            |c: ContractBuilder, priority: INT| -> ScriptResult<ContractBuilder> {
                Ok(c.priority(non_negative(priority, "priority")?))
            },
        )
        .register_fn("ignored", ContractBuilder::ignored)
        .register_fn("in_progress", ContractBuilder::in_progress)
        .register_fn("metadata", |c: ContractBuilder, key: &str, value: Dynamic| {
            c.metadata(key, dynamic_to_json(value))
        })
        .register_fn(
            "request",
            |c: ContractBuilder, request: RequestBuilder| -> ScriptResult<ContractBuilder> {
                Ok(c.request(request.build().map_err(script_error)?))
            },
        )
        .register_fn("response", |c: ContractBuilder, response: ResponseBuilder| {
            c.response(response.build())
        })
        .register_fn("input", |c: ContractBuilder, input: InputBuilder| {
            c.input(input.build())
        })
        .register_fn(
            "output_message",
            |c: ContractBuilder, output: OutputMessageBuilder| c.output_message(output.build()),
        );
}

fn register_request(engine: &mut Engine) {
    engine
        .register_type_with_name::<RequestBuilder>("Request")
        .register_fn("request", Request::builder)
        .register_fn(
            "method",
            |r: RequestBuilder, method: Dynamic| -> ScriptResult<RequestBuilder> {
                Ok(r.method(to_dual_string(method)?))
            },
        )
        .register_fn(
            "url",
            |r: RequestBuilder, url: Dynamic| -> ScriptResult<RequestBuilder> {
                Ok(r.url(to_dual_string(url)?))
            },
        )
        .register_fn(
            "url_path",
            |r: RequestBuilder, path: Dynamic| -> ScriptResult<RequestBuilder> {
                Ok(r.url_path(to_dual_string(path)?))
            },
        )
        .register_fn(
            "query_parameter",
            |r: RequestBuilder, name: &str, value: Dynamic| -> ScriptResult<RequestBuilder> {
                Ok(r.query_parameter(name, to_dual_string(value)?))
            },
        )
        .register_fn(
            "header",
            |r: RequestBuilder, name: &str, value: Dynamic| -> ScriptResult<RequestBuilder> {
                Ok(r.header(name, to_dual_string(value)?))
            },
        )
        .register_fn("header", |r: RequestBuilder, name: &str| r.header_name(name))
        .register_fn(
            "cookie",
            |r: RequestBuilder, name: &str, value: Dynamic| -> ScriptResult<RequestBuilder> {
                Ok(r.cookie(name, to_dual_string(value)?))
            },
        )
        .register_fn("cookie", |r: RequestBuilder, name: &str| r.cookie_name(name))
        .register_fn("body", |r: RequestBuilder, body: Dynamic| r.body(to_body(body)))
        .register_fn("multipart", |r: RequestBuilder, parts: MultipartBuilder| {
            r.body(crate::model::Body::Multipart(parts.build()))
        })
        .register_fn(
            "body_matchers",
            |r: RequestBuilder, matchers: BodyMatchersBuilder| r.body_matchers(matchers.build()),
        );
}

fn register_response(engine: &mut Engine) {
    engine
        .register_type_with_name::<ResponseBuilder>("Response")
        .register_fn("response", Response::builder)
        .register_fn(
            "status",
            |r: ResponseBuilder, status: Dynamic| -> ScriptResult<ResponseBuilder> {
                Ok(r.status(to_dual_u16(status)?))
            },
        )
        .register_fn(
            "delay",
            |r: ResponseBuilder, millis: Dynamic| -> ScriptResult<ResponseBuilder> {
                Ok(r.delay(to_dual_u64(millis)?))
            },
        )
        .register_fn(
            "header",
            |r: ResponseBuilder, name: &str, value: Dynamic| -> ScriptResult<ResponseBuilder> {
                Ok(r.header(name, to_dual_string(value)?))
            },
        )
        .register_fn("header", |r: ResponseBuilder, name: &str| r.header_name(name))
        .register_fn(
            "cookie",
            |r: ResponseBuilder, name: &str, value: Dynamic| -> ScriptResult<ResponseBuilder> {
                Ok(r.cookie(name, to_dual_string(value)?))
            },
        )
        .register_fn("cookie", |r: ResponseBuilder, name: &str| r.cookie_name(name))
        .register_fn("body", |r: ResponseBuilder, body: Dynamic| r.body(to_body(body)))
        .register_fn(
            "body_matchers",
            |r: ResponseBuilder, matchers: BodyMatchersBuilder| r.body_matchers(matchers.build()),
        )
        .register_fn("asynchronous", ResponseBuilder::asynchronous);
}

fn register_messaging(engine: &mut Engine) {
    engine
        .register_type_with_name::<InputBuilder>("Input")
        .register_fn("input", Input::builder)
        .register_fn(
            "message_from",
            |i: InputBuilder, channel: Dynamic| -> ScriptResult<InputBuilder> {
                Ok(i.message_from(to_dual_string(channel)?))
            },
        )
        .register_fn("triggered_by", |i: InputBuilder, method: &str| {
            i.triggered_by(method)
        })
        .register_fn("assert_that", |i: InputBuilder, method: &str| {
            i.assert_that(method)
        })
        .register_fn(
            "header",
            |i: InputBuilder, name: &str, value: Dynamic| -> ScriptResult<InputBuilder> {
                Ok(i.header(name, to_dual_string(value)?))
            },
        )
        .register_fn("header", |i: InputBuilder, name: &str| i.header_name(name))
        .register_fn("body", |i: InputBuilder, body: Dynamic| i.body(to_body(body)))
        .register_fn(
            "body_matchers",
            |i: InputBuilder, matchers: BodyMatchersBuilder| i.body_matchers(matchers.build()),
        );

    engine
        .register_type_with_name::<OutputMessageBuilder>("OutputMessage")
        .register_fn("output_message", OutputMessage::builder)
        .register_fn(
            "sent_to",
            |o: OutputMessageBuilder, channel: Dynamic| -> ScriptResult<OutputMessageBuilder> {
                Ok(o.sent_to(to_dual_string(channel)?))
            },
        )
        .register_fn(
            "header",
            |o: OutputMessageBuilder,
             name: &str,
             value: Dynamic|
             -> ScriptResult<OutputMessageBuilder> {
                Ok(o.header(name, to_dual_string(value)?))
            },
        )
        .register_fn("header", |o: OutputMessageBuilder, name: &str| {
            o.header_name(name)
        })
        .register_fn("body", |o: OutputMessageBuilder, body: Dynamic| {
            o.body(to_body(body))
        })
        .register_fn(
            "body_matchers",
            |o: OutputMessageBuilder, matchers: BodyMatchersBuilder| {
                o.body_matchers(matchers.build())
            },
        )
        .register_fn("assert_that", |o: OutputMessageBuilder, method: &str| {
            o.assert_that(method)
        });
}

fn register_body_matchers(engine: &mut Engine) {
    engine
        .register_type_with_name::<BodyMatchersBuilder>("BodyMatchers")
        .register_type_with_name::<MatchingType>("MatchingType")
        .register_fn("body_matchers", BodyMatchersBuilder::default)
        .register_fn(
            "json_path",
            |m: BodyMatchersBuilder, path: &str, matcher: MatchingType| m.json_path(path, matcher),
        )
        .register_fn("xpath", |m: BodyMatchersBuilder, path: &str, matcher: MatchingType| {
            m.xpath(path, matcher)
        })
        // A matcher entry with no matching type; flagged by validation.
        .register_fn("json_path", |m: BodyMatchersBuilder, path: &str, _: ()| {
            m.entry(PathType::JsonPath, path, None)
        })
        .register_fn("xpath", |m: BodyMatchersBuilder, path: &str, _: ()| {
            m.entry(PathType::XPath, path, None)
        })
        .register_fn("by_equality", MatchingType::by_equality)
        .register_fn("by_type", MatchingType::by_type)
        .register_fn("by_type_min", |min: INT| -> ScriptResult<MatchingType> {
            Ok(MatchingType::by_type_bounded(
                Some(non_negative(min, "minimum occurrence")?),
                None,
            ))
        })
        .register_fn("by_type_max", |max: INT| -> ScriptResult<MatchingType> {
            Ok(MatchingType::by_type_bounded(
                None,
                Some(non_negative(max, "maximum occurrence")?),
            ))
        })
        .register_fn(
            "by_type_range",
            |min: INT, max: INT| -> ScriptResult<MatchingType> {
                let min = non_negative(min, "minimum occurrence")?;
                let max = non_negative(max, "maximum occurrence")?;
                if min > max {
                    return Err(format!("minimum occurrence {min} exceeds maximum {max}").into());
                }
                Ok(MatchingType::by_type_bounded(Some(min), Some(max)))
            },
        )
        .register_fn("by_date", MatchingType::by_date)
        .register_fn("by_time", MatchingType::by_time)
        .register_fn("by_timestamp", MatchingType::by_timestamp)
        .register_fn("by_regex", MatchingType::by_regex)
        .register_fn("by_regex", |pattern: &str| -> ScriptResult<MatchingType> {
            Ok(MatchingType::by_regex(
                RegexPattern::new(pattern).map_err(script_error)?,
            ))
        });
}

fn register_multipart(engine: &mut Engine) {
    engine
        .register_type_with_name::<MultipartBuilder>("Multipart")
        .register_fn("multipart", MultipartBuilder::default)
        .register_fn(
            "param",
            |m: MultipartBuilder, name: &str, value: Dynamic| -> ScriptResult<MultipartBuilder> {
                Ok(m.param(name, to_dual_string(value)?))
            },
        )
        .register_fn(
            "named",
            |m: MultipartBuilder,
             name: &str,
             file_name: Dynamic,
             content: Dynamic|
             -> ScriptResult<MultipartBuilder> {
                Ok(m.named(NamedPart::new(
                    name,
                    to_dual_string(file_name)?,
                    to_dual_string(content)?,
                )))
            },
        )
        .register_fn(
            "named",
            |m: MultipartBuilder,
             name: &str,
             file_name: Dynamic,
             content: Dynamic,
             content_type: Dynamic|
             -> ScriptResult<MultipartBuilder> {
                let part = NamedPart::new(name, to_dual_string(file_name)?, to_dual_string(content)?)
                    .with_content_type(to_dual_string(content_type)?);
                Ok(m.named(part))
            },
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Body, Side};
    use serde_json::json;

    fn eval(script: &str) -> Result<Dynamic, Box<rhai::EvalAltResult>> {
        let engine = create_engine(&LoaderConfig::default(), Path::new("."));
        engine.eval::<Dynamic>(script)
    }

    fn eval_contract(script: &str) -> crate::model::Contract {
        eval(script)
            .unwrap()
            .try_cast::<ContractBuilder>()
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_fraud_check_contract() {
        let contract = eval_contract(
            r#"
            contract()
                .description("Should mark client as fraud")
                .request(request()
                    .method("PUT")
                    .url("/fraudcheck")
                    .header("Content-Type", "application/vnd.fraud.v1+json")
                    .body(#{
                        clientId: value(consumer(regex("[0-9]{10}")), producer("8532032713")),
                        loanAmount: 99999
                    }))
                .response(response()
                    .status(200)
                    .body(#{ fraudCheckStatus: "FRAUD", rejectionReason: "Amount too high" }))
            "#,
        );

        let request = contract.request().unwrap();
        assert_eq!(request.method, DualValue::Single("PUT".to_string()));
        let body = request.body.as_ref().unwrap();
        assert_eq!(
            body.consumer_view(),
            json!({"clientId": "[0-9]{10}", "loanAmount": 99999})
        );
        assert_eq!(
            body.producer_view(),
            json!({"clientId": "8532032713", "loanAmount": 99999})
        );
        assert_eq!(contract.response().unwrap().status.producer_value(), Some(&200));
        assert_eq!(
            contract.description.as_deref(),
            Some("Should mark client as fraud")
        );
    }

    #[test]
    fn test_regex_value_sets_consumer_pattern_only() {
        let contract = eval_contract(
            r#"contract().request(request().method("GET").url(regex("/frauds/[0-9]+")))"#,
        );
        let url = contract.request().unwrap().url.as_ref().unwrap();
        assert!(matches!(url.value.consumer_side(), Some(Side::Pattern(_))));
        assert!(url.value.producer_value().is_none());
    }

    #[test]
    fn test_predefined_patterns_are_available() {
        let result = eval("any_uuid().to_string()").unwrap();
        assert_eq!(
            result.into_string().unwrap(),
            patterns::any_uuid().as_str().to_string()
        );
    }

    #[test]
    fn test_url_and_url_path_conflict_is_a_script_error() {
        let err = eval(r#"contract().request(request().url("/a").url_path("/b"))"#).unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn test_invalid_status_is_a_script_error() {
        let err = eval(r#"response().status(-5)"#).unwrap_err();
        assert!(err.to_string().contains("status code"));
    }

    #[test]
    fn test_body_matchers_and_messaging() {
        let contract = eval_contract(
            r#"
            contract()
                .label("book_returned")
                .input(input().triggered_by("bookReturnedTriggered()"))
                .output_message(output_message()
                    .sent_to("output")
                    .header("BOOK-NAME", "foo")
                    .body(#{ bookName: "foo", returned: "2024-08-13" })
                    .body_matchers(body_matchers()
                        .json_path("$.returned", by_date())
                        .json_path("$.bookName", by_regex("[a-z]+"))
                        .xpath("/book/name", by_type_range(1, 3))))
            "#,
        );
        let output = contract.output_message().unwrap();
        assert_eq!(output.body_matchers.iter().count(), 3);
        assert!(output.body_matchers.iter().all(|m| m.is_complete()));
        assert!(contract.input().unwrap().triggered_by.is_some());
    }

    #[test]
    fn test_unset_matcher_is_recorded() {
        let result = eval(r#"body_matchers().json_path("$.id", ())"#).unwrap();
        let matchers = result.try_cast::<BodyMatchersBuilder>().unwrap().build();
        assert!(!matchers.iter().next().unwrap().is_complete());
    }

    #[test]
    fn test_multipart_body() {
        let contract = eval_contract(
            r#"
            contract()
                .request(request()
                    .method("PUT")
                    .url("/multipart")
                    .multipart(multipart()
                        .param("formParameter", "\"formParameterValue\"")
                        .named("file", regex(".+\\.txt"), "file content", "text/plain")))
                .response(response().status(200))
            "#,
        );
        match contract.request().unwrap().body.as_ref().unwrap() {
            Body::Multipart(m) => {
                assert_eq!(m.params.len(), 1);
                assert_eq!(m.named[0].param_name, "file");
                assert!(m.named[0].content_type.is_set());
            }
            other => panic!("Expected multipart body, got {other:?}"),
        }
    }

    #[test]
    fn test_operation_limit_is_enforced() {
        let config = LoaderConfig {
            max_operations: 100,
            ..Default::default()
        };
        let engine = create_engine(&config, Path::new("."));
        let result = engine.eval::<Dynamic>("let x = 0; loop { x += 1; }");
        assert!(result.is_err());
    }

    #[test]
    fn test_string_growth_is_bounded() {
        let config = LoaderConfig {
            max_string_size: 1024,
            ..Default::default()
        };
        let engine = create_engine(&config, Path::new("."));
        let err = engine
            .eval::<Dynamic>(r#"let s = "x"; loop { s += s; }"#)
            .unwrap_err();
        assert!(matches!(*err, rhai::EvalAltResult::ErrorDataTooLarge(..)));
    }

    #[test]
    fn test_array_growth_is_bounded() {
        let config = LoaderConfig {
            max_array_size: 16,
            ..Default::default()
        };
        let engine = create_engine(&config, Path::new("."));
        let err = engine
            .eval::<Dynamic>("let a = []; loop { a.push(1); }")
            .unwrap_err();
        assert!(matches!(*err, rhai::EvalAltResult::ErrorDataTooLarge(..)));
    }

    #[test]
    fn test_cookie_without_value() {
        let contract = eval_contract(
            r#"
            contract()
                .request(request().method("GET").url("/").cookie("session"))
                .response(response().status(200).cookie("tracking"))
            "#,
        );
        let request_cookie = &contract.request().unwrap().cookies[0];
        assert_eq!(request_cookie.name, "session");
        assert!(!request_cookie.value.is_set());
        assert!(!contract.response().unwrap().cookies[0].is_complete());
    }

    #[test]
    fn test_files_outside_document_directory_are_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("secret.txt"), "token").unwrap();
        let base = dir.path().join("contracts");
        std::fs::create_dir(&base).unwrap();
        let engine = create_engine(&LoaderConfig::default(), &base);

        let err = engine.eval::<String>(r#"file("../secret.txt")"#).unwrap_err();
        assert!(err.to_string().contains("outside the document directory"));
        let absolute = format!("json_file({:?})", dir.path().join("secret.txt").display().to_string());
        assert!(engine.eval::<Dynamic>(&absolute).is_err());
    }

    #[test]
    fn test_negative_priority_is_rejected() {
        let err = eval("contract().priority(-1)").unwrap_err();
        assert!(err.to_string().contains("priority"));
    }
}
