//! Conversions between Rhai `Dynamic` values and the contract model.

use rhai::{Array, Dynamic, EvalAltResult, Map};
use serde_json::Value;

use crate::model::{Body, BodyNode, DualValue, RegexPattern, Side};

pub(super) type ScriptResult<T> = Result<T, Box<EvalAltResult>>;

/// Result of `consumer(..)` in a script.
#[derive(Debug, Clone)]
pub(super) struct ConsumerSide(pub Side<Value>);

/// Result of `producer(..)` in a script.
#[derive(Debug, Clone)]
pub(super) struct ProducerSide(pub Side<Value>);

pub(super) fn json_to_dynamic(value: Value) -> Dynamic {
    match value {
        Value::Null => Dynamic::UNIT,
        Value::Bool(b) => Dynamic::from(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Dynamic::from(i)
            } else if let Some(f) = n.as_f64() {
                Dynamic::from(f)
            } else {
                Dynamic::UNIT
            }
        }
        Value::String(s) => Dynamic::from(s),
        Value::Array(arr) => {
            let vec: Array = arr.into_iter().map(json_to_dynamic).collect();
            Dynamic::from(vec)
        }
        Value::Object(obj) => {
            let mut map = Map::new();
            for (k, v) in obj {
                map.insert(k.into(), json_to_dynamic(v));
            }
            Dynamic::from(map)
        }
    }
}

pub(super) fn dynamic_to_json(value: Dynamic) -> Value {
    if value.is_unit() {
        Value::Null
    } else if let Ok(b) = value.as_bool() {
        Value::Bool(b)
    } else if let Ok(i) = value.as_int() {
        Value::Number(i.into())
    } else if let Ok(f) = value.as_float() {
        serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    } else if let Ok(s) = value.clone().into_string() {
        Value::String(s)
    } else if let Some(pattern) = value.clone().try_cast::<RegexPattern>() {
        Value::String(pattern.as_str().to_string())
    } else if let Some(arr) = value.clone().try_cast::<Array>() {
        Value::Array(arr.into_iter().map(dynamic_to_json).collect())
    } else if let Some(map) = value.clone().try_cast::<Map>() {
        let mut obj = serde_json::Map::new();
        for (k, v) in map {
            obj.insert(k.to_string(), dynamic_to_json(v));
        }
        Value::Object(obj)
    } else {
        Value::String(format!("{value}"))
    }
}

/// One side of `value(..)`: a pattern or a concrete JSON value.
pub(super) fn to_side(value: Dynamic) -> Side<Value> {
    match value.clone().try_cast::<RegexPattern>() {
        Some(pattern) => Side::Pattern(pattern),
        None => Side::Concrete(dynamic_to_json(value)),
    }
}

/// Any script value accepted where a field value is expected.
///
/// `()` leaves the field unset. A bare `consumer(..)` or `producer(..)`
/// applies to both sides.
pub(super) fn to_dual_value(value: Dynamic) -> DualValue<Value> {
    if value.is_unit() {
        return DualValue::Unset;
    }
    if let Some(dual) = value.clone().try_cast::<DualValue<Value>>() {
        return dual;
    }
    if let Some(ConsumerSide(side)) = value.clone().try_cast::<ConsumerSide>() {
        return DualValue::from_parts(Some(side), None);
    }
    if let Some(ProducerSide(side)) = value.clone().try_cast::<ProducerSide>() {
        return DualValue::from_parts(None, Some(side));
    }
    if let Some(pattern) = value.clone().try_cast::<RegexPattern>() {
        return DualValue::pattern(pattern);
    }
    DualValue::Single(dynamic_to_json(value))
}

/// Combine the arguments of `value(a, b)`, given in either order.
pub(super) fn combine_sides(first: Dynamic, second: Dynamic) -> ScriptResult<DualValue<Value>> {
    let mut consumer = None;
    let mut producer = None;
    for side in [first, second] {
        if let Some(ConsumerSide(s)) = side.clone().try_cast::<ConsumerSide>() {
            if consumer.replace(s).is_some() {
                return Err("value() was given two consumer sides".into());
            }
        } else if let Some(ProducerSide(s)) = side.clone().try_cast::<ProducerSide>() {
            if producer.replace(s).is_some() {
                return Err("value() was given two producer sides".into());
            }
        } else {
            return Err(format!(
                "value() expects consumer(..) and producer(..) arguments, got {}",
                side.type_name()
            )
            .into());
        }
    }
    Ok(DualValue::from_parts(consumer, producer))
}

pub(super) fn to_dual_string(value: Dynamic) -> ScriptResult<DualValue<String>> {
    to_dual_value(value).try_map(|v| match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("expected a text value, got {other}").into()),
    })
}

pub(super) fn to_dual_u16(value: Dynamic) -> ScriptResult<DualValue<u16>> {
    to_dual_value(value).try_map(|v| {
        v.as_u64()
            .and_then(|n| u16::try_from(n).ok())
            .ok_or_else(|| format!("expected a status code between 0 and 65535, got {v}").into())
    })
}

pub(super) fn to_dual_u64(value: Dynamic) -> ScriptResult<DualValue<u64>> {
    to_dual_value(value).try_map(|v| {
        v.as_u64()
            .ok_or_else(|| format!("expected a non-negative number, got {v}").into())
    })
}

pub(super) fn to_body(value: Dynamic) -> Body {
    if let Ok(text) = value.clone().into_string() {
        return Body::Text(DualValue::Single(text));
    }
    if let Some(pattern) = value.clone().try_cast::<RegexPattern>() {
        return Body::Text(DualValue::pattern(pattern));
    }
    Body::Json(to_body_node(value))
}

pub(super) fn to_body_node(value: Dynamic) -> BodyNode {
    if is_dual(&value) {
        return BodyNode::Dynamic(to_dual_value(value));
    }
    if let Some(arr) = value.clone().try_cast::<Array>() {
        return BodyNode::Array(arr.into_iter().map(to_body_node).collect());
    }
    if let Some(map) = value.clone().try_cast::<Map>() {
        return BodyNode::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_string(), to_body_node(v)))
                .collect(),
        );
    }
    BodyNode::Value(dynamic_to_json(value))
}

fn is_dual(value: &Dynamic) -> bool {
    value.is::<DualValue<Value>>()
        || value.is::<ConsumerSide>()
        || value.is::<ProducerSide>()
        || value.is::<RegexPattern>()
}
