//! Predefined regular expressions for common dynamic values.
//!
//! Exposed to the Rhai DSL as `any_uuid()`, `any_email()`, ... and used by the
//! date/time body matchers.

use once_cell::sync::Lazy;

use super::value::RegexPattern;

macro_rules! predefined {
    ($($name:ident => $pattern:expr),+ $(,)?) => {
        $(
            static $name: Lazy<RegexPattern> =
                Lazy::new(|| RegexPattern::new($pattern).expect("predefined pattern compiles"));
        )+
    };
}

predefined! {
    TRUE_OR_FALSE => r"(true|false)",
    ALPHA_NUMERIC => r"[a-zA-Z0-9]+",
    ONLY_ALPHA_UNICODE => r"[\p{L}]*",
    NUMBER => r"-?(\d*\.\d+|\d+)",
    INTEGER => r"-?(\d+)",
    POSITIVE_INT => r"([1-9]\d*)",
    DOUBLE => r"-?(\d*\.\d+)",
    HEX => r"[a-fA-F0-9]+",
    IP_ADDRESS => r"([01]?\d\d?|2[0-4]\d|25[0-5])\.([01]?\d\d?|2[0-4]\d|25[0-5])\.([01]?\d\d?|2[0-4]\d|25[0-5])\.([01]?\d\d?|2[0-4]\d|25[0-5])",
    HOSTNAME => r"((http[s]?|ftp):/)/?([^:/\s]+)(:[0-9]{1,5})?",
    EMAIL => r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,6}",
    URL => r"(ftp|http|https)://[\w.-]+(:[0-9]{1,5})?(/[\w./?%&=+~#-]*)?",
    HTTPS_URL => r"https://[\w.-]+(:[0-9]{1,5})?(/[\w./?%&=+~#-]*)?",
    UUID => r"[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}",
    ISO_DATE => r"(\d\d\d\d)-(0[1-9]|1[012])-(0[1-9]|[12][0-9]|3[01])",
    ISO_DATE_TIME => r"([0-9]{4})-(1[0-2]|0[1-9])-(3[01]|0[1-9]|[12][0-9])T(2[0-3]|[01][0-9]):([0-5][0-9]):([0-5][0-9])",
    ISO_TIME => r"(2[0-3]|[01][0-9]):([0-5][0-9]):([0-5][0-9])",
    ISO8601_WITH_OFFSET => r"([0-9]{4})-(1[0-2]|0[1-9])-(3[01]|0[1-9]|[12][0-9])T(2[0-3]|[01][0-9]):([0-5][0-9]):([0-5][0-9])(\.\d+)?(Z|[+-][01]\d:[0-5]\d)",
    NON_EMPTY => r"[\S\s]+",
    NON_BLANK => r"^\s*\S[\S\s]*",
}

fn pattern(predefined: &Lazy<RegexPattern>) -> RegexPattern {
    RegexPattern::clone(predefined)
}

pub fn a_boolean() -> RegexPattern {
    pattern(&TRUE_OR_FALSE)
}

pub fn any_alpha_numeric() -> RegexPattern {
    pattern(&ALPHA_NUMERIC)
}

pub fn any_alpha_unicode() -> RegexPattern {
    pattern(&ONLY_ALPHA_UNICODE)
}

pub fn any_number() -> RegexPattern {
    pattern(&NUMBER)
}

pub fn any_integer() -> RegexPattern {
    pattern(&INTEGER)
}

pub fn any_positive_int() -> RegexPattern {
    pattern(&POSITIVE_INT)
}

pub fn any_double() -> RegexPattern {
    pattern(&DOUBLE)
}

pub fn any_hex() -> RegexPattern {
    pattern(&HEX)
}

pub fn any_ip_address() -> RegexPattern {
    pattern(&IP_ADDRESS)
}

pub fn any_hostname() -> RegexPattern {
    pattern(&HOSTNAME)
}

pub fn any_email() -> RegexPattern {
    pattern(&EMAIL)
}

pub fn any_url() -> RegexPattern {
    pattern(&URL)
}

pub fn any_https_url() -> RegexPattern {
    pattern(&HTTPS_URL)
}

pub fn any_uuid() -> RegexPattern {
    pattern(&UUID)
}

pub fn iso_date() -> RegexPattern {
    pattern(&ISO_DATE)
}

pub fn iso_date_time() -> RegexPattern {
    pattern(&ISO_DATE_TIME)
}

pub fn iso_time() -> RegexPattern {
    pattern(&ISO_TIME)
}

pub fn iso8601_with_offset() -> RegexPattern {
    pattern(&ISO8601_WITH_OFFSET)
}

pub fn non_empty() -> RegexPattern {
    pattern(&NON_EMPTY)
}

pub fn non_blank() -> RegexPattern {
    pattern(&NON_BLANK)
}

/// Name/constructor table, used to register the patterns with the DSL.
pub const PREDEFINED: &[(&str, fn() -> RegexPattern)] = &[
    ("a_boolean", a_boolean),
    ("any_alpha_numeric", any_alpha_numeric),
    ("any_alpha_unicode", any_alpha_unicode),
    ("any_number", any_number),
    ("any_integer", any_integer),
    ("any_positive_int", any_positive_int),
    ("any_double", any_double),
    ("any_hex", any_hex),
    ("any_ip_address", any_ip_address),
    ("any_hostname", any_hostname),
    ("any_email", any_email),
    ("any_url", any_url),
    ("any_https_url", any_https_url),
    ("any_uuid", any_uuid),
    ("any_date", iso_date),
    ("any_date_time", iso_date_time),
    ("any_time", iso_time),
    ("any_iso8601_with_offset", iso8601_with_offset),
    ("any_non_empty_string", non_empty),
    ("any_non_blank_string", non_blank),
];
