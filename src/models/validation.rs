use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

/// Longest URL accepted for image/avatar links.
pub const MAX_URL_LENGTH: usize = 2083;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Numeric timestamps above this magnitude are milliseconds, below it seconds.
const MILLIS_THRESHOLD: f64 = 2e10;
/// Latest year that still renders as an RFC 3339 string.
const MAX_YEAR: i32 = 9999;

/// A single rejected field in a request body or query string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn missing(field: &str) -> Self {
        Self::new(field, "field required")
    }

    fn expected(field: &str, what: &str, got: &Value) -> Self {
        Self::new(field, format!("expected {what}, got {}", json_type_name(got)))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Typed access to the fields of a JSON object body.
///
/// Every accessor reports failures against the field it was asked for, so a
/// record parser can simply chain them with `?`. `null` is treated the same as
/// an absent field.
#[derive(Debug, Clone)]
pub struct Fields {
    map: Map<String, Value>,
}

impl Fields {
    /// Wrap a request body. Anything other than a JSON object is rejected.
    pub fn from_body(body: Value) -> Result<Self, FieldError> {
        match body {
            Value::Object(map) => Ok(Self { map }),
            other => Err(FieldError::expected("body", "object", &other)),
        }
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.map.get(name).filter(|v| !v.is_null())
    }

    pub fn required_str(&self, name: &str) -> Result<String, FieldError> {
        self.optional_str(name)?
            .ok_or_else(|| FieldError::missing(name))
    }

    pub fn optional_str(&self, name: &str) -> Result<Option<String>, FieldError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(FieldError::expected(name, "string", other)),
        }
    }

    pub fn str_or(&self, name: &str, default: &str) -> Result<String, FieldError> {
        Ok(self
            .optional_str(name)?
            .unwrap_or_else(|| default.to_string()))
    }

    pub fn str_list(&self, name: &str) -> Result<Vec<String>, FieldError> {
        self.list(name, |field, item| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(FieldError::expected(field, "string", other)),
        })
    }

    pub fn optional_url(&self, name: &str) -> Result<Option<String>, FieldError> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => parse_http_url(name, value).map(Some),
        }
    }

    pub fn url_list(&self, name: &str) -> Result<Vec<String>, FieldError> {
        self.list(name, parse_http_url)
    }

    pub fn bool_or(&self, name: &str, default: bool) -> Result<bool, FieldError> {
        match self.get(name) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(FieldError::expected(name, "boolean", other)),
        }
    }

    pub fn required_timestamp(&self, name: &str) -> Result<DateTime<Utc>, FieldError> {
        self.optional_timestamp(name)?
            .ok_or_else(|| FieldError::missing(name))
    }

    pub fn optional_timestamp(&self, name: &str) -> Result<Option<DateTime<Utc>>, FieldError> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => parse_timestamp(name, value).map(Some),
        }
    }

    pub fn non_negative_number(&self, name: &str) -> Result<f64, FieldError> {
        let value = self.get(name).ok_or_else(|| FieldError::missing(name))?;
        let number = value
            .as_f64()
            .ok_or_else(|| FieldError::expected(name, "number", value))?;
        if number < 0.0 {
            return Err(FieldError::new(
                name,
                "must be greater than or equal to 0",
            ));
        }
        Ok(number)
    }

    fn list<T>(
        &self,
        name: &str,
        item: impl Fn(&str, &Value) -> Result<T, FieldError>,
    ) -> Result<Vec<T>, FieldError> {
        match self.get(name) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, v)| item(&format!("{name}[{i}]"), v))
                .collect(),
            Some(other) => Err(FieldError::expected(name, "array", other)),
        }
    }
}

fn parse_http_url(field: &str, value: &Value) -> Result<String, FieldError> {
    let Value::String(raw) = value else {
        return Err(FieldError::expected(field, "URL string", value));
    };
    if raw.len() > MAX_URL_LENGTH {
        return Err(FieldError::new(
            field,
            format!("URL must be at most {MAX_URL_LENGTH} characters"),
        ));
    }
    let url = url::Url::parse(raw)
        .map_err(|e| FieldError::new(field, format!("invalid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FieldError::new(field, "URL scheme must be http or https"));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(FieldError::new(field, "URL must have a host"));
    }
    Ok(url.to_string())
}

fn parse_timestamp(field: &str, value: &Value) -> Result<DateTime<Utc>, FieldError> {
    let dt = match value {
        Value::String(raw) => parse_timestamp_str(raw.trim())
            .ok_or_else(|| FieldError::new(field, format!("invalid datetime '{raw}'"))),
        Value::Number(n) => n
            .as_f64()
            .filter(|n| n.is_finite())
            .map(|n| if n.abs() > MILLIS_THRESHOLD { n } else { n * 1000.0 })
            .and_then(|millis| DateTime::from_timestamp_millis(millis.round() as i64))
            .ok_or_else(|| FieldError::new(field, "timestamp out of range")),
        other => Err(FieldError::expected(field, "datetime", other)),
    }?;
    if !(1..=MAX_YEAR).contains(&dt.year()) {
        return Err(FieldError::new(field, "timestamp out of range"));
    }
    Ok(dt)
}

fn parse_timestamp_str(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
