//! Query-string encoding
//!
//! Turns typed parameter values into the canonical `(key, value)` tokens the
//! API expects. Encoding is pure and deterministic: the same input always
//! yields the same pairs in the same order, which is what makes a request
//! safe to replay on retry.
//!
//! Conventions:
//! - absent values produce no pair at all (`false` and `0` are present)
//! - booleans are the literals `true` / `false`
//! - enum members use their declared wire token (see [`wire_enum!`](crate::wire_enum))
//! - dates are `YYYY-MM-DD` or `YYYY-MM-DDThh:mm:ssZ`, as declared by the caller
//! - lists are either one comma-joined value or one pair per element

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::errors::{CallwireError, Result};

/// A closed mapping between enum members and wire tokens.
///
/// Implemented by [`wire_enum!`](crate::wire_enum); implementing it by hand
/// is possible but the table must cover every member.
pub trait WireEnum: Copy + Sized + 'static {
    /// Type name reported in validation errors.
    const TYPE_NAME: &'static str;

    /// Every member, in declaration order.
    fn variants() -> &'static [Self];

    /// Canonical wire token for this member.
    fn wire_token(self) -> &'static str;

    /// Parse an exact wire token.
    ///
    /// # Errors
    /// Returns a validation error naming [`Self::TYPE_NAME`] if no member
    /// uses `token`.
    fn from_wire(token: &str) -> Result<Self> {
        Self::variants().iter().copied().find(|member| member.wire_token() == token).ok_or_else(
            || CallwireError::validation(Self::TYPE_NAME, format!("unknown wire token `{token}`")),
        )
    }
}

/// How a date parameter is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateGranularity {
    /// `YYYY-MM-DD`
    Calendar,
    /// `YYYY-MM-DDThh:mm:ssZ`
    Instant,
}

/// How a list parameter is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    /// One pair whose value is the comma-joined elements.
    Csv,
    /// One pair per element, same key repeated.
    Repeated,
}

/// A typed query parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    /// Wire token of an enum member.
    Token(&'static str),
    Date { value: DateTime<Utc>, granularity: DateGranularity },
    List { values: Vec<String>, style: ListStyle },
}

impl QueryValue {
    pub fn token<E: WireEnum>(member: E) -> Self {
        Self::Token(member.wire_token())
    }

    /// A calendar date, rendered as `YYYY-MM-DD`.
    pub fn calendar(date: NaiveDate) -> Self {
        Self::Date {
            value: Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
            granularity: DateGranularity::Calendar,
        }
    }

    pub fn date(value: DateTime<Utc>, granularity: DateGranularity) -> Self {
        Self::Date { value, granularity }
    }

    pub fn list<I, S>(values: I, style: ListStyle) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List { values: values.into_iter().map(Into::into).collect(), style }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<NaiveDate> for QueryValue {
    fn from(value: NaiveDate) -> Self {
        Self::calendar(value)
    }
}

/// Encode one named parameter into zero or more query pairs.
pub fn encode(name: &str, value: Option<&QueryValue>) -> Vec<(String, String)> {
    let Some(value) = value else {
        return Vec::new();
    };

    match value {
        QueryValue::Text(text) => vec![(name.to_string(), text.clone())],
        QueryValue::Integer(number) => vec![(name.to_string(), number.to_string())],
        QueryValue::Boolean(flag) => {
            vec![(name.to_string(), if *flag { "true" } else { "false" }.to_string())]
        }
        QueryValue::Token(token) => vec![(name.to_string(), (*token).to_string())],
        QueryValue::Date { value, granularity } => {
            vec![(name.to_string(), format_date(value, *granularity))]
        }
        QueryValue::List { values, .. } if values.is_empty() => Vec::new(),
        QueryValue::List { values, style: ListStyle::Csv } => {
            vec![(name.to_string(), values.join(","))]
        }
        QueryValue::List { values, style: ListStyle::Repeated } => {
            values.iter().map(|v| (name.to_string(), v.clone())).collect()
        }
    }
}

/// Render a date in the declared granularity.
pub fn format_date(value: &DateTime<Utc>, granularity: DateGranularity) -> String {
    match granularity {
        DateGranularity::Calendar => value.format("%Y-%m-%d").to_string(),
        DateGranularity::Instant => value.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
    }
}

/// Ordered query parameters; duplicate keys are kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: &str, value: impl Into<QueryValue>) -> &mut Self {
        let value = value.into();
        self.pairs.extend(encode(name, Some(&value)));
        self
    }

    /// Append `value` if present; `None` contributes nothing.
    pub fn append_opt<V: Into<QueryValue>>(&mut self, name: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.append(name, value);
        }
        self
    }

    pub fn append_enum<E: WireEnum>(&mut self, name: &str, member: E) -> &mut Self {
        self.append(name, QueryValue::token(member))
    }

    pub fn append_enum_opt<E: WireEnum>(&mut self, name: &str, member: Option<E>) -> &mut Self {
        if let Some(member) = member {
            self.append_enum(name, member);
        }
        self
    }

    pub fn append_date(
        &mut self,
        name: &str,
        value: DateTime<Utc>,
        granularity: DateGranularity,
    ) -> &mut Self {
        self.append(name, QueryValue::date(value, granularity))
    }

    pub fn append_list<I, S>(&mut self, name: &str, values: I, style: ListStyle) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.append(name, QueryValue::list(values, style))
    }

    /// Append an enum list; members are mapped through their wire tokens.
    pub fn append_enum_list<E: WireEnum>(
        &mut self,
        name: &str,
        members: &[E],
        style: ListStyle,
    ) -> &mut Self {
        self.append_list(name, members.iter().map(|m| m.wire_token()), style)
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// First value recorded for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Percent-encoded `key=value&...` form, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}
