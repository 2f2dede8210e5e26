//! Page windows and page results
//!
//! List endpoints page either by an opaque server cursor
//! (`next_page_token`) or by a 1-based page number. Which one an endpoint
//! uses is declared by its adapter through [`PaginationMode`]; the two are
//! never mixed within one iteration.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{CallwireError, Result};
use crate::query::QueryParams;

pub const MIN_PAGE_SIZE: u32 = 1;
pub const MAX_PAGE_SIZE: u32 = 100;

pub const PAGE_SIZE_PARAM: &str = "page_size";
pub const NEXT_PAGE_TOKEN_PARAM: &str = "next_page_token";
pub const PAGE_NUMBER_PARAM: &str = "page_number";

/// How an endpoint advances between pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaginationMode {
    /// Follow `next_page_token` until the server stops returning one.
    #[default]
    Cursor,
    /// Request `page_number` 1, 2, ... until `page_count` is reached.
    PageNumber,
}

/// One page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    size_requested: u32,
    cursor: Option<String>,
    page_number_fallback: Option<u32>,
}

impl PageWindow {
    /// Window for the first page.
    ///
    /// # Errors
    /// Returns a validation error for `page_size` outside `[1, 100]`.
    pub fn new(size_requested: u32) -> Result<Self> {
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&size_requested) {
            return Err(CallwireError::validation(
                PAGE_SIZE_PARAM,
                format!(
                    "must be between {MIN_PAGE_SIZE} and {MAX_PAGE_SIZE}, got {size_requested}"
                ),
            ));
        }
        Ok(Self { size_requested, cursor: None, page_number_fallback: None })
    }

    /// Same size, continuing from `cursor`. An empty cursor means "first page".
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        let cursor = cursor.into();
        self.cursor = if cursor.is_empty() { None } else { Some(cursor) };
        self
    }

    /// Same size, targeting a 1-based page number.
    ///
    /// # Errors
    /// Returns a validation error for page number 0.
    pub fn with_page_number(mut self, page_number: u32) -> Result<Self> {
        if page_number == 0 {
            return Err(CallwireError::validation(PAGE_NUMBER_PARAM, "page numbers start at 1"));
        }
        self.page_number_fallback = Some(page_number);
        Ok(self)
    }

    pub fn size_requested(&self) -> u32 {
        self.size_requested
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn page_number(&self) -> Option<u32> {
        self.page_number_fallback
    }

    /// Write `page_size` plus the cursor or page number into `query`.
    pub fn apply_to(&self, query: &mut QueryParams) {
        query
            .append(PAGE_SIZE_PARAM, self.size_requested)
            .append_opt(NEXT_PAGE_TOKEN_PARAM, self.cursor.clone())
            .append_opt(PAGE_NUMBER_PARAM, self.page_number_fallback);
    }
}

/// One decoded page
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    pub records: Vec<T>,
    /// `None` marks the terminal page.
    pub next_cursor: Option<String>,
    pub total_records: Option<u64>,
    pub page_size: u32,
    pub page_number: Option<u32>,
    pub page_count: Option<u32>,
}

impl<T> PageResult<T> {
    pub fn new(records: Vec<T>, next_cursor: Option<String>) -> Self {
        let page_size = u32::try_from(records.len()).unwrap_or(u32::MAX);
        Self {
            records,
            next_cursor: next_cursor.filter(|c| !c.is_empty()),
            total_records: None,
            page_size,
            page_number: None,
            page_count: None,
        }
    }

    pub fn is_terminal(&self, mode: PaginationMode) -> bool {
        match mode {
            PaginationMode::Cursor => self.next_cursor.as_deref().map_or(true, str::is_empty),
            PaginationMode::PageNumber => {
                if self.records.is_empty() {
                    return true;
                }
                match (self.page_number, self.page_count) {
                    (Some(number), Some(count)) => number >= count,
                    _ => true,
                }
            }
        }
    }
}

/// Decode a list envelope:
/// `{ next_page_token, page_size, total_records, page_number, page_count, <records_key>: [...] }`.
///
/// A missing or `null` records array decodes as an empty page.
///
/// # Errors
/// Returns [`CallwireError::Decode`] if the body is not a JSON object or a
/// record does not match `T`.
pub fn decode_list_page<T: DeserializeOwned>(body: &[u8], records_key: &str) -> Result<PageResult<T>> {
    let envelope: Value = serde_json::from_slice(body)
        .map_err(|e| CallwireError::Decode(format!("invalid list envelope: {e}")))?;
    let Value::Object(mut fields) = envelope else {
        return Err(CallwireError::Decode("list envelope is not a JSON object".to_string()));
    };

    let records: Vec<T> = match fields.remove(records_key) {
        None | Some(Value::Null) => Vec::new(),
        Some(array) => serde_json::from_value(array)
            .map_err(|e| CallwireError::Decode(format!("invalid `{records_key}` records: {e}")))?,
    };

    let next_cursor = fields.get(NEXT_PAGE_TOKEN_PARAM).and_then(Value::as_str).map(String::from);
    let mut page = PageResult::new(records, next_cursor);
    if let Some(size) = fields.get(PAGE_SIZE_PARAM).and_then(Value::as_u64) {
        page.page_size = u32::try_from(size).unwrap_or(u32::MAX);
    }
    page.total_records = fields.get("total_records").and_then(Value::as_u64);
    page.page_number = read_u32(&fields, PAGE_NUMBER_PARAM);
    page.page_count = read_u32(&fields, "page_count");
    Ok(page)
}

fn read_u32(fields: &serde_json::Map<String, Value>, key: &str) -> Option<u32> {
    fields.get(key).and_then(Value::as_u64).and_then(|v| u32::try_from(v).ok())
}
