//! Per-user usage report (`GET /report/users`)
//!
//! The report endpoint is page-numbered and only accepts windows of at most
//! 30 days.

use callwire_core::PagedEndpoint;
use callwire_domain::{wire_enum, DateWindow, PageWindow, PaginationMode, RequestDescriptor, Result};
use chrono::NaiveDate;
use serde::Deserialize;

wire_enum! {
    pub enum ReportUserType {
        Active => "active",
        Inactive => "inactive",
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserUsage {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub meetings: u32,
    #[serde(default)]
    pub meeting_minutes: u64,
}

/// Page-numbered usage report over a bounded date window
#[derive(Debug, Clone)]
pub struct UsageReport {
    window: DateWindow,
    user_type: Option<ReportUserType>,
}

impl UsageReport {
    /// # Errors
    /// Returns a validation error if `from > to` or the span exceeds 30 days.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        Ok(Self { window: DateWindow::within_default_span(from, to)?, user_type: None })
    }

    #[must_use]
    pub fn user_type(mut self, user_type: ReportUserType) -> Self {
        self.user_type = Some(user_type);
        self
    }

    pub fn window(&self) -> &DateWindow {
        &self.window
    }
}

impl PagedEndpoint for UsageReport {
    type Record = UserUsage;

    fn records_key(&self) -> &str {
        "users"
    }

    fn pagination_mode(&self) -> PaginationMode {
        PaginationMode::PageNumber
    }

    fn build_page_request(&self, window: &PageWindow) -> Result<RequestDescriptor> {
        RequestDescriptor::get()
            .segment("report")
            .segment("users")
            .with_query(|q| {
                self.window.apply_to(q);
                q.append_enum_opt("type", self.user_type);
                window.apply_to(q);
            })
            .build()
    }
}
