//! Contact search (`GET /contacts`)

use callwire_core::PagedEndpoint;
use callwire_domain::{wire_enum, ListStyle, PageWindow, RequestDescriptor, Result};
use serde::Deserialize;

wire_enum! {
    /// Which directory to search.
    pub enum ContactType {
        Company => "company",
        External => "external",
    }
}

wire_enum! {
    pub enum PresenceStatus {
        Available => "Available",
        Away => "Away",
        DoNotDisturb => "Do_Not_Disturb",
        InMeeting => "In_Meeting",
        Offline => "Offline",
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Contact {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub presence_status: Option<PresenceStatus>,
}

/// Cursor-paged contact listing
#[derive(Debug, Clone, Default)]
pub struct ListContacts {
    pub contact_type: Option<ContactType>,
    pub query_presence_status: Option<bool>,
    /// Restrict to these addresses; sent as one comma-joined value.
    pub emails: Vec<String>,
}

impl ListContacts {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contact_type(mut self, contact_type: ContactType) -> Self {
        self.contact_type = Some(contact_type);
        self
    }

    #[must_use]
    pub fn with_presence(mut self, enabled: bool) -> Self {
        self.query_presence_status = Some(enabled);
        self
    }

    #[must_use]
    pub fn emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emails = emails.into_iter().map(Into::into).collect();
        self
    }
}

impl PagedEndpoint for ListContacts {
    type Record = Contact;

    fn records_key(&self) -> &str {
        "contacts"
    }

    fn build_page_request(&self, window: &PageWindow) -> Result<RequestDescriptor> {
        RequestDescriptor::get()
            .segment("contacts")
            .with_query(|q| {
                q.append_enum_opt("type", self.contact_type)
                    .append_opt("query_presence_status", self.query_presence_status)
                    .append_list("emails", self.emails.iter().map(String::as_str), ListStyle::Csv);
                window.apply_to(q);
            })
            .build()
    }
}
