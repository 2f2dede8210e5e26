//! Reference resource adapters
//!
//! Each adapter only builds a [`RequestDescriptor`](callwire_domain::RequestDescriptor)
//! and decodes its payload; the executor and paginator do the rest.
//!
//! - [`contacts`]: cursor-paged contact search with enum and CSV filters
//! - [`reports`]: page-numbered usage report over a bounded date window
//! - [`users`]: single-user lookup and no-content mutations

pub mod contacts;
pub mod reports;
pub mod users;

pub use contacts::{Contact, ContactType, ListContacts, PresenceStatus};
pub use reports::{ReportUserType, UsageReport, UserUsage};
pub use users::{DeleteAction, DeleteUser, GetUser, UpdateUser, User, UserPatch};
