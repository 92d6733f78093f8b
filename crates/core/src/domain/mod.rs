//! Records read from the ERP resource endpoints.
//!
//! Field names follow the ERP wire format so the records deserialize directly
//! from `{"data": [...]}` payloads. Anything the ERP may leave blank is an
//! `Option`.

pub mod customer;
pub mod serial;
pub mod staff;
pub mod territory;

pub use customer::{AddressLink, Customer};
pub use serial::{IssueTableRow, SerialNumber};
pub use staff::{Employee, ServicePerson};
pub use territory::Territory;
