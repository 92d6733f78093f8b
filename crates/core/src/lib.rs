pub mod config;
pub mod domain;
pub mod email;
pub mod errors;
pub mod forms;
pub mod warranty;
pub mod zonal;

pub use domain::{
    AddressLink, Customer, Employee, IssueTableRow, SerialNumber, ServicePerson, Territory,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use forms::{FormFields, IssuePayload, WarrantyClaimPayload};
pub use warranty::WarrantyStatus;
pub use zonal::{ZonalInputs, ZonalManagerMap};
