//! Domain models shared across the custom-fields service.

pub mod custom_field;
pub mod hierarchy;
pub mod ledger;
pub mod search;
pub mod sheet;

pub use custom_field::{keys, CustomField, FIELD_TYPE_MASTER_LIST};
pub use hierarchy::HierarchyNode;
pub use ledger::EnablementRecord;
pub use search::{SearchCriteria, SearchResult};
pub use sheet::{SheetData, SheetRow};
