pub mod difference;
pub mod in_memory;
pub mod pricing;
pub mod ports;
pub mod reconciliation;
pub mod records;
pub mod snapshot;
pub mod value_objects;
