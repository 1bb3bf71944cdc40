//! Port traits separating domain logic from infrastructure.

pub mod config_port;
pub mod data_port;
pub mod report_port;
