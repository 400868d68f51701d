//! End-to-end tests for the construction flow, read path, and CLI.

pub mod cli_test;
pub mod construction_flow_test;
pub mod properties_test;
pub mod reader_test;
