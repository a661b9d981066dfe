//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod call_tool;
pub mod execute_tool;
