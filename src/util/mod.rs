//! Utility modules for privilege checks and tool invocation.

pub mod privilege;
pub mod system;
