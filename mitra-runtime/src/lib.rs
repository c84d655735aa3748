pub mod agent_backend;
pub mod config_store;
pub mod defaults;
pub mod fs_util;
pub mod functions_backend;
pub mod history;
pub mod router;
pub mod runtime_backends;
pub mod secrets;
pub mod simulated;
pub mod tables;
