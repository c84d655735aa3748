pub mod agent;
pub mod functions;
pub mod parse;
pub mod request;
pub mod runtime;
