pub mod artifact;
pub mod config;
pub mod error;
pub mod language;
pub mod record;
pub mod result;
pub mod types;
pub mod validation;

pub use artifact::*;
pub use config::*;
pub use error::*;
pub use language::*;
pub use record::*;
pub use result::*;
pub use types::*;
pub use validation::*;
