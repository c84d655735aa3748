pub mod capture;
pub mod exchange;
pub mod render;
pub mod session;
pub mod traits;
