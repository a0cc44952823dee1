pub mod context;
pub mod script;
pub mod types;
