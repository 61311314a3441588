pub mod error;
pub mod form;
pub mod job;
pub mod settings;
