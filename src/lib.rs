pub mod actor;
pub mod apps;
pub mod common;
pub mod sys;
