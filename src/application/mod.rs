//! Application services layer.

pub mod admin;
pub mod bilingual;
pub mod content;
pub mod error;
pub mod repos;
pub mod retry;
