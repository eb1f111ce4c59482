//! Application state and the collaborators that feed it: records, persistence, uploads and the catalogue API.

pub mod api;
pub mod recipe;
pub mod state;
pub mod storage;
pub mod upload;
