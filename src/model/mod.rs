//! Core data model: the decoded message record and the page geometry.

pub mod geometry;
pub mod message;
