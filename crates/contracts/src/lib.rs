//! Shared types for the CMS backend and its clients.

pub mod domain;
pub mod shared;
pub mod system;
pub mod usecases;
