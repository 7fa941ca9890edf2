pub mod ordering;
pub mod repository;
pub mod service;
