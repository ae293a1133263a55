pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod repository;
pub mod scheduler;
pub mod service;

#[cfg(test)]
mod testing;
