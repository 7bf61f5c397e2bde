//! API handlers.

pub mod admin;
pub mod assignments;
pub mod auth;
pub mod certificates;
pub mod courses;
pub mod events;
pub mod health;
pub mod profile;
pub mod student;
