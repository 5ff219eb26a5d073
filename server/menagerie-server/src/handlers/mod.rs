//! HTTP handlers, one module per resource

pub mod admin;
pub mod animals;
pub mod auth;
pub mod health;
pub mod zoos;
