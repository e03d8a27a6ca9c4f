//! Shared utilities for the photo-share backend services

pub mod crypto;
pub mod database;
pub mod observability;
