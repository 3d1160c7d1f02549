//! API Routes
//!
//! Route handlers organized by functionality.

pub mod charts;
pub mod controls;
pub mod health;
