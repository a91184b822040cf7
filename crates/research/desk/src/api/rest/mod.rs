//! REST API: page, research events and health

pub mod extract;
pub mod handlers;
pub mod router;
pub mod state;
