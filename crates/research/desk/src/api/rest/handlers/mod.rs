//! API request handlers

mod health;
mod page;
mod research;

pub use health::*;
pub use page::*;
pub use research::*;
