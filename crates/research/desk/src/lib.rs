//! Research Desk library
//!
//! Web front end for a human-in-the-loop research workflow:
//! - Per-user research sessions with idle expiry
//! - Workflow gateway over a [`research_graph::ResearchGraph`]
//! - Screen model and Markdown rendering
//! - REST API and server lifecycle

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod server;
pub mod session;
pub mod sweeper;
pub mod ui;

pub use config::{DeskConfig, Deployment, EngineConfig};
pub use error::{ApiError, DeskError, DeskResult};
pub use gateway::{GatewayError, SegmentOutcome, WorkflowGateway};
pub use server::Server;
pub use session::{OpenedSession, SessionRecord, SessionStore};
