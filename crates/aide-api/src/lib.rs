//! aide-api: wire types and HTTP clients for Aide's external collaborators
//!
//! This crate covers the two services the conversational core talks to: the
//! LLM completion endpoint (task refinement mode) and the task/subtask
//! persistence endpoint. Shapes here match the collaborator contracts
//! bit-exactly; everything tolerant or stateful lives in `aide-chat`.

pub mod client;
pub mod error;
pub mod types;

pub use client::{RefineClient, TaskClient};
pub use error::{Error, Result};
pub use types::*;
