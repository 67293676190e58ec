// src/application/commands/mod.rs
//
// Command Handlers
//
// ARCHITECTURE:
// - Commands are thin adapters between callers (the CLI) and services
// - Commands accept DTOs, return DTOs
// - Commands convert every error into an ErrorResponse
// - Commands NEVER contain business logic

pub mod content_commands;
pub mod media_commands;
pub mod node_commands;

pub use content_commands::*;
pub use media_commands::*;
pub use node_commands::*;

use uuid::Uuid;

use crate::application::error_handling::{CommandResult, ErrorResponse};
use crate::domain::NodeKind;

pub(crate) fn parse_id(raw: &str, what: &str) -> CommandResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|e| ErrorResponse::validation(format!("Invalid {} id '{}': {}", what, raw, e)))
}

pub(crate) fn parse_optional_id(raw: Option<&str>, what: &str) -> CommandResult<Option<Uuid>> {
    raw.map(|raw| parse_id(raw, what)).transpose()
}

pub(crate) fn parse_kind(raw: &str) -> CommandResult<NodeKind> {
    raw.parse::<NodeKind>()
        .map_err(|_| ErrorResponse::validation(format!("Unknown node kind '{}'", raw)))
}
