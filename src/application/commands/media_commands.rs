// src/application/commands/media_commands.rs
//
// Media Command Handlers

use crate::application::dto::*;
use crate::application::error_handling::CommandResult;
use crate::application::state::AppState;
use crate::services::AttachMediaRequest;

use super::parse_id;

pub fn attach_media(state: &AppState, dto: AttachMediaDto) -> CommandResult<MediaDto> {
    let request = AttachMediaRequest {
        node_id: parse_id(&dto.node_id, "node")?,
        file_name: dto.file_name,
        actor: None,
    };
    let media = state.tree_service.attach_media(request)?;
    Ok(MediaDto::from(media))
}

pub fn detach_media(state: &AppState, media_id: &str) -> CommandResult<()> {
    let id = parse_id(media_id, "media")?;
    state.tree_service.detach_media(id)?;
    Ok(())
}

pub fn list_media(state: &AppState, node_id: &str) -> CommandResult<Vec<MediaDto>> {
    let id = parse_id(node_id, "node")?;
    let media = state.tree_service.list_media(id)?;
    Ok(media.into_iter().map(MediaDto::from).collect())
}
