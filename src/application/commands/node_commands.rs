// src/application/commands/node_commands.rs
//
// Node Command Handlers
//
// RULES:
// - Accept DTOs
// - Call services
// - Return DTOs
// - Never contain business logic

use crate::application::dto::*;
use crate::application::error_handling::{CommandResult, ErrorResponse};
use crate::application::state::AppState;
use crate::domain::locale::resolve_translation;
use crate::domain::NewTranslation;
use crate::services::{CreateNodeRequest, MoveNodeRequest, UpdateNodeRequest};

use super::{parse_id, parse_kind, parse_optional_id};

/// Create a node, optionally with its first translation
pub fn create_node(state: &AppState, dto: CreateNodeDto) -> CommandResult<NodeDto> {
    let kind = parse_kind(&dto.kind)?;

    let translation = match (dto.locale, dto.title) {
        (Some(locale), Some(title)) => {
            let mut translation = NewTranslation::new(locale, title).with_keywords(dto.keywords);
            translation.description = dto.description;
            Some(translation)
        }
        (None, None) => None,
        _ => {
            return Err(ErrorResponse::validation(
                "An initial translation needs both a locale and a title",
            ))
        }
    };

    let request = CreateNodeRequest {
        kind,
        parent_id: parse_optional_id(dto.parent_id.as_deref(), "parent")?,
        after_sibling_id: parse_optional_id(dto.after_sibling_id.as_deref(), "sibling")?,
        key: dto.key,
        translation,
        collection_type: dto.collection_type,
        style: None,
        actor: None,
    };

    let node = state.tree_service.create_node(request)?;
    Ok(NodeDto::from(node))
}

/// Move a node; with no parent it becomes the last root
pub fn move_node(state: &AppState, dto: MoveNodeDto) -> CommandResult<NodeDto> {
    let request = MoveNodeRequest {
        node_id: parse_id(&dto.node_id, "node")?,
        new_parent_id: parse_optional_id(dto.parent_id.as_deref(), "parent")?,
        after_sibling_id: parse_optional_id(dto.after_sibling_id.as_deref(), "sibling")?,
        actor: None,
    };
    let node = state.tree_service.move_node(request)?;
    Ok(NodeDto::from(node))
}

/// Change key, collection type or default locale
pub fn update_node(state: &AppState, dto: UpdateNodeDto) -> CommandResult<NodeDto> {
    let request = UpdateNodeRequest {
        node_id: parse_id(&dto.node_id, "node")?,
        key: dto.key.map(Some),
        collection_type: dto.collection_type,
        default_locale: dto.default_locale.map(Some),
        ..Default::default()
    };
    let node = state.tree_service.update_node(request)?;
    Ok(NodeDto::from(node))
}

/// Delete a node; returns the ids of every removed node
pub fn delete_node(state: &AppState, node_id: &str, cascade: bool) -> CommandResult<Vec<String>> {
    let id = parse_id(node_id, "node")?;
    let removed = state.tree_service.delete_node(id, cascade)?;
    Ok(removed.into_iter().map(|id| id.to_string()).collect())
}

pub fn get_node(state: &AppState, node_id: &str) -> CommandResult<NodeDto> {
    let id = parse_id(node_id, "node")?;
    Ok(NodeDto::from(state.tree_service.get_node(id)?))
}

pub fn get_node_by_key(state: &AppState, kind: &str, key: &str) -> CommandResult<NodeDto> {
    let kind = parse_kind(kind)?;
    state
        .tree_service
        .get_node_by_key(kind, key)?
        .map(NodeDto::from)
        .ok_or_else(|| ErrorResponse::not_found(&format!("{} '{}'", kind, key)))
}

pub fn get_children(state: &AppState, node_id: &str) -> CommandResult<Vec<NodeDto>> {
    let id = parse_id(node_id, "node")?;
    let children = state.tree_service.get_children(id)?;
    Ok(children.into_iter().map(NodeDto::from).collect())
}

/// Whole forest in pre-order with titles in `locale`
pub fn get_tree(state: &AppState, kind: &str, locale: &str) -> CommandResult<Vec<TreeLineDto>> {
    let kind = parse_kind(kind)?;
    let nodes = state.tree_service.list_forest(kind)?;

    nodes
        .into_iter()
        .map(|node| -> CommandResult<TreeLineDto> {
            let content = state.tree_service.get_content(node.id)?;
            Ok(TreeLineDto {
                id: node.id.to_string(),
                key: node.key.clone(),
                title: resolve_translation(&content, locale, true).map(|t| t.title.clone()),
                depth: node.depth,
                lft: node.lft,
                rgt: node.rgt,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::error_handling::ErrorType;
    use crate::config::StoreConfig;

    fn state() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::with_database(dir.path().join("canopy.db"));
        let state = AppState::initialize(&config).unwrap();
        (dir, state)
    }

    #[test]
    fn test_create_and_render_tree() {
        let (_dir, state) = state();
        let root = create_node(
            &state,
            CreateNodeDto {
                kind: "category".to_string(),
                key: Some("root".to_string()),
                locale: Some("en".to_string()),
                title: Some("Root".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        create_node(
            &state,
            CreateNodeDto {
                kind: "category".to_string(),
                parent_id: Some(root.id.clone()),
                locale: Some("en".to_string()),
                title: Some("News".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let lines = get_tree(&state, "category", "en").unwrap();
        let titles: Vec<_> = lines.iter().map(|l| l.title.clone().unwrap()).collect();
        assert_eq!(titles, vec!["Root", "News"]);
        assert_eq!(lines[1].depth, 1);

        assert_eq!(get_node_by_key(&state, "category", "root").unwrap().id, root.id);
    }

    #[test]
    fn test_bad_input_is_validation_error() {
        let (_dir, state) = state();
        let err = get_node(&state, "not-a-uuid").unwrap_err();
        assert_eq!(err.error_type, ErrorType::Validation);

        let err = create_node(
            &state,
            CreateNodeDto {
                kind: "page".to_string(),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(err.error_type, ErrorType::Validation);

        let err = create_node(
            &state,
            CreateNodeDto {
                kind: "category".to_string(),
                title: Some("No locale".to_string()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(err.error_type, ErrorType::Validation);
    }

    #[test]
    fn test_delete_with_children_is_conflict() {
        let (_dir, state) = state();
        let root = create_node(
            &state,
            CreateNodeDto {
                kind: "collection".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        create_node(
            &state,
            CreateNodeDto {
                kind: "collection".to_string(),
                parent_id: Some(root.id.clone()),
                ..Default::default()
            },
        )
        .unwrap();

        let err = delete_node(&state, &root.id, false).unwrap_err();
        assert_eq!(err.error_type, ErrorType::Conflict);
        assert_eq!(delete_node(&state, &root.id, true).unwrap().len(), 2);
    }

    #[test]
    fn test_update_default_locale() {
        let (_dir, state) = state();
        let node = create_node(
            &state,
            CreateNodeDto {
                kind: "category".to_string(),
                locale: Some("de".to_string()),
                title: Some("Titel".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(node.default_locale.as_deref(), Some("de"));

        let updated = update_node(
            &state,
            UpdateNodeDto {
                node_id: node.id.clone(),
                default_locale: Some("en".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.default_locale.as_deref(), Some("en"));

        let err = update_node(
            &state,
            UpdateNodeDto {
                node_id: node.id,
                default_locale: Some("not a locale".to_string()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(err.error_type, ErrorType::Validation);
    }
}
