use super::entity::{Node, NodeKind};
use crate::domain::{DomainError, DomainResult};

/// Validates the per-node invariants (position-independent ones included)
pub fn validate_node(node: &Node) -> DomainResult<()> {
    if node.lft >= node.rgt {
        return Err(DomainError::InvariantViolation(format!(
            "Node {} has lft {} >= rgt {}",
            node.id, node.lft, node.rgt
        )));
    }
    if node.depth < 0 {
        return Err(DomainError::InvariantViolation(format!(
            "Node {} has negative depth {}",
            node.id, node.depth
        )));
    }
    if node.is_root() != (node.depth == 0) {
        return Err(DomainError::InvariantViolation(format!(
            "Node {} has depth {} but parent {:?}",
            node.id, node.depth, node.parent_id
        )));
    }
    validate_key(node.key.as_deref())?;
    if node.kind == NodeKind::Category && (node.collection_type.is_some() || node.style.is_some()) {
        return Err(DomainError::Validation(
            "Categories cannot carry a collection type or style".to_string(),
        ));
    }
    if let Some(style) = &node.style {
        if !style.is_object() {
            return Err(DomainError::Validation(
                "Collection style must be a JSON object".to_string(),
            ));
        }
    }
    Ok(())
}

/// A key, when present, cannot be blank or contain whitespace
pub fn validate_key(key: Option<&str>) -> DomainResult<()> {
    if let Some(key) = key {
        if key.trim().is_empty() || key.chars().any(char::is_whitespace) {
            return Err(DomainError::Validation(format!(
                "Node key '{}' must be non-empty and contain no whitespace",
                key
            )));
        }
    }
    Ok(())
}

/// Invariants that must hold true for every node:
///
/// 1. lft < rgt
/// 2. depth equals the number of strict ancestors (checked per forest)
/// 3. roots, and only roots, have depth 0 and no parent
/// 4. key is unique per kind when present (enforced by the store)
/// 5. collection type and style only exist on collections

#[cfg(test)]
mod tests {
    use super::*;

    fn positioned(kind: NodeKind) -> Node {
        let mut node = Node::new(kind, None);
        node.lft = 1;
        node.rgt = 2;
        node
    }

    #[test]
    fn test_valid_root() {
        assert!(validate_node(&positioned(NodeKind::Category)).is_ok());
        assert!(validate_node(&positioned(NodeKind::Collection)).is_ok());
    }

    #[test]
    fn test_inverted_bounds_fail() {
        let mut node = positioned(NodeKind::Category);
        node.rgt = 1;
        assert!(validate_node(&node).is_err());
    }

    #[test]
    fn test_depth_parent_mismatch_fails() {
        let mut node = positioned(NodeKind::Category);
        node.depth = 1;
        assert!(validate_node(&node).is_err());
    }

    #[test]
    fn test_key_rules() {
        assert!(validate_key(Some("news")).is_ok());
        assert!(validate_key(Some("  ")).is_err());
        assert!(validate_key(Some("two words")).is_err());
        assert!(validate_key(None).is_ok());
    }

    #[test]
    fn test_category_cannot_have_style() {
        let mut node = positioned(NodeKind::Category);
        node.style = Some(serde_json::json!({ "type": "circle" }));
        assert!(validate_node(&node).is_err());
    }
}
