use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult};

/// A media file filed under exactly one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: Uuid,
    pub node_id: Uuid,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

impl MediaItem {
    pub fn new(node_id: Uuid, file_name: String, actor: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            node_id,
            file_name,
            created_at: Utc::now(),
            created_by: actor,
        }
    }
}

pub fn validate_media(media: &MediaItem) -> DomainResult<()> {
    let name = media.file_name.trim();
    if name.is_empty() {
        return Err(DomainError::Validation(
            "Media file name cannot be empty".to_string(),
        ));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(DomainError::Validation(format!(
            "Media file name '{}' cannot contain path separators",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_rules() {
        let node_id = Uuid::new_v4();
        assert!(validate_media(&MediaItem::new(node_id, "photo.jpg".into(), None)).is_ok());
        assert!(validate_media(&MediaItem::new(node_id, " ".into(), None)).is_err());
        assert!(validate_media(&MediaItem::new(node_id, "a/b.jpg".into(), None)).is_err());
    }
}
