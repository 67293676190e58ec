// src/services/aggregate_service_tests.rs
//
// Breadcrumbs, counters and the aggregate cache

#[cfg(test)]
mod aggregate_service_tests {
    use tempfile::TempDir;

    use crate::application::AppState;
    use crate::config::StoreConfig;
    use crate::domain::{Aggregates, DescendantKind, NewTranslation, Node, NodeKind};
    use crate::services::{
        AggregateService, AttachMediaRequest, CreateNodeRequest, MoveNodeRequest, TreeService,
    };

    struct Fixture {
        _dir: TempDir,
        state: AppState,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let config = StoreConfig::with_database(dir.path().join("canopy.db"));
            let state = AppState::initialize(&config).unwrap();
            Self { _dir: dir, state }
        }

        fn tree(&self) -> &TreeService {
            &self.state.tree_service
        }

        fn aggregates(&self) -> &AggregateService {
            &self.state.aggregate_service
        }

        fn collection(&self, parent: Option<&Node>, translation: Option<NewTranslation>) -> Node {
            let mut request = CreateNodeRequest::new(NodeKind::Collection, parent.map(|p| p.id));
            request.translation = translation;
            self.tree().create_node(request).unwrap()
        }

        fn attach(&self, node: &Node, file_name: &str) {
            self.tree()
                .attach_media(AttachMediaRequest {
                    node_id: node.id,
                    file_name: file_name.to_string(),
                    actor: None,
                })
                .unwrap();
        }
    }

    #[test]
    fn test_breadcrumb_resolves_titles_root_first() {
        let fx = Fixture::new();
        let root = fx.collection(None, Some(NewTranslation::new("de", "Wurzel")));
        let middle = fx.collection(Some(&root), None);
        let leaf = fx.collection(Some(&middle), Some(NewTranslation::new("en", "Leaf")));

        let crumbs = fx.aggregates().build_breadcrumb(leaf.id, "en").unwrap();

        assert_eq!(crumbs.len(), 2);
        assert_eq!(crumbs[0].id, root.id);
        // falls back to the root's default locale
        assert_eq!(crumbs[0].title.as_deref(), Some("Wurzel"));
        assert_eq!(crumbs[1].id, middle.id);
        assert_eq!(crumbs[1].title, None);

        assert!(fx.aggregates().build_breadcrumb(root.id, "en").unwrap().is_empty());
    }

    #[test]
    fn test_counts() {
        let fx = Fixture::new();
        let root = fx.collection(None, None);
        let a = fx.collection(Some(&root), None);
        let b = fx.collection(Some(&root), None);
        let _c = fx.collection(Some(&a), None);
        fx.attach(&root, "cover.jpg");
        fx.attach(&a, "1.jpg");
        fx.attach(&b, "2.jpg");
        fx.attach(&b, "3.jpg");

        let service = fx.aggregates();
        assert_eq!(service.count_direct_children(root.id).unwrap(), 2);
        assert_eq!(
            service
                .count_descendants_of_kind(root.id, DescendantKind::Node)
                .unwrap(),
            3
        );
        assert_eq!(
            service
                .count_descendants_of_kind(root.id, DescendantKind::Media)
                .unwrap(),
            4
        );
        assert_eq!(
            service
                .count_descendants_of_kind(b.id, DescendantKind::Media)
                .unwrap(),
            2
        );

        assert_eq!(
            service.aggregates(root.id).unwrap(),
            Aggregates {
                child_count: 2,
                descendant_count: 3,
                media_count: 1,
                subtree_media_count: 4,
            }
        );
    }

    #[test]
    fn test_media_events_invalidate_ancestor_chain() {
        let fx = Fixture::new();
        let root = fx.collection(None, None);
        let child = fx.collection(Some(&root), None);
        let sibling = fx.collection(None, None);

        for node in [&root, &child, &sibling] {
            fx.aggregates().aggregates(node.id).unwrap();
            assert!(fx.aggregates().is_cached(node.id));
        }

        fx.attach(&child, "photo.jpg");

        assert!(!fx.aggregates().is_cached(root.id));
        assert!(!fx.aggregates().is_cached(child.id));
        assert!(fx.aggregates().is_cached(sibling.id));
        assert_eq!(
            fx.aggregates().aggregates(root.id).unwrap().subtree_media_count,
            1
        );
    }

    #[test]
    fn test_move_invalidates_old_and_new_chains() {
        let fx = Fixture::new();
        let left = fx.collection(None, None);
        let right = fx.collection(None, None);
        let moving = fx.collection(Some(&left), None);
        fx.attach(&moving, "a.jpg");

        assert_eq!(fx.aggregates().aggregates(left.id).unwrap().child_count, 1);
        assert_eq!(fx.aggregates().aggregates(right.id).unwrap().child_count, 0);

        fx.tree()
            .move_node(MoveNodeRequest {
                node_id: moving.id,
                new_parent_id: Some(right.id),
                after_sibling_id: None,
                actor: None,
            })
            .unwrap();

        let left = fx.aggregates().aggregates(left.id).unwrap();
        let right = fx.aggregates().aggregates(right.id).unwrap();
        assert_eq!((left.child_count, left.subtree_media_count), (0, 0));
        assert_eq!((right.child_count, right.subtree_media_count), (1, 1));
    }

    #[test]
    fn test_delete_drops_removed_entries() {
        let fx = Fixture::new();
        let root = fx.collection(None, None);
        let child = fx.collection(Some(&root), None);
        fx.aggregates().aggregates(child.id).unwrap();

        fx.tree().delete_node(child.id, false).unwrap();

        assert!(!fx.aggregates().is_cached(child.id));
        assert!(fx.aggregates().aggregates(child.id).is_err());
        assert_eq!(fx.aggregates().aggregates(root.id).unwrap(), Aggregates::default());
    }

    #[test]
    fn test_view() {
        let fx = Fixture::new();
        let root = fx.collection(None, Some(NewTranslation::new("en", "Root")));
        let node = fx.collection(
            Some(&root),
            Some(
                NewTranslation::new("en", "Trips")
                    .with_description("All trips")
                    .with_keywords(["travel"]),
            ),
        );
        let child = fx.collection(Some(&node), Some(NewTranslation::new("en", "Alps")));
        fx.attach(&child, "peak.jpg");

        let view = fx.aggregates().view(node.id, "de").unwrap();

        assert_eq!(view.node.id, node.id);
        assert_eq!(view.locale, "de");
        assert_eq!(view.resolved_locale.as_deref(), Some("en"));
        assert_eq!(view.title.as_deref(), Some("Trips"));
        assert_eq!(view.description.as_deref(), Some("All trips"));
        assert_eq!(view.keywords, vec!["travel".to_string()]);
        assert!(!view.locked);
        assert_eq!(view.breadcrumb.len(), 1);
        assert_eq!(view.breadcrumb[0].title.as_deref(), Some("Root"));
        assert_eq!(view.parent.map(|p| p.id), Some(root.id));
        assert_eq!(view.children.len(), 1);
        assert_eq!(view.children[0].title.as_deref(), Some("Alps"));
        assert!(!view.children[0].has_children);
        assert_eq!(view.aggregates.subtree_media_count, 1);
    }
}
