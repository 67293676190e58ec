// In-memory forest tests: the nested-set invariants after every mutation

#[cfg(test)]
mod tests {
    use crate::domain::node::{Node, NodeKind};
    use crate::domain::tree::{validate_forest, Forest, Interval};
    use crate::domain::DomainError;
    use uuid::Uuid;

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn new_node() -> Node {
        Node::new(NodeKind::Category, None)
    }

    fn bounds(forest: &Forest, id: Uuid) -> (i64, i64, i64) {
        let n = forest.get(id).unwrap();
        (n.lft, n.rgt, n.depth)
    }

    /// Exhaustive pairwise scan plus the ordered validation pass
    fn assert_well_formed(forest: &Forest) {
        let nodes = forest.nodes();
        for a in nodes {
            assert!(a.lft < a.rgt, "{} has inverted bounds", a);
            for b in nodes {
                if a.id != b.id {
                    assert!(
                        a.interval().nests_with(&b.interval()),
                        "{} and {} partially overlap",
                        a,
                        b
                    );
                }
            }
            let ancestors = forest.ancestors(a.id).unwrap();
            assert_eq!(a.depth, ancestors.len() as i64, "depth of {}", a);
        }
        validate_forest(nodes).unwrap();
    }

    /// Children exactly fill the parent's interior when no gaps were left behind
    /// Children's intervals plus the gaps between them tile `(parent.lft, parent.rgt)`
    fn assert_children_fill(forest: &Forest, parent: Uuid) {
        let p = forest.get(parent).unwrap();
        let mut next = p.lft + 1;
        for child in forest.children(parent).unwrap() {
            assert_eq!(child.lft, next, "gap before {} inside {}", child, p);
            next = child.rgt + 1;
        }
        assert_eq!(next, p.rgt, "gap after the last child of {}", p);
    }

    /// R(1,10) with children A(2,5), B(6,7), D(8,9); A has child C(3,4)
    struct Scenario {
        forest: Forest,
        r: Uuid,
        a: Uuid,
        b: Uuid,
        c: Uuid,
        d: Uuid,
    }

    fn scenario() -> Scenario {
        let mut forest = Forest::new();
        let r = forest.insert_child(new_node(), None, None).unwrap();
        let a = forest.insert_child(new_node(), Some(r), None).unwrap();
        let b = forest.insert_child(new_node(), Some(r), None).unwrap();
        let d = forest.insert_child(new_node(), Some(r), None).unwrap();
        let c = forest.insert_child(new_node(), Some(a), None).unwrap();
        Scenario { forest, r, a, b, c, d }
    }

    // ========================================================================
    // INSERT
    // ========================================================================

    #[test]
    fn test_scenario_bounds() {
        let s = scenario();
        assert_eq!(bounds(&s.forest, s.r), (1, 10, 0));
        assert_eq!(bounds(&s.forest, s.a), (2, 5, 1));
        assert_eq!(bounds(&s.forest, s.c), (3, 4, 2));
        assert_eq!(bounds(&s.forest, s.b), (6, 7, 1));
        assert_eq!(bounds(&s.forest, s.d), (8, 9, 1));
        assert_well_formed(&s.forest);
        assert_children_fill(&s.forest, s.r);
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let s = scenario();
        let children: Vec<Uuid> = s.forest.children(s.r).unwrap().iter().map(|n| n.id).collect();
        assert_eq!(children, vec![s.a, s.b, s.d]);
    }

    #[test]
    fn test_insert_after_sibling() {
        let mut s = scenario();
        let e = s.forest.insert_child(new_node(), Some(s.r), Some(s.a)).unwrap();

        let children: Vec<Uuid> = s.forest.children(s.r).unwrap().iter().map(|n| n.id).collect();
        assert_eq!(children, vec![s.a, e, s.b, s.d]);
        assert_eq!(bounds(&s.forest, e), (6, 7, 1));
        assert_well_formed(&s.forest);
    }

    #[test]
    fn test_insert_after_sibling_of_other_parent_fails() {
        let mut s = scenario();
        let result = s.forest.insert_child(new_node(), Some(s.b), Some(s.c));
        assert!(matches!(result, Err(DomainError::InvalidPosition(_))));
    }

    #[test]
    fn test_insert_under_missing_parent_fails() {
        let mut forest = Forest::new();
        let result = forest.insert_child(new_node(), Some(Uuid::new_v4()), None);
        assert!(matches!(result, Err(DomainError::NotFound(_))));
        assert!(forest.is_empty());
    }

    #[test]
    fn test_second_root_follows_first() {
        let mut s = scenario();
        let root2 = s.forest.insert_child(new_node(), None, None).unwrap();
        assert_eq!(bounds(&s.forest, root2), (11, 12, 0));
        assert_eq!(s.forest.roots().len(), 2);
        assert_well_formed(&s.forest);
    }

    // ========================================================================
    // MOVE
    // ========================================================================

    #[test]
    fn test_move_to_current_parent_is_noop() {
        let mut s = scenario();
        let before = s.forest.nodes().to_vec();

        let moved = s.forest.move_subtree(s.a, Some(s.r), None).unwrap();

        assert!(!moved);
        assert_eq!(s.forest.nodes(), before.as_slice());
    }

    #[test]
    fn test_move_into_descendant_is_rejected_unchanged() {
        let mut s = scenario();
        let before = s.forest.nodes().to_vec();

        let into_child = s.forest.move_subtree(s.a, Some(s.c), None);
        assert!(matches!(into_child, Err(DomainError::Cycle { .. })));

        let into_self = s.forest.move_subtree(s.a, Some(s.a), None);
        assert!(matches!(into_self, Err(DomainError::Cycle { .. })));

        assert_eq!(s.forest.nodes(), before.as_slice());
    }

    #[test]
    fn test_move_subtree_forward_recomputes_depth() {
        let mut s = scenario();
        assert!(s.forest.move_subtree(s.a, Some(s.d), None).unwrap());

        assert_eq!(bounds(&s.forest, s.r), (1, 10, 0));
        assert_eq!(bounds(&s.forest, s.b), (2, 3, 1));
        assert_eq!(bounds(&s.forest, s.d), (4, 9, 1));
        assert_eq!(bounds(&s.forest, s.a), (5, 8, 2));
        assert_eq!(bounds(&s.forest, s.c), (6, 7, 3));
        assert_eq!(s.forest.get(s.a).unwrap().parent_id, Some(s.d));
        assert_well_formed(&s.forest);
    }

    #[test]
    fn test_move_subtree_backward() {
        let mut s = scenario();
        assert!(s.forest.move_subtree(s.d, Some(s.c), None).unwrap());

        assert_eq!(bounds(&s.forest, s.a), (2, 7, 1));
        assert_eq!(bounds(&s.forest, s.c), (3, 6, 2));
        assert_eq!(bounds(&s.forest, s.d), (4, 5, 3));
        assert_eq!(bounds(&s.forest, s.b), (8, 9, 1));
        assert_well_formed(&s.forest);
    }

    #[test]
    fn test_reorder_with_sibling() {
        let mut s = scenario();
        assert!(s.forest.move_subtree(s.a, Some(s.r), Some(s.d)).unwrap());

        let children: Vec<Uuid> = s.forest.children(s.r).unwrap().iter().map(|n| n.id).collect();
        assert_eq!(children, vec![s.b, s.d, s.a]);
        assert_eq!(bounds(&s.forest, s.c), (7, 8, 2));
        assert_well_formed(&s.forest);
        assert_children_fill(&s.forest, s.r);
    }

    #[test]
    fn test_promote_to_root_and_back() {
        let mut s = scenario();
        let root2 = s.forest.insert_child(new_node(), None, None).unwrap();

        assert!(s.forest.move_subtree(s.a, None, Some(s.r)).unwrap());
        assert_eq!(bounds(&s.forest, s.r), (1, 6, 0));
        assert_eq!(bounds(&s.forest, s.a), (7, 10, 0));
        assert_eq!(bounds(&s.forest, root2), (11, 12, 0));
        assert!(s.forest.get(s.a).unwrap().is_root());
        assert_well_formed(&s.forest);

        assert!(s.forest.move_subtree(s.a, Some(root2), None).unwrap());
        assert_eq!(bounds(&s.forest, root2), (7, 12, 0));
        assert_eq!(bounds(&s.forest, s.c), (9, 10, 2));
        assert_well_formed(&s.forest);
    }

    #[test]
    fn test_move_after_itself_is_invalid() {
        let mut s = scenario();
        let result = s.forest.move_subtree(s.b, Some(s.r), Some(s.b));
        assert!(matches!(result, Err(DomainError::InvalidPosition(_))));
    }

    // ========================================================================
    // DELETE
    // ========================================================================

    #[test]
    fn test_delete_leaf_closes_gap() {
        let mut s = scenario();
        let removed = s.forest.delete_subtree(s.b, false).unwrap();

        assert_eq!(removed, vec![s.b]);
        assert_eq!(bounds(&s.forest, s.a), (2, 5, 1));
        assert_eq!(bounds(&s.forest, s.r), (1, 8, 0));
        assert_eq!(bounds(&s.forest, s.d), (6, 7, 1));
        assert_well_formed(&s.forest);
    }

    #[test]
    fn test_delete_with_children_requires_cascade() {
        let mut s = scenario();
        let before = s.forest.nodes().to_vec();

        let result = s.forest.delete_subtree(s.a, false);
        assert!(matches!(
            result,
            Err(DomainError::HasChildren { descendants: 1, .. })
        ));
        assert_eq!(s.forest.nodes(), before.as_slice());

        let removed = s.forest.delete_subtree(s.a, true).unwrap();
        assert_eq!(removed, vec![s.a, s.c]);
        assert_eq!(bounds(&s.forest, s.r), (1, 6, 0));
        assert_well_formed(&s.forest);
    }

    // ========================================================================
    // RANDOMISED SEQUENCES
    // ========================================================================

    /// Small deterministic generator so failures reproduce
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self, bound: usize) -> usize {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((self.0 >> 33) as usize) % bound.max(1)
        }
    }

    #[test]
    fn test_random_mutation_sequences_stay_well_formed() {
        for seed in 1..=20u64 {
            let mut rng = Lcg(seed);
            let mut forest = Forest::new();

            for _ in 0..60 {
                let ids: Vec<Uuid> = forest.nodes().iter().map(|n| n.id).collect();
                let pick = |rng: &mut Lcg| -> Option<Uuid> {
                    if ids.is_empty() || rng.next(5) == 0 {
                        None
                    } else {
                        Some(ids[rng.next(ids.len())])
                    }
                };

                match rng.next(4) {
                    0 | 1 => {
                        let parent = pick(&mut rng);
                        forest.insert_child(new_node(), parent, None).unwrap();
                    }
                    2 => {
                        if let Some(id) = pick(&mut rng) {
                            let target = pick(&mut rng);
                            let before = forest.nodes().to_vec();
                            match forest.move_subtree(id, target, None) {
                                Ok(_) => {}
                                Err(DomainError::Cycle { .. }) => {
                                    assert_eq!(forest.nodes(), before.as_slice());
                                }
                                Err(e) => panic!("unexpected move error: {}", e),
                            }
                        }
                    }
                    _ => {
                        if let Some(id) = pick(&mut rng) {
                            let cascade = rng.next(2) == 0;
                            let _ = forest.delete_subtree(id, cascade);
                        }
                    }
                }

                assert_well_formed(&forest);
                let mut next_root = 1;
                for root in forest.roots() {
                    assert_eq!(root.lft, next_root, "roots are not contiguous");
                    next_root = root.rgt + 1;
                }
                for node in forest.nodes() {
                    assert_children_fill(&forest, node.id);
                }
            }
        }
    }

    // ========================================================================
    // VALIDATION
    // ========================================================================

    #[test]
    fn test_validate_detects_partial_overlap() {
        let mut a = new_node();
        a.lft = 1;
        a.rgt = 4;
        let mut b = new_node();
        b.lft = 3;
        b.rgt = 6;
        b.depth = 1;
        b.parent_id = Some(a.id);

        let result = validate_forest(&[a, b]);
        assert!(matches!(result, Err(DomainError::InvariantViolation(_))));
    }

    #[test]
    fn test_validate_detects_wrong_depth() {
        let mut s = scenario();
        let c = s.forest.get(s.c).unwrap().clone();
        let mut nodes: Vec<Node> = s.forest.nodes().iter().filter(|n| n.id != c.id).cloned().collect();
        let mut broken = c;
        broken.depth = 1;
        nodes.push(broken);

        assert!(validate_forest(&nodes).is_err());
        assert!(s.forest.delete_subtree(s.c, false).is_ok());
    }

    #[test]
    fn test_validate_detects_shared_bound() {
        let mut a = new_node();
        a.lft = 1;
        a.rgt = 2;
        let mut b = new_node();
        b.lft = 2;
        b.rgt = 3;

        assert!(validate_forest(&[a, b]).is_err());
        assert!(Interval::new(1, 2).nests_with(&Interval::new(3, 4)));
    }
}
