use serde::{Deserialize, Serialize};

/// Closed nested-set interval `[left, right]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub left: i64,
    pub right: i64,
}

impl Interval {
    pub fn new(left: i64, right: i64) -> Self {
        Self { left, right }
    }

    /// Number of bound values the interval occupies (2 per node inside it)
    pub fn width(&self) -> i64 {
        self.right - self.left + 1
    }

    /// Strict containment: `other` lies inside and is not `self`
    pub fn contains(&self, other: &Interval) -> bool {
        self.left < other.left && other.right < self.right
    }

    /// `other` is `self` or lies inside it
    pub fn encloses(&self, other: &Interval) -> bool {
        self.left <= other.left && other.right <= self.right
    }

    pub fn is_disjoint(&self, other: &Interval) -> bool {
        self.right < other.left || other.right < self.left
    }

    /// Disjoint or nested, never partially overlapping
    pub fn nests_with(&self, other: &Interval) -> bool {
        self.is_disjoint(other) || self.encloses(other) || other.encloses(self)
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.left, self.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_containment() {
        let outer = Interval::new(1, 10);
        let inner = Interval::new(3, 4);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(!outer.contains(&outer));
        assert!(outer.encloses(&outer));
        assert_eq!(outer.width(), 10);
    }

    #[test]
    fn test_partial_overlap_does_not_nest() {
        let a = Interval::new(1, 4);
        let b = Interval::new(3, 6);
        assert!(!a.nests_with(&b));
        assert!(a.nests_with(&Interval::new(5, 6)));
        assert!(a.nests_with(&Interval::new(2, 3)));
    }
}
