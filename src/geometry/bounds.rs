use glam::Vec3;

/// An axis-aligned bounding box.
///
/// The default box is empty and inverted (`lower = +inf`, `upper = -inf`), so
/// it is the identity for [`BoundingBox::expand_to_include`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub lower: Vec3,
    pub upper: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            lower: Vec3::INFINITY,
            upper: Vec3::NEG_INFINITY,
        }
    }
}

impl BoundingBox {
    pub fn new(lower: Vec3, upper: Vec3) -> Self {
        Self { lower, upper }
    }

    /// Tightest box around `points`. Empty input gives the empty box.
    pub fn from_points(points: &[Vec3]) -> Self {
        points.iter().copied().collect()
    }

    /// Grow to cover `other`. `other` is not modified.
    pub fn expand_to_include(&mut self, other: &BoundingBox) {
        self.lower = self.lower.min(other.lower);
        self.upper = self.upper.max(other.upper);
    }

    pub fn include_point(&mut self, point: Vec3) {
        self.lower = self.lower.min(point);
        self.upper = self.upper.max(point);
    }

    /// Merged copy of two boxes.
    pub fn merged(mut self, other: &BoundingBox) -> Self {
        self.expand_to_include(other);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.lower.cmpgt(self.upper).any()
    }

    pub fn center(&self) -> Vec3 {
        (self.lower + self.upper) * 0.5
    }

    /// Length of the main diagonal, zero for an empty box.
    pub fn diagonal(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            (self.upper - self.lower).length()
        }
    }
}

impl FromIterator<Vec3> for BoundingBox {
    fn from_iter<I: IntoIterator<Item = Vec3>>(iter: I) -> Self {
        let mut bbox = Self::default();
        for p in iter {
            bbox.include_point(p);
        }
        bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxes() -> [BoundingBox; 3] {
        [
            BoundingBox::from_points(&[Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 3.0)]),
            BoundingBox::from_points(&[Vec3::new(-1.0, 0.5, 0.5), Vec3::new(0.5, 4.0, 1.0)]),
            BoundingBox::from_points(&[Vec3::new(2.0, -3.0, 0.0)]),
        ]
    }

    #[test]
    fn test_default_is_empty() {
        let bbox = BoundingBox::default();
        assert!(bbox.is_empty());
        assert_eq!(bbox.diagonal(), 0.0);
        assert_eq!(BoundingBox::from_points(&[]), bbox);
    }

    #[test]
    fn test_from_points() {
        let [a, _, _] = boxes();
        assert_eq!(a.lower, Vec3::ZERO);
        assert_eq!(a.upper, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(a.center(), Vec3::new(0.5, 1.0, 1.5));
    }

    #[test]
    fn test_merge_is_associative() {
        let [a, b, c] = boxes();
        assert_eq!(a.merged(&b).merged(&c), a.merged(&b.merged(&c)));
    }

    #[test]
    fn test_merge_is_commutative() {
        let [a, b, _] = boxes();
        assert_eq!(a.merged(&b), b.merged(&a));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let [a, _, _] = boxes();
        assert_eq!(a.merged(&a), a);
    }

    #[test]
    fn test_empty_is_identity() {
        let [a, _, _] = boxes();
        assert_eq!(BoundingBox::default().merged(&a), a);
        assert_eq!(a.merged(&BoundingBox::default()), a);
    }

    #[test]
    fn test_expand_leaves_other_untouched() {
        let [mut a, b, _] = boxes();
        let b_before = b;
        a.expand_to_include(&b);
        assert_eq!(b, b_before);
        assert_eq!(a.lower, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(a.upper, Vec3::new(1.0, 4.0, 3.0));
    }
}
