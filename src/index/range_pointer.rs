use crate::KeyType;

use super::node::NodeId;

/// A half-open key range `[ge, lt)` of a node, which may own one child node.
///
/// Either bound can be absent, which makes the range unbounded on that side.
/// A range without any bound is dead and does not contain any value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangePointer<K> {
    ge: Option<K>,
    lt: Option<K>,
    is_boundary: bool,
    pub(crate) child: Option<NodeId>,
    owner: NodeId,
}

impl<K> RangePointer<K>
where
    K: KeyType,
{
    pub(crate) fn new(owner: NodeId) -> RangePointer<K> {
        RangePointer {
            ge: None,
            lt: None,
            is_boundary: false,
            child: None,
            owner,
        }
    }

    /// Changes the bounds and the boundary flag.
    ///
    /// Only the parts given as `Some` are modified, the others keep their value.
    pub fn set_range(
        &mut self,
        ge: Option<K>,
        lt: Option<K>,
        is_boundary: Option<bool>,
    ) -> &mut Self {
        if ge.is_some() {
            self.ge = ge;
        }
        if lt.is_some() {
            self.lt = lt;
        }
        if let Some(is_boundary) = is_boundary {
            self.is_boundary = is_boundary;
        }
        self
    }

    /// Returns whether the value is inside `[ge, lt)`.
    pub fn in_range(&self, value: &K) -> bool {
        match (&self.ge, &self.lt) {
            (None, None) => false,
            (Some(ge), None) => value >= ge,
            (None, Some(lt)) => value < lt,
            (Some(ge), Some(lt)) => value >= ge && value < lt,
        }
    }

    /// Inclusive lower bound.
    pub fn ge(&self) -> Option<&K> {
        self.ge.as_ref()
    }

    /// Exclusive upper bound.
    pub fn lt(&self) -> Option<&K> {
        self.lt.as_ref()
    }

    /// True for the unbounded ranges at the far left and far right of a node.
    pub fn is_boundary(&self) -> bool {
        self.is_boundary
    }

    /// The node owned by this range, if any.
    pub fn child(&self) -> Option<NodeId> {
        self.child
    }

    /// The node this range belongs to.
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// Creates the ranges for the given key sequence of a node.
    ///
    /// The keys are used in the order they are given. A single key results
    /// in one range on each side of it, otherwise each key after the first one
    /// adds a range to the previous key and an open range starting at the key,
    /// which gives `2n - 1` ranges for `n` keys.
    pub(crate) fn generate(owner: NodeId, keys: &[K]) -> Vec<RangePointer<K>> {
        let mut result = Vec::with_capacity((2 * keys.len()).saturating_sub(1).max(2));
        let last = keys.len().saturating_sub(1);
        for (i, key) in keys.iter().enumerate() {
            if i == 0 {
                let mut left = RangePointer::new(owner);
                left.set_range(None, Some(key.clone()), Some(true));
                result.push(left);
                if keys.len() == 1 {
                    let mut right = RangePointer::new(owner);
                    right.set_range(Some(key.clone()), None, Some(true));
                    result.push(right);
                }
            } else {
                let mut between = RangePointer::new(owner);
                between.set_range(Some(keys[i - 1].clone()), Some(key.clone()), None);
                result.push(between);

                let mut open = RangePointer::new(owner);
                open.set_range(Some(key.clone()), None, Some(i == last));
                result.push(open);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pointer(ge: Option<i64>, lt: Option<i64>) -> RangePointer<i64> {
        let mut p = RangePointer::new(NodeId(0));
        p.set_range(ge, lt, None);
        p
    }

    #[test]
    fn dead_pointer_matches_nothing() {
        let p = pointer(None, None);
        for v in [i64::MIN, -1, 0, 1, i64::MAX] {
            assert_eq!(false, p.in_range(&v));
        }
    }

    #[test]
    fn half_open_bounds() {
        let p = pointer(Some(3), Some(5));
        assert_eq!(false, p.in_range(&2));
        assert_eq!(true, p.in_range(&3));
        assert_eq!(true, p.in_range(&4));
        assert_eq!(false, p.in_range(&5));

        let left = pointer(None, Some(3));
        assert_eq!(true, left.in_range(&i64::MIN));
        assert_eq!(false, left.in_range(&3));

        let right = pointer(Some(3), None);
        assert_eq!(false, right.in_range(&2));
        assert_eq!(true, right.in_range(&i64::MAX));
    }

    #[test]
    fn empty_interval_is_not_normalized() {
        // Bounds in the wrong order are kept as they are
        let p = pointer(Some(5), Some(3));
        for v in 0..10 {
            assert_eq!(false, p.in_range(&v));
        }
    }

    #[test]
    fn set_range_keeps_unspecified_parts() {
        let mut p = pointer(Some(1), Some(10));
        p.set_range(None, Some(20), Some(true));
        assert_eq!(Some(&1), p.ge());
        assert_eq!(Some(&20), p.lt());
        assert_eq!(true, p.is_boundary());
        p.set_range(Some(2), None, None);
        assert_eq!(Some(&2), p.ge());
        assert_eq!(Some(&20), p.lt());
        assert_eq!(true, p.is_boundary());
    }

    #[test]
    fn generate_single_key() {
        let pointers = RangePointer::generate(NodeId(4), &[7]);
        assert_eq!(2, pointers.len());
        assert_eq!((None, Some(&7)), (pointers[0].ge(), pointers[0].lt()));
        assert_eq!((Some(&7), None), (pointers[1].ge(), pointers[1].lt()));
        assert!(pointers.iter().all(|p| p.is_boundary()));
        assert!(pointers.iter().all(|p| p.owner() == NodeId(4)));
    }

    #[test]
    fn generate_multiple_keys() {
        let pointers = RangePointer::generate(NodeId(0), &[5, 6, 7]);
        let bounds: Vec<_> = pointers
            .iter()
            .map(|p| (p.ge().copied(), p.lt().copied(), p.is_boundary()))
            .collect();
        assert_eq!(
            vec![
                (None, Some(5), true),
                (Some(5), Some(6), false),
                (Some(6), None, false),
                (Some(6), Some(7), false),
                (Some(7), None, true),
            ],
            bounds
        );
    }

    #[test]
    fn generate_without_keys() {
        assert!(RangePointer::<i64>::generate(NodeId(0), &[]).is_empty());
    }
}
