//! Null-aware ordering for group keys

use std::cmp::Ordering;

/// `Option` ordered with `None` after every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NullsLast<T>(pub Option<T>);

impl<T: Ord> Ord for NullsLast<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl<T: Ord> PartialOrd for NullsLast<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_sorts_last() {
        let mut keys = vec![NullsLast(None), NullsLast(Some("b")), NullsLast(Some("a"))];
        keys.sort();
        assert_eq!(
            keys,
            vec![NullsLast(Some("a")), NullsLast(Some("b")), NullsLast(None)]
        );
    }

    #[test]
    fn tuple_keys_compare_lexicographically() {
        let a = (NullsLast(Some("Kenya")), NullsLast(None::<&str>));
        let b = (NullsLast(Some("Kenya")), NullsLast(Some("tokyo-2020")));
        let c = (NullsLast(None), NullsLast(Some("athens-1896")));
        assert!(b < a);
        assert!(a < c);
    }
}
