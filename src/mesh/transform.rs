//! Registry of geometric-transform direction vectors.

use crate::float_types::Real;
use nalgebra::Vector3;
use std::collections::BTreeMap;

/// Decimal places kept when canonicalizing a direction vector.
const KEY_DECIMALS: i32 = 3;

/// Key type: a direction vector quantized to fixed precision, so that
/// collinear/parallel element directions collapse onto one key.
type DirectionKey = [i64; 3];

fn quantize(direction: &Vector3<Real>) -> DirectionKey {
    let scale = (10.0 as Real).powi(KEY_DECIMALS);
    [
        (direction.x * scale).round() as i64,
        (direction.y * scale).round() as i64,
        (direction.z * scale).round() as i64,
    ]
}

fn dequantize(key: &DirectionKey) -> Vector3<Real> {
    let scale = (10.0 as Real).powi(KEY_DECIMALS);
    Vector3::new(
        key[0] as Real / scale,
        key[1] as Real / scale,
        key[2] as Real / scale,
    )
}

/// Mapping from canonicalized out-of-plane direction vectors to integer
/// transform tags.
///
/// Tags are assigned monotonically from 1 and never reused; all elements
/// whose directions agree within the fixed rounding share one tag, which
/// minimizes the number of transform definitions the downstream solver has
/// to emit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformRegistry {
    map: BTreeMap<DirectionKey, usize>,
    counter: usize,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag for `direction`, inserting a fresh one if the direction has not
    /// been seen before.
    pub fn tag_for(&mut self, direction: &Vector3<Real>) -> usize {
        let key = quantize(direction);
        if let Some(&tag) = self.map.get(&key) {
            return tag;
        }
        self.counter += 1;
        self.map.insert(key, self.counter);
        self.counter
    }

    /// Tag already assigned to `direction`, if any.
    pub fn tag_of(&self, direction: &Vector3<Real>) -> Option<usize> {
        self.map.get(&quantize(direction)).copied()
    }

    /// Number of distinct transform tags.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Highest tag assigned so far.
    pub const fn counter(&self) -> usize {
        self.counter
    }

    /// Iterate `(direction, tag)` pairs in deterministic key order, with
    /// the direction restored to its canonical fixed-precision value.
    pub fn iter(&self) -> impl Iterator<Item = (Vector3<Real>, usize)> + '_ {
        self.map.iter().map(|(key, &tag)| (dequantize(key), tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_directions_share_a_tag() {
        let mut reg = TransformRegistry::new();
        let a = reg.tag_for(&Vector3::new(0.0, 0.0, -1.0));
        let b = reg.tag_for(&Vector3::new(0.0, 0.0, -1.0000004));
        assert_eq!(a, b);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn distinct_directions_get_distinct_tags() {
        let mut reg = TransformRegistry::new();
        let a = reg.tag_for(&Vector3::new(0.0, 0.0, -1.0));
        let b = reg.tag_for(&Vector3::new(1.0, 0.0, 0.0));
        assert_ne!(a, b);
        assert_eq!(reg.counter(), 2);
    }
}
