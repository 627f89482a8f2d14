//! Nested frame-position specifications.
//!
//! A [`PositionSpec`] is either a single frame position or an ordered group
//! of further specs, nested to any depth. [`PositionSpec::resolve`] flattens
//! it depth-first into the order frames should be fetched in, and returns a
//! [`PositionShape`] that maps every leaf to its index in that flat list.
//! [`PositionShape::rebuild`] then turns a flat list of results back into a
//! [`Nested`] value with exactly the nesting of the request.
//!
//! # Example
//!
//! ```
//! use shotframes::{Nested, PositionSpec};
//!
//! let spec = PositionSpec::group([
//!     PositionSpec::from(3),
//!     PositionSpec::from(vec![7, 8]),
//! ]);
//! let (flat, shape) = spec.resolve()?;
//! assert_eq!(flat, vec![3, 7, 8]);
//!
//! let rebuilt = shape.rebuild(vec!["a", "b", "c"])?;
//! assert_eq!(
//!     rebuilt,
//!     Nested::Group(vec![
//!         Nested::Item("a"),
//!         Nested::Group(vec![Nested::Item("b"), Nested::Item("c")]),
//!     ]),
//! );
//! # Ok::<(), shotframes::ShotFramesError>(())
//! ```

use std::ops::Range;

use serde_json::Value;

use crate::error::ShotFramesError;

/// A possibly nested description of which frames to extract.
///
/// Leaves hold `i64` so malformed (negative) input can be represented and
/// reported by [`resolve`](PositionSpec::resolve) instead of wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionSpec {
    /// A single frame position.
    Leaf(i64),
    /// An ordered sequence of specs.
    Group(Vec<PositionSpec>),
}

/// Structure of a resolved [`PositionSpec`].
///
/// A tree parallel to the request: each leaf records the index of its position
/// in the flat list, and each group records the contiguous range of flat
/// indices its descendants occupy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionShape {
    /// A leaf at `index` in the flat list.
    Leaf {
        /// Index into the flat position list.
        index: usize,
    },
    /// A group spanning `range` in the flat list.
    Group {
        /// Flat indices covered by this group's leaves.
        range: Range<usize>,
        /// Shapes of the group's children, in order.
        children: Vec<PositionShape>,
    },
}

/// A value with the same nesting as the [`PositionSpec`] that requested it.
#[derive(Debug, Clone, PartialEq)]
pub enum Nested<T> {
    /// Result for a leaf position.
    Item(T),
    /// Results for a group, in request order.
    Group(Vec<Nested<T>>),
}

impl PositionSpec {
    /// Build a group from anything convertible into specs.
    pub fn group<I, S>(children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PositionSpec>,
    {
        PositionSpec::Group(children.into_iter().map(Into::into).collect())
    }

    /// Parse an untyped JSON value.
    ///
    /// Integers become leaves and arrays become groups. Integral floats such
    /// as `3.0` are accepted as integers. Anything else, including fractional
    /// numbers such as `2.5`, is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ShotFramesError::InvalidPosition`] for a non-integral or
    /// non-numeric leaf. Negative integers are accepted here and rejected by
    /// [`resolve`](PositionSpec::resolve).
    pub fn from_json(value: &Value) -> Result<Self, ShotFramesError> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(PositionSpec::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(PositionSpec::Group),
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().and_then(integral_f64))
                .map(PositionSpec::Leaf)
                .ok_or_else(|| ShotFramesError::InvalidPosition {
                    value: number.to_string(),
                    reason: "position must be an integer".to_string(),
                }),
            other => Err(ShotFramesError::InvalidPosition {
                value: other.to_string(),
                reason: "expected an integer or an array of positions".to_string(),
            }),
        }
    }

    /// Number of leaf positions.
    pub fn leaf_count(&self) -> usize {
        match self {
            PositionSpec::Leaf(_) => 1,
            PositionSpec::Group(children) => children.iter().map(PositionSpec::leaf_count).sum(),
        }
    }

    /// Flatten depth-first.
    ///
    /// Duplicates are kept: every leaf contributes exactly one entry. Upper
    /// bounds are not checked here; the session does that against the open
    /// video's frame count.
    ///
    /// # Errors
    ///
    /// Returns [`ShotFramesError::InvalidPosition`] if any leaf is negative.
    pub fn resolve(&self) -> Result<(Vec<u64>, PositionShape), ShotFramesError> {
        let mut flat = Vec::with_capacity(self.leaf_count());
        let shape = resolve_into(self, &mut flat)?;
        Ok((flat, shape))
    }
}

fn resolve_into(spec: &PositionSpec, flat: &mut Vec<u64>) -> Result<PositionShape, ShotFramesError> {
    match spec {
        PositionSpec::Leaf(value) => {
            let position = u64::try_from(*value).map_err(|_| ShotFramesError::InvalidPosition {
                value: value.to_string(),
                reason: "position must be non-negative".to_string(),
            })?;
            let index = flat.len();
            flat.push(position);
            Ok(PositionShape::Leaf { index })
        }
        PositionSpec::Group(children) => {
            let start = flat.len();
            let children = children
                .iter()
                .map(|child| resolve_into(child, flat))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(PositionShape::Group {
                range: start..flat.len(),
                children,
            })
        }
    }
}

fn integral_f64(value: f64) -> Option<i64> {
    // Bounds exclude i64::MAX, which is not exactly representable as f64.
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

impl From<i64> for PositionSpec {
    fn from(value: i64) -> Self {
        PositionSpec::Leaf(value)
    }
}

impl TryFrom<u64> for PositionSpec {
    type Error = ShotFramesError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        i64::try_from(value)
            .map(PositionSpec::Leaf)
            .map_err(|_| ShotFramesError::InvalidPosition {
                value: value.to_string(),
                reason: "position does not fit in a signed 64-bit integer".to_string(),
            })
    }
}

impl From<i32> for PositionSpec {
    fn from(value: i32) -> Self {
        PositionSpec::Leaf(value.into())
    }
}

impl<S: Into<PositionSpec>> From<Vec<S>> for PositionSpec {
    fn from(children: Vec<S>) -> Self {
        PositionSpec::group(children)
    }
}

impl PositionShape {
    /// Number of leaves described by this shape.
    pub fn leaf_count(&self) -> usize {
        match self {
            PositionShape::Leaf { .. } => 1,
            PositionShape::Group { range, .. } => range.len(),
        }
    }

    /// Rebuild the requested nesting from flat values.
    ///
    /// `values[i]` is placed wherever the flat list had index `i`.
    ///
    /// # Errors
    ///
    /// Returns [`ShotFramesError::ShapeMismatch`] if `values` does not have
    /// exactly [`leaf_count`](PositionShape::leaf_count) elements, or if the
    /// shape's leaf indices are not the flat indices in order.
    pub fn rebuild<T>(&self, values: Vec<T>) -> Result<Nested<T>, ShotFramesError> {
        let expected = self.leaf_count();
        if values.len() != expected {
            return Err(ShotFramesError::ShapeMismatch {
                expected,
                actual: values.len(),
            });
        }
        // Leaves appear in flat-index order, so a single forward pass suffices.
        let mut values = values.into_iter().enumerate();
        let nested = self.rebuild_from(&mut values, expected)?;
        if values.next().is_some() {
            return Err(ShotFramesError::ShapeMismatch {
                expected: nested.leaf_count(),
                actual: expected,
            });
        }
        Ok(nested)
    }

    fn rebuild_from<T>(
        &self,
        values: &mut impl Iterator<Item = (usize, T)>,
        supplied: usize,
    ) -> Result<Nested<T>, ShotFramesError> {
        match self {
            PositionShape::Leaf { index } => match values.next() {
                Some((flat_index, value)) if flat_index == *index => Ok(Nested::Item(value)),
                _ => Err(ShotFramesError::ShapeMismatch {
                    expected: index + 1,
                    actual: supplied,
                }),
            },
            PositionShape::Group { children, .. } => children
                .iter()
                .map(|child| child.rebuild_from(values, supplied))
                .collect::<Result<Vec<_>, _>>()
                .map(Nested::Group),
        }
    }
}

impl<T> Nested<T> {
    /// Number of items at the leaves.
    pub fn leaf_count(&self) -> usize {
        match self {
            Nested::Item(_) => 1,
            Nested::Group(children) => children.iter().map(Nested::leaf_count).sum(),
        }
    }

    /// Borrow the leaves in depth-first order.
    pub fn leaves(&self) -> Vec<&T> {
        let mut out = Vec::with_capacity(self.leaf_count());
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a T>) {
        match self {
            Nested::Item(item) => out.push(item),
            Nested::Group(children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// Consume the value and return its leaves in depth-first order.
    pub fn flatten(self) -> Vec<T> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<T>) {
        match self {
            Nested::Item(item) => out.push(item),
            Nested::Group(children) => {
                for child in children {
                    child.flatten_into(out);
                }
            }
        }
    }

    /// Transform every leaf, keeping the nesting.
    pub fn map<U, F>(self, mut f: F) -> Nested<U>
    where
        F: FnMut(T) -> U,
    {
        self.map_with(&mut f)
    }

    fn map_with<U, F>(self, f: &mut F) -> Nested<U>
    where
        F: FnMut(T) -> U,
    {
        match self {
            Nested::Item(item) => Nested::Item(f(item)),
            Nested::Group(children) => {
                Nested::Group(children.into_iter().map(|child| child.map_with(f)).collect())
            }
        }
    }
}
