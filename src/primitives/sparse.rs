//! Sparse vector over a fixed logical dimension.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StreamlearnError};

/// Finite-dimension real vector where unset entries are implicitly zero.
///
/// Only non-zero entries are stored: writing exactly `0.0` (directly, by
/// accumulation, or through [`SparseVector::retain_map`]) removes the
/// entry, so [`SparseVector::norm_l0`] always equals the stored count.
/// Entries are kept in index order, which makes iteration deterministic
/// and restartable.
///
/// # Example
///
/// ```
/// use streamlearn::primitives::SparseVector;
///
/// let mut v = SparseVector::new(10);
/// v.set(3, 2.0).unwrap();
/// v.accumulate(7, -1.5).unwrap();
///
/// assert_eq!(v.get(3), 2.0);
/// assert_eq!(v.get(4), 0.0);
/// assert_eq!(v.norm_l0(), 2.0);
/// assert_eq!(v.norm_l1(), 3.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SparseVectorRaw")]
pub struct SparseVector {
    dimension: usize,
    entries: BTreeMap<usize, f64>,
}

/// Wire form of [`SparseVector`], checked before it becomes one.
#[derive(Deserialize)]
struct SparseVectorRaw {
    dimension: usize,
    entries: BTreeMap<usize, f64>,
}

impl TryFrom<SparseVectorRaw> for SparseVector {
    type Error = StreamlearnError;

    fn try_from(raw: SparseVectorRaw) -> Result<Self> {
        SparseVector::from_pairs(raw.dimension, raw.entries)
    }
}

impl SparseVector {
    /// Creates an all-zero vector of the given logical dimension.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: BTreeMap::new(),
        }
    }

    /// Builds a vector from `(index, value)` pairs.
    ///
    /// Later pairs overwrite earlier ones with the same index.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfBounds` if any index is `>= dimension`.
    pub fn from_pairs<I>(dimension: usize, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        let mut v = Self::new(dimension);
        for (index, value) in pairs {
            v.set(index, value)?;
        }
        Ok(v)
    }

    /// Builds a vector from a dense slice, storing only non-zero values.
    #[must_use]
    pub fn from_dense(values: &[f64]) -> Self {
        let entries = values
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0.0)
            .map(|(i, &v)| (i, v))
            .collect();
        Self {
            dimension: values.len(),
            entries,
        }
    }

    /// Logical dimension `d`; valid indices are `[0, d)`.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored (non-zero) entries.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no entry is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value at `index`, `0.0` when unset or out of range. Never errors.
    #[must_use]
    pub fn get(&self, index: usize) -> f64 {
        self.entries.get(&index).copied().unwrap_or(0.0)
    }

    /// Sets the value at `index`. Setting `0.0` removes the entry.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfBounds` if `index >= dimension`.
    pub fn set(&mut self, index: usize, value: f64) -> Result<()> {
        self.check_index(index)?;
        if value == 0.0 {
            self.entries.remove(&index);
        } else {
            self.entries.insert(index, value);
        }
        Ok(())
    }

    /// Adds `delta` to the value at `index`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfBounds` if `index >= dimension`.
    pub fn accumulate(&mut self, index: usize, delta: f64) -> Result<()> {
        self.check_index(index)?;
        if delta == 0.0 {
            return Ok(());
        }
        match self.entries.entry(index) {
            btree_map::Entry::Occupied(mut slot) => {
                let updated = *slot.get() + delta;
                if updated == 0.0 {
                    slot.remove();
                } else {
                    *slot.get_mut() = updated;
                }
            }
            btree_map::Entry::Vacant(slot) => {
                slot.insert(delta);
            }
        }
        Ok(())
    }

    /// Removes every entry, keeping the dimension.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of non-zero entries, as a float for symmetry with the other norms.
    #[must_use]
    pub fn norm_l0(&self) -> f64 {
        self.entries.len() as f64
    }

    /// Sum of absolute values.
    #[must_use]
    pub fn norm_l1(&self) -> f64 {
        self.entries.values().map(|v| v.abs()).sum()
    }

    /// Euclidean norm.
    #[must_use]
    pub fn norm_l2(&self) -> f64 {
        self.squared_norm().sqrt()
    }

    /// Largest absolute value, `0.0` for the empty vector.
    #[must_use]
    pub fn norm_linf(&self) -> f64 {
        self.entries.values().fold(0.0, |acc, v| acc.max(v.abs()))
    }

    /// Sum of squared values.
    #[must_use]
    pub fn squared_norm(&self) -> f64 {
        self.entries.values().map(|v| v * v).sum()
    }

    /// Iterates `(index, value)` pairs in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().map(|(&i, &v)| (i, v))
    }

    /// Iterates set indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.keys().copied()
    }

    /// Inner product over the shared support.
    ///
    /// Walks the sparser operand and probes the other, so the cost is
    /// bounded by the smaller non-zero count.
    #[must_use]
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (small, large) = if self.nnz() <= other.nnz() {
            (self, other)
        } else {
            (other, self)
        };
        small.iter().map(|(i, v)| v * large.get(i)).sum()
    }

    /// `||self - other||^2` without materializing the difference.
    #[must_use]
    pub fn squared_distance(&self, other: &SparseVector) -> f64 {
        let cross = self.dot(other);
        (self.squared_norm() + other.squared_norm() - 2.0 * cross).max(0.0)
    }

    /// Multiplies every stored value by `factor`.
    pub fn scale(&mut self, factor: f64) {
        if factor == 0.0 {
            self.entries.clear();
            return;
        }
        for v in self.entries.values_mut() {
            *v *= factor;
        }
        self.entries.retain(|_, v| *v != 0.0);
    }

    /// Replaces each stored value with `f(value)`, dropping results equal to zero.
    pub fn retain_map<F>(&mut self, mut f: F)
    where
        F: FnMut(f64) -> f64,
    {
        self.entries.retain(|_, v| {
            *v = f(*v);
            *v != 0.0
        });
    }

    /// Copy with one extra trailing dimension holding `value`.
    ///
    /// Used to append a constant bias feature at index `dimension`.
    #[must_use]
    pub fn augmented(&self, value: f64) -> SparseVector {
        let mut out = SparseVector {
            dimension: self.dimension + 1,
            entries: self.entries.clone(),
        };
        if value != 0.0 {
            out.entries.insert(self.dimension, value);
        }
        out
    }

    /// Dense copy of the vector.
    #[must_use]
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dimension];
        for (i, v) in self.iter() {
            dense[i] = v;
        }
        dense
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.dimension {
            return Err(StreamlearnError::IndexOutOfBounds {
                index,
                dimension: self.dimension,
            });
        }
        Ok(())
    }
}
