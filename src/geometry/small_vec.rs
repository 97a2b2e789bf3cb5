//! Inline-first vector for short index lists.
//!
//! Faces are almost always triangles or quads, so storing their indices in a
//! `Vec` would put one heap allocation behind every face. `SmallVec` keeps up
//! to `N` elements inline and only spills to the heap when it grows past that.

use std::fmt;
use std::ops::{Deref, DerefMut};

use thiserror::Error;

/// Errors reported by the checked `SmallVec` accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SmallVecError {
    /// Checked access past the end.
    #[error("index {index} out of range for length {len}")]
    OutOfRange { index: usize, len: usize },
    /// The heap buffer could not be grown.
    #[error("out of memory while growing small vector")]
    OutOfMemory,
}

/// A sequence of `Copy` values stored inline for up to `N` elements.
///
/// Thin wrapper over [`smallvec::SmallVec`] that adds the checked accessors
/// and fallible push the mesh code relies on.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SmallVec<T, const N: usize> {
    inner: smallvec::SmallVec<[T; N]>,
}

impl<T: Copy, const N: usize> SmallVec<T, N> {
    /// Create an empty vector using the inline buffer.
    pub fn new() -> Self {
        Self {
            inner: smallvec::SmallVec::new(),
        }
    }

    /// Create a vector holding `count` copies of `value`.
    pub fn from_elem(value: T, count: usize) -> Self {
        Self {
            inner: smallvec::SmallVec::from_elem(value, count),
        }
    }

    /// Create a vector from a slice, inline when it fits.
    pub fn from_slice(values: &[T]) -> Self {
        Self {
            inner: smallvec::SmallVec::from_slice(values),
        }
    }

    /// Append a value, spilling to the heap on the first overflow.
    ///
    /// Like `Vec::push`, this aborts if the allocator fails. Use
    /// [`SmallVec::try_push`] to observe allocation failure.
    pub fn push(&mut self, value: T) {
        self.inner.push(value);
    }

    /// Append a value, reporting allocation failure instead of aborting.
    pub fn try_push(&mut self, value: T) -> Result<(), SmallVecError> {
        if self.inner.len() == self.inner.capacity() {
            self.inner
                .try_reserve(1)
                .map_err(|_| SmallVecError::OutOfMemory)?;
        }
        self.inner.push(value);
        Ok(())
    }

    /// Remove and return the last value.
    pub fn pop(&mut self) -> Option<T> {
        self.inner.pop()
    }

    /// Bounds-checked access.
    pub fn at(&self, index: usize) -> Result<&T, SmallVecError> {
        let len = self.len();
        self.inner
            .get(index)
            .ok_or(SmallVecError::OutOfRange { index, len })
    }

    /// Bounds-checked mutable access.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, SmallVecError> {
        let len = self.len();
        self.inner
            .get_mut(index)
            .ok_or(SmallVecError::OutOfRange { index, len })
    }

    /// Number of elements that fit without reallocating.
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Whether the elements currently live in the inline buffer.
    pub fn is_inline(&self) -> bool {
        !self.inner.spilled()
    }

    pub fn as_slice(&self) -> &[T] {
        self.inner.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.inner.as_mut_slice()
    }
}

impl<T, const N: usize> Deref for SmallVec<T, N> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.inner
    }
}

impl<T, const N: usize> DerefMut for SmallVec<T, N> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.inner
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for SmallVec<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Copy, const N: usize, const M: usize> From<[T; M]> for SmallVec<T, N> {
    fn from(values: [T; M]) -> Self {
        Self::from_slice(&values)
    }
}

impl<T: Copy, const N: usize> From<&[T]> for SmallVec<T, N> {
    fn from(values: &[T]) -> Self {
        Self::from_slice(values)
    }
}

impl<T, const N: usize> FromIterator<T> for SmallVec<T, N> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl<T, const N: usize> Extend<T> for SmallVec<T, N> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.inner.extend(iter);
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a SmallVec<T, N> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Small4 = SmallVec<u32, 4>;

    #[test]
    fn test_push_stays_inline_until_full() {
        let mut v = Small4::new();
        assert!(v.is_empty());
        assert_eq!(v.capacity(), 4);
        for i in 0..4 {
            v.push(i);
        }
        assert!(v.is_inline());
        assert_eq!(v.as_slice(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_push_spills_and_doubles() {
        let mut v = Small4::new();
        for i in 0..5 {
            v.push(i);
        }
        assert!(!v.is_inline());
        assert!(v.capacity() >= 8);
        assert_eq!(v.as_slice(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_try_push_matches_push() {
        let mut a = Small4::new();
        let mut b = Small4::new();
        for i in 0..9 {
            a.push(i);
            b.try_push(i).unwrap();
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_try_push_spills_past_inline_capacity() {
        let mut v = Small4::from_slice(&[1, 2, 3, 4]);
        assert!(v.is_inline());
        assert!(v.try_push(5).is_ok());
        assert!(!v.is_inline());
        assert_eq!(v.as_slice(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_from_elem_inline_and_heap() {
        let small = Small4::from_elem(7, 3);
        assert!(small.is_inline());
        assert_eq!(small.as_slice(), &[7, 7, 7]);

        let large = Small4::from_elem(2, 6);
        assert!(!large.is_inline());
        assert_eq!(large.len(), 6);
        assert!(large.iter().all(|&x| x == 2));
    }

    #[test]
    fn test_pop() {
        let mut v = Small4::from([1, 2, 3, 4, 5]);
        assert_eq!(v.pop(), Some(5));
        assert_eq!(v.len(), 4);
        let mut e = Small4::new();
        assert_eq!(e.pop(), None);
    }

    #[test]
    fn test_at_out_of_range() {
        let v = Small4::from([10, 20, 30]);
        assert_eq!(v.at(2), Ok(&30));
        assert_eq!(
            v.at(3),
            Err(SmallVecError::OutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_clone_is_independent() {
        let mut inline = Small4::from([1, 2]);
        let inline_copy = inline.clone();
        inline[0] = 99;
        assert_eq!(inline_copy.as_slice(), &[1, 2]);

        let mut heap = Small4::from([1, 2, 3, 4, 5, 6]);
        let heap_copy = heap.clone();
        heap[5] = 0;
        heap.push(7);
        assert_eq!(heap_copy.as_slice(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_move_out_of_vec_keeps_contents() {
        let faces = vec![Small4::from([0, 1, 2]), Small4::from([0, 1, 2, 3, 4])];
        let moved: Vec<Small4> = faces.into_iter().rev().collect();
        assert_eq!(moved[0].as_slice(), &[0, 1, 2, 3, 4]);
        assert_eq!(moved[1].as_slice(), &[0, 1, 2]);
    }

    #[test]
    fn test_collect() {
        let v: Small4 = (0..6).collect();
        assert_eq!(v.len(), 6);
        assert_eq!(v[5], 5);
    }
}
