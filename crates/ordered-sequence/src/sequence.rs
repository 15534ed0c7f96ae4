use std::cmp::Ordering;
use std::fmt;
use std::ops::{Bound, Index, Range, RangeBounds};
use std::sync::Arc;

use crate::error::{Result, SequenceError};

/// Shared comparator used to order an [`OrderedSequence`].
///
/// Derived sequences (`filter`, `slice`, `map`, `concat`) share the comparator of
/// the sequence they were derived from.
pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Default ascending comparison.
///
/// Values that cannot be compared (such as `NaN`) are treated as equal.
pub fn ascending<T: PartialOrd>(a: &T, b: &T) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// An ordered sequence with a pluggable comparator and an explicit
/// sortedness flag.
///
/// While the sequence is *safe*, every adjacent pair `(a, b)` satisfies
/// `comparator(a, b) != Ordering::Greater`.
#[derive(Clone)]
pub struct OrderedSequence<T> {
    items: Vec<T>,
    comparator: Comparator<T>,
    unsafe_order: bool,
}

impl<T: PartialOrd + 'static> OrderedSequence<T> {
    /// Creates an empty sequence using ascending order.
    pub fn new() -> Self {
        Self::with_comparator(ascending::<T>)
    }

    /// Creates a sequence from `items`, sorting them in ascending order.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::from_vec_with(items, ascending::<T>)
    }

    /// Replaces the comparator without re-sorting.
    ///
    /// `None` falls back to ascending order. The safety flag is left alone:
    /// searches detect a sequence laid out against the new comparator's
    /// direction by comparing its first and last elements.
    pub fn set_comparator(&mut self, comparator: Option<Comparator<T>>) {
        self.comparator = comparator.unwrap_or_else(|| Arc::new(ascending::<T>));
    }
}

impl<T: PartialOrd + 'static> Default for OrderedSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialOrd + 'static> FromIterator<T> for OrderedSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T> OrderedSequence<T> {
    /// Creates an empty sequence ordered by `comparator`.
    pub fn with_comparator<F>(comparator: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Self {
            items: Vec::new(),
            comparator: Arc::new(comparator),
            unsafe_order: false,
        }
    }

    /// Creates a sequence from `items`, sorting them by `comparator`.
    pub fn from_vec_with<F>(items: Vec<T>, comparator: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        let mut sequence = Self {
            items,
            comparator: Arc::new(comparator),
            unsafe_order: false,
        };
        sequence.resort();
        sequence
    }

    /// The active comparator.
    pub fn comparator(&self) -> &Comparator<T> {
        &self.comparator
    }

    /// True while the sequence is guaranteed to be in comparator order.
    pub fn is_safe(&self) -> bool {
        !self.unsafe_order
    }

    /// True when an order-breaking operation ran since the last `resort()`.
    pub fn is_unsafe(&self) -> bool {
        self.unsafe_order
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// Insertion-sorts the elements in place with the active comparator and
    /// marks the sequence safe.
    ///
    /// The sort is stable, so elements the comparator considers equal keep their
    /// relative order.
    pub fn resort(&mut self) -> &mut Self {
        let comparator = Arc::clone(&self.comparator);
        for i in 1..self.items.len() {
            let mut j = i;
            while j > 0 && comparator(&self.items[j - 1], &self.items[j]) == Ordering::Greater {
                self.items.swap(j - 1, j);
                j -= 1;
            }
        }
        self.unsafe_order = false;
        self
    }

    /// Replaces the comparator and re-sorts.
    pub fn resort_with<F>(&mut self, comparator: F) -> &mut Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Arc::new(comparator);
        self.resort()
    }

    fn ensure_safe(&self, operation: &'static str) -> Result<()> {
        if self.unsafe_order {
            Err(SequenceError::unsafe_collection(operation))
        } else {
            Ok(())
        }
    }

    /// Comparator result, flipped when the elements are laid out against the
    /// comparator's direction.
    fn oriented(&self, descending: bool, a: &T, b: &T) -> Ordering {
        let ordering = (self.comparator)(a, b);
        if descending { ordering.reverse() } else { ordering }
    }

    fn is_descending(&self) -> bool {
        match (self.items.first(), self.items.last()) {
            (Some(first), Some(last)) => (self.comparator)(first, last) == Ordering::Greater,
            _ => false,
        }
    }

    /// Index range of the elements comparing equal to `value`.
    fn equal_run(&self, value: &T) -> Range<usize> {
        let descending = self.is_descending();
        let start = self
            .items
            .partition_point(|item| self.oriented(descending, item, value) == Ordering::Less);
        let end = self
            .items
            .partition_point(|item| self.oriented(descending, item, value) != Ordering::Greater);
        start..end.max(start)
    }

    /// Binary search for the right-most index holding `value`.
    pub fn search_last(&self, value: &T) -> Result<Option<usize>>
    where
        T: PartialEq,
    {
        self.ensure_safe("search_last")?;
        Ok(self.equal_run(value).rev().find(|&i| self.items[i] == *value))
    }

    /// Index of the first element of the contiguous block of `value` ending at
    /// [`Self::search_last`].
    ///
    /// Steps left only while the preceding element is `==` to `value`, so an
    /// equal element separated by a comparator-equal but different one is not
    /// reached.
    pub fn search_first(&self, value: &T) -> Result<Option<usize>>
    where
        T: PartialEq,
    {
        self.ensure_safe("search_first")?;
        let Some(mut index) = self.search_last(value)? else {
            return Ok(None);
        };
        while index > 0 && self.items[index - 1] == *value {
            index -= 1;
        }
        Ok(Some(index))
    }

    /// Inserts `value` at its ordered position and returns the index.
    ///
    /// The value lands after any elements that compare equal to it. This cannot
    /// break the order, so the safety flag is untouched.
    pub fn ordered_insert(&mut self, value: T) -> Result<usize> {
        self.ensure_safe("ordered_insert")?;
        let descending = self.is_descending();
        let index = self
            .items
            .partition_point(|item| self.oriented(descending, item, &value) != Ordering::Greater);
        self.items.insert(index, value);
        Ok(index)
    }

    /// Removes the right-most occurrence of `value`, returning its former index.
    pub fn ordered_remove(&mut self, value: &T) -> Result<Option<usize>>
    where
        T: PartialEq,
    {
        self.ensure_safe("ordered_remove")?;
        let index = self.search_last(value)?;
        if let Some(index) = index {
            self.items.remove(index);
        }
        Ok(index)
    }

    fn derive(&self, items: Vec<T>, unsafe_order: bool) -> Self {
        Self {
            items,
            comparator: Arc::clone(&self.comparator),
            unsafe_order,
        }
    }

    /// Elements matching `predicate`, in their current order. Inherits the safety flag.
    pub fn filter(&self, mut predicate: impl FnMut(&T) -> bool) -> Self
    where
        T: Clone,
    {
        let items = self.items.iter().filter(|item| predicate(item)).cloned().collect();
        self.derive(items, self.unsafe_order)
    }

    /// A copy of `range`. Inherits the safety flag.
    ///
    /// Bounds past the end are clamped to `len()`, and a start beyond the end
    /// yields an empty sequence.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Self
    where
        T: Clone,
    {
        let len = self.items.len();
        let end = match range.end_bound() {
            Bound::Included(&end) => end.saturating_add(1),
            Bound::Excluded(&end) => end,
            Bound::Unbounded => len,
        }
        .min(len);
        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start.saturating_add(1),
            Bound::Unbounded => 0,
        }
        .min(end);
        self.derive(self.items[start..end].to_vec(), self.unsafe_order)
    }

    /// Transformed copy. Always unsafe: `f` may reorder values relative to the comparator.
    pub fn map(&self, f: impl FnMut(&T) -> T) -> Self {
        let items = self.items.iter().map(f).collect();
        self.derive(items, true)
    }

    /// This sequence followed by `other`. Always unsafe.
    pub fn concat(&self, other: &[T]) -> Self
    where
        T: Clone,
    {
        let mut items = Vec::with_capacity(self.items.len() + other.len());
        items.extend_from_slice(&self.items);
        items.extend_from_slice(other);
        self.derive(items, true)
    }

    // Order-breaking operations.

    pub fn push(&mut self, value: T) {
        self.unsafe_order = true;
        self.items.push(value);
    }

    /// Appends every element of `iter`. Marks the sequence unsafe.
    pub fn append_all(&mut self, iter: impl IntoIterator<Item = T>) {
        self.unsafe_order = true;
        self.items.extend(iter);
    }

    /// Inserts every element of `iter` at the front, keeping their relative order.
    pub fn prepend(&mut self, iter: impl IntoIterator<Item = T>) {
        self.unsafe_order = true;
        let tail = std::mem::take(&mut self.items);
        self.items.extend(iter);
        self.items.extend(tail);
    }

    /// Replaces `range` with `replace_with`, returning the removed elements.
    pub fn splice<R, I>(&mut self, range: R, replace_with: I) -> Vec<T>
    where
        R: RangeBounds<usize>,
        I: IntoIterator<Item = T>,
    {
        self.unsafe_order = true;
        self.items.splice(range, replace_with).collect()
    }

    pub fn copy_within(&mut self, src: impl RangeBounds<usize>, dest: usize)
    where
        T: Copy,
    {
        self.unsafe_order = true;
        self.items.copy_within(src, dest);
    }

    pub fn reverse(&mut self) {
        self.unsafe_order = true;
        self.items.reverse();
    }

    /// Mutable access to one element. Marks the sequence unsafe since the
    /// element's sort key may change.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.unsafe_order = true;
        self.items.get_mut(index)
    }

    /// Mutable iteration. Marks the sequence unsafe.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.unsafe_order = true;
        self.items.iter_mut()
    }

    /// Applies `f` to every element in place. Marks the sequence unsafe.
    pub fn update_each(&mut self, f: impl FnMut(&mut T)) {
        self.iter_mut().for_each(f);
    }

    // Operations that cannot break the order keep the current flag.

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    pub fn pop_front(&mut self) -> Option<T> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.remove(0))
        }
    }

    /// Removes and returns the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> T {
        self.items.remove(index)
    }

    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub fn retain(&mut self, f: impl FnMut(&T) -> bool) {
        self.items.retain(f);
    }

    /// Removes every element. An empty sequence is trivially ordered.
    pub fn clear(&mut self) {
        self.items.clear();
        self.unsafe_order = false;
    }
}

impl<T> Extend<T> for OrderedSequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.append_all(iter);
    }
}

impl<T> Index<usize> for OrderedSequence<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T> AsRef<[T]> for OrderedSequence<T> {
    fn as_ref(&self) -> &[T] {
        &self.items
    }
}

impl<'a, T> IntoIterator for &'a OrderedSequence<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> IntoIterator for OrderedSequence<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderedSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedSequence")
            .field("items", &self.items)
            .field("safe", &self.is_safe())
            .finish_non_exhaustive()
    }
}
