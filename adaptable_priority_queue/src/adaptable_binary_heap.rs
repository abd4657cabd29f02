use std::cmp::Ordering;
use std::fmt::Debug;
use std::vec::Vec;

use crate::slot_arena::SlotIndex;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub(crate) struct HeapIndex(usize);

impl HeapIndex {
    #[inline(always)]
    pub(crate) fn new(v: usize) -> Self {
        Self(v)
    }

    #[inline(always)]
    pub(crate) fn as_usize(self) -> usize {
        self.0
    }
}

/// One cell of the backing array.
///
/// Keys live inside the heap cells so comparisons never touch the arena;
/// that allows position updates to flow through `FnMut` change handlers
/// while a sift is in progress.
pub(crate) struct HeapEntry<K> {
    slot: SlotIndex,
    key: K,
}

impl<K> HeapEntry<K> {
    #[inline(always)]
    pub(crate) fn new(slot: SlotIndex, key: K) -> Self {
        Self { slot, key }
    }
}

/// Min-heap over a `Vec`, ordered by a caller-supplied comparator.
///
/// Every move of an entry is reported to the caller through a change handler
/// `FnMut(SlotIndex, HeapIndex)` so that outer bookkeeping (the slot arena)
/// can keep its position back-references current. Both sifts also call the
/// handler once for the final settled position, which covers entries that
/// were placed by a swap rather than by the sift loop itself.
pub(crate) struct BinaryHeap<K> {
    data: Vec<HeapEntry<K>>,
}

impl<K> BinaryHeap<K> {
    #[inline(always)]
    pub(crate) fn new() -> Self {
        Self { data: Vec::new() }
    }

    #[inline(always)]
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    #[inline(always)]
    pub(crate) fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional);
    }

    /// Puts slot and key in queue at the first free leaf, then restores heap
    /// order upward.
    /// Calls change_handler for every moved entry.
    #[inline(always)]
    pub(crate) fn push<C, H>(&mut self, slot: SlotIndex, key: K, compare: &C, change_handler: H)
    where
        C: Fn(&K, &K) -> Ordering,
        H: FnMut(SlotIndex, HeapIndex),
    {
        self.data.push(HeapEntry { slot, key });
        self.sift_up(self.data.len() - 1, compare, change_handler);
    }

    /// Removes the entry with the smallest key.
    /// Time complexity - O(log n) swaps and change_handler calls
    #[inline(always)]
    pub(crate) fn pop<C, H>(&mut self, compare: &C, change_handler: H) -> Option<(SlotIndex, K)>
    where
        C: Fn(&K, &K) -> Ordering,
        H: FnMut(SlotIndex, HeapIndex),
    {
        self.remove(HeapIndex(0), compare, change_handler)
    }

    #[inline(always)]
    pub(crate) fn peek(&self) -> Option<(SlotIndex, &K)> {
        self.look_into(HeapIndex(0))
    }

    /// Removes the entry at `position` and returns it.
    ///
    /// The last entry takes over the vacated position; it may have to move
    /// either direction from there, so the repair sifts up or down depending
    /// on how it compares against its new parent.
    /// Time complexity - O(log n) swaps and change_handler calls
    pub(crate) fn remove<C, H>(
        &mut self,
        position: HeapIndex,
        compare: &C,
        change_handler: H,
    ) -> Option<(SlotIndex, K)>
    where
        C: Fn(&K, &K) -> Ordering,
        H: FnMut(SlotIndex, HeapIndex),
    {
        if position.0 >= self.data.len() {
            return None;
        }
        if position.0 == self.data.len() - 1 {
            let result = self.data.pop().expect("checked by position bound");
            return Some((result.slot, result.key));
        }
        self.swap_items(position.0, self.data.len() - 1);
        let result = self.data.pop().expect("checked by position bound");
        let pos = position.0;
        if pos > 0
            && compare(&self.data[pos].key, &self.data[(pos - 1) / 2].key) == Ordering::Less
        {
            self.sift_up(pos, compare, change_handler);
        } else {
            self.sift_down(pos, compare, change_handler);
        }
        Some((result.slot, result.key))
    }

    #[inline(always)]
    pub(crate) fn look_into(&self, position: HeapIndex) -> Option<(SlotIndex, &K)> {
        let entry = self.data.get(position.0)?;
        Some((entry.slot, &entry.key))
    }

    /// Replaces the key at `position` and restores heap order, returning the
    /// old key. The sift direction follows from comparing new against old.
    pub(crate) fn change_key<C, H>(
        &mut self,
        position: HeapIndex,
        key: K,
        compare: &C,
        change_handler: H,
    ) -> K
    where
        C: Fn(&K, &K) -> Ordering,
        H: FnMut(SlotIndex, HeapIndex),
    {
        if position.0 >= self.data.len() {
            panic!("Out of index during changing key");
        }

        let old = std::mem::replace(&mut self.data[position.0].key, key);
        match compare(&self.data[position.0].key, &old) {
            Ordering::Less => {
                self.sift_up(position.0, compare, change_handler);
            }
            Ordering::Equal => {}
            Ordering::Greater => {
                self.sift_down(position.0, compare, change_handler);
            }
        }
        old
    }

    /// Builds a heap from entries in arbitrary order with O(n) bottom-up
    /// heapify. Positions of moved entries are reported through the handler;
    /// untouched entries keep the positions they were constructed with.
    pub(crate) fn from_unordered<C, H>(
        data: Vec<HeapEntry<K>>,
        compare: &C,
        mut change_handler: H,
    ) -> Self
    where
        C: Fn(&K, &K) -> Ordering,
        H: FnMut(SlotIndex, HeapIndex),
    {
        let mut heap = Self { data };
        for pos in (0..heap.data.len() / 2).rev() {
            heap.sift_down(pos, compare, &mut change_handler);
        }
        heap
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub(crate) fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline(always)]
    pub(crate) fn clear(&mut self) {
        self.data.clear()
    }

    #[inline(always)]
    pub(crate) fn iter(&self) -> BinaryHeapIterator<K> {
        BinaryHeapIterator {
            inner: self.data.iter(),
        }
    }

    fn sift_up<C, H>(&mut self, position: usize, compare: &C, mut change_handler: H)
    where
        C: Fn(&K, &K) -> Ordering,
        H: FnMut(SlotIndex, HeapIndex),
    {
        debug_assert!(position < self.data.len(), "Out of index in sift_up");
        let mut position = position;
        while position > 0 {
            let parent_pos = (position - 1) / 2;
            if compare(&self.data[position].key, &self.data[parent_pos].key) == Ordering::Less {
                self.swap_items(parent_pos, position);
                change_handler(self.data[position].slot, HeapIndex(position));
                position = parent_pos;
            } else {
                break;
            }
        }
        change_handler(self.data[position].slot, HeapIndex(position));
    }

    fn sift_down<C, H>(&mut self, position: usize, compare: &C, mut change_handler: H)
    where
        C: Fn(&K, &K) -> Ordering,
        H: FnMut(SlotIndex, HeapIndex),
    {
        debug_assert!(position < self.data.len(), "Out of index in sift_down");
        let mut position = position;
        loop {
            let min_child_idx = {
                let child1 = position * 2 + 1;
                let child2 = child1 + 1;
                if child1 >= self.data.len() {
                    break;
                }
                // On equal children either one makes a valid heap; the left
                // child is kept then.
                if child2 < self.data.len()
                    && compare(&self.data[child2].key, &self.data[child1].key) == Ordering::Less
                {
                    child2
                } else {
                    child1
                }
            };

            if compare(&self.data[min_child_idx].key, &self.data[position].key) == Ordering::Less {
                self.swap_items(position, min_child_idx);
                change_handler(self.data[position].slot, HeapIndex(position));
                position = min_child_idx;
            } else {
                break;
            }
        }
        change_handler(self.data[position].slot, HeapIndex(position));
    }

    #[inline(always)]
    fn swap_items(&mut self, pos1: usize, pos2: usize) {
        debug_assert!(pos1 < self.data.len(), "Out of index in first pos in swap");
        debug_assert!(pos2 < self.data.len(), "Out of index in second pos in swap");
        self.data.swap(pos1, pos2);
    }
}

/// Borrowing iterator over heap cells in storage (level) order.
pub(crate) struct BinaryHeapIterator<'a, K> {
    inner: std::slice::Iter<'a, HeapEntry<K>>,
}

impl<'a, K> Iterator for BinaryHeapIterator<'a, K> {
    type Item = (SlotIndex, &'a K);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| (entry.slot, &entry.key))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    #[inline]
    fn count(self) -> usize {
        self.inner.count()
    }
}

// Default implementations

impl<K: Clone> Clone for HeapEntry<K> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot,
            key: self.key.clone(),
        }
    }
}

impl<K: Copy> Copy for HeapEntry<K> {}

impl<K: Debug> Debug for HeapEntry<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{{slot: {:?}, key: {:?}}}", &self.slot, &self.key)
    }
}

impl<K: Clone> Clone for BinaryHeap<K> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
        }
    }
}

impl<K: Debug> Debug for BinaryHeap<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        self.data.fmt(f)
    }
}
