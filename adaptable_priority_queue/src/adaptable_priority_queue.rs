use std::cmp::Ordering;
use std::fmt::{Debug, Display};

use crate::adaptable_binary_heap::{BinaryHeap, BinaryHeapIterator, HeapEntry, HeapIndex};
use crate::slot_arena::{EntryId, SlotArena};

/// An adaptable priority queue over caller-ordered keys.
///
/// The queue is a min-heap under the comparator supplied at construction:
/// [`pop`] always returns the entry whose key compares smallest. There is no
/// default ordering; the comparator is the single injected behavior and must
/// be a consistent total order, or the queue's behavior is unspecified.
///
/// What makes the queue *adaptable* is the [`EntryId`] handle returned by
/// [`push`]: the queue tracks where every entry currently lives in the
/// backing array, so an arbitrary entry can be removed or re-keyed through
/// its handle in ***O(log n)*** without searching. Handles are
/// generation-checked, so a handle whose entry has left the queue fails
/// softly instead of touching a later entry that reused the storage.
///
/// Keys need not be unique, hashable, or cloneable.
///
/// [`push`]: AdaptablePriorityQueue::push
/// [`pop`]: AdaptablePriorityQueue::pop
///
/// # Examples
///
/// ## Main example
/// ```
/// use adaptable_priority_queue::AdaptablePriorityQueue;
///
/// let mut queue = AdaptablePriorityQueue::new(|a: &i32, b: &i32| a.cmp(b));
///
/// // Currently queue is empty
/// assert_eq!(queue.peek(), None);
///
/// queue.push(5, "five");
/// let three = queue.push(3, "three");
/// queue.push(8, "eight");
/// let one = queue.push(1, "one");
/// queue.push(4, "four");
///
/// // Peek returns references to the minimum pair.
/// assert_eq!(queue.peek(), Some((&1, &"one")));
/// assert_eq!(queue.len(), 5);
///
/// // Handles survive reordering; this one still finds its entry.
/// assert_eq!(queue.get(three), Some((&3, &"three")));
///
/// // Re-key an arbitrary entry in place...
/// assert_eq!(queue.set_key(three, 9), Ok(3));
/// // ...or remove one outright.
/// assert_eq!(queue.remove(one), Some((1, "one")));
///
/// // Popping drains in ascending key order.
/// assert_eq!(queue.pop(), Some((4, "four")));
/// assert_eq!(queue.pop(), Some((5, "five")));
/// assert_eq!(queue.pop(), Some((8, "eight")));
/// assert_eq!(queue.pop(), Some((9, "three")));
/// assert_eq!(queue.pop(), None);
/// ```
///
/// ## Float keys
///
/// Keys only need whatever ordering the comparator provides, so `f64` works
/// without a wrapper type as long as the caller rules out NaN:
///
/// ```
/// use adaptable_priority_queue::AdaptablePriorityQueue;
///
/// let mut queue = AdaptablePriorityQueue::new(|a: &f64, b: &f64| {
///     a.partial_cmp(b).expect("keys are never NaN")
/// });
/// queue.push(0.5, "half");
/// queue.push(0.25, "quarter");
/// assert_eq!(queue.pop(), Some((0.25, "quarter")));
/// assert_eq!(queue.pop(), Some((0.5, "half")));
/// assert_eq!(queue.pop(), None);
/// ```
#[derive(Clone)]
pub struct AdaptablePriorityQueue<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    heap: BinaryHeap<K>,
    slots: SlotArena<V>,
    compare: C,
}

impl<K, V, C> AdaptablePriorityQueue<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    /// Creates an empty queue ordered by `compare`.
    ///
    /// ### Examples
    ///
    ///
    /// ```
    /// use adaptable_priority_queue::AdaptablePriorityQueue;
    /// let mut queue = AdaptablePriorityQueue::new(|a: &u32, b: &u32| a.cmp(b));
    /// queue.push(4, "entry");
    /// ```
    #[inline]
    pub fn new(compare: C) -> Self {
        Self {
            heap: BinaryHeap::new(),
            slots: SlotArena::new(),
            compare,
        }
    }

    /// Creates an empty queue with allocated memory enough
    /// to keep `capacity` elements without reallocation.
    ///
    /// ### Examples
    ///
    ///
    /// ```
    /// use adaptable_priority_queue::AdaptablePriorityQueue;
    /// let mut queue = AdaptablePriorityQueue::with_capacity(10, |a: &u32, b: &u32| a.cmp(b));
    /// queue.push(4, "entry");
    /// ```
    #[inline]
    pub fn with_capacity(capacity: usize, compare: C) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            slots: SlotArena::with_capacity(capacity),
            compare,
        }
    }

    /// Builds a queue from key-value pairs in ***O(n)*** by bottom-up
    /// heapify. Duplicate keys are all kept; this is not a map.
    ///
    /// ### Examples
    ///
    ///
    /// ```
    /// use adaptable_priority_queue::AdaptablePriorityQueue;
    /// let queue = AdaptablePriorityQueue::from_iter_with(
    ///     |a: &i32, b: &i32| a.cmp(b),
    ///     vec![(3, "c"), (1, "a"), (2, "b"), (1, "a2")],
    /// );
    /// assert_eq!(queue.len(), 4);
    /// let keys: Vec<i32> = queue.into_iter().map(|(k, _)| k).collect();
    /// assert_eq!(keys, vec![1, 1, 2, 3]);
    /// ```
    pub fn from_iter_with<I>(compare: C, iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let iter = iter.into_iter();
        let min_size = iter.size_hint().0;
        let mut slots = SlotArena::with_capacity(min_size);
        let mut entries: Vec<HeapEntry<K>> = Vec::with_capacity(min_size);
        for (key, value) in iter {
            let id = slots.insert(value, HeapIndex::new(entries.len()));
            entries.push(HeapEntry::new(id.slot(), key));
        }

        let slots_ref = &mut slots;
        let heap = BinaryHeap::from_unordered(entries, &compare, |slot, pos| {
            slots_ref.set_heap_pos(slot, pos)
        });
        Self {
            heap,
            slots,
            compare,
        }
    }

    /// Reserves space for at least `additional` new elements.
    ///
    /// Growth moves entries to new storage but never changes their array
    /// positions, so outstanding handles are unaffected.
    ///
    /// ### Panics
    ///
    /// Panics if the new capacity overflows `usize`.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        self.heap.reserve(additional);
        self.slots.reserve(additional);
    }

    /// Adds a new entry to the queue and returns its handle.
    ///
    /// Always succeeds; duplicate keys coexist.
    ///
    /// ### Examples
    ///
    ///
    /// ```
    /// use adaptable_priority_queue::AdaptablePriorityQueue;
    /// let mut queue = AdaptablePriorityQueue::new(|a: &i32, b: &i32| a.cmp(b));
    /// let id = queue.push(7, "payload");
    /// assert_eq!(queue.get(id), Some((&7, &"payload")));
    /// ```
    ///
    /// ### Time complexity
    ///
    /// Average complexity is ***O(log n)***.
    /// If elements are pushed in ascending order, amortized complexity
    /// is ***O(1)***.
    ///
    /// The worst case is when reallocation appears.
    /// In this case complexity of single call is ***O(n)***.
    pub fn push(&mut self, key: K, value: V) -> EntryId {
        // Borrow checker treats borrowing a field as borrowing whole structure
        // so we need to get references to fields to borrow them individually.
        let heap = &mut self.heap;
        let slots = &mut self.slots;
        let compare = &self.compare;

        let id = slots.insert(value, HeapIndex::new(heap.len()));
        heap.push(id.slot(), key, compare, |slot, pos| {
            slots.set_heap_pos(slot, pos)
        });
        id
    }

    /// Removes and returns the entry with the minimal key.
    ///
    /// The entry's handle goes stale. Returns `None` on an empty queue,
    /// without side effects.
    ///
    /// ### Examples
    ///
    ///
    /// ```
    /// use adaptable_priority_queue::AdaptablePriorityQueue;
    /// let mut queue = AdaptablePriorityQueue::from_iter_with(
    ///     |a: &i32, b: &i32| a.cmp(b),
    ///     (0..5).map(|x| (x, x)),
    /// );
    /// assert_eq!(queue.pop(), Some((0, 0)));
    /// assert_eq!(queue.pop(), Some((1, 1)));
    /// assert_eq!(queue.pop(), Some((2, 2)));
    /// assert_eq!(queue.pop(), Some((3, 3)));
    /// assert_eq!(queue.pop(), Some((4, 4)));
    /// assert_eq!(queue.pop(), None);
    /// ```
    ///
    /// ### Time complexity
    ///
    /// Cost of pop is always ***O(log n)***
    pub fn pop(&mut self) -> Option<(K, V)> {
        let heap = &mut self.heap;
        let slots = &mut self.slots;
        let compare = &self.compare;

        let (slot, key) = heap.pop(compare, |slot, pos| slots.set_heap_pos(slot, pos))?;
        let value = slots.remove(slot);
        Some((key, value))
    }

    /// Gets references to the minimal entry's key and value without
    /// modifying the queue.
    ///
    /// ### Examples
    ///
    ///
    /// ```
    /// use adaptable_priority_queue::AdaptablePriorityQueue;
    /// let mut queue = AdaptablePriorityQueue::new(|a: &i32, b: &i32| a.cmp(b));
    /// assert_eq!(queue.peek(), None);
    /// queue.push(10, "x");
    /// assert_eq!(queue.peek(), Some((&10, &"x")));
    /// ```
    ///
    /// ### Time complexity
    ///
    /// Always ***O(1)***
    pub fn peek(&self) -> Option<(&K, &V)> {
        let (slot, key) = self.heap.peek()?;
        Some((key, self.slots.value_of(slot)))
    }

    /// Gets the handle of the minimal entry.
    ///
    /// ### Examples
    ///
    ///
    /// ```
    /// use adaptable_priority_queue::AdaptablePriorityQueue;
    /// let mut queue = AdaptablePriorityQueue::new(|a: &i32, b: &i32| a.cmp(b));
    /// let id = queue.push(1, "min");
    /// queue.push(2, "other");
    /// assert_eq!(queue.peek_id(), Some(id));
    /// ```
    ///
    /// ### Time complexity
    ///
    /// Always ***O(1)***
    pub fn peek_id(&self) -> Option<EntryId> {
        let (slot, _) = self.heap.peek()?;
        Some(self.slots.id_of(slot))
    }

    /// Gets references to the key and value behind a handle, or `None` if
    /// the handle is stale.
    ///
    /// ### Time complexity
    ///
    /// Always ***O(1)***
    pub fn get(&self, id: EntryId) -> Option<(&K, &V)> {
        let heap_pos = self.slots.resolve(id)?;
        let (slot, key) = self
            .heap
            .look_into(heap_pos)
            .expect("resolved handles point into the heap");
        debug_assert_eq!(slot, id.slot());
        Some((key, self.slots.value_of(slot)))
    }

    /// Current index of the entry in the backing array, or `None` if the
    /// handle is stale. Index 0 is the minimum; children of index `i` sit at
    /// `2i + 1` and `2i + 2`. The index is only stable until the next
    /// mutating operation.
    ///
    /// ### Time complexity
    ///
    /// Always ***O(1)***
    #[inline]
    pub fn position(&self, id: EntryId) -> Option<usize> {
        Some(self.slots.resolve(id)?.as_usize())
    }

    /// Returns true if the handle still refers to a live entry.
    ///
    /// ### Time complexity
    ///
    /// Always ***O(1)***
    #[inline]
    pub fn contains(&self, id: EntryId) -> bool {
        self.slots.resolve(id).is_some()
    }

    /// Replaces the key of the entry behind a handle and reorders the queue.
    /// Returns the old key if the handle is live, or
    /// [`SetKeyNotFoundError`] if it is stale.
    ///
    /// ### Examples
    ///
    ///
    /// ```
    /// use adaptable_priority_queue::{AdaptablePriorityQueue, SetKeyNotFoundError};
    /// let mut queue = AdaptablePriorityQueue::new(|a: &i32, b: &i32| a.cmp(b));
    /// queue.push(1, "first");
    /// let id = queue.push(2, "second");
    /// assert_eq!(queue.set_key(id, 0), Ok(2));
    /// assert_eq!(queue.peek(), Some((&0, &"second")));
    /// assert_eq!(queue.pop(), Some((0, "second")));
    /// // The handle went stale together with its entry.
    /// assert_eq!(queue.set_key(id, 5), Err(SetKeyNotFoundError {}));
    /// ```
    ///
    /// ### Time complexity
    ///
    /// In best case ***O(1)***, in average costs ***O(log n)***.
    #[inline]
    pub fn set_key(&mut self, id: EntryId, key: K) -> Result<K, SetKeyNotFoundError> {
        let heap = &mut self.heap;
        let slots = &mut self.slots;
        let compare = &self.compare;

        let heap_pos = match slots.resolve(id) {
            Some(pos) => pos,
            None => return Err(SetKeyNotFoundError {}),
        };
        Ok(heap.change_key(heap_pos, key, compare, |slot, pos| {
            slots.set_heap_pos(slot, pos)
        }))
    }

    /// Removes an arbitrary entry through its handle.
    /// Returns the key-value pair, or `None` if the handle is stale.
    ///
    /// ### Examples
    ///
    ///
    /// ```
    /// use adaptable_priority_queue::AdaptablePriorityQueue;
    /// let mut queue = AdaptablePriorityQueue::new(|a: &i32, b: &i32| a.cmp(b));
    /// queue.push(1, "keep");
    /// let id = queue.push(2, "drop");
    /// queue.push(3, "keep too");
    /// assert_eq!(queue.remove(id), Some((2, "drop")));
    /// assert_eq!(queue.remove(id), None);
    /// assert_eq!(queue.len(), 2);
    /// ```
    ///
    /// ### Time complexity
    ///
    /// On average the function will require ***O(log n)*** operations.
    pub fn remove(&mut self, id: EntryId) -> Option<(K, V)> {
        let heap = &mut self.heap;
        let slots = &mut self.slots;
        let compare = &self.compare;

        let heap_pos = slots.resolve(id)?;
        let (slot, key) = heap
            .remove(heap_pos, compare, |slot, pos| slots.set_heap_pos(slot, pos))
            .expect("resolved handles point into the heap");
        debug_assert_eq!(slot, id.slot());
        let value = slots.remove(slot);
        Some((key, value))
    }

    /// Get the number of entries in queue.
    ///
    /// ### Examples
    ///
    ///
    /// ```
    /// use adaptable_priority_queue::AdaptablePriorityQueue;
    /// let queue = AdaptablePriorityQueue::from_iter_with(
    ///     |a: &i32, b: &i32| a.cmp(b),
    ///     (0..5).map(|x| (x, x)),
    /// );
    /// assert_eq!(queue.len(), 5);
    /// ```
    ///
    /// ### Time complexity
    ///
    /// Always ***O(1)***
    #[inline]
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.heap.len(), self.slots.live());
        self.heap.len()
    }

    /// Returns true if queue is empty.
    ///
    /// ```
    /// let mut queue = adaptable_priority_queue::AdaptablePriorityQueue::new(
    ///     |a: &i32, b: &i32| a.cmp(b),
    /// );
    /// assert!(queue.is_empty());
    /// queue.push(0, 5);
    /// assert!(!queue.is_empty());
    /// ```
    ///
    /// ### Time complexity
    ///
    /// Always ***O(1)***
    #[inline]
    pub fn is_empty(&self) -> bool {
        debug_assert_eq!(self.heap.is_empty(), self.slots.live() == 0);
        self.heap.is_empty()
    }

    /// Make the queue empty. Every outstanding handle goes stale.
    ///
    /// ```
    /// use adaptable_priority_queue::AdaptablePriorityQueue;
    /// let mut queue = AdaptablePriorityQueue::new(|a: &i32, b: &i32| a.cmp(b));
    /// let id = queue.push(1, 1);
    /// queue.clear();
    /// assert!(queue.is_empty());
    /// assert_eq!(queue.get(id), None);
    /// ```
    ///
    /// ### Time complexity
    ///
    /// Always ***O(n)***
    #[inline]
    pub fn clear(&mut self) {
        self.heap.clear();
        self.slots.clear();
    }

    /// Create readonly borrowing iterator over the backing array in storage
    /// (level) order: the first entry is the minimum, the rest follow the
    /// heap layout rather than the sorted order.
    ///
    /// ```
    /// use adaptable_priority_queue::AdaptablePriorityQueue;
    /// let queue = AdaptablePriorityQueue::from_iter_with(
    ///     |a: &i32, b: &i32| a.cmp(b),
    ///     vec![(3, "c"), (1, "a"), (2, "b")],
    /// );
    /// let mut seen: Vec<i32> = queue.iter().map(|(&k, _)| k).collect();
    /// assert_eq!(seen.first(), Some(&1));
    /// seen.sort_unstable();
    /// assert_eq!(seen, vec![1, 2, 3]);
    /// ```
    ///
    /// ### Time complexity
    ///
    /// Iterating over whole queue is ***O(n)***
    pub fn iter(&self) -> AdaptablePriorityQueueBorrowIter<K, V> {
        AdaptablePriorityQueueBorrowIter {
            heap_iterator: self.heap.iter(),
            slots: &self.slots,
        }
    }
}

impl<K, V, C> Debug for AdaptablePriorityQueue<K, V, C>
where
    K: Debug,
    V: Debug,
    C: Fn(&K, &K) -> Ordering,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "[")?;
        for entry in self.iter() {
            write!(f, "{:?}", entry)?;
        }
        write!(f, "]")
    }
}

impl<K, V, C> IntoIterator for AdaptablePriorityQueue<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    type Item = (K, V);
    type IntoIter = AdaptablePriorityQueueIterator<K, V, C>;

    /// Make iterator that returns entries in ascending key order.
    ///
    /// ### Examples
    ///
    ///
    /// ```
    /// use adaptable_priority_queue::AdaptablePriorityQueue;
    /// let queue = AdaptablePriorityQueue::from_iter_with(
    ///     |a: &i32, b: &i32| a.cmp(b),
    ///     vec![(2, "second"), (0, "first"), (5, "third")],
    /// );
    /// let mut iterator = queue.into_iter();
    /// assert_eq!(iterator.next(), Some((0, "first")));
    /// assert_eq!(iterator.next(), Some((2, "second")));
    /// assert_eq!(iterator.next(), Some((5, "third")));
    /// assert_eq!(iterator.next(), None);
    /// ```
    ///
    /// ### Time complexity
    ///
    /// ***O(n log n)*** for iteration.
    fn into_iter(self) -> Self::IntoIter {
        Self::IntoIter { queue: self }
    }
}

/// This is consuming iterator that returns entries in ascending key order
///
/// ### Time complexity
/// Overall complexity of iteration is ***O(n log n)***
pub struct AdaptablePriorityQueueIterator<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    queue: AdaptablePriorityQueue<K, V, C>,
}

impl<K, V, C> Iterator for AdaptablePriorityQueueIterator<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.queue.pop()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.queue.len(), Some(self.queue.len()))
    }

    #[inline]
    fn count(self) -> usize
    where
        Self: Sized,
    {
        self.queue.len()
    }
}

/// This is unordered borrowing iterator over queue.
///
/// ### Time complexity
/// Overall complexity of iteration is ***O(n)***
pub struct AdaptablePriorityQueueBorrowIter<'a, K, V> {
    heap_iterator: BinaryHeapIterator<'a, K>,
    slots: &'a SlotArena<V>,
}

impl<'a, K, V> Iterator for AdaptablePriorityQueueBorrowIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let slots = &self.slots;
        self.heap_iterator
            .next()
            .map(|(slot, key)| (key, slots.value_of(slot)))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.heap_iterator.size_hint()
    }

    #[inline]
    fn count(self) -> usize
    where
        Self: Sized,
    {
        self.heap_iterator.count()
    }
}

/// This is error type for [`set_key`] method of [`AdaptablePriorityQueue`].
/// It means the handle's entry is no longer in the queue.
///
/// [`set_key`]: AdaptablePriorityQueue::set_key
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Default)]
pub struct SetKeyNotFoundError;

impl Display for SetKeyNotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "Entry not found in AdaptablePriorityQueue during set_key"
        )
    }
}

impl std::error::Error for SetKeyNotFoundError {}

#[cfg(test)]
mod tests {
    use super::{AdaptablePriorityQueue, SetKeyNotFoundError};
    use crate::adaptable_binary_heap::HeapIndex;
    use crate::slot_arena::EntryId;
    use std::cmp::Ordering;

    fn cmp_i32(a: &i32, b: &i32) -> Ordering {
        a.cmp(b)
    }

    // Checks that every tracked handle resolves to the heap cell that refers
    // back to its slot.
    fn check_backrefs<V, C: Fn(&i32, &i32) -> Ordering>(
        queue: &AdaptablePriorityQueue<i32, V, C>,
        ids: &[EntryId],
    ) {
        for &id in ids {
            let pos = queue.position(id).expect("live handle must resolve");
            assert!(pos < queue.len());
            let (slot, _) = queue
                .heap
                .look_into(HeapIndex::new(pos))
                .expect("position in bounds");
            assert_eq!(slot, id.slot(), "stale back-reference for {:?}", id);
        }
    }

    #[test]
    fn test_sorted_extraction() {
        let mut queue = AdaptablePriorityQueue::new(cmp_i32);
        for x in [5, 3, 8, 1, 4] {
            queue.push(x, ());
        }
        assert_eq!(queue.len(), 5);
        for expected in [1, 3, 4, 5, 8] {
            assert_eq!(queue.pop(), Some((expected, ())));
        }
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_single_entry() {
        let mut queue = AdaptablePriorityQueue::new(cmp_i32);
        queue.push(10, "x");
        assert_eq!(queue.peek(), Some((&10, &"x")));
        assert_eq!(queue.pop(), Some((10, "x")));
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.peek(), None);
    }

    #[test]
    fn test_empty_queue() {
        let mut queue = AdaptablePriorityQueue::<i32, i32, _>::new(cmp_i32);
        for _ in 0..3 {
            assert_eq!(queue.pop(), None);
            assert_eq!(queue.peek(), None);
            assert_eq!(queue.peek_id(), None);
            assert_eq!(queue.len(), 0);
        }
    }

    #[test]
    fn test_equal_keys() {
        let mut queue = AdaptablePriorityQueue::new(cmp_i32);
        for v in ["a", "b", "c"] {
            queue.push(2, v);
        }
        let mut values = Vec::new();
        while let Some((key, value)) = queue.pop() {
            assert_eq!(key, 2);
            values.push(value);
        }
        values.sort_unstable();
        assert_eq!(values, ["a", "b", "c"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_peek_agrees_with_pop() {
        let items = [
            ("first", 5),
            ("second", 4),
            ("third", 3),
            ("fourth", 2),
            ("fifth", 1),
        ];

        let mut queue = AdaptablePriorityQueue::new(cmp_i32);
        for &(name, key) in items.iter() {
            queue.push(key, name);
        }

        while queue.len() > 0 {
            let (&key, &name) = queue.peek().unwrap();
            let id = queue.peek_id().unwrap();
            assert_eq!(queue.get(id), Some((&key, &name)));
            assert_eq!(queue.position(id), Some(0));
            let (key1, name1) = queue.pop().unwrap();
            assert_eq!(key, key1);
            assert_eq!(name, name1);
            assert!(!queue.contains(id));
        }
        assert_eq!(queue.peek(), None);
    }

    #[test]
    fn test_positions_stay_current() {
        let keys = [
            16, 5, 20, 10, 12, 10, 8, 12, 2, -1, -18, 5, -16, 1, 7, 3, 17, -20, -4, 3, -7, -5,
        ];
        let mut queue = AdaptablePriorityQueue::new(cmp_i32);
        let mut ids = Vec::new();
        for &k in keys.iter() {
            ids.push(queue.push(k, k * 10));
            check_backrefs(&queue, &ids);
        }

        // Remove a middle entry, re-key another, then drain.
        let removed = ids.remove(7);
        assert!(queue.remove(removed).is_some());
        check_backrefs(&queue, &ids);

        let rekeyed = ids[3];
        queue.set_key(rekeyed, -100).unwrap();
        check_backrefs(&queue, &ids);
        assert_eq!(queue.peek_id(), Some(rekeyed));

        while queue.pop().is_some() {
            ids.retain(|&id| queue.contains(id));
            check_backrefs(&queue, &ids);
        }
        assert!(ids.is_empty());
    }

    #[test]
    fn test_set_key() {
        let items = [
            ("first", 5),
            ("second", 4),
            ("third", 3),
            ("fourth", 2),
            ("fifth", 1),
        ];

        let mut queue = AdaptablePriorityQueue::new(cmp_i32);
        let mut ids = std::collections::HashMap::new();
        for &(name, key) in items.iter() {
            ids.insert(name, queue.push(key, name));
        }

        assert_eq!(queue.set_key(ids["first"], -5), Ok(5));
        assert_eq!(queue.get(ids["first"]), Some((&-5, &"first")));
        assert_eq!(queue.pop(), Some((-5, "first")));

        assert_eq!(queue.set_key(ids["fifth"], 11), Ok(1));
        assert_eq!(queue.get(ids["fifth"]), Some((&11, &"fifth")));
        queue.pop();
        queue.pop();
        queue.pop();
        assert_eq!(queue.pop(), Some((11, "fifth")));

        // All entries are gone; every handle must now fail.
        assert_eq!(queue.set_key(ids["first"], 64), Err(SetKeyNotFoundError));
        assert_eq!(
            queue.set_key(ids["third"], 64),
            Err(SetKeyNotFoundError::default())
        );
    }

    #[test]
    fn test_remove_rebalances_tree() {
        let mut queue = AdaptablePriorityQueue::new(cmp_i32);

        queue.push(300, ());
        let id = queue.push(500, ());
        queue.push(400, ());
        queue.push(400, ());
        queue.push(600, ());
        queue.push(100, ());
        queue.push(200, ());
        assert_eq!(queue.remove(id), Some((500, ())));

        let mut list = Vec::new();
        while let Some((key, ())) = queue.pop() {
            list.push(key);
        }

        assert_eq!(list, [100, 200, 300, 400, 400, 600])
    }

    #[test]
    fn test_handles_go_stale() {
        let mut queue = AdaptablePriorityQueue::new(cmp_i32);
        let a = queue.push(1, "a");
        let b = queue.push(2, "b");
        let c = queue.push(3, "c");

        assert_eq!(queue.pop(), Some((1, "a")));
        assert_eq!(queue.get(a), None);
        assert_eq!(queue.position(a), None);
        assert_eq!(queue.remove(a), None);
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.remove(b), Some((2, "b")));
        assert_eq!(queue.remove(b), None);

        queue.clear();
        assert_eq!(queue.get(c), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_slot_reuse_does_not_revive_handles() {
        let mut queue = AdaptablePriorityQueue::new(cmp_i32);
        let a = queue.push(1, "a");
        queue.push(2, "b");
        assert_eq!(queue.pop(), Some((1, "a")));

        // The freed slot is reused; the old handle must not see the tenant.
        let c = queue.push(3, "c");
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.get(a), None);
        assert_eq!(queue.set_key(a, 0), Err(SetKeyNotFoundError));
        assert_eq!(queue.get(c), Some((&3, &"c")));
    }

    #[test]
    fn test_clear_then_reuse() {
        let mut queue = AdaptablePriorityQueue::new(cmp_i32);
        let old_ids: Vec<_> = (0..10).map(|x| queue.push(x, x)).collect();
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);

        let new_ids: Vec<_> = (0..10).map(|x| queue.push(x, x * 2)).collect();
        for id in old_ids.iter() {
            assert_eq!(queue.get(*id), None);
        }
        for (x, id) in new_ids.iter().enumerate() {
            assert_eq!(queue.get(*id), Some((&(x as i32), &(x as i32 * 2))));
        }
    }

    #[test]
    fn test_iteration() {
        let items = [
            ("first", 1),
            ("second", 2),
            ("third", 3),
            ("fourth", 4),
            ("fifth", 5),
        ];

        let queue = AdaptablePriorityQueue::from_iter_with(
            cmp_i32,
            items.iter().rev().map(|&(name, key)| (key, name)),
        );
        let mut iter = queue.into_iter();
        assert_eq!(iter.next(), Some((1, "first")));
        assert_eq!(iter.next(), Some((2, "second")));
        assert_eq!(iter.next(), Some((3, "third")));
        assert_eq!(iter.next(), Some((4, "fourth")));
        assert_eq!(iter.next(), Some((5, "fifth")));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_borrow_iter() {
        let items = [(5, "five"), (3, "three"), (4, "four"), (1, "one")];
        let queue = AdaptablePriorityQueue::from_iter_with(cmp_i32, items.iter().cloned());

        let mut seen: Vec<(i32, &str)> = queue.iter().map(|(&k, &v)| (k, v)).collect();
        assert_eq!(seen.len(), queue.len());
        assert_eq!(seen.first(), Some(&(1, "one")));
        seen.sort_unstable();
        let mut expected = items.to_vec();
        expected.sort_unstable();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_reversed_comparator() {
        let mut queue = AdaptablePriorityQueue::new(|a: &i32, b: &i32| b.cmp(a));
        for x in [5, 3, 8, 1, 4] {
            queue.push(x, ());
        }
        let keys: Vec<i32> = queue.into_iter().map(|(k, ())| k).collect();
        assert_eq!(keys, [8, 5, 4, 3, 1]);
    }

    #[test]
    fn test_not_clone_key_works() {
        struct Key(u32);

        let vals = [0u32, 1, 1, 2, 4, 5];
        let mut queue = AdaptablePriorityQueue::new(|a: &Key, b: &Key| a.0.cmp(&b.0));
        let mut ids = Vec::new();
        for &v in vals.iter() {
            ids.push(queue.push(Key(v), v));
        }
        queue.set_key(ids[1], Key(10)).unwrap();
        let mut res = Vec::with_capacity(vals.len());
        while let Some((Key(k), v)) = queue.pop() {
            res.push((k, v));
        }
        assert_eq!(&res, &[(0, 0), (1, 1), (2, 2), (4, 4), (5, 5), (10, 1)]);
    }

    #[test]
    fn test_clone_keeps_handles_valid() {
        let mut queue = AdaptablePriorityQueue::new(cmp_i32);
        let id = queue.push(5, "five");
        queue.push(1, "one");

        let mut copy = queue.clone();
        assert_eq!(copy.get(id), Some((&5, &"five")));
        assert_eq!(copy.set_key(id, 0), Ok(5));
        assert_eq!(copy.pop(), Some((0, "five")));
        // The original is untouched.
        assert_eq!(queue.get(id), Some((&5, &"five")));
        assert_eq!(queue.pop(), Some((1, "one")));
    }

    #[test]
    fn test_sync() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<AdaptablePriorityQueue<i32, i32, fn(&i32, &i32) -> Ordering>>();
    }

    #[test]
    fn test_send() {
        fn assert_send<T: Send>() {}
        assert_send::<AdaptablePriorityQueue<i32, i32, fn(&i32, &i32) -> Ordering>>();
    }

    #[test]
    fn test_fmt() {
        let mut queue = AdaptablePriorityQueue::new(cmp_i32);
        queue.push(1, "one");

        assert_eq!(format!("{:?}", queue), "[(1, \"one\")]");
    }
}
