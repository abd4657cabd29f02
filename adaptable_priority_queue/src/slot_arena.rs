use std::fmt::Debug;

use crate::adaptable_binary_heap::HeapIndex;

/// Wrapper around the arena vec index.
/// Used to avoid mix up with heap index
/// and to make sure the arena is indexed only with SlotIndex.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub(crate) struct SlotIndex(u32);

impl SlotIndex {
    #[cfg(test)]
    #[inline(always)]
    pub(crate) fn new(v: u32) -> Self {
        Self(v)
    }

    #[inline(always)]
    pub(crate) fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Handle to one entry of an [`AdaptablePriorityQueue`].
///
/// A handle stays valid while its entry is in the queue, no matter how the
/// entry moves through the backing array. Once the entry leaves the queue
/// (by `pop`, `remove` or `clear`) the handle goes stale: lookups through it
/// return `None` and [`set_key`] returns an error, even if the storage slot
/// has been reused for a later entry.
///
/// [`AdaptablePriorityQueue`]: crate::AdaptablePriorityQueue
/// [`set_key`]: crate::AdaptablePriorityQueue::set_key
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct EntryId {
    slot: SlotIndex,
    generation: u64,
}

impl EntryId {
    #[inline(always)]
    pub(crate) fn slot(self) -> SlotIndex {
        self.slot
    }
}

enum SlotState<V> {
    Occupied { heap_pos: HeapIndex, value: V },
    Vacant { next_free: Option<SlotIndex> },
}

struct Slot<V> {
    generation: u64,
    state: SlotState<V>,
}

/// Generation-checked storage between public handles and heap positions.
///
/// Occupied slots own the value payload and the entry's current position in
/// the heap array; vacant slots form an intrusive free list so storage is
/// reused across removals. Freeing a slot bumps its generation, which is
/// what keeps previously issued handles from resolving to a later tenant.
pub(crate) struct SlotArena<V> {
    slots: Vec<Slot<V>>,
    free_head: Option<SlotIndex>,
    live: usize,
}

impl<V> SlotArena<V> {
    #[inline(always)]
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            live: 0,
        }
    }

    #[inline(always)]
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            live: 0,
        }
    }

    #[inline(always)]
    pub(crate) fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
    }

    /// Stores a value with an initial heap position and returns its handle.
    /// Reuses the youngest freed slot when one exists.
    pub(crate) fn insert(&mut self, value: V, heap_pos: HeapIndex) -> EntryId {
        self.live += 1;
        match self.free_head {
            Some(slot) => {
                let stored = &mut self.slots[slot.as_usize()];
                self.free_head = match stored.state {
                    SlotState::Vacant { next_free } => next_free,
                    SlotState::Occupied { .. } => {
                        unreachable!("free list entry {:?} is occupied", slot)
                    }
                };
                stored.state = SlotState::Occupied { heap_pos, value };
                EntryId {
                    slot,
                    generation: stored.generation,
                }
            }
            None => {
                let slot = SlotIndex(self.slots.len() as u32);
                self.slots.push(Slot {
                    generation: 0,
                    state: SlotState::Occupied { heap_pos, value },
                });
                EntryId {
                    slot,
                    generation: 0,
                }
            }
        }
    }

    /// Resolves a handle to the entry's current heap position.
    /// Returns `None` for stale handles.
    #[inline(always)]
    pub(crate) fn resolve(&self, id: EntryId) -> Option<HeapIndex> {
        let stored = self.slots.get(id.slot.as_usize())?;
        if stored.generation != id.generation {
            return None;
        }
        match stored.state {
            SlotState::Occupied { heap_pos, .. } => Some(heap_pos),
            SlotState::Vacant { .. } => None,
        }
    }

    /// Rebuilds the handle for a slot known to be occupied.
    #[inline(always)]
    pub(crate) fn id_of(&self, slot: SlotIndex) -> EntryId {
        debug_assert!(matches!(
            self.slots[slot.as_usize()].state,
            SlotState::Occupied { .. }
        ));
        EntryId {
            slot,
            generation: self.slots[slot.as_usize()].generation,
        }
    }

    #[inline(always)]
    pub(crate) fn value_of(&self, slot: SlotIndex) -> &V {
        match &self.slots[slot.as_usize()].state {
            SlotState::Occupied { value, .. } => value,
            SlotState::Vacant { .. } => unreachable!("heap refers to vacant slot {:?}", slot),
        }
    }

    /// Records the new heap position of a slot. Called from the heap's
    /// change handlers only; the slot is always occupied then.
    #[inline(always)]
    pub(crate) fn set_heap_pos(&mut self, slot: SlotIndex, pos: HeapIndex) {
        match &mut self.slots[slot.as_usize()].state {
            SlotState::Occupied { heap_pos, .. } => *heap_pos = pos,
            SlotState::Vacant { .. } => unreachable!("position update for vacant slot {:?}", slot),
        }
    }

    /// Frees a slot and returns its value. The generation bump makes every
    /// outstanding handle for this slot stale.
    pub(crate) fn remove(&mut self, slot: SlotIndex) -> V {
        let stored = &mut self.slots[slot.as_usize()];
        stored.generation += 1;
        let state = std::mem::replace(
            &mut stored.state,
            SlotState::Vacant {
                next_free: self.free_head,
            },
        );
        self.free_head = Some(slot);
        self.live -= 1;
        match state {
            SlotState::Occupied { value, .. } => value,
            SlotState::Vacant { .. } => unreachable!("removed slot {:?} was vacant", slot),
        }
    }

    /// Frees every occupied slot, invalidating all outstanding handles.
    /// Storage is kept for reuse.
    pub(crate) fn clear(&mut self) {
        self.free_head = None;
        for (i, stored) in self.slots.iter_mut().enumerate().rev() {
            if let SlotState::Occupied { .. } = stored.state {
                stored.generation += 1;
            }
            stored.state = SlotState::Vacant {
                next_free: self.free_head,
            };
            self.free_head = Some(SlotIndex(i as u32));
        }
        self.live = 0;
    }

    #[inline(always)]
    pub(crate) fn live(&self) -> usize {
        self.live
    }
}

impl<V: Clone> Clone for SlotState<V> {
    fn clone(&self) -> Self {
        match self {
            SlotState::Occupied { heap_pos, value } => SlotState::Occupied {
                heap_pos: *heap_pos,
                value: value.clone(),
            },
            SlotState::Vacant { next_free } => SlotState::Vacant {
                next_free: *next_free,
            },
        }
    }
}

impl<V: Clone> Clone for Slot<V> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            state: self.state.clone(),
        }
    }
}

impl<V: Clone> Clone for SlotArena<V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            free_head: self.free_head,
            live: self.live,
        }
    }
}

impl<V: Debug> Debug for Slot<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match &self.state {
            SlotState::Occupied { heap_pos, value } => write!(
                f,
                "{{gen: {}, heap_pos: {:?}, value: {:?}}}",
                self.generation, heap_pos, value
            ),
            SlotState::Vacant { next_free } => {
                write!(f, "{{gen: {}, free -> {:?}}}", self.generation, next_free)
            }
        }
    }
}

impl<V: Debug> Debug for SlotArena<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.debug_list().entries(self.slots.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_resolve() {
        let mut arena = SlotArena::new();
        let a = arena.insert("a", HeapIndex::new(0));
        let b = arena.insert("b", HeapIndex::new(1));
        assert_eq!(arena.resolve(a), Some(HeapIndex::new(0)));
        assert_eq!(arena.resolve(b), Some(HeapIndex::new(1)));
        assert_eq!(arena.value_of(a.slot()), &"a");
        assert_eq!(arena.value_of(b.slot()), &"b");
        assert_eq!(arena.live(), 2);
    }

    #[test]
    fn test_set_heap_pos() {
        let mut arena = SlotArena::new();
        let a = arena.insert("a", HeapIndex::new(0));
        arena.set_heap_pos(a.slot(), HeapIndex::new(5));
        assert_eq!(arena.resolve(a), Some(HeapIndex::new(5)));
    }

    #[test]
    fn test_remove_makes_handle_stale() {
        let mut arena = SlotArena::new();
        let a = arena.insert(10, HeapIndex::new(0));
        assert_eq!(arena.remove(a.slot()), 10);
        assert_eq!(arena.resolve(a), None);
        assert_eq!(arena.live(), 0);
    }

    #[test]
    fn test_slot_reuse_keeps_old_handle_stale() {
        let mut arena = SlotArena::new();
        let a = arena.insert(10, HeapIndex::new(0));
        arena.remove(a.slot());
        let b = arena.insert(20, HeapIndex::new(0));
        // Same storage slot, different generation.
        assert_eq!(a.slot(), b.slot());
        assert_ne!(a, b);
        assert_eq!(arena.resolve(a), None);
        assert_eq!(arena.resolve(b), Some(HeapIndex::new(0)));
        assert_eq!(arena.value_of(b.slot()), &20);
    }

    #[test]
    fn test_id_of_round_trip() {
        let mut arena = SlotArena::new();
        let a = arena.insert(1, HeapIndex::new(0));
        assert_eq!(arena.id_of(a.slot()), a);
    }

    #[test]
    fn test_clear() {
        let mut arena = SlotArena::new();
        let ids: Vec<_> = (0..5)
            .map(|i| arena.insert(i, HeapIndex::new(i as usize)))
            .collect();
        arena.clear();
        assert_eq!(arena.live(), 0);
        for id in ids.iter() {
            assert_eq!(arena.resolve(*id), None);
        }
        // Freed storage is reused, lowest slots first.
        let fresh = arena.insert(100, HeapIndex::new(0));
        assert_eq!(fresh.slot(), SlotIndex::new(0));
        assert_eq!(arena.resolve(fresh), Some(HeapIndex::new(0)));
    }
}
