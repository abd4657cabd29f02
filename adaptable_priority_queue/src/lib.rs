//! This is a priority queue whose entries support re-keying and early
//! removal through stable handles.
//!
//! It stores entries in an array-backed binary min-heap and keeps a live
//! back-reference from every entry to its current array position, so a
//! handle can locate its entry without searching.
//!
//! Each entry has an associated *key* and *value*. The key order comes from
//! a comparator supplied at construction; there is no default ordering, and
//! keys need not be unique, hashable, or cloneable. Values are opaque
//! payloads owned by the queue and handed back on removal.
//!
//! Popping returns the entry with the smallest key.
//! Pushing adds an entry and returns its handle.
//! Through the handle it is also possible to change an entry's key or
//! remove it early.
//!
//! Push, pop, re-key, and remove-by-handle have ***O(log n)*** time
//! complexity; peek and handle lookup are ***O(1)***.
//!
//! # Examples
//!
//! This is a miniature event timeline of the kind MIDI-style sequencers
//! keep: events are ordered by timestamp, and scheduled events sometimes
//! need to be moved or cancelled before they fire.
//!
//! This example shows how handles from [`push`] let the timeline adjust
//! pending events without scanning the queue.
//!
//! [`push`]: AdaptablePriorityQueue::push
//!
//! ```
//! use adaptable_priority_queue::AdaptablePriorityQueue;
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! struct Timestamp {
//!     seconds: f64,
//! }
//!
//! let mut timeline = AdaptablePriorityQueue::new(|a: &Timestamp, b: &Timestamp| {
//!     a.seconds
//!         .partial_cmp(&b.seconds)
//!         .expect("timestamps are never NaN")
//! });
//!
//! timeline.push(Timestamp { seconds: 0.0 }, "note on");
//! let sustain = timeline.push(Timestamp { seconds: 2.5 }, "sustain pedal");
//! let note_off = timeline.push(Timestamp { seconds: 4.0 }, "note off");
//!
//! // The earliest event is always at the front.
//! let (first, &event) = timeline.peek().expect("timeline is not empty");
//! assert_eq!((first.seconds, event), (0.0, "note on"));
//!
//! // Events can be rescheduled in place through their handles...
//! timeline
//!     .set_key(note_off, Timestamp { seconds: 1.0 })
//!     .expect("event is still pending");
//!
//! // ...or cancelled outright.
//! assert_eq!(
//!     timeline.remove(sustain),
//!     Some((Timestamp { seconds: 2.5 }, "sustain pedal"))
//! );
//!
//! // Draining plays events back in timestamp order.
//! let order: Vec<&str> = timeline.into_iter().map(|(_, event)| event).collect();
//! assert_eq!(order, vec!["note on", "note off"]);
//! ```

mod adaptable_binary_heap;
mod adaptable_priority_queue;
mod slot_arena;

pub use crate::adaptable_priority_queue::{
    AdaptablePriorityQueue, AdaptablePriorityQueueBorrowIter, AdaptablePriorityQueueIterator,
    SetKeyNotFoundError,
};
pub use crate::slot_arena::EntryId;

#[doc = include_str!("../../Readme.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;
