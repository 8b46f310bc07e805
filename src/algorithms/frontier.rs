use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Heap entry. `Ord` is reversed so that `BinaryHeap` pops the smallest
/// estimate first; equal estimates pop in insertion order.
#[derive(Debug, Clone, Copy)]
struct Entry {
    estimated: f64,
    seq: u64,
    index: usize,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimated
            .total_cmp(&self.estimated)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Open list keyed by estimated total cost, over flat cell indices.
///
/// Removal is lazy: `live` maps each queued cell to the sequence number of
/// its current heap entry, and anything else popped off the heap is stale.
#[derive(Debug, Default)]
pub struct Frontier {
    heap: BinaryHeap<Entry>,
    live: FxHashMap<usize, u64>,
    next_seq: u64,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `index`, replacing any entry it already has.
    pub fn push(&mut self, index: usize, estimated: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.live.insert(index, seq);
        self.heap.push(Entry {
            estimated,
            seq,
            index,
        });
    }

    pub fn pop_min(&mut self) -> Option<usize> {
        while let Some(entry) = self.heap.pop() {
            if self.live.get(&entry.index) == Some(&entry.seq) {
                self.live.remove(&entry.index);
                return Some(entry.index);
            }
        }
        None
    }

    pub fn contains(&self, index: usize) -> bool {
        self.live.contains_key(&index)
    }

    /// Drops `index` from the queue. Returns whether it was queued.
    pub fn remove(&mut self, index: usize) -> bool {
        self.live.remove(&index).is_some()
    }

    /// Remove-then-reinsert with a new key.
    pub fn decrease_key_or_reinsert(&mut self, index: usize, estimated: f64) {
        self.remove(index);
        self.push(index, estimated);
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Queued cells in no particular order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.live.keys().copied()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.live.clear();
    }
}
