//! Arena of result sequences.
//!
//! Collectors never own a `Vec` directly; they hold a [`SeqHandle`] into
//! this store. A handle carries the generation of the slot it was issued
//! for, so once a sequence is released every copy of its handle goes stale
//! and a second release is a no-op instead of a double free.

use crate::Value;

/// Generation-checked reference to a sequence in a [`SequenceStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeqHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    seq: Option<Vec<Value>>,
}

#[derive(Debug, Default)]
pub struct SequenceStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl SequenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an empty sequence, reusing a released slot when possible.
    pub fn allocate(&mut self) -> SeqHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.seq = Some(Vec::new());
            return SeqHandle {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            seq: Some(Vec::new()),
        });
        SeqHandle {
            index,
            generation: 0,
        }
    }

    fn slot(&self, handle: SeqHandle) -> Option<&Vec<Value>> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.seq.as_ref())
    }

    fn slot_mut(&mut self, handle: SeqHandle) -> Option<&mut Vec<Value>> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.seq.as_mut())
    }

    /// Contents of a live sequence; `None` once released.
    pub fn get(&self, handle: SeqHandle) -> Option<&[Value]> {
        self.slot(handle).map(Vec::as_slice)
    }

    pub fn len(&self, handle: SeqHandle) -> usize {
        self.slot(handle).map_or(0, Vec::len)
    }

    pub fn is_live(&self, handle: SeqHandle) -> bool {
        self.slot(handle).is_some()
    }

    /// Append to a live sequence. Returns false for a stale handle.
    pub fn push(&mut self, handle: SeqHandle, value: Value) -> bool {
        match self.slot_mut(handle) {
            Some(seq) => {
                seq.push(value);
                true
            }
            None => false,
        }
    }

    pub fn take_first(&mut self, handle: SeqHandle) -> Option<Value> {
        let seq = self.slot_mut(handle)?;
        if seq.is_empty() {
            None
        } else {
            Some(seq.remove(0))
        }
    }

    /// Move the first element of `from` into a freshly allocated sequence.
    ///
    /// Returns the new handle, or `None` when `from` is stale or empty.
    pub fn transfer_first(&mut self, from: SeqHandle) -> Option<SeqHandle> {
        let value = self.take_first(from)?;
        let to = self.allocate();
        self.push(to, value);
        Some(to)
    }

    /// Release a sequence. Returns false if it was already released.
    pub fn release(&mut self, handle: SeqHandle) -> bool {
        let Some(slot) = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.seq.is_some())
        else {
            return false;
        };

        slot.seq = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        true
    }

    /// Release every live sequence. Returns how many were released.
    pub fn clear(&mut self) -> usize {
        let mut released = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.seq.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
                released += 1;
            }
        }
        released
    }

    /// Number of sequences currently allocated.
    pub fn live(&self) -> usize {
        self.slots.iter().filter(|slot| slot.seq.is_some()).count()
    }
}
