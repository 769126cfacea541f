//! SlotMap - Generational index-based storage
//!
//! Provides O(1) insertion, removal, and lookup with use-after-free detection.
//! Keys never keep a value alive: once a value is removed its slot generation
//! is bumped and every outstanding key for it resolves to `None`.
//!
//! A value can also be *checked out* of its slot for the duration of an update
//! and put back with [`SlotMap::restore`]. While checked out the slot is neither
//! readable nor reusable, so the caller can hold `&mut T` and `&SlotMap<T>` at once.

use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// Key for slot map access with generation tracking
pub struct SlotKey<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SlotKey<T> {
    /// Create a new key
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Get the raw index
    #[inline]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Get the generation
    #[inline]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Create a null/invalid key
    #[inline]
    pub const fn null() -> Self {
        Self::new(u32::MAX, 0)
    }

    /// Check if key is null
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.index == u32::MAX
    }

    /// Pack into a single u64 (generation in the high bits)
    #[inline]
    pub const fn to_bits(&self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }
}

// Manual impls so keys stay Copy/Eq/Hash regardless of T
impl<T> Clone for SlotKey<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SlotKey<T> {}

impl<T> PartialEq for SlotKey<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for SlotKey<T> {}

impl<T> Hash for SlotKey<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bits().hash(state);
    }
}

impl<T> Default for SlotKey<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> fmt::Debug for SlotKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "SlotKey(null)")
        } else {
            write!(f, "SlotKey({}v{})", self.index, self.generation)
        }
    }
}

impl<T> fmt::Display for SlotKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Slot entry
struct Slot<T> {
    value: Option<T>,
    generation: u32,
    checked_out: bool,
}

/// SlotMap - generational index storage
pub struct SlotMap<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    len: usize,
}

impl<T> SlotMap<T> {
    /// Create a new empty slot map
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create with initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Insert a value and get its key
    pub fn insert(&mut self, value: T) -> SlotKey<T> {
        self.len += 1;

        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            SlotKey::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                value: Some(value),
                generation: 0,
                checked_out: false,
            });
            SlotKey::new(index, 0)
        }
    }

    /// Remove a value by key. Checked-out slots cannot be removed.
    pub fn remove(&mut self, key: SlotKey<T>) -> Option<T> {
        let slot = self.slots.get_mut(key.index as usize)?;

        if slot.generation != key.generation || slot.value.is_none() {
            return None;
        }

        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(key.index);
        self.len -= 1;

        slot.value.take()
    }

    /// Move a value out of its slot without freeing the slot.
    ///
    /// Until [`restore`](Self::restore) is called, `get` returns `None` for the key
    /// and the slot is never handed out by `insert`.
    pub fn checkout(&mut self, key: SlotKey<T>) -> Option<T> {
        let slot = self.slots.get_mut(key.index as usize)?;
        if slot.generation != key.generation || slot.checked_out {
            return None;
        }
        let value = slot.value.take()?;
        slot.checked_out = true;
        Some(value)
    }

    /// Put a checked-out value back. Returns the value if the key does not
    /// refer to a checked-out slot.
    pub fn restore(&mut self, key: SlotKey<T>, value: T) -> Result<(), T> {
        match self.slots.get_mut(key.index as usize) {
            Some(slot) if slot.generation == key.generation && slot.checked_out => {
                slot.checked_out = false;
                slot.value = Some(value);
                Ok(())
            }
            _ => Err(value),
        }
    }

    /// Check whether a key currently refers to a checked-out slot
    pub fn is_checked_out(&self, key: SlotKey<T>) -> bool {
        self.slots
            .get(key.index as usize)
            .map(|s| s.generation == key.generation && s.checked_out)
            .unwrap_or(false)
    }

    /// Get a reference to a value
    pub fn get(&self, key: SlotKey<T>) -> Option<&T> {
        let slot = self.slots.get(key.index as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        slot.value.as_ref()
    }

    /// Get a mutable reference to a value
    pub fn get_mut(&mut self, key: SlotKey<T>) -> Option<&mut T> {
        let slot = self.slots.get_mut(key.index as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Check if a key refers to a stored value (checked-out values count as live)
    pub fn contains_key(&self, key: SlotKey<T>) -> bool {
        self.slots
            .get(key.index as usize)
            .map(|s| s.generation == key.generation && (s.value.is_some() || s.checked_out))
            .unwrap_or(false)
    }

    /// Get the number of elements (checked-out values included)
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over all stored values
    pub fn iter(&self) -> impl Iterator<Item = (SlotKey<T>, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.value
                .as_ref()
                .map(|v| (SlotKey::new(i as u32, slot.generation), v))
        })
    }

    /// Iterate over all stored values mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotKey<T>, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, slot)| {
            let gen = slot.generation;
            slot.value.as_mut().map(|v| (SlotKey::new(i as u32, gen), v))
        })
    }

    /// Iterate over keys only
    pub fn keys(&self) -> impl Iterator<Item = SlotKey<T>> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Iterate over values only
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(|slot| slot.value.as_ref())
    }
}

impl<T> Default for SlotMap<T> {
    fn default() -> Self {
        Self::new()
    }
}
