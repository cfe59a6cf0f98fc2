//! A generational arena - a contiguous growable array type which allows
//! removing entries from the middle without shifting and without
//! invalidating the indices of other entries.
//!
//! A [`Pool`] is a contiguous block of memory with fixed-size slots, each
//! either vacant or occupied. Putting an object into the pool returns a
//! [`Handle`] to it. A handle carries a generation number alongside its
//! index; the handle is only usable while its generation matches the one
//! stored in the slot, so reusing a freed slot for a new object can never
//! be confused with a stale handle to the old one.

use std::{
    fmt::{Debug, Display, Formatter},
    hash::{Hash, Hasher},
    marker::PhantomData,
    ops::{Index, IndexMut},
};

const INVALID_GENERATION: u32 = 0;

/// Opaque, typed, generation-checked identifier into a [`Pool<T>`].
///
/// A handle remains usable only as long as the pool slot it points at still
/// carries the same generation; once that slot is freed and reused the old
/// handle silently becomes invalid rather than aliasing the new occupant.
pub struct Handle<T> {
    index: u32,
    generation: u32,
    type_marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// A handle that never resolves to anything.
    pub const NONE: Handle<T> = Handle {
        index: 0,
        generation: INVALID_GENERATION,
        type_marker: PhantomData,
    };

    pub fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            type_marker: PhantomData,
        }
    }

    pub fn is_none(self) -> bool {
        self.generation == INVALID_GENERATION
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }

    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }

    /// Reinterprets this handle as a handle into a pool of a different type,
    /// keeping the same index/generation. Useful when a lookup table is
    /// keyed by a more general identifier than the pool it indexes into.
    pub fn transmute<U>(self) -> Handle<U> {
        Handle::new(self.index, self.generation)
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::NONE
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> Debug for Handle<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} (Handle<{}>)", self.index, self.generation, std::any::type_name::<T>())
    }
}

impl<T> Display for Handle<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.index, self.generation)
    }
}

#[derive(Clone, Debug)]
enum PoolRecord<T> {
    Vacant {
        next_free: Option<u32>,
        /// Generation to assign the next time this slot is occupied; keeps
        /// increasing across free/spawn cycles so a handle into a long-gone
        /// occupant can never alias a later one at the same index.
        next_generation: u32,
    },
    Occupied {
        generation: u32,
        payload: T,
    },
}

/// Generational arena. See module docs.
#[derive(Debug)]
pub struct Pool<T> {
    records: Vec<PoolRecord<T>>,
    free_head: Option<u32>,
    alive_count: u32,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            free_head: None,
            alive_count: 0,
        }
    }

    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            records: Vec::with_capacity(capacity as usize),
            free_head: None,
            alive_count: 0,
        }
    }

    /// Puts `payload` into the pool and returns a handle to it.
    pub fn spawn(&mut self, payload: T) -> Handle<T> {
        if let Some(free_index) = self.free_head {
            let record = &mut self.records[free_index as usize];
            let (next_free, generation) = match *record {
                PoolRecord::Vacant {
                    next_free,
                    next_generation,
                } => (next_free, next_generation),
                PoolRecord::Occupied { .. } => unreachable!("free list points at occupied slot"),
            };
            self.free_head = next_free;

            *record = PoolRecord::Occupied { generation, payload };
            self.alive_count += 1;
            Handle::new(free_index, generation)
        } else {
            let index = self.records.len() as u32;
            self.records.push(PoolRecord::Occupied {
                generation: 1,
                payload,
            });
            self.alive_count += 1;
            Handle::new(index, 1)
        }
    }

    pub fn is_valid_handle(&self, handle: Handle<T>) -> bool {
        self.records
            .get(handle.index() as usize)
            .is_some_and(|record| match record {
                PoolRecord::Occupied { generation, .. } => *generation == handle.generation(),
                PoolRecord::Vacant { .. } => false,
            })
    }

    pub fn try_borrow(&self, handle: Handle<T>) -> Option<&T> {
        match self.records.get(handle.index() as usize)? {
            PoolRecord::Occupied { generation, payload } if *generation == handle.generation() => {
                Some(payload)
            }
            _ => None,
        }
    }

    pub fn try_borrow_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        match self.records.get_mut(handle.index() as usize)? {
            PoolRecord::Occupied { generation, payload } if *generation == handle.generation() => {
                Some(payload)
            }
            _ => None,
        }
    }

    pub fn borrow(&self, handle: Handle<T>) -> &T {
        self.try_borrow(handle)
            .expect("attempt to borrow a pool entry through a stale or out-of-range handle")
    }

    pub fn borrow_mut(&mut self, handle: Handle<T>) -> &mut T {
        self.try_borrow_mut(handle)
            .expect("attempt to borrow a pool entry through a stale or out-of-range handle")
    }

    /// Removes the entry pointed at by `handle`, returning its payload if
    /// the handle was still valid. The freed slot is pushed onto the
    /// free-list with its generation bumped, so any outstanding handle into
    /// it becomes stale immediately.
    pub fn try_free(&mut self, handle: Handle<T>) -> Option<T> {
        let index = handle.index() as usize;
        let record = self.records.get_mut(index)?;
        match record {
            PoolRecord::Occupied { generation, .. } if *generation == handle.generation() => {
                let next_generation = generation.wrapping_add(1).max(1);
                let PoolRecord::Occupied { payload, .. } = std::mem::replace(
                    record,
                    PoolRecord::Vacant {
                        next_free: self.free_head,
                        next_generation,
                    },
                ) else {
                    unreachable!()
                };
                self.free_head = Some(index as u32);
                self.alive_count -= 1;
                Some(payload)
            }
            _ => None,
        }
    }

    pub fn free(&mut self, handle: Handle<T>) -> T {
        self.try_free(handle)
            .expect("attempt to free a pool entry through a stale or out-of-range handle")
    }

    pub fn alive_count(&self) -> u32 {
        self.alive_count
    }

    pub fn total_count(&self) -> usize {
        self.records.len()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.free_head = None;
        self.alive_count = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.iter().filter_map(|record| match record {
            PoolRecord::Occupied { payload, .. } => Some(payload),
            PoolRecord::Vacant { .. } => None,
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.records.iter_mut().filter_map(|record| match record {
            PoolRecord::Occupied { payload, .. } => Some(payload),
            PoolRecord::Vacant { .. } => None,
        })
    }

    pub fn pair_iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| match record {
                PoolRecord::Occupied { generation, payload } => {
                    Some((Handle::new(index as u32, *generation), payload))
                }
                PoolRecord::Vacant { .. } => None,
            })
    }
}

impl<T> Index<Handle<T>> for Pool<T> {
    type Output = T;

    fn index(&self, handle: Handle<T>) -> &Self::Output {
        self.borrow(handle)
    }
}

impl<T> IndexMut<Handle<T>> for Pool<T> {
    fn index_mut(&mut self, handle: Handle<T>) -> &mut Self::Output {
        self.borrow_mut(handle)
    }
}
