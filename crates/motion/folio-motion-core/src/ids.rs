//! Identifiers and simple allocators for core entities.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u32);

/// Generation stamp for one animation run on one element.
/// A newer token for the same element invalidates every older one.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AnimationToken(pub u64);

/// Monotonic allocator for ElementId and AnimationToken.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_element: u32,
    next_token: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_element(&mut self) -> ElementId {
        let id = ElementId(self.next_element);
        self.next_element = self.next_element.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_token(&mut self) -> AnimationToken {
        let token = AnimationToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        token
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
