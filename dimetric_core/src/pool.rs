// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays sprite pool with generational handles.
//!
//! Sprites are the only per-instance objects a pass produces. Rather than
//! allocating one per instance per pass, the pool keeps every slot it has
//! ever created and recycles released ones through a free list. A pass
//! releases everything it drew last time and acquires again, so once the
//! pool has grown to the largest visible set, steady-state passes allocate
//! nothing.
//!
//! # Reset contract
//!
//! A released slot is reset before it is handed out again: content cleared,
//! transform set to identity, alpha 1, no tint, no instance, not visible.
//! [`acquire`](SpritePool::acquire) therefore always returns a blank sprite.
//!
//! Handles carry a generation counter. Releasing a slot bumps its
//! generation, so a handle kept across a pass fails validation instead of
//! silently addressing a recycled sprite.

use alloc::vec::Vec;
use core::fmt;

use kurbo::Affine;

use crate::backend::TextureId;
use crate::grid::InstanceId;
use crate::iso::DiamondCorners;
use crate::layers::Rgba8;

/// A handle to a sprite in a [`SpritePool`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteHandle {
    idx: u32,
    generation: u32,
}

impl SpriteHandle {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for SpriteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpriteHandle({}@gen{})", self.idx, self.generation)
    }
}

/// What a sprite draws.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpriteContent {
    /// A host texture, drawn with the sprite's transform.
    Texture(TextureId),
    /// A flat diamond in screen space, drawn when the texture is missing.
    Diamond {
        /// Screen-space vertices.
        corners: DiamondCorners,
        /// Fill color.
        color: Rgba8,
    },
}

/// A snapshot of one sprite's properties.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    /// What to draw.
    pub content: Option<SpriteContent>,
    /// Canvas-to-screen transform.
    pub transform: Affine,
    /// Opacity.
    pub alpha: f32,
    /// Multiplicative tint.
    pub tint: Option<Rgba8>,
    /// The instance this sprite draws.
    pub instance: Option<InstanceId>,
    /// Whether the sprite is shown.
    pub visible: bool,
}

impl Sprite {
    /// The state of a freshly acquired sprite.
    pub const BLANK: Self = Self {
        content: None,
        transform: Affine::IDENTITY,
        alpha: 1.0,
        tint: None,
        instance: None,
        visible: false,
    };
}

/// Struct-of-arrays storage for sprites.
#[derive(Debug, Default)]
pub struct SpritePool {
    // -- Properties --
    content: Vec<Option<SpriteContent>>,
    transform: Vec<Affine>,
    alpha: Vec<f32>,
    tint: Vec<Option<Rgba8>>,
    instance: Vec<Option<InstanceId>>,
    visible: Vec<bool>,

    // -- Allocation --
    generation: Vec<u32>,
    in_use: Vec<bool>,
    free_list: Vec<u32>,
    len: u32,
    created: u64,

    // -- Draw order --
    active: Vec<u32>,
}

impl SpritePool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Allocation API --

    /// Hands out a blank sprite, reusing a released slot when possible.
    ///
    /// Sprites are drawn in acquisition order.
    pub fn acquire(&mut self) -> SpriteHandle {
        let idx = if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.created += 1;
            self.content.push(None);
            self.transform.push(Affine::IDENTITY);
            self.alpha.push(1.0);
            self.tint.push(None);
            self.instance.push(None);
            self.visible.push(false);
            self.generation.push(0);
            self.in_use.push(false);
            idx
        };
        self.in_use[idx as usize] = true;
        self.active.push(idx);
        SpriteHandle {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Returns a sprite to the pool, resetting it.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn release(&mut self, handle: SpriteHandle) {
        self.validate(handle);
        if let Some(pos) = self.active.iter().position(|&i| i == handle.idx) {
            self.active.remove(pos);
        }
        self.recycle(handle.idx);
    }

    /// Returns every in-use sprite to the pool.
    pub fn release_all(&mut self) {
        let active = core::mem::take(&mut self.active);
        // Push in reverse so the next pass reacquires slots in the same order.
        for &idx in active.iter().rev() {
            self.recycle(idx);
        }
        self.active = active;
        self.active.clear();
    }

    /// Whether the handle refers to an in-use sprite.
    #[must_use]
    pub fn is_alive(&self, handle: SpriteHandle) -> bool {
        handle.idx < self.len
            && self.generation[handle.idx as usize] == handle.generation
            && self.in_use[handle.idx as usize]
    }

    // -- Property API --

    /// Sets what the sprite draws.
    pub fn set_content(&mut self, handle: SpriteHandle, content: SpriteContent) {
        self.validate(handle);
        self.content[handle.idx as usize] = Some(content);
    }

    /// Sets the canvas-to-screen transform.
    pub fn set_transform(&mut self, handle: SpriteHandle, transform: Affine) {
        self.validate(handle);
        self.transform[handle.idx as usize] = transform;
    }

    /// Sets opacity and tint.
    pub fn set_appearance(&mut self, handle: SpriteHandle, alpha: f32, tint: Option<Rgba8>) {
        self.validate(handle);
        self.alpha[handle.idx as usize] = alpha;
        self.tint[handle.idx as usize] = tint;
    }

    /// Records which instance the sprite draws.
    pub fn set_instance(&mut self, handle: SpriteHandle, instance: InstanceId) {
        self.validate(handle);
        self.instance[handle.idx as usize] = Some(instance);
    }

    /// Shows or hides the sprite.
    pub fn set_visible(&mut self, handle: SpriteHandle, visible: bool) {
        self.validate(handle);
        self.visible[handle.idx as usize] = visible;
    }

    /// Returns a snapshot of the sprite.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn get(&self, handle: SpriteHandle) -> Sprite {
        self.validate(handle);
        self.sprite_at(handle.idx)
    }

    /// Iterates in-use sprites in draw order.
    pub fn iter_active(&self) -> impl Iterator<Item = (SpriteHandle, Sprite)> + '_ {
        self.active.iter().map(|&idx| {
            (
                SpriteHandle {
                    idx,
                    generation: self.generation[idx as usize],
                },
                self.sprite_at(idx),
            )
        })
    }

    // -- Statistics --

    /// Number of in-use sprites.
    #[must_use]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Total slots, in use or free.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.len
    }

    /// Number of free slots.
    #[must_use]
    pub fn free_len(&self) -> usize {
        self.free_list.len()
    }

    /// Slots created over the pool's lifetime. Only grows when
    /// [`acquire`](Self::acquire) finds no free slot.
    #[must_use]
    pub fn allocations(&self) -> u64 {
        self.created
    }

    // -- Internals --

    fn sprite_at(&self, idx: u32) -> Sprite {
        let i = idx as usize;
        Sprite {
            content: self.content[i],
            transform: self.transform[i],
            alpha: self.alpha[i],
            tint: self.tint[i],
            instance: self.instance[i],
            visible: self.visible[i],
        }
    }

    fn recycle(&mut self, idx: u32) {
        let i = idx as usize;
        self.content[i] = None;
        self.transform[i] = Affine::IDENTITY;
        self.alpha[i] = 1.0;
        self.tint[i] = None;
        self.instance[i] = None;
        self.visible[i] = false;
        self.in_use[i] = false;
        self.generation[i] = self.generation[i].wrapping_add(1);
        self.free_list.push(idx);
    }

    fn validate(&self, handle: SpriteHandle) {
        assert!(
            self.is_alive(handle),
            "stale SpriteHandle: {handle:?} (current gen: {})",
            if handle.idx < self.len {
                self.generation[handle.idx as usize]
            } else {
                u32::MAX
            }
        );
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Vec2;

    use super::*;

    #[test]
    fn acquire_returns_blank_sprites() {
        let mut pool = SpritePool::new();
        let h = pool.acquire();
        assert_eq!(pool.get(h), Sprite::BLANK);
        pool.set_content(h, SpriteContent::Texture(TextureId(4)));
        pool.set_transform(h, Affine::translate(Vec2::new(3.0, 4.0)));
        pool.set_appearance(h, 0.6, Some(Rgba8::WHITE));
        pool.set_instance(h, InstanceId(2));
        pool.set_visible(h, true);
        pool.release(h);

        let again = pool.acquire();
        assert_eq!(again.index(), h.index(), "slot reused");
        assert_eq!(pool.get(again), Sprite::BLANK, "reset on release");
        assert_eq!(pool.allocations(), 1);
    }

    #[test]
    fn steady_state_passes_do_not_allocate() {
        let mut pool = SpritePool::new();
        for _ in 0..5 {
            pool.acquire();
        }
        assert_eq!(pool.allocations(), 5);
        for _ in 0..10 {
            pool.release_all();
            for _ in 0..5 {
                pool.acquire();
            }
        }
        assert_eq!(pool.allocations(), 5);
        assert_eq!(pool.capacity(), 5);
        assert_eq!(pool.active_len(), 5);
    }

    #[test]
    fn release_all_preserves_slot_order() {
        let mut pool = SpritePool::new();
        let first: alloc::vec::Vec<u32> = (0..4).map(|_| pool.acquire().index()).collect();
        pool.release_all();
        let second: alloc::vec::Vec<u32> = (0..4).map(|_| pool.acquire().index()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn iter_active_follows_acquisition_order() {
        let mut pool = SpritePool::new();
        let a = pool.acquire();
        let b = pool.acquire();
        pool.set_instance(a, InstanceId(10));
        pool.set_instance(b, InstanceId(20));
        let seen: alloc::vec::Vec<_> = pool.iter_active().map(|(_, s)| s.instance).collect();
        assert_eq!(seen, [Some(InstanceId(10)), Some(InstanceId(20))]);
        pool.release(a);
        assert_eq!(pool.iter_active().count(), 1);
        assert_eq!(pool.free_len(), 1);
    }

    #[test]
    #[should_panic(expected = "stale SpriteHandle")]
    fn stale_handle_panics() {
        let mut pool = SpritePool::new();
        let h = pool.acquire();
        pool.release_all();
        pool.set_visible(h, true);
    }

    #[test]
    #[should_panic(expected = "stale SpriteHandle")]
    fn double_release_panics() {
        let mut pool = SpritePool::new();
        let h = pool.acquire();
        pool.release(h);
        pool.release(h);
    }
}
