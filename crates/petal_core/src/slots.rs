//! Context slot allocator
//!
//! Drawing surfaces are addressed by small integer ids so records can name
//! them in 16 bits. Id 0 is the primary surface: it exists from the start,
//! is never handed out by [`ContextSlots::lease`] and can never be released.
//! Every other id is leased from a free list and goes back to it on release.
//! A retired id is no longer leased but stays off the free list until
//! [`ContextSlots::recycle`], so pending records naming it cannot be
//! misattributed to a new owner.

use std::fmt;

use crate::error::{Error, Result};

/// Id of a virtual drawing surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u16);

impl ContextId {
    /// The always-present primary surface
    pub const PRIMARY: ContextId = ContextId(0);

    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    pub const fn is_primary(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Free-list allocator for context ids
#[derive(Debug)]
pub struct ContextSlots {
    /// Next never-used id
    next: u32,
    /// Released ids, reused last-in first-out
    free: Vec<u16>,
    /// Retired ids waiting for [`ContextSlots::recycle`]
    retired: Vec<u16>,
    /// `leased[id]` is true while `id` is handed out. Index 0 is always true.
    leased: Vec<bool>,
}

impl ContextSlots {
    pub fn new() -> Self {
        Self {
            next: 1,
            free: Vec::new(),
            retired: Vec::new(),
            leased: vec![true],
        }
    }

    /// Hand out an id: the most recently released one if any, else a new one
    pub fn lease(&mut self) -> Result<ContextId> {
        let id = match self.free.pop() {
            Some(id) => id,
            None => {
                let id = u16::try_from(self.next).map_err(|_| Error::ContextsExhausted)?;
                self.next += 1;
                self.leased.push(false);
                id
            }
        };
        self.leased[id as usize] = true;
        Ok(ContextId(id))
    }

    /// Return an id to the free list.
    ///
    /// Releasing the primary context is refused, as is releasing an id that
    /// is not currently leased; neither touches the free list.
    pub fn release(&mut self, id: ContextId) -> Result<()> {
        self.unlease(id)?;
        self.free.push(id.0);
        Ok(())
    }

    /// Like [`ContextSlots::release`], but the id is only leasable again
    /// after the next [`ContextSlots::recycle`].
    pub fn retire(&mut self, id: ContextId) -> Result<()> {
        self.unlease(id)?;
        self.retired.push(id.0);
        Ok(())
    }

    /// Move every retired id to the free list, returning them in retire order
    pub fn recycle(&mut self) -> Vec<ContextId> {
        let ids: Vec<ContextId> = self.retired.iter().map(|&id| ContextId(id)).collect();
        self.free.append(&mut self.retired);
        ids
    }

    /// Retired ids not yet recycled
    pub fn retired(&self) -> usize {
        self.retired.len()
    }

    fn unlease(&mut self, id: ContextId) -> Result<()> {
        if id.is_primary() {
            return Err(Error::PrimaryContextRelease);
        }
        match self.leased.get_mut(id.0 as usize) {
            Some(leased) if *leased => {
                *leased = false;
                Ok(())
            }
            _ => Err(Error::ContextNotLeased(id)),
        }
    }

    pub fn is_leased(&self, id: ContextId) -> bool {
        self.leased.get(id.0 as usize).copied().unwrap_or(false)
    }

    /// Number of live ids, including the primary one
    pub fn live_count(&self) -> usize {
        self.leased.iter().filter(|leased| **leased).count()
    }

    /// Live ids in ascending order, primary first
    pub fn live(&self) -> impl Iterator<Item = ContextId> + '_ {
        self.leased
            .iter()
            .enumerate()
            .filter(|(_, leased)| **leased)
            .map(|(id, _)| ContextId(id as u16))
    }
}

impl Default for ContextSlots {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_is_preassigned() {
        let mut slots = ContextSlots::new();
        assert!(slots.is_leased(ContextId::PRIMARY));
        assert_eq!(slots.lease().unwrap(), ContextId::new(1));
        assert_eq!(slots.lease().unwrap(), ContextId::new(2));
    }

    #[test]
    fn test_release_then_lease_reuses_id() {
        let mut slots = ContextSlots::new();
        let a = slots.lease().unwrap();
        let _b = slots.lease().unwrap();

        slots.release(a).unwrap();
        assert!(!slots.is_leased(a));
        assert_eq!(slots.lease().unwrap(), a);
    }

    #[test]
    fn test_free_list_is_lifo() {
        let mut slots = ContextSlots::new();
        let a = slots.lease().unwrap();
        let b = slots.lease().unwrap();
        slots.release(a).unwrap();
        slots.release(b).unwrap();

        assert_eq!(slots.lease().unwrap(), b);
        assert_eq!(slots.lease().unwrap(), a);
        assert_eq!(slots.lease().unwrap(), ContextId::new(3));
    }

    #[test]
    fn test_primary_release_refused() {
        let mut slots = ContextSlots::new();
        assert!(matches!(
            slots.release(ContextId::PRIMARY),
            Err(Error::PrimaryContextRelease)
        ));
        // Free list untouched: the next lease is still a fresh id
        assert_eq!(slots.lease().unwrap(), ContextId::new(1));
    }

    #[test]
    fn test_double_release_refused() {
        let mut slots = ContextSlots::new();
        let a = slots.lease().unwrap();
        slots.release(a).unwrap();
        assert!(matches!(slots.release(a), Err(Error::ContextNotLeased(id)) if id == a));
        assert!(matches!(
            slots.release(ContextId::new(42)),
            Err(Error::ContextNotLeased(_))
        ));

        // Only one copy of `a` went back to the free list
        assert_eq!(slots.lease().unwrap(), a);
        assert_ne!(slots.lease().unwrap(), a);
    }

    #[test]
    fn test_live_listing() {
        let mut slots = ContextSlots::new();
        let a = slots.lease().unwrap();
        let b = slots.lease().unwrap();
        slots.release(a).unwrap();

        assert_eq!(slots.live_count(), 2);
        assert_eq!(
            slots.live().collect::<Vec<_>>(),
            vec![ContextId::PRIMARY, b]
        );
    }

    #[test]
    fn test_retired_id_waits_for_recycle() {
        let mut slots = ContextSlots::new();
        let a = slots.lease().unwrap();
        slots.retire(a).unwrap();
        assert!(!slots.is_leased(a));
        assert!(matches!(slots.retire(a), Err(Error::ContextNotLeased(_))));
        assert!(matches!(
            slots.retire(ContextId::PRIMARY),
            Err(Error::PrimaryContextRelease)
        ));

        // Not reusable before recycling
        let b = slots.lease().unwrap();
        assert_ne!(b, a);
        assert_eq!(slots.retired(), 1);

        assert_eq!(slots.recycle(), vec![a]);
        assert_eq!(slots.retired(), 0);
        assert_eq!(slots.lease().unwrap(), a);
        assert!(slots.recycle().is_empty());
    }

    #[test]
    fn test_exhaustion() {
        let mut slots = ContextSlots::new();
        for _ in 1..=u16::MAX as u32 {
            slots.lease().unwrap();
        }
        assert!(matches!(slots.lease(), Err(Error::ContextsExhausted)));
    }
}
