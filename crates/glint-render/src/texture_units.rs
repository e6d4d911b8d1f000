//! Per-group texture-unit bookkeeping.
//!
//! Greedy first-fit: a texture keeps the first slot it was given for the
//! lifetime of the group, and when the table is full the group closes
//! instead of evicting. Reuse across groups buys nothing since every group
//! is a separate draw call, so the table is simply cleared per group.

use ahash::HashMap;

/// Assigns a bounded number of sampler slots to the distinct textures of the
/// current batch group.
#[derive(Debug)]
pub struct TextureUnitAllocator {
    max_units: u32,
    /// Texture ids in slot order.
    slots: Vec<u64>,
    lookup: HashMap<u64, u32>,
}

impl TextureUnitAllocator {
    /// `max_units` is the device's simultaneous-binding budget. A backend
    /// reporting 0 is treated as 1: every group can bind at least one
    /// texture.
    pub fn new(max_units: u32) -> Self {
        if max_units == 0 {
            tracing::warn!("backend reported 0 texture units, clamping to 1");
        }
        Self {
            max_units: max_units.max(1),
            slots: Vec::new(),
            lookup: HashMap::default(),
        }
    }

    /// Clear the slot table for a fresh group.
    pub fn begin_group(&mut self) {
        self.slots.clear();
        self.lookup.clear();
    }

    /// Assign a slot to `texture_id`, reusing an existing assignment.
    /// Returns `None` when the group's budget is exhausted.
    pub fn try_assign(&mut self, texture_id: u64) -> Option<u32> {
        if let Some(&slot) = self.lookup.get(&texture_id) {
            return Some(slot);
        }
        if self.slots.len() as u32 >= self.max_units {
            return None;
        }
        let slot = self.slots.len() as u32;
        self.slots.push(texture_id);
        self.lookup.insert(texture_id, slot);
        Some(slot)
    }

    /// Texture ids of the current group, in slot order.
    pub fn assigned(&self) -> &[u64] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn max_units(&self) -> u32 {
        self.max_units
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assigns_sequential_slots() {
        let mut units = TextureUnitAllocator::new(4);
        assert_eq!(units.try_assign(10), Some(0));
        assert_eq!(units.try_assign(20), Some(1));
        assert_eq!(units.try_assign(30), Some(2));
        assert_eq!(units.assigned(), &[10, 20, 30]);
    }

    #[test]
    fn test_reuses_existing_assignment() {
        let mut units = TextureUnitAllocator::new(2);
        assert_eq!(units.try_assign(10), Some(0));
        assert_eq!(units.try_assign(20), Some(1));
        assert_eq!(units.try_assign(10), Some(0));
        assert_eq!(units.len(), 2);
    }

    #[test]
    fn test_full_table_rejects_new_textures() {
        let mut units = TextureUnitAllocator::new(2);
        units.try_assign(10);
        units.try_assign(20);
        assert_eq!(units.try_assign(30), None);
        // Known textures still resolve.
        assert_eq!(units.try_assign(20), Some(1));
    }

    #[test]
    fn test_begin_group_clears_table() {
        let mut units = TextureUnitAllocator::new(1);
        units.try_assign(10);
        assert_eq!(units.try_assign(20), None);
        units.begin_group();
        assert_eq!(units.try_assign(20), Some(0));
    }

    #[test]
    fn test_zero_budget_clamps_to_one() {
        let mut units = TextureUnitAllocator::new(0);
        assert_eq!(units.max_units(), 1);
        assert_eq!(units.try_assign(10), Some(0));
        assert_eq!(units.try_assign(20), None);
    }
}
