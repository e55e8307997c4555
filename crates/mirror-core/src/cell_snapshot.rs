//! Sparse snapshot of the non-empty cells in a region.
//!
//! Only cells whose material differs from the default empty material are
//! recorded. Restoration therefore has two passes: first every region cell
//! missing from the snapshot is emptied (this removes anything built during
//! the overlay), then every recorded cell is written back (this replaces
//! anything destroyed or altered).

use std::collections::BTreeMap;

use mirror_types::{BlockPos, Material, WorldId};
use mirror_world::VoxelStore;

use crate::region::Region;

/// Cell counts reported by [`CellSnapshot::restore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellRestoreStats {
    /// Untracked cells that held something and were emptied.
    pub cleared: u64,
    /// Recorded cells written back.
    pub rewritten: u64,
}

/// Recorded materials of a region's non-empty cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellSnapshot {
    cells: BTreeMap<BlockPos, Material>,
}

impl CellSnapshot {
    /// Record every non-empty cell of `region`.
    pub fn capture<V: VoxelStore + ?Sized>(store: &V, world: WorldId, region: Region) -> Self {
        let cells = region
            .cells()
            .filter_map(|pos| {
                let material = store.cell(world, pos);
                (!material.is_default()).then_some((pos, material))
            })
            .collect();
        Self { cells }
    }

    /// Return every cell of `region` to its recorded state.
    ///
    /// Cells absent from the snapshot end up empty. Idempotent: a second
    /// call finds nothing left to clear and rewrites the same materials.
    pub fn restore<V: VoxelStore + ?Sized>(
        &self,
        store: &mut V,
        world: WorldId,
        region: Region,
    ) -> CellRestoreStats {
        let mut stats = CellRestoreStats::default();

        for pos in region.cells() {
            if self.cells.contains_key(&pos) {
                continue;
            }
            if !store.cell(world, pos).is_default() {
                store.set_cell(world, pos, Material::AIR);
                stats.cleared = stats.cleared.saturating_add(1);
            }
        }

        for (&pos, &material) in &self.cells {
            store.set_cell(world, pos, material);
            stats.rewritten = stats.rewritten.saturating_add(1);
        }

        stats
    }

    /// Recorded material at `pos`, if the cell was non-empty at capture.
    pub fn get(&self, pos: BlockPos) -> Option<Material> {
        self.cells.get(&pos).copied()
    }

    /// Number of recorded cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell was recorded.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over recorded cells in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (BlockPos, Material)> + '_ {
        self.cells.iter().map(|(&pos, &material)| (pos, material))
    }
}
