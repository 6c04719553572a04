//! Landscape cells and the entity location index that shadows them.

use lunk_core::{CellCoord, EntityId, Landscape, LandscapeView, OccupancyView};

/// Dense row-major grid of landscape cells.
#[derive(Clone, Debug)]
pub(crate) struct LandscapeGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Landscape>,
}

impl LandscapeGrid {
    pub(crate) fn new(columns: u32, rows: u32, cells: Vec<Landscape>) -> Self {
        Self {
            columns,
            rows,
            cells,
        }
    }

    pub(crate) fn landscape(&self, cell: CellCoord) -> Option<Landscape> {
        index(self.columns, self.rows, cell).and_then(|index| self.cells.get(index).copied())
    }

    pub(crate) fn is_wall(&self, cell: CellCoord) -> bool {
        self.landscape(cell) == Some(Landscape::Wall)
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Overwrites a cell, returning the landscape it held before.
    pub(crate) fn set(&mut self, cell: CellCoord, landscape: Landscape) -> Option<Landscape> {
        let index = index(self.columns, self.rows, cell)?;
        let slot = self.cells.get_mut(index)?;
        Some(std::mem::replace(slot, landscape))
    }

    /// Non-wall cells whose column and row offsets from `center` lie in `[-radius, radius)`.
    pub(crate) fn open_cells_around(&self, center: CellCoord, radius: u32) -> Vec<CellCoord> {
        let radius = i64::from(radius);
        let mut cells = Vec::new();
        for row_offset in -radius..radius {
            for column_offset in -radius..radius {
                let column = i64::from(center.column()) + column_offset;
                let row = i64::from(center.row()) + row_offset;
                let (Ok(column), Ok(row)) = (u32::try_from(column), u32::try_from(row)) else {
                    continue;
                };
                let cell = CellCoord::new(column, row);
                if self.landscape(cell) == Some(Landscape::Open) {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    pub(crate) fn view(&self) -> LandscapeView<'_> {
        LandscapeView::new(&self.cells, self.columns, self.rows)
    }

    pub(crate) const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }
}

/// Maps every cell to the ids of the entities whose position lies inside it.
///
/// Each occupant list stays sorted so lookups are deterministic.
#[derive(Clone, Debug)]
pub(crate) struct EntityIndex {
    columns: u32,
    rows: u32,
    cells: Vec<Vec<EntityId>>,
}

impl EntityIndex {
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![Vec::new(); capacity],
        }
    }

    pub(crate) fn insert(&mut self, entity: EntityId, cell: CellCoord) {
        let Some(occupants) = self.slot_mut(cell) else {
            return;
        };
        if let Err(position) = occupants.binary_search(&entity) {
            occupants.insert(position, entity);
        }
    }

    pub(crate) fn remove(&mut self, entity: EntityId, cell: CellCoord) {
        let Some(occupants) = self.slot_mut(cell) else {
            return;
        };
        if let Ok(position) = occupants.binary_search(&entity) {
            let _ = occupants.remove(position);
        }
    }

    pub(crate) fn relocate(&mut self, entity: EntityId, from: CellCoord, to: CellCoord) {
        if from == to {
            return;
        }
        self.remove(entity, from);
        self.insert(entity, to);
    }

    pub(crate) fn occupants(&self, cell: CellCoord) -> &[EntityId] {
        index(self.columns, self.rows, cell)
            .and_then(|index| self.cells.get(index))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn view(&self) -> OccupancyView<'_> {
        OccupancyView::new(&self.cells, self.columns, self.rows)
    }

    fn slot_mut(&mut self, cell: CellCoord) -> Option<&mut Vec<EntityId>> {
        let index = index(self.columns, self.rows, cell)?;
        self.cells.get_mut(index)
    }
}

fn index(columns: u32, rows: u32, cell: CellCoord) -> Option<usize> {
    if cell.column() < columns && cell.row() < rows {
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(columns).ok()?;
        Some(row * width + column)
    } else {
        None
    }
}
