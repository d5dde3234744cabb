/// Stable handle to a tape cell.
///
/// Handles are assigned in allocation order, so the origin cell is always
/// `CellId(0)`. A handle stays valid for the lifetime of the tape because
/// cells are never removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(usize);

impl CellId {
    /// Allocation order of this cell (0 for the origin).
    pub fn serial(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
struct Cell {
    value: u8,
    left: Option<CellId>,
    right: Option<CellId>,
}

impl Cell {
    fn zero() -> Self {
        Self {
            value: 0,
            left: None,
            right: None,
        }
    }
}

/// A tape of byte cells that grows lazily in both directions.
///
/// Cells live in an arena and are linked to their neighbors by handle.
/// Moving off either end allocates a fresh zero cell; nothing is ever freed.
#[derive(Clone, Debug)]
pub struct Tape {
    cells: Vec<Cell>,
    leftmost: CellId,
}

impl Tape {
    const ORIGIN: CellId = CellId(0);

    /// A tape holding only the origin cell, set to zero.
    pub fn new() -> Self {
        Self {
            cells: vec![Cell::zero()],
            leftmost: Self::ORIGIN,
        }
    }

    pub fn origin(&self) -> CellId {
        Self::ORIGIN
    }

    pub fn leftmost(&self) -> CellId {
        self.leftmost
    }

    /// Number of cells allocated so far.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn value(&self, id: CellId) -> u8 {
        self.cells[id.0].value
    }

    pub fn set(&mut self, id: CellId, value: u8) {
        self.cells[id.0].value = value;
    }

    pub fn increment(&mut self, id: CellId) {
        let cell = &mut self.cells[id.0];
        cell.value = cell.value.wrapping_add(1);
    }

    pub fn decrement(&mut self, id: CellId) {
        let cell = &mut self.cells[id.0];
        cell.value = cell.value.wrapping_sub(1);
    }

    /// The right neighbor of `id`, allocating it if needed.
    pub fn right_of(&mut self, id: CellId) -> CellId {
        if let Some(right) = self.cells[id.0].right {
            return right;
        }
        let new = self.alloc(Cell {
            left: Some(id),
            ..Cell::zero()
        });
        self.cells[id.0].right = Some(new);
        new
    }

    /// The left neighbor of `id`, allocating it if needed.
    pub fn left_of(&mut self, id: CellId) -> CellId {
        if let Some(left) = self.cells[id.0].left {
            return left;
        }
        let new = self.alloc(Cell {
            right: Some(id),
            ..Cell::zero()
        });
        self.cells[id.0].left = Some(new);
        if id == self.leftmost {
            self.leftmost = new;
        }
        new
    }

    /// Cells from leftmost to rightmost.
    pub fn iter(&self) -> Cells<'_> {
        Cells {
            tape: self,
            next: Some(self.leftmost),
        }
    }

    /// Zero-based position of `id` counted from the leftmost cell.
    pub fn index_of(&self, id: CellId) -> usize {
        // Linear walk; the tape is linked, not indexed.
        self.iter()
            .position(|(cell, _)| cell == id)
            .unwrap_or(0)
    }

    fn alloc(&mut self, cell: Cell) -> CellId {
        self.cells.push(cell);
        CellId(self.cells.len() - 1)
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

/// Left-to-right iterator over `(handle, value)` pairs.
pub struct Cells<'a> {
    tape: &'a Tape,
    next: Option<CellId>,
}

impl Iterator for Cells<'_> {
    type Item = (CellId, u8);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let cell = &self.tape.cells[id.0];
        self.next = cell.right;
        Some((id, cell.value))
    }
}
