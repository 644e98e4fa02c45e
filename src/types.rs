use smallvec::SmallVec;

/// Single coordinate axis, used for column/row positions and board width/height.
pub type Coord = u8;

/// Count type for cells and mines; a full 255x255 board still fits.
pub type CellCount = u16;

/// Board position as `(col, row)`.
pub type Pos = (Coord, Coord);

/// Conversion from a board position to an `ndarray` index with axes `(col, row)`.
pub trait GridIndex {
    type Output;
    fn to_index(self) -> Self::Output;
}

impl GridIndex for Pos {
    type Output = [usize; 2];

    fn to_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn cell_product(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// The 8-way neighborhood, in the order neighbors are visited.
const NEIGHBOR_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// In-bounds neighbors of `pos` on a `size` board, in a fixed order.
pub fn neighbors(pos: Pos, size: Pos) -> SmallVec<[Pos; 8]> {
    let mut found = SmallVec::new();
    for (dc, dr) in NEIGHBOR_OFFSETS {
        let Some(col) = pos.0.checked_add_signed(dc) else {
            continue;
        };
        let Some(row) = pos.1.checked_add_signed(dr) else {
            continue;
        };
        if col < size.0 && row < size.1 {
            found.push((col, row));
        }
    }
    found
}
