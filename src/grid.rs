//! Table grid builder.
//!
//! Turns a list of table rows (cells with `colspan`/`rowspan`) into an R×C
//! grid where every slot is exactly one [`GridCell`]. Every renderer goes
//! through [`build_grid`], so a table always resolves to the same grid
//! whatever the output format.

use crate::model::{Node, NodeKind};
use serde::{Deserialize, Serialize};

/// Largest honoured `colspan`, as in HTML.
pub const MAX_COLSPAN: usize = 1000;

/// Largest honoured `rowspan`, as in HTML.
pub const MAX_ROWSPAN: usize = 65534;

/// Position of a source cell: row index and cell index within that row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    /// Source row index
    pub row: usize,
    /// Cell index within the source row
    pub cell: usize,
}

/// One slot of a built grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GridCell {
    /// No source cell covers this slot
    Empty,
    /// Top-left slot of a source cell
    Master {
        /// The owning source cell
        source: CellRef,
        /// Effective column span (clipped to the grid)
        colspan: usize,
        /// Effective row span (clipped to the grid)
        rowspan: usize,
    },
    /// Covered by a master to the left in the same row
    HorizontalContinuation {
        /// The owning source cell
        source: CellRef,
    },
    /// Covered by a master in a row above
    VerticalContinuation {
        /// The owning source cell
        source: CellRef,
    },
}

impl GridCell {
    /// Get the owning source cell, if any.
    pub fn source(&self) -> Option<CellRef> {
        match *self {
            GridCell::Empty => None,
            GridCell::Master { source, .. }
            | GridCell::HorizontalContinuation { source }
            | GridCell::VerticalContinuation { source } => Some(source),
        }
    }

    /// Check if this slot is a master.
    pub fn is_master(&self) -> bool {
        matches!(self, GridCell::Master { .. })
    }

    /// Check if this slot is empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, GridCell::Empty)
    }
}

/// Declared spans of one source cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Declared column span (at least 1)
    pub colspan: usize,
    /// Declared row span (at least 1)
    pub rowspan: usize,
}

impl Span {
    /// Create a span, clamping to `1..=MAX_COLSPAN` and `1..=MAX_ROWSPAN`.
    pub fn new(colspan: usize, rowspan: usize) -> Self {
        Self {
            colspan: colspan.clamp(1, MAX_COLSPAN),
            rowspan: rowspan.clamp(1, MAX_ROWSPAN),
        }
    }

    /// Read the `colspan`/`rowspan` attributes of a cell node.
    pub fn of(cell: &Node) -> Self {
        let span = |key: &str| cell.attributes.get(key).map_or(1, |v| v.as_span());
        Self::new(span("colspan"), span("rowspan"))
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// A merge-aware table grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Slots, row-major
    pub rows: Vec<Vec<GridCell>>,
}

impl Grid {
    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Get the slot at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<&GridCell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Iterate masters with their slot position, row-major.
    pub fn masters(&self) -> impl Iterator<Item = (usize, usize, &GridCell)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, cell)| cell.is_master())
                .map(move |(c, cell)| (r, c, cell))
        })
    }

    /// Check if any master spans more than one slot.
    pub fn has_merged_cells(&self) -> bool {
        self.masters().any(|(_, _, cell)| {
            matches!(cell, GridCell::Master { colspan, rowspan, .. } if *colspan > 1 || *rowspan > 1)
        })
    }

    /// Resolve a cell reference against the rows the grid was built from.
    pub fn cell<'a>(&self, rows: &'a [Node], source: CellRef) -> Option<&'a Node> {
        rows.get(source.row)
            .and_then(|row| row_cells(row).nth(source.cell))
    }
}

/// Iterate the cell children of a table row.
pub fn row_cells(row: &Node) -> impl Iterator<Item = &Node> + '_ {
    row.content
        .iter()
        .filter(|c| matches!(c.kind, NodeKind::TableCell { .. }))
}

/// Build the grid for a list of table-row nodes.
pub fn build_grid(rows: &[Node]) -> Grid {
    let spans: Vec<Vec<Span>> = rows
        .iter()
        .map(|row| row_cells(row).map(Span::of).collect())
        .collect();
    build_grid_from_spans(&spans)
}

/// Build the grid from declared spans, one vector per row.
///
/// Columns are the largest per-row colspan sum, each colspan capped at
/// [`MAX_COLSPAN`]. Cells are placed left to right at the first free slot;
/// spans are clipped where they would leave the grid or run into an
/// occupied slot, and cells that find no free slot in their row are
/// dropped.
pub fn build_grid_from_spans(rows: &[Vec<Span>]) -> Grid {
    let row_count = rows.len();
    let column_count = rows
        .iter()
        .map(|row| {
            row.iter()
                .fold(0usize, |acc, s| acc.saturating_add(s.colspan.clamp(1, MAX_COLSPAN)))
        })
        .max()
        .unwrap_or(0);

    let mut slots = vec![vec![GridCell::Empty; column_count]; row_count];

    for (r, row) in rows.iter().enumerate() {
        let mut col = 0;
        for (i, span) in row.iter().enumerate() {
            while col < column_count && !slots[r][col].is_empty() {
                col += 1;
            }
            if col >= column_count {
                log::debug!(
                    "Table row {} overflows {} columns; dropping {} cell(s)",
                    r,
                    column_count,
                    row.len() - i
                );
                break;
            }

            let end = col.saturating_add(span.colspan.clamp(1, MAX_COLSPAN));
            let colspan = (col..column_count.min(end))
                .take_while(|&c| slots[r][c].is_empty())
                .count();
            let mut rowspan = 1;
            while rowspan < span.rowspan
                && r.saturating_add(rowspan) < row_count
                && slots[r + rowspan][col..col + colspan]
                    .iter()
                    .all(GridCell::is_empty)
            {
                rowspan += 1;
            }
            if rowspan < span.rowspan {
                log::trace!(
                    "Rowspan {} of cell ({}, {}) clipped to {}",
                    span.rowspan,
                    r,
                    i,
                    rowspan
                );
            }

            let source = CellRef { row: r, cell: i };
            slots[r][col] = GridCell::Master {
                source,
                colspan,
                rowspan,
            };
            for slot in &mut slots[r][col + 1..col + colspan] {
                *slot = GridCell::HorizontalContinuation { source };
            }
            for below in &mut slots[r + 1..r + rowspan] {
                for slot in &mut below[col..col + colspan] {
                    *slot = GridCell::VerticalContinuation { source };
                }
            }

            col += colspan;
        }
    }

    Grid { rows: slots }
}
