use lunk_core::CellCoord;

/// Marker for a cell that holds no tile.
pub const EMPTY_CODE: i32 = -1;

/// Row-major grid of tile codes decoded from a comma-separated layer file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer {
    columns: u32,
    rows: u32,
    codes: Vec<i32>,
}

/// Reasons a layer file cannot be decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum LayerDefect {
    Empty,
    NotAnInteger {
        row: u32,
        column: u32,
        value: String,
    },
    Ragged {
        row: u32,
        expected: u32,
        actual: u32,
    },
}

impl Layer {
    /// Decodes a layer from its textual form.
    ///
    /// Blank lines are skipped; surrounding whitespace around each value is ignored.
    pub(crate) fn parse(contents: &str) -> Result<Self, LayerDefect> {
        let mut codes = Vec::new();
        let mut columns = None;
        let mut rows = 0_u32;

        for line in contents.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let mut width = 0_u32;
            for (column, value) in line.split(',').enumerate() {
                let value = value.trim();
                let code = value
                    .parse::<i32>()
                    .map_err(|_| LayerDefect::NotAnInteger {
                        row: rows,
                        column: column as u32,
                        value: value.to_owned(),
                    })?;
                codes.push(code);
                width += 1;
            }

            match columns {
                None => columns = Some(width),
                Some(expected) if expected != width => {
                    return Err(LayerDefect::Ragged {
                        row: rows,
                        expected,
                        actual: width,
                    });
                }
                Some(_) => {}
            }
            rows += 1;
        }

        let Some(columns) = columns else {
            return Err(LayerDefect::Empty);
        };

        Ok(Self {
            columns,
            rows,
            codes,
        })
    }

    /// Number of columns in the layer.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the layer.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Tile code stored at `cell`, or `None` when the cell is empty or outside the layer.
    #[must_use]
    pub fn code(&self, cell: CellCoord) -> Option<i32> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let index = cell.row() as usize * self.columns as usize + cell.column() as usize;
        self.codes
            .get(index)
            .copied()
            .filter(|code| *code != EMPTY_CODE)
    }

    /// Iterates over every non-empty cell in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (CellCoord, i32)> + '_ {
        let columns = self.columns;
        self.codes
            .iter()
            .enumerate()
            .filter(|(_, code)| **code != EMPTY_CODE)
            .map(move |(index, code)| {
                let index = index as u32;
                (CellCoord::new(index % columns, index / columns), *code)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_and_skips_empty_cells() {
        let layer = Layer::parse("-1,3,-1\n 0, -1 ,7\n\n").expect("layer");
        assert_eq!((layer.columns(), layer.rows()), (3, 2));
        assert_eq!(layer.code(CellCoord::new(1, 0)), Some(3));
        assert_eq!(layer.code(CellCoord::new(0, 0)), None);
        assert_eq!(layer.code(CellCoord::new(5, 0)), None);

        let tiles: Vec<_> = layer.tiles().collect();
        assert_eq!(
            tiles,
            vec![
                (CellCoord::new(1, 0), 3),
                (CellCoord::new(0, 1), 0),
                (CellCoord::new(2, 1), 7),
            ]
        );
    }

    #[test]
    fn rejects_ragged_rows() {
        assert_eq!(
            Layer::parse("1,2,3\n4,5\n"),
            Err(LayerDefect::Ragged {
                row: 1,
                expected: 3,
                actual: 2,
            })
        );
    }

    #[test]
    fn rejects_non_numeric_values() {
        assert_eq!(
            Layer::parse("1,x\n"),
            Err(LayerDefect::NotAnInteger {
                row: 0,
                column: 1,
                value: "x".to_owned(),
            })
        );
    }

    #[test]
    fn rejects_empty_files() {
        assert_eq!(Layer::parse("\n  \n"), Err(LayerDefect::Empty));
    }
}
