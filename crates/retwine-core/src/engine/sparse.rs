//! Compressed sparse row matrices for the projection step.
//!
//! The backbone extractor materializes three matrices over the same sparsity
//! pattern (observed counts, expected counts, p-values). CSR keeps the
//! nonzero entries contiguous per row; a dense representation is not
//! acceptable at realistic scale (hundreds of thousands of users/posts).

/// An immutable CSR matrix with f64 values.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    nrows: usize,
    ncols: usize,
    /// Row start offsets into `indices`/`data`; length `nrows + 1`.
    indptr: Vec<usize>,
    /// Column index per nonzero entry, ascending within each row.
    indices: Vec<u32>,
    /// Value per nonzero entry.
    data: Vec<f64>,
}

impl CsrMatrix {
    /// An empty matrix of the given shape.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        CsrMatrix {
            nrows,
            ncols,
            indptr: vec![0; nrows + 1],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Builds a matrix from `(row, col, value)` triplets.
    ///
    /// Triplets must be sorted by `(row, col)` and free of duplicates; this
    /// is a programmer contract (the extractor produces them that way), so
    /// violations are debug assertions rather than runtime errors.
    pub fn from_sorted_triplets(
        nrows: usize,
        ncols: usize,
        triplets: impl IntoIterator<Item = (u32, u32, f64)>,
    ) -> Self {
        let mut indptr = vec![0usize; nrows + 1];
        let mut indices = Vec::new();
        let mut data = Vec::new();
        let mut last: Option<(u32, u32)> = None;
        for (row, col, value) in triplets {
            debug_assert!((row as usize) < nrows && (col as usize) < ncols);
            debug_assert!(last.map_or(true, |prev| prev < (row, col)), "unsorted triplets");
            last = Some((row, col));
            indptr[row as usize + 1] += 1;
            indices.push(col);
            data.push(value);
        }
        for i in 0..nrows {
            indptr[i + 1] += indptr[i];
        }
        CsrMatrix {
            nrows,
            ncols,
            indptr,
            indices,
            data,
        }
    }

    /// Matrix shape as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// Number of stored (nonzero) entries.
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// The stored value at `(row, col)`, or 0.0 when absent.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        let (cols, values) = self.row(row);
        match cols.binary_search(&(col as u32)) {
            Ok(pos) => values[pos],
            Err(_) => 0.0,
        }
    }

    /// Column indices and values of one row.
    pub fn row(&self, row: usize) -> (&[u32], &[f64]) {
        let start = self.indptr[row];
        let end = self.indptr[row + 1];
        (&self.indices[start..end], &self.data[start..end])
    }

    /// Iterates stored entries as `(row, col, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.nrows).flat_map(move |row| {
            let (cols, values) = self.row(row);
            cols.iter()
                .zip(values)
                .map(move |(&col, &value)| (row, col as usize, value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triplets_round_trip_through_get() {
        let m = CsrMatrix::from_sorted_triplets(
            3,
            4,
            vec![(0, 1, 2.0), (0, 3, 1.0), (2, 0, 5.0)],
        );
        assert_eq!(m.shape(), (3, 4));
        assert_eq!(m.nnz(), 3);
        assert_eq!(m.get(0, 1), 2.0);
        assert_eq!(m.get(0, 3), 1.0);
        assert_eq!(m.get(2, 0), 5.0);
        assert_eq!(m.get(1, 1), 0.0);
    }

    #[test]
    fn iter_yields_row_major_entries() {
        let m = CsrMatrix::from_sorted_triplets(2, 2, vec![(0, 0, 1.0), (1, 1, 2.0)]);
        let entries: Vec<_> = m.iter().collect();
        assert_eq!(entries, vec![(0, 0, 1.0), (1, 1, 2.0)]);
    }

    #[test]
    fn empty_rows_are_handled() {
        let m = CsrMatrix::zeros(5, 5);
        assert_eq!(m.nnz(), 0);
        assert_eq!(m.row(3), (&[][..], &[][..]));
    }
}
