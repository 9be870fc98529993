// Copyright (c) 2024 Mudit Bhargava
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.
//

// comb.rs
//
// This file contains the comb-vector (row displacement) compression for the
// state/class tables. All non-default entries share one array; each row is
// written at an offset chosen so no two non-default entries collide, and a
// check array records which row owns each cell.

use serde::Serialize;

/// Check value of a vacant comb cell; no row ever carries this number.
const NO_ROW: u32 = u32::MAX;

#[derive(Debug, Clone, Serialize)]
pub struct CombVect {
    pub comb: Vec<u32>,
    pub check: Vec<u32>,
    pub base: Vec<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub enum Encoding {
    Full { data: Vec<u32> },
    Comb(CombVect),
}

/// A `(state, class)` table, stored either as the full matrix or comb
/// compressed when the comb form is sufficiently smaller.
#[derive(Debug, Clone, Serialize)]
pub struct StateClassTable {
    pub rows: usize,
    pub cols: usize,
    pub default: u32,
    pub encoding: Encoding,
}

impl StateClassTable {
    /// Build from a row-major matrix, preferring the comb encoding only
    /// when twice the full length exceeds five times the comb length.
    pub fn build(matrix: Vec<u32>, rows: usize, cols: usize, default: u32) -> Self {
        debug_assert_eq!(matrix.len(), rows * cols);
        let comb = compress(&matrix, rows, cols, default);
        let full_len = matrix.len();
        let comb_len = comb.comb.len();
        let encoding = if 2 * full_len > 5 * comb_len {
            Encoding::Comb(comb)
        } else {
            Encoding::Full { data: matrix }
        };
        Self {
            rows,
            cols,
            default,
            encoding,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> u32 {
        if row >= self.rows || col >= self.cols {
            return self.default;
        }
        match &self.encoding {
            Encoding::Full { data } => data[row * self.cols + col],
            Encoding::Comb(comb) => {
                let index = comb.base[row] as usize + col;
                if index < comb.check.len() && comb.check[index] == row as u32 {
                    comb.comb[index]
                } else {
                    self.default
                }
            },
        }
    }

    pub fn is_comb(&self) -> bool {
        matches!(self.encoding, Encoding::Comb(_))
    }

    /// Number of stored elements (for the statistics report).
    pub fn stored_len(&self) -> usize {
        match &self.encoding {
            Encoding::Full { data } => data.len(),
            Encoding::Comb(comb) => comb.comb.len() + comb.check.len() + comb.base.len(),
        }
    }
}

fn compress(matrix: &[u32], rows: usize, cols: usize, default: u32) -> CombVect {
    let mut comb: Vec<u32> = Vec::new();
    let mut check: Vec<u32> = Vec::new();
    let mut base: Vec<u32> = vec![0; rows];

    // Fullest rows first: greedy first-fit packs them much tighter.
    let mut order: Vec<usize> = (0..rows).collect();
    let count_of = |row: usize| {
        (0..cols)
            .filter(|&col| matrix[row * cols + col] != default)
            .count()
    };
    order.sort_by(|&a, &b| count_of(b).cmp(&count_of(a)).then(a.cmp(&b)));

    for row in order {
        let entries: Vec<usize> = (0..cols)
            .filter(|&col| matrix[row * cols + col] != default)
            .collect();
        if entries.is_empty() {
            base[row] = 0;
            continue;
        }
        let mut offset = 0usize;
        'search: loop {
            for &col in &entries {
                let index = offset + col;
                if index < check.len() && check[index] != NO_ROW {
                    offset += 1;
                    continue 'search;
                }
            }
            break;
        }
        let needed = offset + cols;
        if check.len() < needed {
            check.resize(needed, NO_ROW);
            comb.resize(needed, default);
        }
        for &col in &entries {
            let index = offset + col;
            comb[index] = matrix[row * cols + col];
            check[index] = row as u32;
        }
        base[row] = offset as u32;
    }

    CombVect { comb, check, base }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comb_lookup_matches_full_matrix() {
        let rows = 4;
        let cols = 3;
        let default = 99;
        let matrix = vec![
            0, 99, 1, //
            99, 2, 99, //
            99, 99, 99, //
            3, 4, 5,
        ];
        let comb = compress(&matrix, rows, cols, default);
        for row in 0..rows {
            for col in 0..cols {
                let index = comb.base[row] as usize + col;
                let value = if index < comb.check.len() && comb.check[index] == row as u32 {
                    comb.comb[index]
                } else {
                    default
                };
                assert_eq!(value, matrix[row * cols + col], "({}, {})", row, col);
            }
        }
    }
}
