/// Packed matrix of bits used for GF(2) elimination. Each row is stored as a
/// run of `u64` words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    rows: usize,
    cols: usize,
    words_per_row: usize,
    words: Vec<u64>,
}

impl BitMatrix {
    /// Number of words needed to hold `cols` bits.
    pub fn words_for(cols: usize) -> usize {
        cols.div_ceil(64)
    }

    pub fn new(rows: usize, cols: usize) -> Self {
        let words_per_row = Self::words_for(cols);
        Self {
            rows,
            cols,
            words_per_row,
            words: vec![0; rows * words_per_row],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::new(n, n);
        for i in 0..n {
            m.set(i, i, true);
        }
        m
    }

    /// Builds a matrix from pre-packed rows. Every row must hold exactly
    /// `words_for(cols)` words.
    pub fn from_rows<I>(cols: usize, rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<u64>>,
    {
        let words_per_row = Self::words_for(cols);
        let mut words = Vec::new();
        let mut count = 0;
        for row in rows {
            assert_eq!(row.len(), words_per_row, "packed row has wrong width");
            words.extend_from_slice(&row);
            count += 1;
        }
        Self {
            rows: count,
            cols,
            words_per_row,
            words,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn locate(&self, row: usize, col: usize) -> (usize, u64) {
        assert!(
            row < self.rows && col < self.cols,
            "bit index ({row}, {col}) out of range for {}x{}",
            self.rows,
            self.cols
        );
        (row * self.words_per_row + col / 64, 1u64 << (col % 64))
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        let (w, mask) = self.locate(row, col);
        self.words[w] & mask != 0
    }

    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        let (w, mask) = self.locate(row, col);
        if value {
            self.words[w] |= mask;
        } else {
            self.words[w] &= !mask;
        }
    }

    pub fn row(&self, row: usize) -> &[u64] {
        assert!(row < self.rows, "row {row} out of range for {} rows", self.rows);
        let start = row * self.words_per_row;
        &self.words[start..start + self.words_per_row]
    }

    /// GF(2) inner product of `self[row]` and `other[other_row]`.
    pub fn dot(&self, row: usize, other: &BitMatrix, other_row: usize) -> bool {
        assert_eq!(self.cols, other.cols, "column count mismatch");
        let ones: u32 = self
            .row(row)
            .iter()
            .zip(other.row(other_row))
            .map(|(a, b)| (a & b).count_ones())
            .sum();
        ones % 2 == 1
    }

    /// `self[dst] ^= self[src]`.
    pub fn xor_row(&mut self, dst: usize, src: usize) {
        assert!(dst < self.rows && src < self.rows, "row out of range");
        if dst == src {
            self.words[dst * self.words_per_row..(dst + 1) * self.words_per_row].fill(0);
            return;
        }
        for k in 0..self.words_per_row {
            let v = self.words[src * self.words_per_row + k];
            self.words[dst * self.words_per_row + k] ^= v;
        }
    }

    pub fn count_ones(&self, row: usize) -> u32 {
        self.row(row).iter().map(|w| w.count_ones()).sum()
    }
}
