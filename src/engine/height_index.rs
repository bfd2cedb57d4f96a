//! HeightIndex - cumulative-height table backed by a Fenwick tree
//!
//! Maps a scroll offset to the row containing it. Rows are measured lazily,
//! so the index only covers a prefix `[0, len())` of the ordered sequence.
//!
//! # Complexity
//!
//! - `set`: O(log n)
//! - `prefix_sum`: O(log n)
//! - `lower_bound`: O(log² n)
//! - `push`: O(log n)
//! - `truncate`: O(removed · log n)
//! - `total`: O(log n)

/// Cumulative pixel heights for a measured prefix of rows.
///
/// Row `i` covers `[prefix_sum(i - 1), prefix_sum(i))`.
#[derive(Debug, Clone)]
pub struct HeightIndex {
    /// Fenwick tree backing storage (1-indexed internally, 0-indexed API)
    tree: Vec<i64>,
    /// Number of measured rows (len <= tree.len())
    len: usize,
}

impl HeightIndex {
    /// Creates an empty index with pre-allocated capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// # use logrows::engine::height_index::HeightIndex;
    /// let index = HeightIndex::new(100);
    /// assert_eq!(index.len(), 0);
    /// assert_eq!(index.total(), 0);
    /// ```
    pub fn new(capacity: usize) -> Self {
        Self {
            tree: vec![0; capacity],
            len: 0,
        }
    }

    /// Replaces the height of an already measured row.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use logrows::engine::height_index::HeightIndex;
    /// let mut index = HeightIndex::new(10);
    /// index.push(5);
    /// index.set(0, 10);
    /// assert_eq!(index.prefix_sum(0), 10);
    /// ```
    pub fn set(&mut self, index: usize, height: u32) {
        assert!(
            index < self.len,
            "index {} out of bounds (len: {})",
            index,
            self.len
        );

        let delta = i64::from(height) - i64::from(self.height(index));
        if delta != 0 {
            fenwick::array::update(&mut self.tree, index, delta);
        }
    }

    /// Height of a single measured row.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn height(&self, index: usize) -> u32 {
        let upper = self.prefix_sum(index);
        let lower = if index == 0 {
            0
        } else {
            self.prefix_sum(index - 1)
        };
        (upper - lower) as u32
    }

    /// Returns the cumulative height up to and including the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use logrows::engine::height_index::HeightIndex;
    /// let mut index = HeightIndex::new(10);
    /// index.push(3);
    /// index.push(4);
    /// index.push(5);
    /// assert_eq!(index.prefix_sum(0), 3);
    /// assert_eq!(index.prefix_sum(1), 7);
    /// assert_eq!(index.prefix_sum(2), 12);
    /// ```
    pub fn prefix_sum(&self, index: usize) -> usize {
        assert!(
            index < self.len,
            "index {} out of bounds (len: {})",
            index,
            self.len
        );

        let sum = fenwick::array::prefix_sum(&self.tree, index);
        sum.max(0) as usize
    }

    /// Top offset of a measured row (sum of all heights before it).
    ///
    /// `offset_of(len())` is the measured total.
    pub fn offset_of(&self, index: usize) -> usize {
        if index == 0 {
            0
        } else {
            self.prefix_sum(index - 1)
        }
    }

    /// Binary search for the first index where `prefix_sum(index) > value`,
    /// i.e. the row containing pixel `value`.
    ///
    /// Returns `None` if `value >= total()` or the index is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use logrows::engine::height_index::HeightIndex;
    /// let mut index = HeightIndex::new(10);
    /// index.push(10);  // [0..10)
    /// index.push(20);  // [10..30)
    /// index.push(15);  // [30..45)
    ///
    /// assert_eq!(index.lower_bound(0), Some(0));
    /// assert_eq!(index.lower_bound(10), Some(1));
    /// assert_eq!(index.lower_bound(30), Some(2));
    /// assert_eq!(index.lower_bound(45), None);
    /// ```
    pub fn lower_bound(&self, value: usize) -> Option<usize> {
        if self.is_empty() {
            return None;
        }

        let mut left = 0;
        let mut right = self.len;

        while left < right {
            let mid = left + (right - left) / 2;
            if self.prefix_sum(mid) > value {
                right = mid;
            } else {
                left = mid + 1;
            }
        }

        (left < self.len).then_some(left)
    }

    /// Total height of all measured rows.
    pub fn total(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.prefix_sum(self.len - 1)
        }
    }

    /// Number of measured rows.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends the next row's height, growing storage if necessary.
    pub fn push(&mut self, height: u32) {
        if self.len >= self.tree.len() {
            self.grow();
        }

        let idx = self.len;
        self.len += 1;
        fenwick::array::update(&mut self.tree, idx, i64::from(height));
    }

    /// Forgets every row from `len` onward.
    ///
    /// Forgotten rows are zeroed through the tree so nodes past the new
    /// length stay consistent for later pushes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use logrows::engine::height_index::HeightIndex;
    /// let mut index = HeightIndex::new(4);
    /// index.push(2);
    /// index.push(3);
    /// index.push(4);
    /// index.truncate(1);
    /// assert_eq!(index.len(), 1);
    /// assert_eq!(index.total(), 2);
    /// ```
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        for idx in (len..self.len).rev() {
            let height = i64::from(self.height(idx));
            if height != 0 {
                fenwick::array::update(&mut self.tree, idx, -height);
            }
        }
        self.len = len;
    }

    /// Doubles the backing storage, rebuilding the tree so nodes beyond the
    /// old capacity also aggregate the rows they cover.
    fn grow(&mut self) {
        let heights: Vec<u32> = (0..self.len).map(|idx| self.height(idx)).collect();
        self.tree = vec![0; self.tree.len().max(1) * 2];
        for (idx, height) in heights.into_iter().enumerate() {
            fenwick::array::update(&mut self.tree, idx, i64::from(height));
        }
    }

    /// Clears all rows, retaining allocated capacity.
    pub fn clear(&mut self) {
        self.tree.iter_mut().for_each(|node| *node = 0);
        self.len = 0;
    }
}

impl Default for HeightIndex {
    fn default() -> Self {
        Self::new(0)
    }
}
