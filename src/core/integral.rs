//! Summed-area table over a saliency map.
//!
//! Row 0 and column 0 are zero so every rectangle sum is four lookups.

use ndarray::Array2;

use crate::core::saliency::SaliencyMap;

#[derive(Debug, Clone)]
pub struct IntegralTable {
    /// (H+1) x (W+1)
    sums: Array2<u64>,
}

impl IntegralTable {
    pub fn build(map: &SaliencyMap) -> Self {
        let (rows, cols) = map.values().dim();
        let mut sums = Array2::<u64>::zeros((rows + 1, cols + 1));
        for y in 0..rows {
            // Running row total keeps this to one add per pixel plus the row above.
            let mut row_sum = 0u64;
            for x in 0..cols {
                row_sum += map.values()[[y, x]] as u64;
                sums[[y + 1, x + 1]] = row_sum + sums[[y, x + 1]];
            }
        }
        Self { sums }
    }

    pub fn width(&self) -> u32 {
        (self.sums.ncols() - 1) as u32
    }

    pub fn height(&self) -> u32 {
        (self.sums.nrows() - 1) as u32
    }

    /// Sum of the window; the caller guarantees it lies inside the map.
    #[inline]
    pub fn rect_sum(&self, x: u32, y: u32, w: u32, h: u32) -> u64 {
        let (x0, y0) = (x as usize, y as usize);
        let (x1, y1) = (x0 + w as usize, y0 + h as usize);
        self.sums[[y1, x1]] + self.sums[[y0, x0]] - self.sums[[y0, x1]] - self.sums[[y1, x0]]
    }

    /// Like [`rect_sum`](Self::rect_sum) but `None` when the window leaves the map.
    pub fn checked_rect_sum(&self, x: u32, y: u32, w: u32, h: u32) -> Option<u64> {
        let fits = x as u64 + w as u64 <= self.width() as u64
            && y as u64 + h as u64 <= self.height() as u64;
        fits.then(|| self.rect_sum(x, y, w, h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(map: &SaliencyMap, x: u32, y: u32, w: u32, h: u32) -> u64 {
        let mut total = 0u64;
        for row in y..y + h {
            for col in x..x + w {
                total += map.values()[[row as usize, col as usize]] as u64;
            }
        }
        total
    }

    fn patterned_map(width: usize, height: usize) -> SaliencyMap {
        SaliencyMap::from_array(Array2::from_shape_fn((height, width), |(r, c)| {
            ((r * 37 + c * 11 + r * c) % 256) as u8
        }))
    }

    #[test]
    fn sentinel_row_and_column_are_zero() {
        let table = IntegralTable::build(&patterned_map(7, 5));
        assert_eq!(table.width(), 7);
        assert_eq!(table.height(), 5);
        for x in 0..=7 {
            assert_eq!(table.sums[[0, x]], 0);
        }
        for y in 0..=5 {
            assert_eq!(table.sums[[y, 0]], 0);
        }
    }

    #[test]
    fn every_window_matches_brute_force() {
        let map = patterned_map(9, 6);
        let table = IntegralTable::build(&map);
        for y in 0..6u32 {
            for x in 0..9u32 {
                for h in 1..=(6 - y) {
                    for w in 1..=(9 - x) {
                        assert_eq!(
                            table.rect_sum(x, y, w, h),
                            brute_force(&map, x, y, w, h),
                            "window ({x},{y},{w},{h})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn saturated_map_does_not_overflow() {
        let map = SaliencyMap::from_array(Array2::from_elem((300, 400), 255u8));
        let table = IntegralTable::build(&map);
        assert_eq!(table.rect_sum(0, 0, 400, 300), 255 * 400 * 300);
    }

    #[test]
    fn checked_sum_refuses_out_of_bounds() {
        let table = IntegralTable::build(&patterned_map(4, 4));
        assert!(table.checked_rect_sum(0, 0, 4, 4).is_some());
        assert!(table.checked_rect_sum(1, 0, 4, 4).is_none());
        assert!(table.checked_rect_sum(0, 3, 1, 2).is_none());
    }
}
