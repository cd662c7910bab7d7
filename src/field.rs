use crate::grid::Grid2;

// Row-major, `i` (x) fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct Field2 {
    grid: Grid2,
    data: Vec<f64>,
}

impl Field2 {
    pub fn new(grid: Grid2, fill: f64) -> Self {
        let data = vec![fill; grid.size()];
        Self { grid, data }
    }

    pub fn from_fn(grid: Grid2, f: impl Fn(usize, usize) -> f64) -> Self {
        let pps = grid.pps();
        let data = (0..grid.size())
            .map(|idx| {
                let i = idx % pps;
                let j = idx / pps;
                f(i, j)
            })
            .collect();
        Self { grid, data }
    }

    pub(crate) fn from_vec(grid: Grid2, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), grid.size(), "field data does not match grid");
        Self { grid, data }
    }

    pub fn grid(&self) -> Grid2 {
        self.grid
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[self.grid.idx(i, j)]
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        let data = self.data.iter().map(|value| f(*value)).collect();
        Self {
            grid: self.grid,
            data,
        }
    }

    pub fn map_in_place(&mut self, f: impl Fn(f64) -> f64) {
        for value in &mut self.data {
            *value = f(*value);
        }
    }

    pub fn count_where(&self, f: impl Fn(f64) -> bool) -> usize {
        self.data.iter().filter(|value| f(**value)).count()
    }

    /// Bounds over finite cells only; `(0, 0)` when nothing is finite.
    pub fn min_max(&self) -> (f64, f64) {
        let mut iter = self.data.iter().filter(|value| value.is_finite());
        let Some(first) = iter.next() else {
            return (0.0, 0.0);
        };
        let mut min_value = *first;
        let mut max_value = *first;
        for value in iter {
            if *value < min_value {
                min_value = *value;
            }
            if *value > max_value {
                max_value = *value;
            }
        }
        (min_value, max_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!(
            (a - b).abs() <= tol,
            "expected {a} to be within {tol} of {b}"
        );
    }

    #[test]
    fn from_fn_maps_coords() {
        let grid = Grid2::new(1.0, 3).unwrap();
        let field = Field2::from_fn(grid, |i, j| (i + j * 10) as f64);
        assert_close(field.get(2, 1), 12.0, 1e-12);
        assert_close(field.data()[grid.idx(1, 2)], 21.0, 1e-12);
    }

    #[test]
    fn min_max_skips_non_finite() {
        let grid = Grid2::new(1.0, 2).unwrap();
        let field = Field2::from_fn(grid, |i, j| match (i, j) {
            (0, 0) => f64::NEG_INFINITY,
            (1, 0) => f64::NAN,
            (0, 1) => -1.5,
            _ => 4.0,
        });
        let (min_value, max_value) = field.min_max();
        assert_close(min_value, -1.5, 1e-12);
        assert_close(max_value, 4.0, 1e-12);
    }

    #[test]
    fn min_max_of_all_non_finite_is_zero() {
        let grid = Grid2::new(1.0, 2).unwrap();
        let field = Field2::new(grid, f64::NEG_INFINITY);
        assert_eq!(field.min_max(), (0.0, 0.0));
    }

    #[test]
    fn map_in_place_matches_map() {
        let grid = Grid2::new(1.0, 2).unwrap();
        let field = Field2::from_fn(grid, |i, j| (i + 2 * j) as f64 + 1.0);
        let mut in_place = field.clone();
        in_place.map_in_place(f64::log10);
        assert_eq!(in_place, field.map(f64::log10));
        assert_eq!(field.count_where(|value| value > 2.0), 2);
    }
}
