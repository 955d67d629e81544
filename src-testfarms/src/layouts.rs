use yawopt::farm::{Farm, FarmProperties};
use yawopt::{FarmDescription, Layout, Turbine, YawError};

/// `n` turbines along the x axis, `spacing` meters apart, the first at the origin
pub fn row_layout(n: usize, spacing: f64) -> Result<Layout, YawError> {
    Layout::new((0..n).map(|i| Turbine::new(spacing * i as f64, 0.0)).collect())
}

/// `rows` rows of `cols` turbines; row-major, x varies fastest
pub fn grid_layout(rows: usize, cols: usize, spacing: f64) -> Result<Layout, YawError> {
    let turbines = (0..rows)
        .flat_map(|r| (0..cols).map(move |c| Turbine::new(spacing * c as f64, spacing * r as f64)))
        .collect();
    Layout::new(turbines)
}

/// Twelve turbines on a 3 x 4 grid with 800 m spacing
pub fn alpha_ventus_grid() -> Result<Layout, YawError> {
    let (xs, ys) = alpha_ventus_coordinates();
    Layout::from_xy(&xs, &ys)
}

fn alpha_ventus_coordinates() -> (Vec<f64>, Vec<f64>) {
    let xs = [0.0, 800.0, 1600.0].repeat(4);
    let ys = [0.0, 800.0, 1600.0, 2400.0].iter().flat_map(|&y| [y; 3]).collect();
    (xs, ys)
}

/// Built-in farm description: the 3 x 4 grid under a westerly 8 m/s wind
pub fn alpha_ventus_description() -> FarmDescription {
    let (layout_x, layout_y) = alpha_ventus_coordinates();
    FarmDescription {
        farm: Farm {
            name: "Alpha Ventus test".to_string(),
            description: "3 x 4 grid, 800 m spacing, westerly wind".to_string(),
            properties: FarmProperties { wind_direction: 270.0, wind_speed: 8.0, layout_x, layout_y },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_matches_builtin_description() {
        let grid = alpha_ventus_grid().unwrap();
        assert_eq!(grid.len(), 12);
        assert_eq!(grid, grid_layout(4, 3, 800.0).unwrap());
        assert_eq!(alpha_ventus_description().layout().unwrap(), grid);
        assert_eq!(grid.xs()[..4], [0.0, 800.0, 1600.0, 0.0]);
        assert_eq!(grid.ys()[..4], [0.0, 0.0, 0.0, 800.0]);
    }

    #[test]
    fn test_row_layout() {
        let row = row_layout(3, 800.0).unwrap();
        assert_eq!(row.xs(), vec![0.0, 800.0, 1600.0]);
        assert!(row_layout(0, 800.0).is_err());
    }
}
