//! Separable gradient filters over three-channel grids
//!
//! Each 3x3 Sobel kernel is applied as two sequential 1D passes. Border
//! rows and columns, where the 3x3 support does not fit, stay zero.

use crate::error::{ImatchError, Result};
use crate::grid::{PixelGrid, SignedGrid};

fn require_color(grid: &PixelGrid) -> Result<()> {
    if grid.is_empty() {
        return Err(ImatchError::InvalidInput {
            reason: "empty grid".to_string(),
        });
    }
    if grid.channels() != 3 {
        return Err(ImatchError::InvalidInput {
            reason: "gradient filters require a three-channel grid".to_string(),
        });
    }
    Ok(())
}

/// 3x3 Sobel X (positive right) — detects vertical edges.
///
/// Separable passes: [-1 0 1] along each row, then [1 2 1] down each column.
pub fn sobel_x(grid: &PixelGrid) -> Result<SignedGrid> {
    require_color(grid)?;
    let (rows, cols) = (grid.rows(), grid.cols());
    let mut temp = SignedGrid::zeros(rows, cols, 3);
    let mut dst = SignedGrid::zeros(rows, cols, 3);

    // Horizontal differencing pass
    for i in 0..rows {
        for j in 1..cols.saturating_sub(1) {
            for c in 0..3 {
                let left = grid.get(i, j - 1, c) as i16;
                let right = grid.get(i, j + 1, c) as i16;
                temp.set(i, j, c, right - left);
            }
        }
    }

    // Vertical smoothing pass
    for i in 1..rows.saturating_sub(1) {
        for j in 1..cols.saturating_sub(1) {
            for c in 0..3 {
                let sum =
                    temp.get(i - 1, j, c) + 2 * temp.get(i, j, c) + temp.get(i + 1, j, c);
                dst.set(i, j, c, sum);
            }
        }
    }

    Ok(dst)
}

/// 3x3 Sobel Y (positive up) — detects horizontal edges.
///
/// Separable passes: [1 2 1] along each row, then [1 0 -1] down each column.
pub fn sobel_y(grid: &PixelGrid) -> Result<SignedGrid> {
    require_color(grid)?;
    let (rows, cols) = (grid.rows(), grid.cols());
    let mut temp = SignedGrid::zeros(rows, cols, 3);
    let mut dst = SignedGrid::zeros(rows, cols, 3);

    // Horizontal smoothing pass
    for i in 0..rows {
        for j in 1..cols.saturating_sub(1) {
            for c in 0..3 {
                let sum = grid.get(i, j - 1, c) as i16
                    + 2 * grid.get(i, j, c) as i16
                    + grid.get(i, j + 1, c) as i16;
                temp.set(i, j, c, sum);
            }
        }
    }

    // Vertical differencing pass
    for i in 1..rows.saturating_sub(1) {
        for j in 1..cols.saturating_sub(1) {
            for c in 0..3 {
                let diff = temp.get(i - 1, j, c) - temp.get(i + 1, j, c);
                dst.set(i, j, c, diff);
            }
        }
    }

    Ok(dst)
}

/// Gradient magnitude from Sobel X and Y: per-channel sqrt(gx^2 + gy^2),
/// saturated into 0-255.
///
/// Caller contract: both inputs must come from the same source grid;
/// dimensions are not re-validated here.
pub fn magnitude(gx: &SignedGrid, gy: &SignedGrid) -> PixelGrid {
    let (rows, cols, channels) = (gx.rows(), gx.cols(), gx.channels());
    let mut out = ndarray::Array3::<u8>::zeros((rows, cols, channels));
    for i in 0..rows {
        for j in 0..cols {
            for c in 0..channels {
                let x = gx.get(i, j, c) as f64;
                let y = gy.get(i, j, c) as f64;
                let mag = (x * x + y * y).sqrt();
                out[[i, j, c]] = mag.min(255.0) as u8;
            }
        }
    }
    PixelGrid::from_array(out)
}
