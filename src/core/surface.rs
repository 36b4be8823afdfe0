//! Volatility Surface
//!
//! Sparse implied volatility grid indexed by days-to-expiry and either
//! moneyness or strike. Cells without observations are absent, never zero.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::option::OptionType;

/// Y-axis of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceAxis {
    /// Strike / spot
    #[default]
    Moneyness,
    /// Absolute strike
    Strike,
}

impl SurfaceAxis {
    pub fn from_use_moneyness(use_moneyness: bool) -> Self {
        if use_moneyness {
            SurfaceAxis::Moneyness
        } else {
            SurfaceAxis::Strike
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SurfaceAxis::Moneyness => "Moneyness (Strike/Spot)",
            SurfaceAxis::Strike => "Strike Price",
        }
    }
}

/// One aggregated surface cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolSurfacePoint {
    pub days_to_expiry: i64,
    /// Moneyness or strike, per the grid's axis
    pub y: f64,
    /// Mean implied volatility of the quotes in this cell
    pub implied_vol: f64,
    /// Number of quotes averaged
    pub count: usize,
}

/// Implied volatility surface for one option side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceGrid {
    pub option_type: OptionType,
    pub axis: SurfaceAxis,
    /// Distinct days-to-expiry, ascending
    pub days: Vec<i64>,
    /// Distinct y values, ascending
    pub y_values: Vec<f64>,
    /// Populated cells sorted by (days, y)
    pub points: Vec<VolSurfacePoint>,
}

impl SurfaceGrid {
    /// Build a grid from cells; axes are derived and sorted
    pub fn from_points(
        option_type: OptionType,
        axis: SurfaceAxis,
        mut points: Vec<VolSurfacePoint>,
    ) -> Self {
        points.sort_by(|a, b| {
            a.days_to_expiry
                .cmp(&b.days_to_expiry)
                .then_with(|| a.y.total_cmp(&b.y))
        });

        let mut days: Vec<i64> = points.iter().map(|p| p.days_to_expiry).collect();
        days.sort_unstable();
        days.dedup();

        let mut y_values: Vec<f64> = points.iter().map(|p| p.y).collect();
        y_values.sort_by(f64::total_cmp);
        y_values.dedup();

        Self {
            option_type,
            axis,
            days,
            y_values,
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Implied vol at an exact (days, y) cell
    pub fn get(&self, days_to_expiry: i64, y: f64) -> Option<f64> {
        self.points
            .binary_search_by(|p| {
                p.days_to_expiry
                    .cmp(&days_to_expiry)
                    .then_with(|| p.y.total_cmp(&y))
            })
            .ok()
            .map(|i| self.points[i].implied_vol)
    }

    /// Dense [days x y] matrix for renderers, NaN where no quote landed
    pub fn to_matrix(&self) -> Array2<f64> {
        let mut z = Array2::from_elem((self.days.len(), self.y_values.len()), f64::NAN);
        for p in &self.points {
            let di = self.days.binary_search(&p.days_to_expiry);
            let yi = self.y_values.binary_search_by(|v| v.total_cmp(&p.y));
            if let (Ok(di), Ok(yi)) = (di, yi) {
                z[[di, yi]] = p.implied_vol;
            }
        }
        z
    }

    /// Smile for one expiry: (y, vol) pairs
    pub fn slice(&self, days_to_expiry: i64) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .filter(|p| p.days_to_expiry == days_to_expiry)
            .map(|p| (p.y, p.implied_vol))
            .collect()
    }

    /// (min, max) implied vol over populated cells
    pub fn vol_range(&self) -> Option<(f64, f64)> {
        self.points.iter().map(|p| p.implied_vol).fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    pub fn title(&self) -> String {
        let side = match self.option_type {
            OptionType::Call => "Call",
            OptionType::Put => "Put",
        };
        format!("{} Option Implied Volatility Surface", side)
    }
}

/// Surfaces for both sides; a side is `None` when no quote survived
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurfacePair {
    pub call: Option<SurfaceGrid>,
    pub put: Option<SurfaceGrid>,
}

impl SurfacePair {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn side(&self, option_type: OptionType) -> Option<&SurfaceGrid> {
        match option_type {
            OptionType::Call => self.call.as_ref(),
            OptionType::Put => self.put.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.call.is_none() && self.put.is_none()
    }
}
