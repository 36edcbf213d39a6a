use crate::fit::FittsModel;
use crate::measurement::Columns;
use crate::util::linspace;
use itertools::{Itertools, MinMaxResult};

/// Mesh resolution along distance and width, as plotted after a session
pub const DISTANCE_STEPS: usize = 15;
pub const WIDTH_STEPS: usize = 80;

/// The fitted model evaluated on a regular (distance, width) grid spanning
/// the observed trials.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMesh {
    pub distances: Vec<f64>,
    pub widths: Vec<f64>,
    /// `elapsed[w][d]` is the prediction at `(distances[d], widths[w])`
    pub elapsed: Vec<Vec<f64>>,
}

impl SurfaceMesh {
    pub fn evaluate(
        model: &FittsModel,
        columns: &Columns,
        distance_steps: usize,
        width_steps: usize,
    ) -> Option<Self> {
        let (d_min, d_max) = bounds(&columns.distance)?;
        let (w_min, w_max) = bounds(&columns.width)?;

        let distances = linspace(d_min, d_max, distance_steps);
        let widths = linspace(w_min, w_max, width_steps);
        let elapsed = widths
            .iter()
            .map(|&w| distances.iter().map(|&d| model.predict(d, w)).collect())
            .collect();

        Some(Self {
            distances,
            widths,
            elapsed,
        })
    }

    /// Every mesh vertex as `(distance, width, elapsed)`
    pub fn points(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.widths
            .iter()
            .zip(self.elapsed.iter())
            .flat_map(move |(&w, row)| {
                self.distances
                    .iter()
                    .zip(row.iter())
                    .map(move |(&d, &e)| (d, w, e))
            })
    }
}

/// Smallest and largest value; `None` when empty
pub fn bounds(values: &[f64]) -> Option<(f64, f64)> {
    match values
        .iter()
        .copied()
        .minmax_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(v) => Some((v, v)),
        MinMaxResult::MinMax(lo, hi) => Some((lo, hi)),
    }
}
