/// One successful acquisition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Seconds from target creation to the hit
    pub elapsed: f64,
    /// Pixels from the previous click to the target center
    pub distance: f64,
    /// Target diameter in pixels
    pub width: f64,
}

/// Column-wise copy of a run of measurements, as plotted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
    pub elapsed: Vec<f64>,
    pub distance: Vec<f64>,
    pub width: Vec<f64>,
}

impl Columns {
    pub fn len(&self) -> usize {
        self.elapsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elapsed.is_empty()
    }
}

impl<'a> FromIterator<&'a Measurement> for Columns {
    fn from_iter<I: IntoIterator<Item = &'a Measurement>>(iter: I) -> Self {
        let mut columns = Columns::default();
        for m in iter {
            columns.elapsed.push(m.elapsed);
            columns.distance.push(m.distance);
            columns.width.push(m.width);
        }
        columns
    }
}

/// Acquisitions in click order.
///
/// Only the session appends to it. The first entry is the practice sample,
/// measured from the first target's own center, so [`trials`](Self::trials)
/// leaves it out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementLog {
    entries: Vec<Measurement>,
}

impl MeasurementLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, measurement: Measurement) {
        self.entries.push(measurement);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[Measurement] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Measurement> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&Measurement> {
        self.entries.last()
    }

    /// Everything after the practice sample
    pub fn trials(&self) -> &[Measurement] {
        self.entries.get(1..).unwrap_or(&[])
    }

    pub fn columns(&self) -> Columns {
        self.trials().iter().collect()
    }
}

impl<'a> IntoIterator for &'a MeasurementLog {
    type Item = &'a Measurement;
    type IntoIter = std::slice::Iter<'a, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
