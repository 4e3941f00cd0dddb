use crate::foundation::error::{FilmrollError, FilmrollResult};

/// Piecewise-linear mapping from an input range to an output range.
///
/// Inputs outside the first/last stop clamp to the first/last output value. This is how
/// scroll progress drives frame position, canvas fade and overlay opacity.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Ramp {
    /// Input stops, sorted ascending.
    pub input: Vec<f64>,
    /// Output value at each input stop.
    pub output: Vec<f64>,
}

impl Ramp {
    /// Create a validated ramp.
    pub fn new(input: Vec<f64>, output: Vec<f64>) -> FilmrollResult<Self> {
        let ramp = Self { input, output };
        ramp.validate()?;
        Ok(ramp)
    }

    /// Two-stop ramp `[a, b] -> [from, to]`.
    pub fn linear(a: f64, b: f64, from: f64, to: f64) -> Self {
        Self {
            input: vec![a, b],
            output: vec![from, to],
        }
    }

    pub fn validate(&self) -> FilmrollResult<()> {
        if self.input.len() < 2 {
            return Err(FilmrollError::validation("Ramp needs at least two stops"));
        }
        if self.input.len() != self.output.len() {
            return Err(FilmrollError::validation(format!(
                "Ramp input/output length mismatch ({} vs {})",
                self.input.len(),
                self.output.len()
            )));
        }
        if self
            .input
            .iter()
            .chain(self.output.iter())
            .any(|v| !v.is_finite())
        {
            return Err(FilmrollError::validation("Ramp stops must be finite"));
        }
        if !self.input.windows(2).all(|w| w[0] <= w[1]) {
            return Err(FilmrollError::validation(
                "Ramp input stops must be sorted ascending",
            ));
        }
        Ok(())
    }

    /// Sample the ramp at `x`.
    pub fn sample(&self, x: f64) -> f64 {
        let Some((&first, &last)) = self.input.first().zip(self.input.last()) else {
            return 0.0;
        };
        let out_first = self.output.first().copied().unwrap_or(0.0);
        let out_last = self.output.last().copied().unwrap_or(out_first);
        if x.is_nan() || x <= first {
            return out_first;
        }
        if x >= last {
            return out_last;
        }

        // first < x < last, so there are at least two stops. Unvalidated fields may be
        // unsorted or mismatched in length; stay in bounds either way.
        let idx = self
            .input
            .partition_point(|&k| k <= x)
            .clamp(1, self.input.len() - 1);
        let (a, b) = (self.input[idx - 1], self.input[idx]);
        let va = self.output.get(idx - 1).copied().unwrap_or(out_last);
        let vb = self.output.get(idx).copied().unwrap_or(out_last);
        let denom = b - a;
        if denom <= 0.0 {
            return va;
        }
        let t = (x - a) / denom;
        va + (vb - va) * t
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ramp.rs"]
mod tests;
