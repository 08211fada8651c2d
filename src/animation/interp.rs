/// Interpolation strategies a movement may declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Constant velocity.
    Linear,
    /// Cosine ease-in/ease-out (zero velocity at both ends).
    Cosine,
}

impl Strategy {
    /// Look up a strategy by its document name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "linear" => Some(Self::Linear),
            "cosine" => Some(Self::Cosine),
            _ => None,
        }
    }

    /// Document name of this strategy.
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Cosine => "cosine",
        }
    }

    /// Interpolate between `start` and `end` at `progress`.
    pub fn apply(self, start: f64, end: f64, progress: f64) -> f64 {
        match self {
            Self::Linear => linear(start, end, progress),
            Self::Cosine => cosine(start, end, progress),
        }
    }
}

/// `start + (end - start) * p`, written as a weighted sum so both endpoints are exact.
pub fn linear(start: f64, end: f64, p: f64) -> f64 {
    start * (1.0 - p) + end * p
}

/// Cosine ease: `c = (1 - cos(p * pi)) / 2`, then `start * (1 - c) + end * c`.
pub fn cosine(start: f64, end: f64, p: f64) -> f64 {
    let c = (1.0 - (p * std::f64::consts::PI).cos()) / 2.0;
    start * (1.0 - c) + end * c
}

#[cfg(test)]
#[path = "../../tests/unit/animation/interp.rs"]
mod tests;
