//! Interpolation and per-tick movement resolution.

pub(crate) mod interp;
pub(crate) mod resolver;
