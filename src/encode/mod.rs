//! Frame export: the sink contract, PNG sequences and animated GIF.

pub(crate) mod gif;
pub(crate) mod sink;
