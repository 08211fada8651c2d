//! Diagram documents: the element/movement model, colors, and the YAML/JSON loader.

pub(crate) mod color;
pub(crate) mod load;
pub(crate) mod model;
