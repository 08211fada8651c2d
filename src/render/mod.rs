//! Rasterization of resolved elements.
//!
//! [`backend`] defines the renderer seam, [`shapes`] turns elements into fillable geometry and
//! [`cpu`] paints it with `vello_cpu`. Label text goes through `usvg`/`resvg` in [`label`].

pub(crate) mod backend;
pub(crate) mod cpu;
pub(crate) mod label;
pub(crate) mod shapes;
