//! Driving runs: host time, the animation clock, captured frames and the [`session::Session`]
//! that ties them together.

pub(crate) mod clock;
pub(crate) mod frames;
pub(crate) mod host;
pub(crate) mod session;
