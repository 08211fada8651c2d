use crate::{
    animation::interp::Strategy,
    document::model::{Element, Movement},
    foundation::core::{Millis, Point},
    foundation::error::{MotiongramError, MotiongramResult},
};

/// Per-run movement state: the origin each movement captured when it first became active.
///
/// Indexed like the movement list it was created for. Declarations stay immutable; this is the
/// only thing playback mutates besides element positions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunState {
    origins: Vec<Option<Point>>,
}

impl RunState {
    /// Fresh state for `movements` movements, none captured yet.
    pub fn new(movements: usize) -> Self {
        Self {
            origins: vec![None; movements],
        }
    }

    /// Forget every captured origin.
    pub fn reset(&mut self) {
        self.origins.iter_mut().for_each(|o| *o = None);
    }

    /// Origin captured by movement `index`, if it has been active this run.
    pub fn origin(&self, index: usize) -> Option<Point> {
        self.origins.get(index).copied().flatten()
    }

    /// Number of movements tracked.
    pub fn len(&self) -> usize {
        self.origins.len()
    }

    /// Whether no movements are tracked.
    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }
}

/// Resolve one element's position at `elapsed` and commit it.
///
/// Every movement targeting the element that has started (finished or not) is applied in document
/// order; each declared axis overwrites the working value, so the last writer wins per axis. An
/// unsupported strategy aborts before anything is committed for this element.
pub fn resolve_element(
    element: &mut Element,
    movements: &[Movement],
    run: &mut RunState,
    elapsed: Millis,
) -> MotiongramResult<()> {
    if run.len() != movements.len() {
        return Err(MotiongramError::validation(format!(
            "run state tracks {} movements but {} were given",
            run.len(),
            movements.len()
        )));
    }

    let before = Point::new(element.x, element.y);
    let mut working = before;

    for (index, m) in movements.iter().enumerate() {
        if m.name != element.name || !m.is_active(elapsed) {
            continue;
        }

        let origin = *run.origins[index].get_or_insert_with(|| {
            Point::new(m.start_x.unwrap_or(before.x), m.start_y.unwrap_or(before.y))
        });
        let progress = m.progress(elapsed);

        if m.end_x.is_none() && m.end_y.is_none() {
            continue;
        }
        let strategy = Strategy::from_name(&m.strategy).ok_or_else(|| {
            MotiongramError::unsupported_strategy(index, &m.name, &m.strategy)
        })?;

        if let Some(end_x) = m.end_x {
            working.x = strategy.apply(origin.x, end_x, progress);
        }
        if let Some(end_y) = m.end_y {
            working.y = strategy.apply(origin.y, end_y, progress);
        }
    }

    element.x = working.x;
    element.y = working.y;
    Ok(())
}

/// Resolve every element at `elapsed`, in element order.
pub fn resolve_all(
    elements: &mut [Element],
    movements: &[Movement],
    run: &mut RunState,
    elapsed: Millis,
) -> MotiongramResult<()> {
    for element in elements.iter_mut() {
        resolve_element(element, movements, run, elapsed)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/animation/resolver.rs"]
mod tests;
