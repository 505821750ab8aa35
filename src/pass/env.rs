//! The result environment: one lattice value per program point.

use super::{Lattice, Point};
use crate::errors::SolveError;
use fxhash::FxHashMap;

/// Named storage for in-progress and final fact sets.
///
/// Slots are fixed at construction; lookups of any other point are
/// contract violations and surface as `SolveError::MissingPoint`.
#[derive(Clone, Debug)]
pub struct Environment<L: Lattice> {
    slots: FxHashMap<Point, L>,
}

impl<L: Lattice> Environment<L> {
    /// Create one `top` slot per point. A point listed twice means two
    /// equations would share storage.
    pub fn new<I: IntoIterator<Item = Point>>(points: I) -> Result<Self, SolveError> {
        let mut slots = FxHashMap::default();
        for point in points {
            if slots.insert(point, L::top()).is_some() {
                return Err(SolveError::DuplicatePoint(point));
            }
        }
        Ok(Environment { slots })
    }

    pub fn get(&self, point: Point) -> Result<&L, SolveError> {
        self.slots
            .get(&point)
            .ok_or(SolveError::MissingPoint(point))
    }

    pub fn lookup(&self, point: Point) -> Option<&L> {
        self.slots.get(&point)
    }

    /// Look a slot up by its textual name, e.g. `"IN_2"`.
    pub fn get_by_name(&self, name: &str) -> Option<&L> {
        Point::parse(name).and_then(|point| self.slots.get(&point))
    }

    /// Overwrite a slot, returning whether its value changed.
    pub(crate) fn update(&mut self, point: Point, value: L) -> Result<bool, SolveError> {
        let slot = self
            .slots
            .get_mut(&point)
            .ok_or(SolveError::MissingPoint(point))?;
        if *slot == value {
            Ok(false)
        } else {
            *slot = value;
            Ok(true)
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All slots, in point order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, &L)> {
        let mut entries = self
            .slots
            .iter()
            .map(|(&point, value)| (point, value))
            .collect::<Vec<_>>();
        entries.sort_by_key(|&(point, _)| point);
        entries.into_iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ir::Inst;
    use std::collections::BTreeSet;

    #[test]
    fn slots_start_empty() {
        let i0 = Inst::from(0);
        let env: Environment<BTreeSet<u32>> =
            Environment::new(vec![Point::Out(i0), Point::In(i0)]).unwrap();
        assert_eq!(env.len(), 2);
        assert!(env.get(Point::In(i0)).unwrap().is_empty());
        assert!(env.get_by_name("OUT_0").unwrap().is_empty());
        assert!(env.get_by_name("OUT_1").is_none());
        let names: Vec<String> = env.iter().map(|(p, _)| p.to_string()).collect();
        assert_eq!(names, vec!["IN_0", "OUT_0"]);
    }

    #[test]
    fn update_reports_change() {
        let i0 = Inst::from(0);
        let mut env: Environment<BTreeSet<u32>> = Environment::new(vec![Point::In(i0)]).unwrap();
        let value: BTreeSet<u32> = [7].iter().copied().collect();
        assert_eq!(env.update(Point::In(i0), value.clone()), Ok(true));
        assert_eq!(env.update(Point::In(i0), value), Ok(false));
        assert_eq!(
            env.update(Point::Out(i0), BTreeSet::new()),
            Err(SolveError::MissingPoint(Point::Out(i0)))
        );
    }

    #[test]
    fn duplicate_points_rejected() {
        let i0 = Inst::from(0);
        let env: Result<Environment<BTreeSet<u32>>, _> =
            Environment::new(vec![Point::In(i0), Point::In(i0)]);
        assert_eq!(env.err(), Some(SolveError::DuplicatePoint(Point::In(i0))));
    }
}
