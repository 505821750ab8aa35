//! Program points: the slot keys of an environment.

use crate::entity::EntityRef;
use crate::ir::Inst;
use std::cmp::Ordering;
use std::convert::TryFrom;

/// The fact set flowing into or out of one instruction.
///
/// Its textual name (`IN_<id>` / `OUT_<id>`) is unique because
/// instruction ids are.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Point {
    In(Inst),
    Out(Inst),
}

impl Point {
    pub fn inst(self) -> Inst {
        match self {
            Point::In(inst) | Point::Out(inst) => inst,
        }
    }

    /// Parse `IN_<id>` or `OUT_<id>`.
    pub fn parse(name: &str) -> Option<Point> {
        let (ctor, id): (fn(Inst) -> Point, &str) = if let Some(id) = name.strip_prefix("IN_") {
            (Point::In, id)
        } else if let Some(id) = name.strip_prefix("OUT_") {
            (Point::Out, id)
        } else {
            return None;
        };
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        // Ids are printed without leading zeros; `IN_03` names no slot.
        if id.len() > 1 && id.starts_with('0') {
            return None;
        }
        let id = id.parse::<u64>().ok()?;
        let id = u32::try_from(id).ok()?;
        Some(ctor(Inst::from(id)))
    }

    fn sort_key(self) -> (Inst, u8) {
        match self {
            Point::In(inst) => (inst, 0),
            Point::Out(inst) => (inst, 1),
        }
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Instruction order first, with IN before OUT.
impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Point::In(inst) => write!(f, "IN_{}", inst.index()),
            Point::Out(inst) => write!(f, "OUT_{}", inst.index()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn names() {
        let i3 = Inst::from(3);
        assert_eq!(Point::In(i3).to_string(), "IN_3");
        assert_eq!(Point::Out(i3).to_string(), "OUT_3");
        assert_eq!(Point::parse("IN_3"), Some(Point::In(i3)));
        assert_eq!(Point::parse("OUT_3"), Some(Point::Out(i3)));
        assert_eq!(Point::parse("OUT_"), None);
        assert_eq!(Point::parse("OUT_+3"), None);
        assert_eq!(Point::parse("MID_3"), None);
        assert_eq!(Point::parse("IN_03"), None);
        assert_eq!(Point::parse("OUT_00"), None);
        assert_eq!(Point::parse("IN_0"), Some(Point::In(Inst::from(0))));
    }

    #[test]
    fn ordering() {
        let mut points = vec![
            Point::Out(Inst::from(1)),
            Point::In(Inst::from(1)),
            Point::Out(Inst::from(0)),
            Point::In(Inst::from(0)),
        ];
        points.sort();
        let names: Vec<String> = points.iter().map(|p| p.to_string()).collect();
        assert_eq!(names, vec!["IN_0", "OUT_0", "IN_1", "OUT_1"]);
    }
}
