//! Reaching-definitions analysis.
//!
//! A fact `(v, p)` at a program point says that the definition of `v`
//! made by instruction `p` may reach that point unredefined. Per
//! instruction `p` the system has:
//!
//! ```plain
//! OUT[p] = {(v, p)} + (IN[p] - (v, _))   if p defines v
//! OUT[p] = IN[p]                         if p is a branch
//! IN[p]  = Union( OUT[q] for q in preds(p) )
//! ```

use crate::entity::EntityRef;
use crate::errors::SolveError;
use crate::ir::{Graph, Inst, InstKind, Var};
use crate::pass::{solve, Environment, Equation, Lattice, Point, Solution, SolverOptions};
use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A definition of `var` made by `inst`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Def {
    pub var: Var,
    pub inst: Inst,
}

pub type DefSet = BTreeSet<Def>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReachingDefsEq {
    /// Gen/kill for an instruction defining `dst`.
    BinOut { inst: Inst, dst: Var },
    /// Identity for a branch.
    BranchOut { inst: Inst },
    /// Union over the OUT sets of `preds`.
    In {
        inst: Inst,
        preds: SmallVec<[Inst; 4]>,
    },
}

impl Equation for ReachingDefsEq {
    type L = DefSet;

    fn point(&self) -> Point {
        match self {
            &ReachingDefsEq::BinOut { inst, .. } | &ReachingDefsEq::BranchOut { inst } => {
                Point::Out(inst)
            }
            &ReachingDefsEq::In { inst, .. } => Point::In(inst),
        }
    }

    fn eval_aux(&self, env: &Environment<DefSet>) -> Result<DefSet, SolveError> {
        match self {
            &ReachingDefsEq::BinOut { inst, dst } => {
                let mut out: DefSet = env
                    .get(Point::In(inst))?
                    .iter()
                    .filter(|def| def.var != dst)
                    .copied()
                    .collect();
                out.insert(Def { var: dst, inst });
                Ok(out)
            }
            &ReachingDefsEq::BranchOut { inst } => Ok(env.get(Point::In(inst))?.clone()),
            &ReachingDefsEq::In { ref preds, .. } => {
                let mut solution = DefSet::top();
                for &pred in preds {
                    solution.meet_with(env.get(Point::Out(pred))?);
                }
                Ok(solution)
            }
        }
    }
}

impl ReachingDefsEq {
    pub fn display<'a>(&'a self, graph: &'a Graph) -> ReachingDefsEqDisplay<'a> {
        ReachingDefsEqDisplay(self, graph)
    }
}

pub struct ReachingDefsEqDisplay<'a>(&'a ReachingDefsEq, &'a Graph);

impl<'a> Display for ReachingDefsEqDisplay<'a> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let eq = self.0;
        match eq {
            &ReachingDefsEq::BinOut { inst, dst } => {
                let dst = self.1.var_name(dst);
                write!(
                    f,
                    "{}: ({}, {}) + ({} - ({}, _))",
                    eq.point(),
                    dst,
                    inst.index(),
                    Point::In(inst),
                    dst
                )
            }
            &ReachingDefsEq::BranchOut { inst } => {
                write!(f, "{}: {}", eq.point(), Point::In(inst))
            }
            &ReachingDefsEq::In { ref preds, .. } => {
                let outs = preds
                    .iter()
                    .map(|&pred| Point::Out(pred).to_string())
                    .collect::<Vec<_>>();
                write!(f, "{}: Union( {} )", eq.point(), outs.join(", "))
            }
        }
    }
}

/// Render a fact set as `{(c, 0), (d, 1)}`, sorted by variable name
/// and then by instruction.
pub struct DefSetDisplay<'a>(pub &'a DefSet, pub &'a Graph);

impl<'a> Display for DefSetDisplay<'a> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let mut defs = self
            .0
            .iter()
            .map(|def| (self.1.var_name(def.var), def.inst.index()))
            .collect::<Vec<_>>();
        defs.sort();
        let defs = defs
            .iter()
            .map(|(name, id)| format!("({}, {})", name, id))
            .collect::<Vec<_>>();
        write!(f, "{{{}}}", defs.join(", "))
    }
}

/// Build the reaching-definitions equation system for every
/// instruction of `graph`: binary-op OUT equations, then branch OUT
/// equations, then one IN equation per instruction.
pub fn constraints(graph: &Graph) -> Vec<ReachingDefsEq> {
    let bin_outs = graph.entries().filter_map(|(inst, data)| match &data.kind {
        &InstKind::BinOp { dst, .. } => Some(ReachingDefsEq::BinOut { inst, dst }),
        _ => None,
    });
    let branch_outs = graph.entries().filter_map(|(inst, data)| match &data.kind {
        &InstKind::Branch { .. } => Some(ReachingDefsEq::BranchOut { inst }),
        _ => None,
    });
    let ins = graph.entries().map(|(inst, data)| ReachingDefsEq::In {
        inst,
        preds: data.preds.clone(),
    });
    bin_outs.chain(branch_outs).chain(ins).collect()
}

/// Solved reaching definitions for one graph.
#[derive(Clone, Debug)]
pub struct ReachingDefs(Solution<DefSet>);

impl ReachingDefs {
    /// Generate and solve the system. Without an explicit pass limit
    /// in `options`, the limit is the lattice-height bound: one fact
    /// per defining instruction, per equation.
    pub fn compute(graph: &Graph, options: &SolverOptions) -> Result<ReachingDefs, SolveError> {
        let equations = constraints(graph);
        let facts = graph
            .entries()
            .filter(|(_, data)| !data.kind.definition().is_empty())
            .count();
        let options = options.or_height_bound(equations.len(), facts);
        log::debug!(
            "reaching defs: {} insts, {} equations, pass limit {:?}",
            graph.len(),
            equations.len(),
            options.max_passes
        );
        Ok(ReachingDefs(solve(&equations, &options)?))
    }

    pub fn env(&self) -> &Environment<DefSet> {
        &self.0.env
    }

    pub fn into_env(self) -> Environment<DefSet> {
        self.0.env
    }

    pub fn passes(&self) -> usize {
        self.0.passes
    }

    pub fn in_facts(&self, inst: Inst) -> Option<&DefSet> {
        self.0.env.lookup(Point::In(inst))
    }

    pub fn out_facts(&self, inst: Inst) -> Option<&DefSet> {
        self.0.env.lookup(Point::Out(inst))
    }

    /// The instructions whose definition of `var` reaches the entry of
    /// `inst`.
    pub fn reaching(&self, inst: Inst, var: Var) -> Vec<Inst> {
        self.in_facts(inst)
            .into_iter()
            .flat_map(|defs| defs.iter())
            .filter(|def| def.var == var)
            .map(|def| def.inst)
            .collect()
    }

    pub fn display<'a>(&'a self, graph: &'a Graph) -> ReachingDefsDisplay<'a> {
        ReachingDefsDisplay(self, graph)
    }
}

pub struct ReachingDefsDisplay<'a>(&'a ReachingDefs, &'a Graph);

impl<'a> Display for ReachingDefsDisplay<'a> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        for (point, defs) in self.0.env().iter() {
            writeln!(f, "{}: {}", point, DefSetDisplay(defs, self.1))?;
        }
        Ok(())
    }
}
