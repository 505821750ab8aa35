//! Liveness analysis.
//!
//! A backward may-analysis over the same graph and solver as
//! reaching definitions:
//!
//! ```plain
//! IN[p]  = uses(p) + (OUT[p] - def(p))
//! OUT[p] = Union( IN[s] for s in succs(p) )
//! ```

use crate::errors::SolveError;
use crate::ir::{Graph, Inst, Var};
use crate::pass::{solve, Environment, Equation, Lattice, Point, Solution, SolverOptions};
use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};

pub type VarSet = BTreeSet<Var>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LivenessEq {
    In {
        inst: Inst,
        defs: SmallVec<[Var; 1]>,
        uses: SmallVec<[Var; 2]>,
    },
    Out {
        inst: Inst,
        succs: SmallVec<[Inst; 2]>,
    },
}

impl Equation for LivenessEq {
    type L = VarSet;

    fn point(&self) -> Point {
        match self {
            &LivenessEq::In { inst, .. } => Point::In(inst),
            &LivenessEq::Out { inst, .. } => Point::Out(inst),
        }
    }

    fn eval_aux(&self, env: &Environment<VarSet>) -> Result<VarSet, SolveError> {
        match self {
            &LivenessEq::In {
                inst,
                ref defs,
                ref uses,
            } => {
                let mut live: VarSet = env
                    .get(Point::Out(inst))?
                    .iter()
                    .filter(|var| !defs.contains(var))
                    .copied()
                    .collect();
                live.extend(uses.iter().copied());
                Ok(live)
            }
            &LivenessEq::Out { ref succs, .. } => {
                let mut live = VarSet::top();
                for &succ in succs {
                    live.meet_with(env.get(Point::In(succ))?);
                }
                Ok(live)
            }
        }
    }
}

impl LivenessEq {
    pub fn display<'a>(&'a self, graph: &'a Graph) -> LivenessEqDisplay<'a> {
        LivenessEqDisplay(self, graph)
    }
}

pub struct LivenessEqDisplay<'a>(&'a LivenessEq, &'a Graph);

impl<'a> Display for LivenessEqDisplay<'a> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let names = |vars: &[Var]| {
            vars.iter()
                .map(|&var| self.1.var_name(var).to_owned())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let eq = self.0;
        match eq {
            &LivenessEq::In {
                inst,
                ref defs,
                ref uses,
            } => write!(
                f,
                "{}: {{{}}} + ({} - {{{}}})",
                eq.point(),
                names(&uses[..]),
                Point::Out(inst),
                names(&defs[..])
            ),
            &LivenessEq::Out { ref succs, .. } => {
                let ins = succs
                    .iter()
                    .map(|&succ| Point::In(succ).to_string())
                    .collect::<Vec<_>>();
                write!(f, "{}: Union( {} )", eq.point(), ins.join(", "))
            }
        }
    }
}

/// Build the liveness equation system: OUT equations, then IN
/// equations.
pub fn constraints(graph: &Graph) -> Vec<LivenessEq> {
    let outs = graph.entries().map(|(inst, data)| LivenessEq::Out {
        inst,
        succs: data.succs.clone(),
    });
    let ins = graph.entries().map(|(inst, data)| LivenessEq::In {
        inst,
        defs: data.kind.definition(),
        uses: data.kind.uses(),
    });
    outs.chain(ins).collect()
}

/// Solved liveness for one graph.
#[derive(Clone, Debug)]
pub struct Liveness(Solution<VarSet>);

impl Liveness {
    pub fn compute(graph: &Graph, options: &SolverOptions) -> Result<Liveness, SolveError> {
        let equations = constraints(graph);
        let options = options.or_height_bound(equations.len(), graph.num_vars());
        log::debug!(
            "liveness: {} insts, {} equations, pass limit {:?}",
            graph.len(),
            equations.len(),
            options.max_passes
        );
        Ok(Liveness(solve(&equations, &options)?))
    }

    pub fn env(&self) -> &Environment<VarSet> {
        &self.0.env
    }

    pub fn passes(&self) -> usize {
        self.0.passes
    }

    pub fn live_in(&self, inst: Inst) -> Option<&VarSet> {
        self.0.env.lookup(Point::In(inst))
    }

    pub fn live_out(&self, inst: Inst) -> Option<&VarSet> {
        self.0.env.lookup(Point::Out(inst))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ir::BinaryOp;

    fn vars(g: &Graph, names: &[&str]) -> VarSet {
        names.iter().filter_map(|name| g.find_var(name)).collect()
    }

    #[test]
    fn straight_line() {
        let _ = env_logger::try_init();
        let mut g = Graph::new();
        let i0 = g.add_binop(BinaryOp::Add, "c", "a", "b");
        let i1 = g.add_binop(BinaryOp::Mul, "d", "c", "a");
        g.add_edge(i0, i1).unwrap();

        let live = Liveness::compute(&g, &SolverOptions::default()).unwrap();
        assert_eq!(live.live_in(i0).unwrap(), &vars(&g, &["a", "b"]));
        assert_eq!(live.live_out(i0).unwrap(), &vars(&g, &["a", "c"]));
        assert_eq!(live.live_in(i1).unwrap(), &vars(&g, &["a", "c"]));
        assert!(live.live_out(i1).unwrap().is_empty());
    }

    #[test]
    fn loop_keeps_counter_live() {
        let mut g = Graph::new();
        let step = g.add_binop(BinaryOp::Add, "i", "i", "one");
        let test = g.add_binop(BinaryOp::Lth, "p", "i", "n");
        let br = g.add_branch("p");
        let exit = g.add_binop(BinaryOp::Add, "r", "i", "zero");
        g.add_edge(step, test).unwrap();
        g.add_edge(test, br).unwrap();
        g.add_branch_targets(br, step, exit).unwrap();

        let live = Liveness::compute(&g, &SolverOptions::default()).unwrap();
        assert_eq!(live.live_out(br).unwrap(), &vars(&g, &["i", "one", "n", "zero"]));
        assert_eq!(live.live_in(br).unwrap(), &vars(&g, &["p", "i", "one", "n", "zero"]));
        assert!(!live.live_out(test).unwrap().contains(&g.find_var("r").unwrap()));
    }

    #[test]
    fn equation_text() {
        let mut g = Graph::new();
        let i0 = g.add_binop(BinaryOp::Add, "c", "a", "b");
        let i1 = g.add_branch("c");
        g.add_edge(i0, i1).unwrap();
        let text: Vec<String> = constraints(&g)
            .iter()
            .map(|eq| eq.display(&g).to_string())
            .collect();
        assert_eq!(
            text,
            vec![
                "OUT_0: Union( IN_1 )",
                "OUT_1: Union(  )",
                "IN_0: {a, b} + (OUT_0 - {c})",
                "IN_1: {c} + (OUT_1 - {})",
            ]
        );
    }
}
