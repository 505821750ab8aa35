use super::{BinaryOp, Inst, InstData, InstKind, Var};
use crate::entity::EntityVec;
use crate::errors::GraphError;
use fxhash::FxHashMap;
use smallvec::SmallVec;

/// A control-flow graph of instructions.
///
/// The graph owns the instruction-id counter: each constructed
/// instruction takes the next id whether or not it is ever linked
/// to anything. Edges are added only while building; analyses take
/// the graph by shared reference.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    insts: EntityVec<Inst, InstData>,
    vars: EntityVec<Var, String>,
    var_dedup: FxHashMap<String, Var>,
}

impl Graph {
    pub fn new() -> Graph {
        Graph::default()
    }

    /// Intern a variable name.
    pub fn var(&mut self, name: &str) -> Var {
        if let Some(&var) = self.var_dedup.get(name) {
            return var;
        }
        let var = self.vars.push(name.to_owned());
        self.var_dedup.insert(name.to_owned(), var);
        log::trace!("var: {} -> {}", name, var);
        var
    }

    pub fn find_var(&self, name: &str) -> Option<Var> {
        self.var_dedup.get(name).copied()
    }

    pub fn var_name(&self, var: Var) -> &str {
        &self.vars[var]
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn add_inst(&mut self, kind: InstKind) -> Inst {
        log::trace!("add_inst: {:?}", kind);
        let inst = self.insts.push(InstData::new(kind));
        log::trace!(" -> {}", inst);
        inst
    }

    pub fn add_binop(&mut self, op: BinaryOp, dst: &str, src0: &str, src1: &str) -> Inst {
        let dst = self.var(dst);
        let src0 = self.var(src0);
        let src1 = self.var(src1);
        self.add_inst(InstKind::BinOp {
            op,
            dst,
            src0,
            src1,
        })
    }

    /// Add a branch-if-true. `add_edge` sets its false target and
    /// `add_true_edge` its true target.
    pub fn add_branch(&mut self, cond: &str) -> Inst {
        let cond = self.var(cond);
        self.add_inst(InstKind::Branch { cond })
    }

    /// Link `from` to `to`, recording `from` as a predecessor of `to`.
    /// On a branch this sets the target taken when the condition is
    /// false.
    pub fn add_edge(&mut self, from: Inst, to: Inst) -> Result<(), GraphError> {
        self.check_endpoints(from, to)?;
        let data = &mut self.insts[from];
        if data.kind.is_branch() {
            if data.if_false.is_some() {
                return Err(GraphError::TargetAlreadySet {
                    branch: from,
                    taken: false,
                });
            }
            data.if_false = Some(to);
        } else if data.succs.contains(&to) {
            return Err(GraphError::DuplicateEdge { from, to });
        }
        self.link(from, to);
        Ok(())
    }

    /// Set the target a branch takes when its condition holds.
    pub fn add_true_edge(&mut self, branch: Inst, to: Inst) -> Result<(), GraphError> {
        self.check_endpoints(branch, to)?;
        let data = &mut self.insts[branch];
        if !data.kind.is_branch() {
            return Err(GraphError::NotABranch(branch));
        }
        if data.if_true.is_some() {
            return Err(GraphError::TargetAlreadySet {
                branch,
                taken: true,
            });
        }
        data.if_true = Some(to);
        self.link(branch, to);
        Ok(())
    }

    /// Convenience for wiring both targets of a branch at once.
    pub fn add_branch_targets(
        &mut self,
        branch: Inst,
        if_true: Inst,
        if_false: Inst,
    ) -> Result<(), GraphError> {
        self.add_true_edge(branch, if_true)?;
        self.add_edge(branch, if_false)
    }

    fn check_endpoints(&self, from: Inst, to: Inst) -> Result<(), GraphError> {
        for inst in [from, to].iter() {
            if self.insts.get(*inst).is_none() {
                return Err(GraphError::UnknownInst(*inst));
            }
        }
        Ok(())
    }

    fn link(&mut self, from: Inst, to: Inst) {
        self.insts[from].succs.push(to);
        self.insts[to].preds.push(from);
        log::trace!("add_edge: from {} to {}", from, to);
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    pub fn insts(&self) -> impl Iterator<Item = Inst> {
        self.insts.iter()
    }

    pub fn entries(&self) -> impl Iterator<Item = (Inst, &InstData)> {
        self.insts.entries()
    }

    pub fn inst(&self, inst: Inst) -> &InstData {
        &self.insts[inst]
    }

    pub fn kind(&self, inst: Inst) -> &InstKind {
        &self.insts[inst].kind
    }

    /// Recover an instruction from its numeric id.
    pub fn lookup_inst(&self, id: u64) -> Option<Inst> {
        self.insts.lookup(id)
    }

    pub fn succs(&self, inst: Inst) -> &[Inst] {
        &self.insts[inst].succs[..]
    }

    pub fn preds(&self, inst: Inst) -> &[Inst] {
        &self.insts[inst].preds[..]
    }

    pub fn definition(&self, inst: Inst) -> SmallVec<[Var; 1]> {
        self.insts[inst].kind.definition()
    }

    pub fn uses(&self, inst: Inst) -> SmallVec<[Var; 2]> {
        self.insts[inst].kind.uses()
    }

    /// The fall-through successor: the only successor of a
    /// straight-line instruction, or the false target of a branch.
    pub fn get_next(&self, inst: Inst) -> Option<Inst> {
        let data = &self.insts[inst];
        if data.kind.is_branch() {
            data.if_false
        } else {
            data.succs.first().copied()
        }
    }

    /// Where a branch goes for a given value of its condition. `None`
    /// for an unset target or a non-branch.
    pub fn branch_target(&self, branch: Inst, taken: bool) -> Option<Inst> {
        let data = &self.insts[branch];
        if taken {
            data.if_true
        } else {
            data.if_false
        }
    }

    /// The every-edge-has-its-inverse check. Holds for any graph
    /// built through `add_edge`.
    pub fn validate(&self) -> bool {
        self.insts.entries().all(|(inst, data)| {
            data.succs.iter().all(|&succ| {
                let forward = data.succs.iter().filter(|&&s| s == succ).count();
                let backward = self.insts[succ]
                    .preds
                    .iter()
                    .filter(|&&p| p == inst)
                    .count();
                forward == backward
            }) && data.preds.iter().all(|&pred| self.insts[pred].succs.contains(&inst))
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entity::EntityRef;

    #[test]
    fn ids_count_unlinked_insts() {
        let mut g = Graph::new();
        let i0 = g.add_binop(BinaryOp::Add, "c", "a", "b");
        let _unlinked = g.add_binop(BinaryOp::Mul, "d", "c", "a");
        let i2 = g.add_branch("d");
        assert_eq!(i0.index(), 0);
        assert_eq!(i2.index(), 2);
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn edges_are_symmetric() {
        let _ = env_logger::try_init();
        let mut g = Graph::new();
        let i0 = g.add_binop(BinaryOp::Add, "c", "a", "b");
        let i1 = g.add_binop(BinaryOp::Mul, "d", "c", "a");
        let i2 = g.add_binop(BinaryOp::Lth, "e", "c", "d");
        g.add_edge(i0, i2).unwrap();
        g.add_edge(i1, i2).unwrap();
        assert_eq!(g.succs(i0), &[i2]);
        assert_eq!(g.preds(i2), &[i0, i1]);
        assert!(g.preds(i0).is_empty());
        assert!(g.validate());
        assert_eq!(g.get_next(i0), Some(i2));
        assert_eq!(g.get_next(i2), None);
    }

    #[test]
    fn duplicate_edge_rejected() {
        let mut g = Graph::new();
        let i0 = g.add_binop(BinaryOp::Add, "c", "a", "b");
        let i1 = g.add_binop(BinaryOp::Add, "d", "c", "c");
        g.add_edge(i0, i1).unwrap();
        assert_eq!(
            g.add_edge(i0, i1),
            Err(GraphError::DuplicateEdge { from: i0, to: i1 })
        );
        assert_eq!(g.preds(i1).len(), 1);
    }

    #[test]
    fn branch_has_two_targets() {
        let mut g = Graph::new();
        let b = g.add_branch("p");
        let t = g.add_binop(BinaryOp::Add, "x", "a", "b");
        let f = g.add_binop(BinaryOp::Mul, "x", "a", "b");
        let extra = g.add_binop(BinaryOp::Mul, "y", "a", "b");
        g.add_branch_targets(b, t, f).unwrap();
        assert_eq!(g.succs(b), &[t, f]);
        assert_eq!(g.branch_target(b, true), Some(t));
        assert_eq!(g.branch_target(b, false), Some(f));
        assert_eq!(g.get_next(b), Some(f));
        assert_eq!(
            g.add_edge(b, extra),
            Err(GraphError::TargetAlreadySet {
                branch: b,
                taken: false
            })
        );
        assert_eq!(
            g.add_true_edge(b, extra),
            Err(GraphError::TargetAlreadySet {
                branch: b,
                taken: true
            })
        );
        assert!(g.preds(extra).is_empty());
    }

    #[test]
    fn branch_targets_may_coincide() {
        let mut g = Graph::new();
        let b = g.add_branch("p");
        let l = g.add_binop(BinaryOp::Add, "x", "a", "b");
        g.add_branch_targets(b, l, l).unwrap();
        assert_eq!(g.succs(b), &[l, l]);
        assert_eq!(g.preds(l), &[b, b]);
        assert!(g.validate());
    }

    #[test]
    fn false_target_only() {
        let mut g = Graph::new();
        let b = g.add_branch("p");
        let f = g.add_binop(BinaryOp::Add, "x", "a", "b");
        g.add_edge(b, f).unwrap();
        assert_eq!(g.branch_target(b, true), None);
        assert_eq!(g.branch_target(b, false), Some(f));
        assert_eq!(g.add_true_edge(f, b), Err(GraphError::NotABranch(f)));
    }

    #[test]
    fn def_use() {
        let mut g = Graph::new();
        let add = g.add_binop(BinaryOp::Add, "x", "a", "a");
        let b = g.add_branch("x");
        let x = g.find_var("x").unwrap();
        let a = g.find_var("a").unwrap();
        assert_eq!(&g.definition(add)[..], &[x]);
        assert_eq!(&g.uses(add)[..], &[a]);
        assert!(g.definition(b).is_empty());
        assert_eq!(&g.uses(b)[..], &[x]);
    }

    #[test]
    fn unknown_inst_rejected() {
        let mut g = Graph::new();
        let i0 = g.add_branch("p");
        let mut other = Graph::new();
        other.add_branch("q");
        let stranger = other.add_branch("r");
        assert_eq!(
            g.add_edge(i0, stranger),
            Err(GraphError::UnknownInst(stranger))
        );
    }
}
