use super::{Inst, Var};
use smallvec::{smallvec, SmallVec};

/// Opcodes of two-operand instructions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Mul,
    /// Less-than comparison; produces a boolean.
    Lth,
    /// Greater-than-or-equal comparison; produces a boolean.
    Geq,
}

impl BinaryOp {
    pub fn opcode(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Mul => "*",
            BinaryOp::Lth => "<",
            BinaryOp::Geq => ">=",
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.opcode())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum InstKind {
    /// `dst = src0 <op> src1`.
    BinOp {
        op: BinaryOp,
        dst: Var,
        src0: Var,
        src1: Var,
    },
    /// Branch-if-true. Its two targets live in `InstData`.
    Branch { cond: Var },
}

impl InstKind {
    /// Variables written by this instruction.
    pub fn definition(&self) -> SmallVec<[Var; 1]> {
        match self {
            &InstKind::BinOp { dst, .. } => smallvec![dst],
            &InstKind::Branch { .. } => smallvec![],
        }
    }

    /// Variables read by this instruction, without repeats.
    pub fn uses(&self) -> SmallVec<[Var; 2]> {
        match self {
            &InstKind::BinOp { src0, src1, .. } if src0 == src1 => smallvec![src0],
            &InstKind::BinOp { src0, src1, .. } => smallvec![src0, src1],
            &InstKind::Branch { cond } => smallvec![cond],
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, InstKind::Branch { .. })
    }
}

/// One node of the graph: what it does plus its edges.
#[derive(Clone, Debug)]
pub struct InstData {
    pub kind: InstKind,
    /// Successors, in insertion order. A branch whose two targets
    /// coincide lists that target twice.
    pub succs: SmallVec<[Inst; 2]>,
    /// Predecessors; always the inverse relation of `succs`.
    pub preds: SmallVec<[Inst; 4]>,
    /// Branch only: where control goes when the condition holds.
    pub if_true: Option<Inst>,
    /// Branch only: where control goes otherwise.
    pub if_false: Option<Inst>,
}

impl InstData {
    pub fn new(kind: InstKind) -> Self {
        InstData {
            kind,
            succs: smallvec![],
            preds: smallvec![],
            if_true: None,
            if_false: None,
        }
    }
}
