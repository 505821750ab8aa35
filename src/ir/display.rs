//! Displaying instruction graphs.

use super::{Graph, Inst, InstKind};
use crate::entity::EntityRef;

use std::fmt::{Display, Formatter, Result as FmtResult};

pub struct InstDisplay<'a>(pub(crate) &'a Graph, pub(crate) Inst);

impl<'a> Display for InstDisplay<'a> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let graph = self.0;
        match graph.kind(self.1) {
            &InstKind::BinOp {
                op,
                dst,
                src0,
                src1,
            } => write!(
                f,
                "{}: {} = {}{}{}",
                self.1.index(),
                graph.var_name(dst),
                graph.var_name(src0),
                op,
                graph.var_name(src1)
            ),
            &InstKind::Branch { cond } => {
                write!(f, "{}: bt {}", self.1.index(), graph.var_name(cond))
            }
        }
    }
}

pub struct GraphDisplay<'a>(pub(crate) &'a Graph, pub(crate) &'a str);

impl<'a> Display for GraphDisplay<'a> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let ids = |insts: &[Inst]| {
            insts
                .iter()
                .map(|inst| inst.index().to_string())
                .collect::<Vec<_>>()
        };
        for (inst, data) in self.0.entries() {
            writeln!(f, "{}{}", self.1, InstDisplay(self.0, inst))?;
            writeln!(f, "{}  P: {}", self.1, ids(&data.preds[..]).join(", "))?;
            if data.kind.is_branch() {
                let target = |t: Option<Inst>| {
                    t.map(|inst| inst.index().to_string())
                        .unwrap_or_else(|| "-".to_owned())
                };
                writeln!(
                    f,
                    "{}  NT: {} NF: {}",
                    self.1,
                    target(data.if_true),
                    target(data.if_false)
                )?;
            } else {
                writeln!(f, "{}  N: {}", self.1, ids(&data.succs[..]).join(", "))?;
            }
        }
        Ok(())
    }
}

impl Graph {
    pub fn display<'a>(&'a self, indent: &'a str) -> GraphDisplay<'a> {
        GraphDisplay(self, indent)
    }

    pub fn display_inst(&self, inst: Inst) -> InstDisplay<'_> {
        InstDisplay(self, inst)
    }
}
