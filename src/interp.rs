//! Instruction-graph interpreter.
//!
//! Runs a program from an entry instruction, following the selected
//! successor of each instruction until there is none. Variable state
//! is a stack of bindings: assigning a variable pushes a new binding,
//! so earlier values remain visible in `InterpEnv::history`.

use crate::ir::*;

/// How many instructions a run may execute before it is stopped.
pub const DEFAULT_FUEL: u64 = 1_000_000;

/// A runtime value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstVal {
    Int(i64),
    Bool(bool),
}

impl ConstVal {
    pub fn as_int(self) -> i64 {
        match self {
            ConstVal::Int(i) => i,
            ConstVal::Bool(b) => b as i64,
        }
    }

    /// Non-zero integers and `true` are truthy.
    pub fn is_truthy(self) -> bool {
        self.as_int() != 0
    }
}

impl std::fmt::Display for ConstVal {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ConstVal::Int(i) => write!(f, "{}", i),
            ConstVal::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Variable bindings, most recent last.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterpEnv {
    bindings: Vec<(Var, ConstVal)>,
}

impl InterpEnv {
    pub fn new() -> Self {
        InterpEnv::default()
    }

    /// Seed an environment with initial values for named variables,
    /// interning the names in `graph`.
    pub fn with_values(graph: &mut Graph, values: &[(&str, ConstVal)]) -> Self {
        let mut env = InterpEnv::new();
        for &(name, value) in values {
            env.set(graph.var(name), value);
        }
        env
    }

    pub fn set(&mut self, var: Var, value: ConstVal) {
        self.bindings.push((var, value));
    }

    /// The most recent binding of `var`.
    pub fn get(&self, var: Var) -> Option<ConstVal> {
        self.bindings
            .iter()
            .rev()
            .find(|&&(bound, _)| bound == var)
            .map(|&(_, value)| value)
    }

    /// Every binding ever made, oldest first.
    pub fn history(&self) -> &[(Var, ConstVal)] {
        &self.bindings[..]
    }
}

/// The result of an interpreter session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InterpResult {
    /// The program fell off its last instruction.
    Ok(InterpEnv),
    /// An instruction read a variable with no binding.
    Unbound { inst: Inst, var: Var },
    /// The run exceeded its fuel.
    OutOfFuel,
}

impl InterpResult {
    /// Extract the final environment, if the run completed, otherwise
    /// produce an error.
    pub fn ok(self) -> anyhow::Result<InterpEnv> {
        match self {
            InterpResult::Ok(env) => Ok(env),
            other => anyhow::bail!("Bad InterpResult: {:?}", other),
        }
    }
}

pub struct Interpreter {
    /// Fuel remaining: allows deterministic stopping of execution.
    pub fuel: u64,
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter { fuel: DEFAULT_FUEL }
    }
}

impl Interpreter {
    pub fn new(fuel: u64) -> Self {
        Interpreter { fuel }
    }

    pub fn run(&mut self, graph: &Graph, entry: Inst, mut env: InterpEnv) -> InterpResult {
        let mut cur = Some(entry);
        while let Some(inst) = cur {
            if self.fuel == 0 {
                return InterpResult::OutOfFuel;
            }
            self.fuel -= 1;

            log::trace!("Evaluating inst {}", graph.display_inst(inst));
            cur = match graph.kind(inst) {
                &InstKind::BinOp {
                    op,
                    dst,
                    src0,
                    src1,
                } => {
                    let (a, b) = match (read(&env, inst, src0), read(&env, inst, src1)) {
                        (Ok(a), Ok(b)) => (a, b),
                        (Err(e), _) | (_, Err(e)) => return e,
                    };
                    let result = eval_binop(op, a, b);
                    log::trace!("{} gets {}", graph.var_name(dst), result);
                    env.set(dst, result);
                    graph.get_next(inst)
                }
                &InstKind::Branch { cond } => {
                    let taken = match read(&env, inst, cond) {
                        Ok(value) => value.is_truthy(),
                        Err(e) => return e,
                    };
                    log::trace!("branch taken: {}", taken);
                    graph.branch_target(inst, taken)
                }
            };
        }
        InterpResult::Ok(env)
    }
}

fn read(env: &InterpEnv, inst: Inst, var: Var) -> Result<ConstVal, InterpResult> {
    env.get(var).ok_or(InterpResult::Unbound { inst, var })
}

fn eval_binop(op: BinaryOp, a: ConstVal, b: ConstVal) -> ConstVal {
    let (a, b) = (a.as_int(), b.as_int());
    match op {
        BinaryOp::Add => ConstVal::Int(a.wrapping_add(b)),
        BinaryOp::Mul => ConstVal::Int(a.wrapping_mul(b)),
        BinaryOp::Lth => ConstVal::Bool(a < b),
        BinaryOp::Geq => ConstVal::Bool(a >= b),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn value_of(graph: &Graph, env: &InterpEnv, name: &str) -> Option<ConstVal> {
        graph.find_var(name).and_then(|var| env.get(var))
    }

    #[test]
    fn binops() {
        let mut g = Graph::new();
        let add = g.add_binop(BinaryOp::Add, "a", "b0", "b1");
        let mul = g.add_binop(BinaryOp::Mul, "m", "b0", "b1");
        let lth = g.add_binop(BinaryOp::Lth, "l", "b0", "b1");
        let geq = g.add_binop(BinaryOp::Geq, "g", "b0", "b1");
        g.add_edge(add, mul).unwrap();
        g.add_edge(mul, lth).unwrap();
        g.add_edge(lth, geq).unwrap();
        let env = InterpEnv::with_values(
            &mut g,
            &[("b0", ConstVal::Int(2)), ("b1", ConstVal::Int(3))],
        );

        let env = Interpreter::default().run(&g, add, env).ok().unwrap();
        assert_eq!(value_of(&g, &env, "a"), Some(ConstVal::Int(5)));
        assert_eq!(value_of(&g, &env, "m"), Some(ConstVal::Int(6)));
        assert_eq!(value_of(&g, &env, "l"), Some(ConstVal::Bool(true)));
        assert_eq!(value_of(&g, &env, "g"), Some(ConstVal::Bool(false)));
    }

    #[test]
    fn branch_picks_min() {
        let _ = env_logger::try_init();
        let mut g = Graph::new();
        let p = g.add_binop(BinaryOp::Lth, "p", "n", "m");
        let b = g.add_branch("p");
        let n_min = g.add_binop(BinaryOp::Add, "answer", "n", "zero");
        let m_min = g.add_binop(BinaryOp::Add, "answer", "m", "zero");
        g.add_edge(p, b).unwrap();
        g.add_branch_targets(b, n_min, m_min).unwrap();

        let seed = |g: &mut Graph, m: i64, n: i64| {
            InterpEnv::with_values(
                g,
                &[
                    ("m", ConstVal::Int(m)),
                    ("n", ConstVal::Int(n)),
                    ("zero", ConstVal::Int(0)),
                ],
            )
        };
        let env = seed(&mut g, 3, 2);
        let env = Interpreter::default().run(&g, p, env).ok().unwrap();
        assert_eq!(value_of(&g, &env, "answer"), Some(ConstVal::Int(2)));

        let env = seed(&mut g, 3, 7);
        let env = Interpreter::default().run(&g, p, env).ok().unwrap();
        assert_eq!(value_of(&g, &env, "answer"), Some(ConstVal::Int(3)));
    }

    #[test]
    fn rebinding_keeps_history() {
        let mut g = Graph::new();
        let double = g.add_binop(BinaryOp::Add, "x", "x", "x");
        let env = InterpEnv::with_values(&mut g, &[("x", ConstVal::Int(4))]);
        let env = Interpreter::default().run(&g, double, env).ok().unwrap();
        let x = g.find_var("x").unwrap();
        assert_eq!(env.get(x), Some(ConstVal::Int(8)));
        assert_eq!(
            env.history(),
            &[(x, ConstVal::Int(4)), (x, ConstVal::Int(8))]
        );
    }

    #[test]
    fn unbound_variable() {
        let mut g = Graph::new();
        let add = g.add_binop(BinaryOp::Add, "x", "a", "b");
        let a = g.find_var("a").unwrap();
        let result = Interpreter::default().run(&g, add, InterpEnv::new());
        assert_eq!(result, InterpResult::Unbound { inst: add, var: a });
        assert!(result.ok().is_err());
    }

    #[test]
    fn infinite_loop_runs_out_of_fuel() {
        let mut g = Graph::new();
        let b = g.add_branch("t");
        g.add_true_edge(b, b).unwrap();
        let env = InterpEnv::with_values(&mut g, &[("t", ConstVal::Bool(true))]);
        assert_eq!(
            Interpreter::new(100).run(&g, b, env),
            InterpResult::OutOfFuel
        );
    }

    #[test]
    fn branch_without_true_target_stops() {
        let mut g = Graph::new();
        let b = g.add_branch("t");
        let f = g.add_binop(BinaryOp::Add, "x", "one", "one");
        g.add_edge(b, f).unwrap();

        let seed = |g: &mut Graph, t: bool| {
            InterpEnv::with_values(g, &[("t", ConstVal::Bool(t)), ("one", ConstVal::Int(1))])
        };
        let env = seed(&mut g, true);
        let env = Interpreter::default().run(&g, b, env).ok().unwrap();
        assert_eq!(value_of(&g, &env, "x"), None);

        let env = seed(&mut g, false);
        let env = Interpreter::default().run(&g, b, env).ok().unwrap();
        assert_eq!(value_of(&g, &env, "x"), Some(ConstVal::Int(2)));
    }
}
