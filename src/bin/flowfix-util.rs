//! FLOWFIX command-line tool.

use anyhow::{anyhow, Result};
use flowfix::analysis::{liveness, reaching_defs, Liveness, ReachingDefs};
use flowfix::pass::SolverOptions;
use flowfix::{BinaryOp, ConstVal, Graph, Inst, InterpEnv, Interpreter};
use log::debug;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "flowfix-util", about = "FLOWFIX utility.")]
struct Options {
    #[structopt(short, long)]
    debug: bool,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    #[structopt(name = "list", about = "List the built-in demo programs")]
    List,
    #[structopt(name = "print-graph", about = "Print a demo program's instruction graph")]
    PrintGraph {
        #[structopt(help = "Demo program name")]
        program: String,
    },
    #[structopt(name = "equations", about = "Print the equation system for a demo program")]
    Equations {
        #[structopt(help = "Demo program name")]
        program: String,
        #[structopt(long, help = "Print liveness instead of reaching definitions")]
        liveness: bool,
    },
    #[structopt(name = "solve", about = "Solve an analysis over a demo program")]
    Solve {
        #[structopt(help = "Demo program name")]
        program: String,
        #[structopt(long, help = "Solve liveness instead of reaching definitions")]
        liveness: bool,
        #[structopt(long, help = "Give up after this many passes")]
        max_passes: Option<usize>,
    },
    #[structopt(name = "run", about = "Interpret a demo program")]
    Run {
        #[structopt(help = "Demo program name")]
        program: String,
        #[structopt(long, default_value = "1000000", help = "Instruction budget")]
        fuel: u64,
    },
}

struct Demo {
    graph: Graph,
    entry: Inst,
    inputs: Vec<(&'static str, ConstVal)>,
}

const DEMOS: &[(&str, &str)] = &[
    ("join", "two definitions joining at a comparison"),
    ("min", "select the smaller of two values"),
    ("spin", "a branch that loops on itself"),
    ("count", "a counting loop"),
];

fn demo(name: &str) -> Result<Demo> {
    let mut graph = Graph::new();
    let (entry, inputs) = match name {
        "join" => {
            let i0 = graph.add_binop(BinaryOp::Add, "c", "a", "b");
            let i1 = graph.add_binop(BinaryOp::Mul, "d", "c", "a");
            let i2 = graph.add_binop(BinaryOp::Lth, "e", "c", "d");
            graph.add_edge(i0, i1)?;
            graph.add_edge(i0, i2)?;
            graph.add_edge(i1, i2)?;
            (i0, vec![("a", ConstVal::Int(2)), ("b", ConstVal::Int(3))])
        }
        "min" => {
            let p = graph.add_binop(BinaryOp::Lth, "p", "n", "m");
            let b = graph.add_branch("p");
            let n_min = graph.add_binop(BinaryOp::Add, "answer", "n", "zero");
            let m_min = graph.add_binop(BinaryOp::Add, "answer", "m", "zero");
            graph.add_edge(p, b)?;
            graph.add_branch_targets(b, n_min, m_min)?;
            (
                p,
                vec![
                    ("m", ConstVal::Int(3)),
                    ("n", ConstVal::Int(2)),
                    ("zero", ConstVal::Int(0)),
                ],
            )
        }
        "spin" => {
            let b = graph.add_branch("x");
            graph.add_edge(b, b)?;
            (b, vec![("x", ConstVal::Bool(true))])
        }
        "count" => {
            let step = graph.add_binop(BinaryOp::Add, "i", "i", "one");
            let test = graph.add_binop(BinaryOp::Lth, "p", "i", "n");
            let br = graph.add_branch("p");
            let exit = graph.add_binop(BinaryOp::Mul, "r", "i", "one");
            graph.add_edge(step, test)?;
            graph.add_edge(test, br)?;
            graph.add_branch_targets(br, step, exit)?;
            (
                step,
                vec![
                    ("i", ConstVal::Int(0)),
                    ("one", ConstVal::Int(1)),
                    ("n", ConstVal::Int(5)),
                ],
            )
        }
        _ => return Err(anyhow!("unknown demo program '{}'", name)),
    };
    debug!("Built demo '{}' with {} instructions", name, graph.len());
    Ok(Demo {
        graph,
        entry,
        inputs,
    })
}

fn main() -> Result<()> {
    let opts = Options::from_args();

    let mut logger = env_logger::Builder::from_default_env();
    if opts.debug {
        logger.filter_level(log::LevelFilter::Debug);
    }
    let _ = logger.try_init();

    match opts.command {
        Command::List => {
            for (name, about) in DEMOS {
                println!("{:8} {}", name, about);
            }
        }
        Command::PrintGraph { program } => {
            let demo = demo(&program)?;
            print!("{}", demo.graph.display(""));
        }
        Command::Equations {
            program,
            liveness: backward,
        } => {
            let demo = demo(&program)?;
            if backward {
                for eq in liveness::constraints(&demo.graph) {
                    println!("{}", eq.display(&demo.graph));
                }
            } else {
                for eq in reaching_defs::constraints(&demo.graph) {
                    println!("{}", eq.display(&demo.graph));
                }
            }
        }
        Command::Solve {
            program,
            liveness: backward,
            max_passes,
        } => {
            let demo = demo(&program)?;
            let options = SolverOptions { max_passes };
            if backward {
                let live = Liveness::compute(&demo.graph, &options)?;
                for (point, vars) in live.env().iter() {
                    let names = vars
                        .iter()
                        .map(|&var| demo.graph.var_name(var))
                        .collect::<Vec<_>>();
                    println!("{}: {{{}}}", point, names.join(", "));
                }
                debug!("Converged after {} passes", live.passes());
            } else {
                let defs = ReachingDefs::compute(&demo.graph, &options)?;
                print!("{}", defs.display(&demo.graph));
                debug!("Converged after {} passes", defs.passes());
            }
        }
        Command::Run { program, fuel } => {
            let mut demo = demo(&program)?;
            let env = InterpEnv::with_values(&mut demo.graph, &demo.inputs);
            let env = Interpreter::new(fuel)
                .run(&demo.graph, demo.entry, env)
                .ok()?;
            for &(var, value) in env.history() {
                println!("{} = {}", demo.graph.var_name(var), value);
            }
        }
    }

    Ok(())
}
