mod builtins;
mod config;
mod env;
mod error;
mod eval;
mod parser;
mod special_forms;
mod value;

use clap::Parser;
use config::{VERSION, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use env::Environment;
use eval::evaluate;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use std::path::PathBuf;
use std::rc::Rc;
use value::Value;

/// A tail-recursive evaluator core for a Scheme dialect
#[derive(Parser, Debug)]
#[command(name = "scheme-core")]
#[command(version = VERSION)]
#[command(about = "A tail-recursive Scheme dialect evaluator")]
struct CliArgs {
    /// Script file to execute
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Load FILE, then drop into the interactive REPL
    #[arg(short = 'i', long = "load", value_name = "FILE")]
    load: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let env = Environment::new();
    builtins::register_all(&env);

    if let Some(load_path) = &args.load {
        run_file(load_path, &env)?;
        return repl(&env);
    }

    if let Some(script_path) = &args.script {
        return run_file(script_path, &env);
    }

    repl(&env)
}

fn run_file(path: &PathBuf, env: &Rc<Environment>) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let exprs = parser::parse_all(&source).map_err(|e| format!("parse error: {e}"))?;
    for expr in &exprs {
        evaluate(expr, env).map_err(|e| format!("evaluation error: {e}"))?;
    }
    Ok(())
}

fn repl(env: &Rc<Environment>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::builder().auto_add_history(true).build();
    let mut rl = DefaultEditor::with_config(config)?;

    let history_file = ".scheme_history";
    let _ = rl.load_history(history_file);

    println!("{WELCOME_MESSAGE}");
    println!("{WELCOME_SUBTITLE}");

    loop {
        match rl.readline("scheme> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                match parser::parse_all(&line) {
                    Ok(exprs) => {
                        let mut last = Value::Undefined;
                        let mut failed = false;
                        for expr in &exprs {
                            match evaluate(expr, env) {
                                Ok(value) => last = value,
                                Err(e) => {
                                    eprintln!("Error: {e}");
                                    failed = true;
                                    break;
                                }
                            }
                        }
                        if !failed {
                            println!("=> {last}");
                        }
                    }
                    Err(e) => eprintln!("Parse error: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(history_file);
    Ok(())
}
