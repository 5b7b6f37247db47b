use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use logic_formula::{Evaluator, Formula, FormulaOptions, Language, Model, Valuation};
use slog::{o, Drain, Logger};

/// Parse, validate and print a first-order or propositional formula
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// formula to parse, e.g. "forall x. P(x) -> Q(f(x))"
    formula: String,

    /// treat the input as a propositional formula
    #[clap(short, long)]
    propositional: bool,

    /// reject functions and predicates that are not in the language
    #[clap(short, long)]
    strict: bool,

    /// starting language as JSON, e.g. '{"functions": {"f": 1}, "predicates": {"P": 2}}'
    #[clap(short, long)]
    language: Option<String>,

    /// print the syntax tree
    #[clap(short, long)]
    tree: bool,

    /// truth value for a propositional variable, e.g. `-a p=true`; evaluates the formula
    #[clap(short, long = "assign", value_parser = parse_assignment)]
    assign: Vec<(String, bool)>,

    /// log parsing, validation and evaluation steps to stderr
    #[clap(short, long)]
    verbose: bool,
}

fn parse_assignment(s: &str) -> Result<(String, bool), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    let truth = match value.trim() {
        "true" | "1" => true,
        "false" | "0" => false,
        other => return Err(format!("expected true or false, got '{}'", other)),
    };
    Ok((name.trim().to_string(), truth))
}

fn eval_logger(verbose: bool) -> Logger {
    if !verbose {
        return Logger::root(slog::Discard, o!());
    }
    let plain = slog_term::PlainSyncDecorator::new(std::io::stderr());
    Logger::root(slog_term::FullFormat::new(plain).build().fuse(), o!())
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .target(env_logger::Target::Stderr)
        .init();

    let mut language: Language = match &args.language {
        Some(json) => serde_json::from_str(json).context("invalid --language JSON")?,
        None => Language::new(),
    };

    let mut options = if args.propositional {
        FormulaOptions::propositional()
    } else {
        FormulaOptions::default()
    };
    if args.strict {
        options = options.strict();
    }

    let formula = match Formula::with_options(&args.formula, &options, &mut language) {
        Ok(formula) => formula,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            return Ok(ExitCode::FAILURE);
        }
    };

    println!("{}", formula);
    if args.tree {
        print!("{}", formula.tree());
    }
    if !language.is_empty() {
        println!("{}", serde_json::to_string(&language)?);
    }

    if !args.assign.is_empty() {
        let valuation = args
            .assign
            .iter()
            .fold(Valuation::new(), |valuation, (name, truth)| {
                valuation.with_truth(name.as_str(), *truth)
            });
        let model = Model::new([false, true]);
        let logger = eval_logger(args.verbose);

        match Evaluator::new(&model, &valuation)
            .with_logger(&logger)
            .truth(formula.ast())
        {
            Ok(truth) => println!("{}", truth),
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(e));
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
