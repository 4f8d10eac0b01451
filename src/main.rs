use clap::{ArgAction, Parser, Subcommand};
use miette::{IntoDiagnostic, Report};
use rpn_calc::{
    config::DEFAULT_MAX_DEPTH,
    evaluate_with,
    repl::{Command, History, HELP_TEXT, HISTORY_SHOWN, PROMPT},
    tokenize, Config,
};
use rustyline::{error::ReadlineError, DefaultEditor};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Reverse Polish Notation calculator", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Maximum bracket nesting depth
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH, global = true)]
    max_depth: usize,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the tokens of an expression
    Tokenize { expression: String },
    /// Evaluate a single expression
    Eval { expression: String },
    /// Start the interactive calculator (default)
    Repl,
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::new().with_max_depth(cli.max_depth);

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Tokenize { expression } => {
            let tokens = tokenize(&expression)
                .map_err(|err| Report::new(err).with_source_code(expression.clone()))?;
            for token in tokens {
                println!("{token:?}");
            }
        }
        Commands::Eval { expression } => {
            let value = evaluate_with(&expression, &config)
                .map_err(|err| Report::new(err).with_source_code(expression.clone()))?;
            println!("{value}");
        }
        Commands::Repl => repl(&config)?,
    }

    Ok(())
}

fn repl(config: &Config) -> miette::Result<()> {
    let mut editor = DefaultEditor::new().into_diagnostic()?;
    let mut history = History::default();

    println!("{HELP_TEXT}");

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("Ctrl+C (type `exit` to quit)");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err).into_diagnostic(),
        };

        match Command::parse(&line) {
            Command::Empty => {}
            Command::Exit => break,
            Command::Help => println!("{HELP_TEXT}"),
            Command::History => {
                for line in history.listing(HISTORY_SHOWN) {
                    println!("{line}");
                }
            }
            Command::Evaluate(expression) => {
                if let Err(err) = editor.add_history_entry(expression) {
                    debug!("could not record line in editor history: {err}");
                }

                match evaluate_with(expression, config) {
                    Ok(value) => {
                        let formatted = value.to_string();
                        println!("{formatted}");
                        history.push(expression, formatted);
                    }
                    Err(err) => {
                        debug!(expression, %err, "evaluation failed");
                        eprintln!("Error: {err}");
                    }
                }
            }
        }
    }

    Ok(())
}

fn directive_for_verbosity(v: u8) -> &'static str {
    match v {
        0 => "rpn_calc=warn",
        1 => "rpn_calc=debug",
        _ => "rpn_calc=trace",
    }
}
