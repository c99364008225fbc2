//! jsbridge command-line entry point
//!
//! Parses CLI arguments and delegates to the Runtime for execution.

use clap::Parser as ClapParser;
use js_cli::{Cli, CliResult, Runtime};

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    if cli.file.is_none() && cli.eval.is_none() && !cli.repl {
        print_usage();
        return Ok(());
    }

    let config = cli.bridge_config()?;
    let mut runtime = Runtime::new(&config)?.with_json_output(cli.json);

    if let Some(file) = &cli.file {
        let result = runtime.execute_file(file)?;
        print_result(&runtime, &result)?;
    } else if let Some(code) = &cli.eval {
        let result = runtime.execute_string(code)?;
        print_result(&runtime, &result)?;
    } else {
        runtime.repl()?;
    }
    Ok(())
}

fn print_result(runtime: &Runtime, result: &core_types::Value) -> CliResult<()> {
    if let Some(text) = runtime.format_result(result)? {
        println!("{}", text);
    }
    Ok(())
}

fn print_usage() {
    println!("jsbridge v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage:");
    println!("  jsbridge --file <FILE>     Execute a JavaScript file");
    println!("  jsbridge --eval <CODE>     Evaluate inline JavaScript code");
    println!("  jsbridge --repl            Start interactive REPL");
    println!();
    println!("Run 'jsbridge --help' for more options.");
}
