//! REPL (Read-Eval-Print Loop) implementation

use crate::error::{CliError, CliResult};
use crate::runtime::Runtime;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Run the interactive REPL
///
/// # Arguments
/// * `runtime` - The Runtime instance to use for execution
///
/// # Returns
/// `Ok(())` when REPL exits normally
pub fn run_repl(runtime: &mut Runtime) -> CliResult<()> {
    let mut editor = DefaultEditor::new()
        .map_err(|e| CliError::Repl(format!("Failed to initialize editor: {}", e)))?;

    println!("jsbridge v{}", env!("CARGO_PKG_VERSION"));
    println!("Type JavaScript code, .help for commands, or .exit to quit.");
    println!();

    let mut line_buffer = String::new();
    let mut in_multiline = false;

    loop {
        let prompt = if in_multiline { "... " } else { "> " };

        match editor.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if !in_multiline && is_exit_command(trimmed) {
                    break;
                }

                if !in_multiline && trimmed.starts_with('.') {
                    handle_repl_command(trimmed, runtime);
                    continue;
                }

                if in_multiline {
                    line_buffer.push('\n');
                }
                line_buffer.push_str(&line);

                if !is_input_complete(&line_buffer) {
                    in_multiline = true;
                    continue;
                }
                in_multiline = false;
                let _ = editor.add_history_entry(&line_buffer);

                match runtime
                    .execute_string(&line_buffer)
                    .and_then(|value| runtime.format_result(&value))
                {
                    Ok(Some(text)) => println!("{}", text),
                    Ok(None) => {}
                    Err(e) => eprintln!("Error: {}", e),
                }
                line_buffer.clear();
            }
            Err(ReadlineError::Interrupted) => {
                if in_multiline {
                    println!("^C");
                    line_buffer.clear();
                    in_multiline = false;
                } else {
                    println!("Press Ctrl-D or type .exit to quit");
                }
            }
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(err) => {
                return Err(CliError::Repl(format!("Readline error: {}", err)));
            }
        }
    }

    Ok(())
}

fn is_exit_command(input: &str) -> bool {
    matches!(input, ".exit" | "exit" | "quit")
}

/// Handle special REPL commands
fn handle_repl_command(command: &str, runtime: &Runtime) {
    match command {
        ".help" => {
            println!("REPL Commands:");
            println!("  .help     - Show this help message");
            println!("  .globals  - List globals defined by the runtime");
            println!("  .require  - Show whether require() is available");
            println!("  .exit     - Exit the REPL");
        }
        ".globals" => {
            for name in runtime.global_names() {
                println!("  {}", name);
            }
        }
        ".require" => {
            println!(
                "require: {}",
                if runtime.has_require() {
                    "enabled"
                } else {
                    "disabled"
                }
            );
        }
        _ => {
            println!("Unknown command: {}", command);
            println!("Type .help for available commands");
        }
    }
}

/// Check if the input appears to be complete
///
/// This is a simple heuristic that checks for balanced braces/brackets/parens
fn is_input_complete(input: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut string_char = ' ';
    let mut escape_next = false;

    for c in input.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }

        if c == '\\' && in_string {
            escape_next = true;
            continue;
        }

        if !in_string {
            match c {
                '"' | '\'' | '`' => {
                    in_string = true;
                    string_char = c;
                }
                '{' | '[' | '(' => depth += 1,
                '}' | ']' | ')' => depth -= 1,
                _ => {}
            }
        } else if c == string_char {
            in_string = false;
        }
    }

    depth <= 0 && !in_string
}
