//! The interactive shell: one assignment statement per line, compiled to
//! completion before the next prompt. Only the symbol table survives from
//! one line to the next.

use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::symbol_table::SymbolTable;
use crate::{codegen, diagnostics, parser, tokenizer};

const PROMPT: &str = ">> ";

pub fn run() -> anyhow::Result<()> {
    println!("aec interactive compiler (type 'exit' to quit)");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut symbols = SymbolTable::default();
    let mut line = String::new();
    loop {
        write!(stdout, "{PROMPT}")?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            // End of input counts as an exit request.
            break;
        }
        let statement = line.trim_end_matches(['\n', '\r']);
        if statement.eq_ignore_ascii_case("exit") {
            break;
        }

        process_statement(statement, &mut symbols);
        println!("symbols: {symbols}");
    }

    Ok(())
}

/// Run one line through the whole front-end. Lexical errors are reported but
/// do not stop the statement; parse errors discard it.
fn process_statement(statement: &str, symbols: &mut SymbolTable) {
    debug!(statement, "Processing statement");

    let scan = tokenizer::tokenize(statement);
    for error in &scan.errors {
        let diagnostic = diagnostics::diagnostic_from_lexical_error(statement, None, error);
        eprintln!("{}", diagnostic.render_terminal_auto());
    }

    match parser::parse(scan.tokens, symbols) {
        Ok(ast) => {
            println!("ast: {ast:?}");
            println!("intermediate code: {}", codegen::render(&ast));
        }
        Err(error) => {
            let diagnostic = diagnostics::diagnostic_from_parse_error(statement, None, &error);
            eprintln!("{}", diagnostic.render_terminal_auto());
        }
    }
}
