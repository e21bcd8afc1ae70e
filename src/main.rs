mod codegen;
mod diagnostics;
mod parser;
mod repl;
mod symbol_table;
mod tokenizer;

use std::env;
use std::path::Path;
use std::str::FromStr;

use clap::Parser;
use serde::Serialize;
use tracing::{debug, info, trace};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::symbol_table::SymbolTable;
use crate::tokenizer::TokenList;

fn main() -> anyhow::Result<()> {
    initialize_logging();

    let aec = Aec::parse();

    match aec.subcmd {
        AecSubcommand::Repl => repl::run()?,
        AecSubcommand::Build(build) => {
            let current_dir = std::env::current_dir()?;
            compile(&current_dir, build)?;
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct CompiledStatement {
    line: usize,
    ast: parser::Statement,
    code: String,
}

fn compile(current_dir: &Path, build: Build) -> anyhow::Result<()> {
    let target_dir = current_dir.join("target").join("aec");
    std::fs::create_dir_all(&target_dir)?;

    let source_path = Path::new(&build.source);
    let source = std::fs::read_to_string(source_path)?;
    trace!(source_len = source.len(), "Read input file");

    let mut symbols = SymbolTable::default();
    let mut token_lists: Vec<TokenList> = vec![];
    let mut statements: Vec<CompiledStatement> = vec![];

    for (i, raw_line) in source.lines().enumerate() {
        let line_no = i + 1;
        let statement = raw_line.trim_end();
        if statement.trim().is_empty() {
            continue;
        }

        let scan = tokenizer::tokenize(statement);
        if !scan.errors.is_empty() {
            let mut bundle = diagnostics::CompilerDiagnosticBundle::default();
            for error in &scan.errors {
                bundle.push(diagnostics::diagnostic_from_lexical_error(
                    statement,
                    Some(source_path),
                    error,
                ));
            }
            // Not fatal on its own, but the gaps usually make the parse fail.
            eprintln!("{}", bundle.render_terminal_auto());
        }
        token_lists.push(scan.tokens.clone());

        match parser::parse(scan.tokens, &mut symbols) {
            Ok(ast) => {
                let code = codegen::render(&ast);
                statements.push(CompiledStatement {
                    line: line_no,
                    ast,
                    code,
                });
            }
            Err(error) => {
                let diagnostic =
                    diagnostics::diagnostic_from_parse_error(statement, Some(source_path), &error)
                        .with_note(format!("at line {line_no} of {}", source_path.display()));
                eprintln!("{}", diagnostic.render_terminal_auto());
                anyhow::bail!("build failed at line {line_no}");
            }
        }
    }

    let tokens_path = target_dir.join("tokens.json");
    std::fs::write(&tokens_path, serde_json::to_string_pretty(&token_lists)?)?;
    trace!(tokens_path = %tokens_path.display(), "Tokenized source file");

    let ast_path = target_dir.join("ast.json");
    std::fs::write(&ast_path, serde_json::to_string_pretty(&statements)?)?;
    debug!(ast_path = %ast_path.display(), "Parsed source file");

    let ir_path = target_dir.join("ir.txt");
    let mut ir_text = String::new();
    for statement in &statements {
        ir_text.push_str(&statement.code);
        ir_text.push('\n');
    }
    std::fs::write(&ir_path, ir_text)?;
    info!(ir_path = %ir_path.display(), "Intermediate code generated");

    let symbols_path = target_dir.join("symbols.json");
    std::fs::write(
        &symbols_path,
        serde_json::to_string_pretty(&symbols.snapshot())?,
    )?;
    info!(symbols_path = %symbols_path.display(), "Final symbol table written");

    Ok(())
}

fn initialize_logging() {
    let env_filter = env::var("RUST_LOG").unwrap_or_default();

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(EnvFilter::from_str(&env_filter).unwrap()))
        .init();
}

#[derive(clap::Parser)]
struct Aec {
    #[clap(subcommand)]
    subcmd: AecSubcommand,
}

#[derive(clap::Subcommand)]
enum AecSubcommand {
    /// Compile statements interactively, one per prompt.
    Repl,
    /// Compile a file of statements and write the artifacts to target/aec.
    Build(Build),
}

#[derive(clap::Parser)]
struct Build {
    source: String,
}
