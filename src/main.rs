mod cli;

use std::fs;
use std::path::Path;

use clap::Parser;
use log::info;

use cli::{Cli, Commands, CompileArgs, TokensArgs};
use cpc::lexer::lex;
use cpc::limits::CompilerLimits;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Compile(args) => compile_file(&args),
        Commands::Tokens(args) => print_tokens(&args),
    }
}

fn load_limits(config: Option<&str>) -> Result<CompilerLimits, Box<dyn std::error::Error>> {
    let limits = match config {
        Some(path) => CompilerLimits::from_project_toml(path)?,
        None => CompilerLimits::default(),
    };
    limits.validate()?;
    Ok(limits)
}

fn compile_file(args: &CompileArgs) -> Result<(), Box<dyn std::error::Error>> {
    let limits = load_limits(args.config.as_deref())?;
    let source = fs::read_to_string(&args.file)?;
    let compilation = cpc::compile(&source, &limits)?;

    let out_dir = Path::new(&args.out_dir);
    fs::create_dir_all(out_dir)?;
    fs::write(out_dir.join("symbol_table_lex.txt"), compilation.tokens_text())?;
    fs::write(out_dir.join("symbol_table_syn.txt"), compilation.trace_text())?;
    fs::write(out_dir.join("symbol_table_sem.txt"), compilation.scopes_text())?;
    fs::write(out_dir.join("error.txt"), compilation.errors_text())?;
    fs::write(out_dir.join("tac.txt"), compilation.tac_text())?;

    if compilation.has_errors() {
        eprintln!(
            "{}: {} error(s), see {}",
            args.file,
            compilation.errors.len(),
            out_dir.join("error.txt").display()
        );
    } else {
        info!("{}: TAC written to {}", args.file, out_dir.join("tac.txt").display());
    }

    Ok(())
}

fn print_tokens(args: &TokensArgs) -> Result<(), Box<dyn std::error::Error>> {
    let limits = load_limits(args.config.as_deref())?;
    let source = fs::read_to_string(&args.file)?;
    let lexed = lex(&source, &limits)?;
    print!("{}", lexed.log());
    for diagnostic in &lexed.diagnostics {
        eprintln!("{}", diagnostic);
    }
    Ok(())
}
