use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cpc")]
#[command(about = "Single-pass compiler emitting three-address code")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a source file and write the symbol tables, error log and TAC
    Compile(CompileArgs),
    /// Print the token stream of a source file
    Tokens(TokensArgs),
}

#[derive(clap::Args)]
pub struct CompileArgs {
    /// Input file path
    pub file: String,

    /// Directory receiving the output files
    #[arg(short, long, default_value = ".")]
    pub out_dir: String,

    /// project.toml with a [limits] table
    #[arg(short, long)]
    pub config: Option<String>,
}

#[derive(clap::Args)]
pub struct TokensArgs {
    /// Input file path
    pub file: String,

    /// project.toml with a [limits] table
    #[arg(short, long)]
    pub config: Option<String>,
}
