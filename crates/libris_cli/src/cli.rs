use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "libris", about = "Library archive manager", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Absolute directory holding the archive file
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Archive file name inside the data directory
    #[arg(long, global = true)]
    pub file_name: Option<String>,

    /// Absolute directory for rolling log files; logging is off without it
    #[arg(long, global = true)]
    pub log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load the archive, creating an empty one on first run
    Init,
    /// Print books, users and active loans
    Show,
    /// Add a book to the catalog
    AddBook(AddBookArgs),
    /// Register a user
    AddUser(AddUserArgs),
    /// Lend a book to a user
    Lend(LendArgs),
    /// Mark a loan as returned
    Return(ReturnArgs),
    /// Print the core version
    Version,
}

#[derive(Args)]
pub struct AddBookArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub isbn: String,
    /// May be given more than once
    #[arg(long = "author")]
    pub authors: Vec<String>,
    #[arg(long)]
    pub year: Option<i32>,
    #[arg(long, default_value_t = 1)]
    pub copies: u32,
}

#[derive(Args)]
pub struct AddUserArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Args)]
pub struct LendArgs {
    #[arg(long)]
    pub book: String,
    #[arg(long)]
    pub user: String,
    /// Loan length in days
    #[arg(long, default_value_t = 30)]
    pub days: u32,
}

#[derive(Args)]
pub struct ReturnArgs {
    #[arg(long)]
    pub loan: String,
}
