use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "docket", about = "docket: a small JSON document store", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding one file per collection
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create documents from a JSON file (object or array of objects)
    Create(CreateArgs),
    /// Read documents where KEY == VALUE
    Read(ReadArgs),
    /// Set a field on documents where KEY == VALUE
    Update(UpdateArgs),
    /// Delete documents where KEY == VALUE
    Delete(DeleteArgs),
    /// List collections
    List,
    /// Create an empty collection
    CreateCollection(CreateCollectionArgs),
    /// Delete a collection (admin only)
    DeleteCollection(DeleteCollectionArgs),
    /// Create the first admin user
    Bootstrap(BootstrapArgs),
    /// Create a user (admin only)
    CreateUser(CreateUserArgs),
    /// Check admin credentials
    Login(AdminArgs),
    /// Start the HTTP server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct CreateArgs {
    #[arg(short, long)]
    pub collection: String,
    #[arg(short, long)]
    pub file: PathBuf,
}

#[derive(Args)]
pub struct Predicate {
    #[arg(short, long)]
    pub collection: String,
    #[arg(short, long)]
    pub key: String,
    #[arg(short, long)]
    pub value: String,
}

#[derive(Args)]
pub struct ReadArgs {
    #[command(flatten)]
    pub predicate: Predicate,
    /// Return every match instead of the first
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub predicate: Predicate,
    #[arg(long)]
    pub update_key: String,
    #[arg(long)]
    pub update_value: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub predicate: Predicate,
}

#[derive(Args)]
pub struct AdminArgs {
    #[arg(short, long)]
    pub username: String,
    #[arg(short, long)]
    pub password: String,
}

#[derive(Args)]
pub struct CreateCollectionArgs {
    pub name: String,
}

#[derive(Args)]
pub struct DeleteCollectionArgs {
    pub name: String,
    #[command(flatten)]
    pub admin: AdminArgs,
}

#[derive(Args)]
pub struct BootstrapArgs {
    #[arg(short, long)]
    pub username: String,
    #[arg(short, long)]
    pub password: String,
    #[arg(long)]
    pub confirm: String,
}

#[derive(Args)]
pub struct CreateUserArgs {
    #[command(flatten)]
    pub admin: AdminArgs,
    #[arg(long)]
    pub new_username: String,
    #[arg(long)]
    pub new_password: String,
    #[arg(long)]
    pub confirm: String,
    /// `user` or `admin`
    #[arg(long, default_value = "user")]
    pub role: String,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Overrides the configured bind address
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}
