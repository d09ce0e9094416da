//! CLI argument definitions using clap
//!
//! `--creds-file`, `--type` and `--operation` are required, but they are
//! declared optional here: [`dynutil_core::Invocation`] checks them so the
//! diagnostic names the missing flag and the exit code stays 1.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use dynutil_core::{Operation, Options, QueryType};

/// List and edit zones, records, HTTP redirects and traffic director services
#[derive(Parser, Debug)]
#[command(name = "dynutil")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Zone to run query against
    #[arg(short, long)]
    pub zone: Option<String>,

    /// Node to change, relative to the zone ('' for the root node)
    #[arg(short, long)]
    pub node: Option<String>,

    /// New value: address (a), cname (cname) or exchange (mx)
    #[arg(short, long)]
    pub value: Option<String>,

    /// Operation to perform [required]
    #[arg(short, long, value_enum)]
    pub operation: Option<OperationArg>,

    /// API credentials yaml file: contains customer_name, user_name and password [required]
    #[arg(short, long, value_name = "FILE")]
    pub creds_file: Option<PathBuf>,

    /// Type of items to operate on [required]
    #[arg(short = 't', long = "type", value_enum)]
    pub query_type: Option<TypeArg>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub debug: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationArg {
    List,
    Update,
    Create,
    Delete,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeArg {
    Zone,
    Mx,
    Cname,
    A,
    Redirect,
    Dsf,
}

impl From<OperationArg> for Operation {
    fn from(arg: OperationArg) -> Self {
        match arg {
            OperationArg::List => Operation::List,
            OperationArg::Update => Operation::Update,
            OperationArg::Create => Operation::Create,
            OperationArg::Delete => Operation::Delete,
        }
    }
}

impl From<TypeArg> for QueryType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Zone => QueryType::Zone,
            TypeArg::Mx => QueryType::Mx,
            TypeArg::Cname => QueryType::Cname,
            TypeArg::A => QueryType::A,
            TypeArg::Redirect => QueryType::Redirect,
            TypeArg::Dsf => QueryType::Dsf,
        }
    }
}

impl Cli {
    /// Raw options for validation
    pub fn options(&self) -> Options {
        Options {
            zone: self.zone.clone(),
            node: self.node.clone(),
            value: self.value.clone(),
            operation: self.operation.map(Operation::from),
            creds_file: self.creds_file.clone(),
            query_type: self.query_type.map(QueryType::from),
        }
    }
}

/// One-line message for a clap parse failure, without clap's own prefix
pub fn clap_message(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from([
            "dynutil", "-o", "update", "-t", "a", "-z", "example.com", "-n", "www", "-v",
            "203.0.113.5", "-c", "creds.yaml",
        ])
        .unwrap();

        let options = cli.options();
        assert_eq!(options.operation, Some(Operation::Update));
        assert_eq!(options.query_type, Some(QueryType::A));
        assert_eq!(options.zone.as_deref(), Some("example.com"));
        assert_eq!(options.node.as_deref(), Some("www"));
        assert_eq!(options.value.as_deref(), Some("203.0.113.5"));
        assert_eq!(options.creds_file, Some(PathBuf::from("creds.yaml")));
    }

    #[test]
    fn test_long_flags_and_empty_node() {
        let cli = Cli::try_parse_from([
            "dynutil",
            "--operation",
            "create",
            "--type",
            "mx",
            "--zone",
            "example.com",
            "--node",
            "",
            "--value",
            "mail.example.com",
            "--creds-file",
            "creds.yaml",
        ])
        .unwrap();

        assert_eq!(cli.node.as_deref(), Some(""));
        assert_eq!(cli.query_type, Some(TypeArg::Mx));
    }

    #[test]
    fn test_required_flags_left_to_validation() {
        let cli = Cli::try_parse_from(["dynutil"]).unwrap();
        let options = cli.options();
        assert!(options.creds_file.is_none());
        assert!(options.operation.is_none());
        assert!(options.query_type.is_none());
    }

    #[test]
    fn test_invalid_type_message() {
        let err = Cli::try_parse_from(["dynutil", "-t", "aaaa"]).unwrap_err();
        let msg = clap_message(&err);
        assert!(msg.contains("aaaa"), "got {}", msg);
        assert!(!msg.starts_with("error:"));
    }
}
