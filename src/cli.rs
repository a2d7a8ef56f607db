use std::ffi::OsString;

use clap::{ArgAction, Parser, Subcommand};

pub const USAGE: &str = "\
GitHub MCP Server CLI Extension

USAGE:
  gh github-mcp-server stdio [flags] - Start the MCP server in stdio mode

FLAGS:
  --read-only            Restrict the server to read-only operations
  --log-file string      Path to log file
  --gh-host string       Specify the GitHub hostname (for GitHub Enterprise)

This extension uses your GitHub CLI authentication
to securely communicate with GitHub APIs.";

#[derive(Parser, Debug)]
#[command(name = "gh-github-mcp-server")]
#[command(disable_version_flag = true, disable_help_subcommand = true)]
pub struct Args {
    /// Print the extension version
    #[arg(short = 'v', long = "version", action = ArgAction::SetTrue)]
    pub version: bool,

    #[command(subcommand)]
    pub sub: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Start the MCP server in stdio mode, forwarding all remaining arguments
    #[command(disable_help_flag = true)]
    Stdio {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

/// What the process should do for a given command line
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Version,
    Stdio(Vec<String>),
    Usage,
}

impl Action {
    /// Unparseable or empty command lines fall back to usage
    ///
    /// Only the first argument selects the action. A version flag ignores
    /// whatever follows it, and `stdio` forwards the raw tail of argv
    /// (including any `--`) rather than clap's parsed values.
    pub fn from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let argv: Vec<OsString> = args.into_iter().map(Into::into).collect();
        if matches!(
            argv.get(1).and_then(|a| a.to_str()),
            Some("-v" | "--version")
        ) {
            return Action::Version;
        }

        match Args::try_parse_from(argv.iter().take(2)) {
            Ok(Args { version: true, .. }) => Action::Version,
            Ok(Args {
                sub: Some(Cmd::Stdio { .. }),
                ..
            }) => Action::Stdio(
                argv.iter()
                    .skip(2)
                    .map(|a| a.to_string_lossy().into_owned())
                    .collect(),
            ),
            _ => Action::Usage,
        }
    }
}
