mod cli;

use anyhow::{Context, Result};
use gh_mcp_launcher::{LaunchError, Launcher, LauncherConfig, launcher::exit_code};
use log::error;

use cli::Action;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())
        })
        .init();

    let code = match Action::from_args(std::env::args_os()) {
        Action::Version => {
            println!("gh-github-mcp-server v{}", LauncherConfig::default().version);
            0
        }
        Action::Usage => {
            println!("{}", cli::USAGE);
            0
        }
        Action::Stdio(args) => run(args),
    };

    std::process::exit(code);
}

fn run(args: Vec<String>) -> i32 {
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("FATAL: Failed to create Tokio runtime: {e}");
            return 1;
        }
    };

    match rt.block_on(real_main(args)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e:#}");
            1
        }
    }
}

async fn real_main(args: Vec<String>) -> Result<i32> {
    let config = LauncherConfig::load().context("Error loading configuration")?;
    let launcher = Launcher::from_env(config);

    let status = launcher.run_stdio(&args).await.map_err(|e| {
        let step = match e {
            LaunchError::Credential(_) => "Error getting GitHub token",
            LaunchError::ChildProcess { .. } => "Error running MCP server",
            _ => "Error with server binary",
        };
        anyhow::Error::new(e).context(step)
    })?;

    let code = exit_code(status);
    if code != 0 {
        error!("MCP server exited with status {code}");
    }
    Ok(code)
}
