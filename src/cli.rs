use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("freelo-mcp")
        .about("Freelo MCP server (stdio JSON-RPC)")
        .disable_version_flag(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .num_args(1)
                .help("Override RUST_LOG level (e.g., info, debug)"),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .help("Print version and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-tools")
                .long("list-tools")
                .help("Print the names of all tools and exit")
                .action(ArgAction::SetTrue),
        )
}

/// Logs go to stderr; stdout carries the protocol. An explicit level wins
/// over RUST_LOG, which wins over the `info` default.
pub fn init_logging(level: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(lvl) = level {
        builder.parse_filters(lvl);
    }
    builder.target(env_logger::Target::Stderr);
    // a second init (tests) is harmless
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let m = build_cli()
            .try_get_matches_from(["freelo-mcp", "--log-level", "debug", "--list-tools"])
            .unwrap();
        assert_eq!(m.get_one::<String>("log-level").map(String::as_str), Some("debug"));
        assert!(m.get_flag("list-tools"));
        assert!(!m.get_flag("version"));
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(build_cli()
            .try_get_matches_from(["freelo-mcp", "--bogus"])
            .is_err());
    }
}
