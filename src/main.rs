use freelo_mcp::{cli, server, tools};

#[tokio::main(flavor = "current_thread")] // one request at a time over stdio
async fn main() -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches();
    let log_level = matches.get_one::<String>("log-level").cloned();

    cli::init_logging(log_level.as_deref());

    if matches.get_flag("version") {
        println!("freelo-mcp {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if matches.get_flag("list-tools") {
        for t in tools::registry() {
            println!("{}", t.name);
        }
        return Ok(());
    }

    server::run_stdio_server().await
}
