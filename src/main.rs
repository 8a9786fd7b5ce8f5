use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use porthole::config::Config;
use porthole::dispatch::{Dispatcher, FsAssets, RouteTable, StaticCredentials};
use porthole::server::{Server, ServerOptions};
use tokio::io::{AsyncBufReadExt, BufReader};

/// How often queued console lines are printed.
const DRAIN_INTERVAL: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;
    cfg.apply_args(std::env::args().skip(1));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(cfg.log_level())
        .with_target(false)
        .with_level(true)
        .init();

    println!("[INFO] Server host name: {}", cfg.server.name);
    println!("[INFO] Server address: {}", cfg.server.listen_addr);

    let dispatcher = Dispatcher::new(
        RouteTable::from_config(&cfg.routes),
        Arc::new(FsAssets::new(&cfg.assets.root)),
        Arc::new(StaticCredentials::new(
            &cfg.credentials.login,
            &cfg.credentials.pass,
        )),
    );

    let server = match Server::bind(ServerOptions::from_config(&cfg), dispatcher).await {
        Ok(server) => server,
        Err(e) => {
            println!("[ERR] Server Init failed: {e:#}");
            return Err(e);
        }
    };

    let runner = tokio::spawn({
        let server = Arc::clone(&server);
        async move { server.run().await }
    });

    let outcome = control_loop(&server).await;

    server.stop();
    match runner.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => println!("[ERR] {e:#}"),
        Err(e) => println!("[ERR] accept loop ended abnormally: {e}"),
    }
    server.shutdown().await;
    print_output(&server)?;

    outcome
}

/// Prints queued output and reads commands until `exit` or Ctrl-C.
async fn control_loop(server: &Server) -> anyhow::Result<()> {
    let mut commands = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut drain = tokio::time::interval(DRAIN_INTERVAL);

    loop {
        tokio::select! {
            _ = drain.tick() => print_output(server)?,
            line = commands.next_line(), if stdin_open => {
                match line.context("failed to read a command")? {
                    Some(command) if command.trim() == "exit" => return Ok(()),
                    Some(_) => println!("[INFO] Please enter \"exit\" to close the server."),
                    None => stdin_open = false,
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl-C")?;
                tracing::info!("Shutdown signal received");
                return Ok(());
            }
        }
    }
}

fn print_output(server: &Server) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    server.output_message(&mut out)?;
    out.flush()?;
    Ok(())
}
