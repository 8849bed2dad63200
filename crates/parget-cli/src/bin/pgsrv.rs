use parget_cli::cli::ServerCli;
use parget_core::logging;

#[tokio::main]
async fn main() {
    logging::init_logging_stderr();

    if let Err(err) = ServerCli::run_from_args().await {
        eprintln!("pgsrv error: {:#}", err);
        std::process::exit(1);
    }
}
