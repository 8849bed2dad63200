use parget_cli::cli::ClientCli;
use parget_core::logging;

#[tokio::main]
async fn main() {
    // Log to the state dir so the progress line on stdout stays readable.
    if logging::init_logging("pgcl").is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = ClientCli::run_from_args().await {
        eprintln!("pgcl error: {:#}", err);
        std::process::exit(1);
    }
}
