use gql::core::error::GqlError;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(gql::LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("gql={}", default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    init_tracing(gql::cli::peek(&args).verbose);

    match gql::run() {
        Ok(()) => {}
        Err(GqlError::Usage(message)) => {
            eprint!("{}", message);
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
