use tesorera::cli;

fn main() {
    tracing_subscriber::fmt::init();
    if let Err(e) = cli::run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
