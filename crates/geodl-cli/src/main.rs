mod cli;

fn main() {
    // Parse, init logging, dispatch.
    if let Err(err) = cli::run() {
        eprintln!("geodl error: {:#}", err);
        std::process::exit(1);
    }
}
