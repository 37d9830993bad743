use household_budget::{cli::run_cli, init};

fn main() {
    init();

    if let Err(err) = run_cli() {
        tracing::error!(%err, "shell exited with an error");
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
