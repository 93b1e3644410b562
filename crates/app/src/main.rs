use std::process;

mod logging;
mod plan;
mod run;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let parsed = match run::parse_args(&args) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("argument error: {err}");
            process::exit(2);
        }
    };
    logging::setup_tracing(parsed.level);
    tracing::info!("sweep starting");

    if let Err(err) = run::run(&parsed) {
        eprintln!("sweep error: {err}");
        process::exit(1);
    }
}
