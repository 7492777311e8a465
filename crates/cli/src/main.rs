use std::process::ExitCode;

fn main() -> ExitCode {
    // .env.local wins because dotenvy never overwrites a variable already set
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    pricecast_cli::run()
}
