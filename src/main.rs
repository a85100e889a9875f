use ambient_dice::app;
use ambient_dice::cli::{self, CliArgs};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = match CliArgs::parse_from_env() {
        Ok(Some(args)) => args,
        Ok(None) => {
            eprintln!("{}", cli::usage());
            return;
        }
        Err(err) => {
            eprintln!("[ambient_dice] {err}");
            std::process::exit(2);
        }
    };
    if let Err(err) = app::run(&args) {
        eprintln!("[ambient_dice] error: {err:?}");
        std::process::exit(1);
    }
}
