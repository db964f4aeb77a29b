//! gal - curate a GitHub-hosted photo gallery

use gallerist::ui::output;

fn main() {
    if let Err(err) = gallerist::cli::run() {
        output::error(format!("{:#}", err));
        std::process::exit(1);
    }
}
