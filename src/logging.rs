//! Logging setup, mirroring the teacher's `main.rs`: `RUST_LOG` drives the
//! default filter, with `-v` bumping the default level to `debug`.

use log::LevelFilter;

pub fn init_logs(verbose: bool) {
    let default_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::from_default_env().filter_level(default_level).init();
}
