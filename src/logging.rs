// Logging setup for the terminal front end
//
// The library only talks to the `log` facade; the binary installs
// env_logger on stderr so stdout stays clean for results.

use env_logger::Env;

const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "warn,social_downloader_lib=debug";

/// Install the logger once. `RUST_LOG` overrides the built-in filters.
pub fn init(verbose: bool) {
    let default = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };

    let result = env_logger::Builder::from_env(Env::default().default_filter_or(default))
        .format_timestamp_millis()
        .try_init();

    if result.is_err() {
        log::debug!("[Logging] Logger already initialised");
    }
}
