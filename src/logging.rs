use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use env_logger::{Builder, Env, Target};

const LOG_FILE: &str = "sweetshop.log";
const OLD_LOG_FILE: &str = "sweetshop.old.log";
const MAX_LOG_BYTES: u64 = 2 * 1024 * 1024;

/// Install the global logger. Lines go to `sweetshop.log` in `data_dir`
/// so command output stays clean; stderr is used if the file can't be
/// opened. `RUST_LOG` overrides the default `info` filter.
pub fn init(data_dir: &Path) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format(|buf, record| {
        let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
        writeln!(
            buf,
            "[{}] {:<5} {}: {}",
            timestamp,
            record.level(),
            record.target(),
            record.args()
        )
    });

    let _ = std::fs::create_dir_all(data_dir);
    let log_path = data_dir.join(LOG_FILE);

    // Rotate: past 2MB, rename to .old and start fresh
    if let Ok(meta) = std::fs::metadata(&log_path) {
        if meta.len() > MAX_LOG_BYTES {
            let _ = std::fs::rename(&log_path, data_dir.join(OLD_LOG_FILE));
        }
    }

    match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => {
            builder.target(Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            builder.target(Target::Stderr);
        }
    }

    if builder.try_init().is_ok() {
        log::info!(
            "=== sweetshop v{} started ({}/{}) ===",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            std::env::consts::ARCH
        );
    }
}
