use core::fmt;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Once,
};

use env_logger::fmt::{Color, Style, StyledValue};
use log::Level;

use crate::config::CARGO_PKG_NAME;

static MAX_TARGET_WIDTH: AtomicUsize = AtomicUsize::new(0);

static SETUP_LOGS: Once = Once::new();

/// Initializes the global logger. Calling it more than once is fine; only
/// the first call takes effect. Honors RUST_LOG, defaulting to `info`.
pub fn setup_logger() {
    SETUP_LOGS.call_once(|| {
        build_logger().is_test(cfg!(test)).init();
    });
}

fn build_logger() -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();

    builder.format(|f, record| {
        use std::io::Write;
        let mut target = record.target();
        if let Some(stripped) = target.strip_prefix(CARGO_PKG_NAME) {
            target = stripped.strip_prefix("::").unwrap_or("pool");
        }

        let width = max_target_width(target);

        let mut style = f.style();
        let level = colored_level(&mut style, record.level());

        let mut style = f.style();
        let target = style.set_bold(true).value(Padded {
            value: target,
            width,
        });

        let time = f.timestamp_micros().to_string();
        let time = time.get(11..).unwrap_or(&time); // skip date

        writeln!(f, "{time} {level} {target} > {}", record.args())
    });

    if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(log::LevelFilter::Info);
    }

    builder.parse_env("RUST_LOG");

    builder
}

struct Padded<T> {
    value: T,
    width: usize,
}

impl<T: fmt::Display> fmt::Display for Padded<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{: <width$}", self.value, width = self.width)
    }
}

fn max_target_width(target: &str) -> usize {
    let max_width = MAX_TARGET_WIDTH.load(Ordering::Relaxed);
    if max_width < target.len() {
        MAX_TARGET_WIDTH.store(target.len(), Ordering::Relaxed);
        target.len()
    } else {
        max_width
    }
}

fn colored_level<'a>(style: &'a mut Style, level: Level) -> StyledValue<'a, &'static str> {
    match level {
        Level::Trace => style.set_color(Color::Magenta).value("TRACE"),
        Level::Debug => style.set_color(Color::Blue).value("DEBUG"),
        Level::Info => style.set_color(Color::Green).value("INFO "),
        Level::Warn => style.set_color(Color::Yellow).value("WARN "),
        Level::Error => style.set_color(Color::Red).value("ERROR"),
    }
}
