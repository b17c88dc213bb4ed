use std::env;
use std::fs::{create_dir_all, OpenOptions};
use std::io::{self, Write};

pub mod cc {
    pub const GREEN: &str = "\x1b[32m";
    pub const CYAN: &str = "\x1b[36m";
    pub const BOLD: &str = "\x1b[1m";
    pub const RESET: &str = "\x1b[0m";
    pub const ORANGE: &str = "\x1b[38;5;208m";
    pub const LIGHT_GRAY: &str = "\x1b[38;5;245m";
    pub const LIGHT_GREEN: &str = "\x1b[92m";
}

#[macro_export]
macro_rules! log {
    // log!("hello");
    ($fmt:literal $(,)?) => {{
        let time = chrono::Utc::now().format("%H:%M:%S%.3f").to_string();
        let mut _stderr = ::std::io::stderr().lock();
        let _ = ::std::io::Write::write_fmt(
            &mut _stderr,
            format_args!(
                concat!("{}{} | {}", "{}", $fmt, "{}", "\n"),
                $crate::libs::writing::cc::LIGHT_GRAY,
                time,
                $crate::libs::writing::cc::RESET,
                $crate::libs::writing::cc::LIGHT_GRAY,
                $crate::libs::writing::cc::RESET,
            ),
        );
    }};

    // log!("balance: {}", b);
    ($fmt:literal, $($arg:expr),+ $(,)?) => {{
        let time = chrono::Utc::now().format("%H:%M:%S%.3f").to_string();
        let mut _stderr = ::std::io::stderr().lock();
        let _ = ::std::io::Write::write_fmt(
            &mut _stderr,
            format_args!(
                concat!("{}{} | {}", "{}", $fmt, "{}", "\n"),
                $crate::libs::writing::cc::LIGHT_GRAY,
                time,
                $crate::libs::writing::cc::RESET,
                $crate::libs::writing::cc::LIGHT_GRAY,
                $($arg),+,
                $crate::libs::writing::cc::RESET,
            ),
        );
    }};

    // log!(cc::CYAN, "hello");
    ($color:expr, $fmt:literal $(,)?) => {{
        let time = chrono::Utc::now().format("%H:%M:%S%.3f").to_string();
        let mut _stderr = ::std::io::stderr().lock();
        let _ = ::std::io::Write::write_fmt(
            &mut _stderr,
            format_args!(
                concat!("{}{} | {}", "{}", $fmt, "{}", "\n"),
                $crate::libs::writing::cc::LIGHT_GRAY,
                time,
                $crate::libs::writing::cc::RESET,
                $color,
                $crate::libs::writing::cc::RESET,
            ),
        );
    }};

    // log!(cc::GREEN, "chain: {}", id);
    ($color:expr, $fmt:literal, $($arg:expr),+ $(,)?) => {{
        let time = chrono::Utc::now().format("%H:%M:%S%.3f").to_string();
        let mut _stderr = ::std::io::stderr().lock();
        let _ = ::std::io::Write::write_fmt(
            &mut _stderr,
            format_args!(
                concat!("{}{} | {}", "{}", $fmt, "{}", "\n"),
                $crate::libs::writing::cc::LIGHT_GRAY,
                time,
                $crate::libs::writing::cc::RESET,
                $color,
                $($arg),+,
                $crate::libs::writing::cc::RESET,
            ),
        );
    }};
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        let mut _stderr = ::std::io::stderr().lock();
        let _ = ::std::io::Write::write_fmt(
            &mut _stderr,
            format_args!(
                "{}{}{}",
                $crate::libs::writing::cc::ORANGE,
                format_args!($($arg)*),
                $crate::libs::writing::cc::RESET,
            ),
        );
        let _ = ::std::io::Write::write_fmt(&mut _stderr, format_args!("\n"));
    }};
}

/// Appends a timestamped line to `logs/celo_<date>.txt` when `DEBUG_LOGS=true`.
pub fn save_log_to_file(log: &str) {
    if !is_debug_logs_enabled() {
        return;
    }

    if let Err(e) = create_dir_all("logs") {
        eprintln!("save_log_to_file mkdir error: {e}");
        return;
    }
    let now = chrono::Utc::now().format("%H-%d-%m-%Y").to_string();
    let file_name = format!("logs/celo_{}.txt", now);
    let time_now = chrono::Utc::now().format("%H:%M:%S%.3f").to_string();
    let log_with_time = format!("[{}] {log}", time_now);

    if let Err(e) = append_line(&file_name, &log_with_time) {
        eprintln!("save_log_to_file error: {e}");
    }
}

fn is_debug_logs_enabled() -> bool {
    match env::var("DEBUG_LOGS") {
        Ok(val) => val.eq_ignore_ascii_case("true"),
        Err(_) => false,
    }
}

fn append_line(path: &str, line: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")?;
    Ok(())
}
