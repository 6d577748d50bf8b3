//! Logger
//!
//! Lifecycle, error and access logging. Access lines use the Common Log
//! Format so they feed straight into standard log tooling. Output targets
//! (stdout/stderr or files) come from `Options` at startup.

pub mod writer;

use chrono::Local;
use std::net::SocketAddr;

use crate::config::Options;

/// Initialize logging from startup options. Call once before `start`.
pub fn init(options: &Options) -> std::io::Result<()> {
    writer::init(
        options.access_log_file.as_deref(),
        options.error_log_file.as_deref(),
    )
}

fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, options: &Options) {
    write_info(&format!("Server running on http://{addr}"));
    write_info(&format!("Static root: {}", options.static_root));
    if let Some(ref path) = options.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = options.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
}

pub fn log_server_stop(addr: &SocketAddr) {
    write_info(&format!("Server on http://{addr} stopped"));
}

/// Common Log Format access line:
/// `client - - [time] "METHOD path HTTP/v" status bytes`
pub fn log_access(
    client: &SocketAddr,
    method: &hyper::Method,
    path: &str,
    version: hyper::Version,
    status: u16,
    body_bytes: usize,
) {
    let version = match version {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    };
    write_info(&format!(
        "{} - - [{}] \"{} {} HTTP/{}\" {} {}",
        client.ip(),
        Local::now().format("%d/%b/%Y:%H:%M:%S %z"),
        method,
        path,
        version,
        status,
        body_bytes,
    ));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}
