//! Build script for Larder
//!
//! Bumps a local build counter and embeds it, plus a compile timestamp, into the binary.

use std::fs;
use std::path::Path;

const COUNTER_FILE: &str = "build_number.txt";

fn main() {
    println!("cargo:rerun-if-changed=src");

    let counter = Path::new(COUNTER_FILE);
    let previous: u64 = fs::read_to_string(counter)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);
    let build = previous + 1;

    fs::write(counter, build.to_string()).expect("Failed to write build counter");

    let compiled_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    println!("cargo:rustc-env=LARDER_BUILD_NUMBER={}", build);
    println!("cargo:rustc-env=LARDER_BUILD_TIMESTAMP={}", compiled_at);
    println!("cargo:warning=Larder build #{} at {}", build, compiled_at);
}
