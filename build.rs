//! Build script: embeds the git short hash in the `--version` string.

use std::process::Command;

fn main() {
    let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();

    let hash = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|hash| !hash.is_empty());

    match hash {
        Some(hash) => {
            println!("cargo:rustc-env=GIT_HASH={}", hash);
            println!("cargo:rustc-env=TRSU_VERSION={}+{}", version, hash);
        }
        None => println!("cargo:rustc-env=TRSU_VERSION={}", version),
    }
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");
}
