use anyhow::{Context, Result};

fn main() -> Result<()> {
    println!("cargo:rerun-if-env-changed=CARGO_PKG_VERSION");
    let version = std::env::var("CARGO_PKG_VERSION").context("missing CARGO_PKG_VERSION")?;

    let rustc = rustc_version::version_meta()?;
    let rustc_version = match rustc.commit_hash.as_deref() {
        Some(hash) => format!("{} {}", rustc.semver, &hash[..hash.len().min(9)]),
        None => rustc.semver.to_string(),
    };

    println!("cargo:rustc-env=GATEKIT_VERSION={version}");
    println!("cargo:rustc-env=GATEKIT_RUSTC_VERSION={rustc_version}");
    Ok(())
}
