//! Build script for hitscout.
//!
//! Places the `.env.example` template next to the `.env` file that
//! `config::load_env` reads, so a fresh install shows which credentials the
//! `fetch` and `lastfm` commands need:
//! - Linux: `~/.local/share/hitscout/.env.example`
//! - macOS: `~/Library/Application Support/hitscout/.env.example`
//! - Windows: `%LOCALAPPDATA%/hitscout/.env.example`
//!
//! A missing template only produces a cargo warning. An existing copy is
//! refreshed whenever the template changes.

use std::{env, fs, path::PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let template = manifest_dir.join(".env.example");

    if !template.is_file() {
        println!(
            "cargo:warning=.env.example not found at {}",
            template.display()
        );
        return Ok(());
    }

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("hitscout");

    // read-only home directories (CI, sandboxes) must not break the build
    if let Err(e) = fs::create_dir_all(&out_dir) {
        println!("cargo:warning=cannot create {}: {}", out_dir.display(), e);
        return Ok(());
    }

    let contents = fs::read_to_string(&template)?;
    let target = out_dir.join(".env.example");
    if fs::read_to_string(&target).ok().as_deref() != Some(contents.as_str()) {
        if let Err(e) = fs::write(&target, contents) {
            println!("cargo:warning=cannot write {}: {}", target.display(), e);
        }
    }

    Ok(())
}
