//! Build script for the site crate.
//!
//! Fingerprints the stylesheet into `static/css/derived/main.<hash>.css`,
//! the path `base.html` links through the `css_hash` filter, and removes
//! copies left behind by earlier builds.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Hex digits kept from the SHA-256 of the stylesheet.
const HASH_LEN: usize = 8;

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let css_dir = Path::new(&manifest_dir).join("static/css");

    let hash = fingerprint(&css_dir, "main").unwrap_or_default();
    println!("cargo:rustc-env=CSS_HASH={hash}");
}

/// Copy `<dir>/<stem>.css` to `<dir>/derived/<stem>.<hash>.css`.
///
/// Returns `None` (with a cargo warning) when the source is missing, so the
/// build still succeeds and the link degrades to `<stem>..css`.
fn fingerprint(dir: &Path, stem: &str) -> Option<String> {
    let source = dir.join(format!("{stem}.css"));
    println!("cargo:rerun-if-changed={}", source.display());

    let content = match fs::read(&source) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {}: {e}", source.display());
            return None;
        }
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let hash = digest.get(..HASH_LEN).unwrap_or(&digest).to_string();

    let derived = dir.join("derived");
    fs::create_dir_all(&derived).expect("Failed to create derived CSS directory");
    prune_stale(&derived, stem, &hash);

    let target: PathBuf = derived.join(format!("{stem}.{hash}.css"));
    fs::copy(&source, &target).expect("Failed to copy CSS to derived directory");
    Some(hash)
}

/// Delete `<stem>.*.css` copies whose hash is no longer current.
fn prune_stale(derived: &Path, stem: &str, current: &str) {
    let Ok(entries) = fs::read_dir(derived) else {
        return;
    };
    let prefix = format!("{stem}.");
    let keep = format!("{stem}.{current}.css");
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with(&prefix)
            && name.ends_with(".css")
            && name != keep
            && let Err(e) = fs::remove_file(entry.path())
        {
            println!("cargo:warning=Could not remove stale {name}: {e}");
        }
    }
}
