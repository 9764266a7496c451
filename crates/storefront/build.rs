//! Build script for the storefront crate.
//!
//! Hashes `static/css/site.css` so the layout can link a content-addressed
//! copy (`site.{hash}.css`) that browsers may cache forever.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let css_dir = Path::new(&manifest_dir).join("static/css");
    let css_path = css_dir.join("site.css");

    println!("cargo:rerun-if-changed={}", css_path.display());

    let Ok(content) = fs::read(&css_path) else {
        println!("cargo:warning=Could not read {}", css_path.display());
        println!("cargo:rustc-env=CSS_HASH=");
        return;
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let short_hash = digest.get(..8).unwrap_or(&digest);
    println!("cargo:rustc-env=CSS_HASH={short_hash}");

    let derived_dir = css_dir.join("derived");
    fs::create_dir_all(&derived_dir).expect("Failed to create derived CSS directory");
    fs::copy(&css_path, derived_dir.join(format!("site.{short_hash}.css")))
        .expect("Failed to copy CSS to derived directory");
}
