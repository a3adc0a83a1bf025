// Copyright © 2024 FormDecor. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build script that refuses to compile on toolchains older than the
//! declared `rust-version`.

/// Minimum compiler release the crate is written against.
const MIN_RUST_VERSION: &str = "1.74.0";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    match version_check::is_min_version(MIN_RUST_VERSION) {
        Some(true) => {}
        Some(false) => {
            eprintln!(
                "formdecor requires rustc {} or newer",
                MIN_RUST_VERSION
            );
            std::process::exit(1);
        }
        // Unknown compiler version, let cargo's own check decide.
        None => {}
    }
}
