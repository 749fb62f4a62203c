//! Enables the AVX-512 `Vec16` path when the compiler has stable AVX-512
//! intrinsics.

use std::process::Command;

/// First stable release with the `avx512f` intrinsics and target feature
const AVX512_STABLE_SINCE: (u32, u32) = (1, 89);
const AVX512_CFG: &str = "has_stable_avx512";

/// `(major, minor)` from the `release: X.Y.Z[-channel]` line of `rustc -vV`
fn rustc_release() -> Option<(u32, u32)> {
    let rustc = std::env::var_os("RUSTC").unwrap_or_else(|| "rustc".into());
    let output = Command::new(rustc).arg("-vV").output().ok()?;
    let text = String::from_utf8(output.stdout).ok()?;

    let release = text.lines().find_map(|line| line.strip_prefix("release: "))?;
    let mut numbers = release.split(['.', '-']).map(str::parse::<u32>);
    Some((numbers.next()?.ok()?, numbers.next()?.ok()?))
}

fn main() {
    println!("cargo::rustc-check-cfg=cfg({AVX512_CFG})");
    println!("cargo::rerun-if-env-changed=RUSTC");

    match rustc_release() {
        Some(release) if release >= AVX512_STABLE_SINCE => {
            println!("cargo::rustc-cfg={AVX512_CFG}");
        }
        Some((major, minor)) => {
            println!("cargo::warning=rustc {major}.{minor} lacks stable AVX-512; Vec16 uses the portable path");
        }
        None => {
            println!("cargo::warning=could not read the rustc version; AVX-512 path disabled");
        }
    }
}
