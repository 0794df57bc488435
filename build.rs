use std::env;
use std::process::Command;

// First stable release that ships the AVX-512 intrinsics and target features
const AVX512_STABLE_MINOR: u32 = 89;

// What the compiler in use can offer to the kernels
#[derive(PartialEq, Eq, Debug)]
struct Toolchain {
    channel: &'static str,
    minor: u32,
}

impl Toolchain {
    fn detect() -> Self {
        let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());

        let version_info = Command::new(rustc)
            .args(["--version", "--verbose"])
            .output()
            .map(|output| String::from_utf8_lossy(&output.stdout).into_owned())
            .unwrap_or_default();

        Self::parse(&version_info)
    }

    // `rustc 1.89.0 (29483883e 2025-08-04)` or `rustc 1.90.0-nightly (...)`
    fn parse(version_info: &str) -> Self {
        let channel = if version_info.contains("nightly") {
            "nightly"
        } else {
            "stable"
        };

        let minor = version_info
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|version| version.split('.').nth(1))
            .and_then(|minor| minor.parse().ok())
            .unwrap_or(0);

        Toolchain { channel, minor }
    }

    fn avx512_stable(&self) -> bool {
        self.minor >= AVX512_STABLE_MINOR
    }

    // Nightly toolchains older than the stabilization can still build the
    // kernel through the feature gates enabled in lib.rs
    fn avx512_kernel(&self) -> bool {
        self.avx512_stable() || self.channel == "nightly"
    }

    fn apply(&self) {
        println!("cargo:rustc-cfg=rustc_channel=\"{}\"", self.channel);

        if self.avx512_stable() {
            println!("cargo:rustc-cfg=avx512_stable");
        }

        if self.avx512_kernel() {
            println!("cargo:rustc-cfg=avx512_kernel");
        }

        println!("cargo::rustc-check-cfg=cfg(rustc_channel, values(\"nightly\", \"stable\"))");
        println!("cargo::rustc-check-cfg=cfg(avx512_stable)");
        println!("cargo::rustc-check-cfg=cfg(avx512_kernel)");
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=RUSTC");

    // CPU features are detected at runtime by the backend dispatcher, the
    // build only decides which kernels the compiler is able to emit
    Toolchain::detect().apply();
}
