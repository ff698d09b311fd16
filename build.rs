fn main() {
    let target = std::env::var("TARGET").unwrap_or_default();
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_default();

    // 仅裸机 riscv64 目标使用链接脚本; 主机上的 `cargo test` 不能链接它
    if !target.starts_with("riscv64") || !target.contains("-none") {
        return;
    }

    let linker_script = format!("{}/linker/riscv64.ld", manifest_dir);
    println!("cargo:rustc-link-arg-bins=-T{}", linker_script);
    println!("cargo:rerun-if-changed={}", linker_script);
    println!("cargo:rerun-if-changed=build.rs");
}
