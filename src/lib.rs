// nt_secmon/src/lib.rs

#![cfg_attr(not(test), no_std)]

// 声明监视器模块
pub mod config;
pub mod console;
pub mod trap;
pub mod util;
pub mod vmpu;

#[cfg(feature = "selftest")]
pub mod test;

use trap::vectors::SvcVectors;
use trap::HardwareController;

/// Panic处理器 - 监视器内的panic一律按故障停机处理
#[cfg(all(target_os = "none", not(test)))]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    // 先关中断，防止嵌套的陷入
    trap::infrastructure::low_level::disable_interrupts();

    error_print!("MONITOR PANIC!");
    if let Some(location) = info.location() {
        error_print!("  Location: {}:{}", location.file(), location.line());
    }
    error_print!("  Message: {}", info.message());

    trap::halt(trap::HaltReason::Panic)
}

/// 监视器初始化
///
/// 检查分发表、安装故障处理函数并设置陷入向量。分发表自检失败时停机，
/// 不会返回。
pub fn init(hw: &'static dyn HardwareController, vectors: &'static SvcVectors) {
    info_print!("nt_secmon initializing...");
    trap::init(hw, vectors);
    info_print!(
        "Registry capacity: {} functions",
        config::MAX_PRIVATE_FUNCTIONS
    );
    info_print!("Monitor core initialization completed.");
}
