#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

// 监视器镜像只面向 riscv64 裸机目标
#[cfg(all(target_arch = "riscv64", target_os = "none"))]
mod kernel {
    use core::arch::global_asm;
    use nt_secmon::config::STACK_SIZE;
    use nt_secmon::trap::vectors::{
        BoxServices, DebugServices, InterruptVirtualization, PageServices, Platform, SvcVectors,
    };
    use nt_secmon::trap::RiscvHardware;
    use nt_secmon::{info_print, warn_print};

    // 程序入口点 - 设置启动栈后跳转到rust_main
    global_asm!(
        "    .section .text.entry",
        "    .globl _start",
        "_start:",
        "    la sp, boot_stack_top",
        "    call rust_main",
        "    .section .bss.stack",
        "    .globl boot_stack_lower_bound",
        "boot_stack_lower_bound:",
        "    .space {stack_size}",
        "    .globl boot_stack_top",
        "boot_stack_top:",
        stack_size = const STACK_SIZE,
    );

    /// 本板卡的平台服务
    ///
    /// 中断虚拟化、盒子初始化和页分配器都不在监视器内核里；
    /// 未提供的服务被调用时监视器会以 NotImplemented 停机。
    struct KernelPlatform;

    impl InterruptVirtualization for KernelPlatform {}
    impl BoxServices for KernelPlatform {}
    impl DebugServices for KernelPlatform {}
    impl PageServices for KernelPlatform {}
    impl Platform for KernelPlatform {}

    static HARDWARE: RiscvHardware = RiscvHardware;
    static VECTORS: SvcVectors = SvcVectors::for_platform::<KernelPlatform>();

    /// 清除BSS段
    ///
    /// 启动栈位于 .bss.stack，在 sbss 之前，不会被清零
    unsafe fn clear_bss() {
        extern "C" {
            fn sbss();
            fn ebss();
        }

        let sbss_addr = sbss as usize;
        let ebss_addr = ebss as usize;

        // 逐字节清零BSS段
        for addr in sbss_addr..ebss_addr {
            core::ptr::write_volatile(addr as *mut u8, 0);
        }
    }

    /// Rust主函数 - 系统的真正入口点
    #[no_mangle]
    extern "C" fn rust_main() -> ! {
        unsafe { clear_bss() };

        info_print!("Boot stack: {} bytes", STACK_SIZE);
        nt_secmon::init(&HARDWARE, &VECTORS);

        #[cfg(feature = "selftest")]
        nt_secmon::test::run_all_tests();

        main_loop()
    }

    /// 主循环 - 之后的一切都由陷入驱动
    fn main_loop() -> ! {
        warn_print!("No boxes configured, idling");
        loop {
            #[allow(unused_unsafe)]
            unsafe {
                riscv::asm::wfi();
            }
        }
    }
}

/// 主机构建没有可启动的镜像
#[cfg(not(target_os = "none"))]
fn main() {
    eprintln!("nt_secmon is a bare-metal image; build it for riscv64gc-unknown-none-elf");
}
