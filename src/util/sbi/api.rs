// SBI API 封装
// 监控器只需要控制台输出和系统复位两类服务

/// SBI调用返回值类型
pub type SbiResult = Result<usize, SbiError>;

/// SBI错误类型 - 符合SBI规范的错误代码
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SbiError {
    Failed = -1,
    NotSupported = -2,
    InvalidParam = -3,
    Denied = -4,
}

/// 控制台输出
pub mod console {
    use super::*;

    /// 输出单个字节到控制台
    ///
    /// 总是返回Ok(0)，因为legacy console_putchar不会失败
    #[cfg(target_arch = "riscv64")]
    pub fn putchar(byte: u8) -> SbiResult {
        #[allow(deprecated)]
        sbi_rt::legacy::console_putchar(byte as usize);
        Ok(0)
    }

    /// 主机构建没有固件控制台，输出被丢弃
    #[cfg(not(target_arch = "riscv64"))]
    pub fn putchar(_byte: u8) -> SbiResult {
        Ok(0)
    }

    /// 输出字符串到控制台，返回输出的字节数
    pub fn puts(s: &str) -> SbiResult {
        let mut count = 0;
        for byte in s.bytes() {
            putchar(byte)?;
            count += 1;
        }
        Ok(count)
    }
}

/// 系统复位
pub mod system {
    /// 冷重启系统
    #[cfg(target_arch = "riscv64")]
    pub fn reboot() -> ! {
        let _ = sbi_rt::system_reset(sbi_rt::ColdReboot, sbi_rt::NoReason);
        // 如果SRST扩展不可用，退回legacy shutdown
        #[allow(deprecated)]
        sbi_rt::legacy::shutdown()
    }

    /// 主机构建无法复位，直接终止当前执行流
    #[cfg(not(target_arch = "riscv64"))]
    pub fn reboot() -> ! {
        panic!("system reset requested")
    }
}
