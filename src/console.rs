// 控制台输出模块
// 监控器的唯一日志通道，底层走SBI控制台；按级别过滤，阈值见 config::LOG_LEVEL

use crate::config::LOG_LEVEL;
use crate::util::sbi;
use core::fmt;

/// 日志级别，从低到高
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    const fn tag(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    /// ANSI颜色: 错误红色，警告黄色，信息绿色
    const fn color(self) -> &'static str {
        match self {
            Level::Debug => "\x1b[90m",
            Level::Info => "\x1b[32m",
            Level::Warn => "\x1b[33m",
            Level::Error => "\x1b[31m",
        }
    }

    /// 该级别是否会被输出
    pub fn enabled(self) -> bool {
        self >= LOG_LEVEL
    }
}

/// 格式化输出函数
pub fn print(args: fmt::Arguments) {
    use core::fmt::Write;
    // 控制台写入不会失败，忽略结果以免在故障路径上再次panic
    let _ = Stdout.write_fmt(args);
}

/// 带级别前缀的一行日志
pub fn log(level: Level, args: fmt::Arguments) {
    if !level.enabled() {
        return;
    }
    print(format_args!(
        "{}[{}] {}\x1b[0m\n",
        level.color(),
        level.tag(),
        args
    ));
}

/// 标准输出结构体，实现Write trait以支持格式化输出
struct Stdout;

impl core::fmt::Write for Stdout {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let _ = sbi::console::puts(s);
        Ok(())
    }
}

/// print宏 - 格式化输出，不过滤级别
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        $crate::console::print(format_args!($($arg)*))
    };
}

/// println宏 - 格式化输出并换行
#[macro_export]
macro_rules! println {
    () => {
        $crate::print!("\n")
    };
    ($($arg:tt)*) => {
        $crate::print!("{}\n", format_args!($($arg)*))
    };
}

/// 调试输出宏 - 带有文件和行号信息
#[macro_export]
macro_rules! debug_print {
    ($($arg:tt)*) => {
        $crate::console::log(
            $crate::console::Level::Debug,
            format_args!("{}:{} {}", file!(), line!(), format_args!($($arg)*)),
        )
    };
}

#[macro_export]
macro_rules! error_print {
    ($($arg:tt)*) => {
        $crate::console::log($crate::console::Level::Error, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn_print {
    ($($arg:tt)*) => {
        $crate::console::log($crate::console::Level::Warn, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! info_print {
    ($($arg:tt)*) => {
        $crate::console::log($crate::console::Level::Info, format_args!($($arg)*))
    };
}
