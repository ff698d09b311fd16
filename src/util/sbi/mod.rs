// SBI 封装入口
// riscv64 上走真实的 SBI 调用，其它目标（主机测试）只保留同样的接口形状

pub mod api;

pub use self::api::{console, system, SbiError, SbiResult};
