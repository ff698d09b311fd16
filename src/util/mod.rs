// 工具模块：固件接口封装

pub mod sbi;
