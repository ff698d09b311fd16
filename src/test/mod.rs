// 板上自检模块入口
// 启用 selftest 特性时在启动后运行，只使用局部的路由器和注册表实例，
// 不改变全局监视器状态

pub mod router_test;

use crate::{error_print, info_print, println, warn_print};

/// 测试结果枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestResult {
    Pass,
    Fail,
    Skip,
}

impl TestResult {
    /// 由断言结果构造
    pub fn check(ok: bool) -> Self {
        if ok {
            TestResult::Pass
        } else {
            TestResult::Fail
        }
    }
}

/// 测试用例结构体
pub struct TestCase {
    pub name: &'static str,
    pub func: fn() -> TestResult,
    pub description: &'static str,
}

/// 单个套件或全部套件的计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Tally {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    fn record(&mut self, result: TestResult) {
        match result {
            TestResult::Pass => self.passed += 1,
            TestResult::Fail => self.failed += 1,
            TestResult::Skip => self.skipped += 1,
        }
    }

    fn absorb(&mut self, other: Tally) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

/// 测试运行器
#[derive(Default)]
pub struct TestRunner {
    overall: Tally,
    suites: usize,
}

impl TestRunner {
    /// 创建新的测试运行器
    pub const fn new() -> Self {
        Self {
            overall: Tally {
                passed: 0,
                failed: 0,
                skipped: 0,
            },
            suites: 0,
        }
    }

    /// 运行单个测试用例
    fn run_test(test: &TestCase) -> TestResult {
        println!("Running test: {} - {}", test.name, test.description);
        let result = (test.func)();
        match result {
            TestResult::Pass => info_print!("  [PASS] {}", test.name),
            TestResult::Fail => error_print!("  [FAIL] {}", test.name),
            TestResult::Skip => warn_print!("  [SKIP] {}", test.name),
        }
        result
    }

    /// 运行测试套件，返回该套件的计数
    pub fn run_suite(&mut self, suite_name: &str, tests: &[TestCase]) -> Tally {
        println!("=== {} Test Suite ===", suite_name);
        let mut tally = Tally::default();
        for test in tests {
            tally.record(Self::run_test(test));
        }
        println!(
            "=== {} Test Suite Complete: {}/{} passed ===",
            suite_name,
            tally.passed,
            tally.total()
        );
        self.overall.absorb(tally);
        self.suites += 1;
        tally
    }

    pub fn tally(&self) -> Tally {
        self.overall
    }

    /// 打印测试总结
    pub fn print_summary(&self) {
        let t = self.overall;
        println!("=== Self-test Summary ({} suites) ===", self.suites);
        println!("Total tests: {}", t.total());
        info_print!("Passed: {}", t.passed);
        if t.failed > 0 {
            error_print!("Failed: {}", t.failed);
        }
        if t.skipped > 0 {
            warn_print!("Skipped: {}", t.skipped);
        }
        println!("==================");
    }

    /// 获取是否所有测试都通过
    pub fn all_passed(&self) -> bool {
        self.overall.failed == 0 && self.overall.total() > 0
    }
}

/// 运行所有自检套件
///
/// 返回是否全部通过；失败只报告，不停机
pub fn run_all_tests() -> bool {
    let mut runner = TestRunner::new();

    // 运行陷入路由测试
    router_test::run_router_tests(&mut runner);

    // 运行盒子函数注册表测试
    registry_test::run_registry_tests(&mut runner);

    runner.print_summary();

    if runner.all_passed() {
        info_print!("All self-test suites completed successfully!");
    } else {
        warn_print!("Some self-tests failed or were skipped");
    }
    runner.all_passed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_on_target_suite_passes_on_the_host() {
        let mut runner = TestRunner::new();
        let router = router_test::run_router_tests(&mut runner);
        let registry = registry_test::run_registry_tests(&mut runner);
        assert_eq!(router.failed, 0);
        assert_eq!(registry.failed, 0);
        assert!(runner.all_passed());
        assert_eq!(runner.tally().total(), router.total() + registry.total());
    }
}
