// 陷入路由自检模块
// 用局部分发表驱动路由器，覆盖快表、慢表、越界丢弃和停机拒绝

use super::{Tally, TestCase, TestResult, TestRunner};
use crate::println;
use crate::trap::exports::{svc_fast, svc_slow, SVC_FAST_INDEX_MAX};
use crate::trap::{
    FastHandler, HaltReason, HaltState, Privilege, Routed, SavedRegisters, SlowHandler,
    SoftFrame, SvcRouter, SvcTables, TrapFrame, Word,
};
use core::sync::atomic::{AtomicUsize, Ordering};

static LAST_FAST: AtomicUsize = AtomicUsize::new(0);

fn mark_fast(frame: &mut dyn TrapFrame) {
    // 标记 = 参数0 + 特权级
    let tag = match frame.privilege() {
        Privilege::Privileged => 0x100,
        Privilege::Unprivileged => 0x200,
    };
    LAST_FAST.store(tag | frame.load_arg(0), Ordering::SeqCst);
}

fn hook(_frame: &mut dyn TrapFrame) {}

fn sum(a0: Word, a1: Word, a2: Word, a3: Word) -> Word {
    a0 + a1 + a2 + a3
}

fn xor(a0: Word, a1: Word, _: Word, _: Word) -> Word {
    a0 ^ a1
}

static FAST: [FastHandler; SVC_FAST_INDEX_MAX] = [mark_fast; SVC_FAST_INDEX_MAX];
static SLOW: [SlowHandler; 3] = [sum, sum, xor];

fn tables() -> Option<SvcTables> {
    SvcTables::new(&FAST, &FAST, &SLOW).ok()
}

/// 两个特权级都能到达每个快表槽位
fn test_fast_dispatch() -> TestResult {
    let Some(tables) = tables() else {
        return TestResult::Fail;
    };
    let state = HaltState::new();
    let router = SvcRouter::new(tables, hook, &state);
    for i in 0..SVC_FAST_INDEX_MAX as u8 {
        for (mode, tag) in [(Privilege::Privileged, 0x100), (Privilege::Unprivileged, 0x200)] {
            let mut frame = SoftFrame::new(mode, svc_fast(i), [i as Word, 0, 0, 0]);
            if router.route(&mut frame) != Routed::Fast(i)
                || LAST_FAST.load(Ordering::SeqCst) != tag | i as usize
            {
                println!("  fast slot {} unreachable from {:?}", i, mode);
                return TestResult::Fail;
            }
        }
    }
    TestResult::Pass
}

/// 慢表结果按 ecall 约定写回 a0
fn test_slow_dispatch_on_saved_registers() -> TestResult {
    let Some(tables) = tables() else {
        return TestResult::Fail;
    };
    let state = HaltState::new();
    let router = SvcRouter::new(tables, hook, &state);

    let mut regs = SavedRegisters::new();
    regs.x[17] = svc_slow(2) as usize;
    regs.x[10] = 0b1100;
    regs.x[11] = 0b1010;
    let routed = router.route(&mut regs);
    println!("  routed: {:?}, a0 = {:#x}", routed, regs.x[10]);
    TestResult::check(routed == Routed::Slow { index: 2, result: 0b0110 } && regs.x[10] == 0b0110)
}

/// 越界慢表索引被丢弃，帧保持不变
fn test_slow_overflow_discarded() -> TestResult {
    let Some(tables) = tables() else {
        return TestResult::Fail;
    };
    let state = HaltState::new();
    let router = SvcRouter::new(tables, hook, &state);
    let mut frame = SoftFrame::new(Privilege::Unprivileged, svc_slow(3), [1, 2, 3, 4]);
    TestResult::check(
        router.route(&mut frame) == Routed::Discarded(3) && frame.regs == [1, 2, 3, 4],
    )
}

/// 停机后路由器拒绝所有陷入
fn test_halted_router_refuses() -> TestResult {
    let Some(tables) = tables() else {
        return TestResult::Fail;
    };
    let state = HaltState::new();
    let router = SvcRouter::new(tables, hook, &state);
    state.enter(HaltReason::UserError(1));
    let mut frame = SoftFrame::new(Privilege::Privileged, svc_slow(1), [1, 1, 1, 1]);
    TestResult::check(router.route(&mut frame) == Routed::Halted && frame.regs[0] == 1)
}

/// 陷入路由测试用例列表
const ROUTER_TESTS: &[TestCase] = &[
    TestCase {
        name: "fast_dispatch",
        func: test_fast_dispatch,
        description: "Every fast slot is reachable from both privilege levels",
    },
    TestCase {
        name: "slow_dispatch_saved_registers",
        func: test_slow_dispatch_on_saved_registers,
        description: "Slow result is written back to a0",
    },
    TestCase {
        name: "slow_overflow_discarded",
        func: test_slow_overflow_discarded,
        description: "Slow index past the table is a no-op",
    },
    TestCase {
        name: "halted_router_refuses",
        func: test_halted_router_refuses,
        description: "A halted monitor routes nothing",
    },
];

/// 运行所有陷入路由测试
pub fn run_router_tests(runner: &mut TestRunner) -> Tally {
    runner.run_suite("Trap Router", ROUTER_TESTS)
}
