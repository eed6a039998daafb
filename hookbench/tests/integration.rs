//! Integration tests for hookbench
//!
//! Registered cases go through discovery, the runner, the controller and the
//! report renderers, the same path a test binary takes.

use hookbench::prelude::*;
use hookbench::{
    BenchmarkController, BufferSink, Disposition, Emphasis, RegisteredCase, RunFlags, RunStatus,
    TestCase, TestDef, generate_json_report, render_summary,
};
use hookbench_cli::{CaseStatus, Runner, build_plan};
use regex::Regex;
use std::cell::Cell;
use std::time::Duration;

thread_local! {
    static TARGET_CALLS: Cell<u64> = const { Cell::new(0) };
    static SETUPS: Cell<u64> = const { Cell::new(0) };
}

fn calc_scope() -> Scope {
    let calculator = Object::class("Calculator")
        .with_fn("add", |args| {
            TARGET_CALLS.with(|c| c.set(c.get() + 1));
            Ok(json!(args.f64(0)? + args.f64(1)?))
        })
        .with_fn("slow_add", |args| {
            std::thread::sleep(Duration::from_millis(1));
            Ok(json!(args.f64(0)? + args.f64(1)?))
        });
    Scope::new().with_local("calc", Object::instance_of(&calculator))
}

fn slow_setup(_: &Scope) -> anyhow::Result<()> {
    SETUPS.with(|c| c.set(c.get() + 1));
    std::thread::sleep(Duration::from_millis(5));
    Ok(())
}

fn add(scope: &Scope, a: f64, b: f64) -> anyhow::Result<serde_json::Value> {
    scope.call("calc.add", &Args::from_values([json!(a), json!(b)]))
}

#[hookbench::case(suite = "Counting", bench = "calc.add", iterations = 4, scope = calc_scope)]
fn test_add_twice(scope: &Scope) -> anyhow::Result<()> {
    add(scope, 1.0, 2.0)?;
    add(scope, 3.0, 4.0)?;
    Ok(())
}

#[hookbench::case(suite = "Counting", scope = calc_scope)]
fn test_unmarked(scope: &Scope) -> anyhow::Result<()> {
    anyhow::ensure!(add(scope, 2.0, 2.0)? == json!(4.0));
    Ok(())
}

#[hookbench::case(suite = "Sleepy", bench = "calc.slow_add", iterations = 5, scope = calc_scope)]
fn test_slow_add(scope: &Scope) -> anyhow::Result<()> {
    scope.call("calc.slow_add", &Args::from_values([json!(1), json!(1)]))?;
    Ok(())
}

#[hookbench::case(
    suite = "Fixtures",
    bench = "calc.add",
    iterations = 3,
    scope = calc_scope,
    setup = slow_setup
)]
fn test_setup_not_timed(scope: &Scope) -> anyhow::Result<()> {
    add(scope, 0.5, 0.5)?;
    Ok(())
}

#[hookbench::case(suite = "Args", scope = calc_scope)]
fn test_with_args(scope: &Scope, args: &Args) -> anyhow::Result<()> {
    anyhow::ensure!(args.get(0).is_none());
    add(scope, 1.0, 1.0)?;
    Ok(())
}

fn plan_for(pattern: &str) -> Vec<&'static TestDef> {
    let filter = Regex::new(pattern).unwrap();
    build_plan(inventory::iter::<TestDef>, Some(&filter)).cases
}

fn bench_flags() -> RunFlags {
    RunFlags {
        bench_enabled: true,
        ..RunFlags::default()
    }
}

#[test]
fn test_cases_are_registered() {
    let cases = plan_for("^Counting\\.");
    let names: Vec<_> = cases.iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["test_add_twice", "test_unmarked"]);

    let marker = cases[0].bench.unwrap();
    assert_eq!(marker.target, "calc.add");
    assert_eq!(marker.iterations, Some(4));
    assert!(cases[0].file.ends_with("integration.rs"));
    assert!(cases[1].bench.is_none());
}

#[test]
fn test_every_target_call_is_a_sample() {
    TARGET_CALLS.with(|c| c.set(0));
    let cases = plan_for("^Counting\\.");

    let report = Runner::new(bench_flags(), 100).run(&cases, |_| {});

    assert_eq!(report.passed(), 2);
    assert_eq!(report.results.len(), 1);
    let result = &report.results[0];
    assert_eq!(result.status(), RunStatus::Completed);
    assert_eq!(result.iterations(), 4);
    // 4 iterations x 2 calls, plus the unmarked test's single call
    assert_eq!(result.store().count(), 8);
    assert_eq!(TARGET_CALLS.with(Cell::get), 9);
}

#[test]
fn test_sleeping_target_measures_milliseconds() {
    let report = Runner::new(bench_flags(), 100).run(&plan_for("^Sleepy\\."), |_| {});
    let summary = report.results[0].summary();

    assert_eq!(summary.count, 5);
    let min = summary.min.unwrap();
    let mean = summary.mean.unwrap();
    assert!(min >= 0.001, "min was {}", min);
    assert!(mean < 0.5, "mean was {}", mean);

    let mut sink = BufferSink::new(100);
    render_summary(&report.results, &mut sink).unwrap();
    let text = sink.text();
    assert!(text.contains("collected 1 items"));
    assert!(text.contains("Sleepy.test_slow_add"));

    // Min, Mean, Median, Stddev in that order, in microseconds
    let values = sink.spans_with(Emphasis::Strong);
    assert_eq!(values.len(), 4);
    let mean_us: f64 = values[1].trim().replace(',', "").parse().unwrap();
    assert!(mean_us >= 1000.0, "mean column was {:?}", values[1]);
    assert!(values[1].trim().contains(','));
}

#[test]
fn test_fixture_time_is_excluded() {
    SETUPS.with(|c| c.set(0));
    let report = Runner::new(bench_flags(), 100).run(&plan_for("^Fixtures\\."), |_| {});

    // once by the host, then once per iteration
    assert_eq!(SETUPS.with(Cell::get), 4);
    let summary = report.results[0].summary();
    assert_eq!(summary.count, 3);
    assert!(summary.max.unwrap() < 0.005);
}

#[test]
fn test_original_restored_after_benchmark() {
    let def = plan_for("^Counting\\.test_add_twice$")[0];
    let mut case = RegisteredCase::new(def);
    let Ok(Member::Callable(original)) = case.scope().resolve("calc.add") else {
        panic!("calc.add is not callable");
    };

    let spec = def.spec(100).unwrap().unwrap();
    let mut controller = BenchmarkController::new(bench_flags());
    let disposition = controller.before_test(&mut case, Some(&spec)).unwrap();
    assert_eq!(disposition, Disposition::Benchmarked);

    let Ok(Member::Callable(after)) = case.scope().resolve("calc.add") else {
        panic!("calc.add is not callable");
    };
    assert!(after.ptr_eq(&original));
    assert!(!controller.is_armed());
    assert_eq!(controller.finalize()[0].store().count(), 8);
}

#[test]
fn test_benchmark_disabled_runs_once() {
    TARGET_CALLS.with(|c| c.set(0));
    let report = Runner::new(RunFlags::default(), 100).run(&plan_for("^Counting\\."), |_| {});

    assert_eq!(report.passed(), 2);
    assert!(report.results.is_empty());
    assert_eq!(TARGET_CALLS.with(Cell::get), 3);
}

#[test]
fn test_bench_only_skips_unmarked() {
    let flags = RunFlags {
        bench_only: true,
        ..bench_flags()
    };
    let report = Runner::new(flags, 100).run(&plan_for("^(Counting|Args)\\."), |_| {});

    let skipped: Vec<_> = report
        .outcomes
        .iter()
        .filter_map(|o| match &o.status {
            CaseStatus::Skipped(reason) => Some((o.id.as_str(), reason.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(skipped.len(), 2);
    assert!(skipped.iter().all(|(_, reason)| *reason == "no associated benchmark"));
    assert_eq!(report.passed(), 1);
}

#[test]
fn test_two_argument_body_registered() {
    let report = Runner::new(RunFlags::default(), 100).run(&plan_for("^Args\\."), |_| {});
    assert_eq!(report.passed(), 1);
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn test_json_report_round_trips_through_serde() {
    let report = Runner::new(bench_flags(), 100).run(&plan_for("^Counting\\."), |_| {});
    let json = generate_json_report(&report.results).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["meta"]["schema"], "hookbench-summary");
    let result = &value["results"][0];
    assert_eq!(result["name"], "Counting.test_add_twice");
    assert_eq!(result["target"], "calc.add");
    assert_eq!(result["samples"].as_array().unwrap().len(), 8);
}
