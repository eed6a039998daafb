//! hookbench demo
//!
//! Run with:
//!   cargo run -p hookbench-demos --example calc_bench                    # run as plain tests
//!   cargo run -p hookbench-demos --example calc_bench -- --bench         # benchmark marked tests
//!   cargo run -p hookbench-demos --example calc_bench -- --bench --bench-only
//!   cargo run -p hookbench-demos --example calc_bench -- --dry-run

use hookbench::prelude::*;
use hookbench_demos::{calculator_scope, codec_scope};

fn reset_input(scope: &Scope) -> anyhow::Result<()> {
    scope.call("codec.encode", &Args::from_values([json!("warmup")]))?;
    Ok(())
}

#[hookbench::case(suite = "CalculatorTests", bench = "calc.add", scope = calculator_scope)]
fn test_add(scope: &Scope) -> anyhow::Result<()> {
    let sum = scope.call("calc.add", &Args::from_values([json!(40), json!(2)]))?;
    anyhow::ensure!(sum == json!(42.0), "40 + 2 = {}", sum);
    Ok(())
}

#[hookbench::case(
    suite = "CalculatorTests",
    bench = "calc.mul",
    iterations = 20,
    scope = calculator_scope
)]
fn test_mul_is_slow(scope: &Scope) -> anyhow::Result<()> {
    let product = scope.call("calc.mul", &Args::from_values([json!(6), json!(7)]))?;
    anyhow::ensure!(product == json!(42.0), "6 * 7 = {}", product);
    Ok(())
}

#[hookbench::case(suite = "CalculatorTests", scope = calculator_scope)]
fn test_add_is_commutative(scope: &Scope) -> anyhow::Result<()> {
    let ab = scope.call("calc.add", &Args::from_values([json!(1.5), json!(2)]))?;
    let ba = scope.call("calc.add", &Args::from_values([json!(2), json!(1.5)]))?;
    anyhow::ensure!(ab == ba);
    Ok(())
}

// Only `codec.decode` is timed; the encode in the fixture and in the body is not.
#[hookbench::case(
    suite = "CodecTests",
    bench = "codec.decode",
    iterations = 50,
    scope = codec_scope,
    setup = reset_input
)]
fn test_round_trip(scope: &Scope) -> anyhow::Result<()> {
    let input = "aaaabbbccd".repeat(100);
    let encoded = scope.call("codec.encode", &Args::from_values([json!(input)]))?;
    let decoded = scope.call("codec.decode", &Args::from_values([encoded]))?;
    anyhow::ensure!(decoded == json!(input));
    Ok(())
}

fn main() {
    if let Err(e) = hookbench::run() {
        eprintln!("error: {:#}", e);
        std::process::exit(2);
    }
}
