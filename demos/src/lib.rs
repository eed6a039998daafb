//! Shared scopes for the hookbench demos
//!
//! Each builder returns a fresh [`Scope`] so every test run starts from the
//! same state.

use hookbench::{Args, Object, Scope};
use serde_json::{Value, json};
use std::time::Duration;

/// `calc`: an instance of `Calculator` with `add` and a deliberately slow `mul`
pub fn calculator_scope() -> Scope {
    let calculator = Object::class("Calculator")
        .with_fn("add", |args| Ok(json!(args.f64(0)? + args.f64(1)?)))
        .with_fn("mul", |args| {
            std::thread::sleep(Duration::from_micros(200));
            Ok(json!(args.f64(0)? * args.f64(1)?))
        });
    Scope::new().with_local("calc", Object::instance_of(&calculator))
}

/// `codec`: a module-level namespace with `encode` and `decode`
pub fn codec_scope() -> Scope {
    let codec = Object::namespace("codec")
        .with_fn("encode", |args| Ok(json!(run_length_encode(text(args)?))))
        .with_fn("decode", |args| Ok(json!(run_length_decode(text(args)?)?)));
    Scope::new().with_global("codec", codec)
}

fn text(args: &Args) -> anyhow::Result<&str> {
    args.get(0)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("argument 0 must be a string"))
}

/// `aaab` → `3a1b`
pub fn run_length_encode(input: &str) -> String {
    let mut out = String::new();
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        let mut run = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }
        out.push_str(&run.to_string());
        out.push(c);
    }
    out
}

/// `3a1b` → `aaab`
pub fn run_length_decode(input: &str) -> anyhow::Result<String> {
    let mut out = String::new();
    let mut count = String::new();
    for c in input.chars() {
        if c.is_ascii_digit() {
            count.push(c);
            continue;
        }
        let run: usize = count
            .parse()
            .map_err(|_| anyhow::anyhow!("missing run length before '{}'", c))?;
        out.extend(std::iter::repeat_n(c, run));
        count.clear();
    }
    anyhow::ensure!(count.is_empty(), "dangling run length '{}'", count);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_length() {
        assert_eq!(run_length_encode("aaabcc"), "3a1b2c");
        assert_eq!(run_length_decode("3a1b2c").unwrap(), "aaabcc");
        assert_eq!(run_length_encode(""), "");
        assert!(run_length_decode("3").is_err());
        assert!(run_length_decode("a").is_err());
    }

    #[test]
    fn test_scopes_resolve() {
        let calc = calculator_scope();
        let sum = calc.call("calc.add", &Args::from_values([json!(1), json!(2)])).unwrap();
        assert_eq!(sum, json!(3.0));

        let codec = codec_scope();
        let encoded = codec.call("codec.encode", &Args::from_values([json!("xxy")])).unwrap();
        assert_eq!(encoded, json!("2x1y"));
    }
}
