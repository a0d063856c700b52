//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.  Results (keys, digests,
//! random values) are printed plain so they can be piped.

use console::style;
use serde_json::{Map, Value};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a single result value, or `{"<name>": value}` in JSON mode.
pub fn value(name: &str, value: &str, json: bool) {
    fields(&[(name, value.to_string())], json);
}

/// Print named result values, one `name: value` line each, or as a JSON
/// object in JSON mode.  A single field in text mode is printed bare.
pub fn fields(items: &[(&str, String)], json: bool) {
    if json {
        println!("{}", render_json(items));
        return;
    }
    match items {
        [(_, only)] => println!("{only}"),
        _ => {
            for (name, v) in items {
                println!("{} {v}", style(format!("{name}:")).bold());
            }
        }
    }
}

fn render_json(items: &[(&str, String)]) -> String {
    let map: Map<String, Value> = items
        .iter()
        .map(|(k, v)| ((*k).to_string(), Value::String(v.clone())))
        .collect();
    Value::Object(map).to_string()
}
