/// JavaScript harness executed by every engine
///
/// The harness builds a callable from the submitted source followed by a
/// statement returning `solve` (or `null`), calls it, then calls
/// `solve(input)` and coerces the return value with `String(value ?? "")`.
/// Exactly one result line is written to stdout, prefixed by
/// [`RESULT_MARKER`]; whatever the submitted code prints is ignored.
/// `output` and `error` travel base64-encoded (UTF-8, lone surrogates
/// replaced with U+FFFD) so the line is plain ASCII JSON.
///
/// Payload transport:
/// - `SOURCE_CODE` / `TEST_INPUT` environment variables (base64) when set,
///   used for containers;
/// - otherwise a JSON object `{ "code", "input" }` on stdin.

use crate::engine::Evaluation;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;

pub const RESULT_MARKER: &str = "__AIGRADE_RESULT__";

pub const MISSING_SOLVE: &str = "Please define a function named solve(input).";

pub const HARNESS_JS: &str = r#"
const fs = require('fs');
const fromEnv = typeof process.env.SOURCE_CODE === 'string';
const decode = (name) => Buffer.from(process.env[name] || '', 'base64').toString('utf8');
const payload = fromEnv
  ? { code: decode('SOURCE_CODE'), input: decode('TEST_INPUT') }
  : JSON.parse(fs.readFileSync(0, 'utf8'));
const writeResult = process.stdout.write.bind(process.stdout);
const quiet = () => true;
for (const level of ['log', 'info', 'warn', 'error', 'debug', 'trace']) console[level] = quiet;
process.stdout.write = quiet;
const b64 = (text) => Buffer.from(String(text), 'utf8').toString('base64');
let result;
try {
  const build = new Function(payload.code + "\n;return typeof solve === 'function' ? solve : null;");
  const solve = build();
  if (typeof solve !== 'function') {
    result = { ok: false, error: b64('Please define a function named solve(input).') };
  } else {
    const value = solve(payload.input);
    result = { ok: true, output: b64(String(value ?? '')) };
  }
} catch (e) {
  result = { ok: false, error: b64(String((e && e.message) || e)) };
}
writeResult('\n__AIGRADE_RESULT__' + JSON.stringify(result) + '\n', () => process.exit(0));
"#;

#[derive(Debug, Deserialize)]
struct HarnessResult {
    ok: bool,
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// stdin payload for the process engine
pub fn stdin_payload(code: &str, input: &str) -> Vec<u8> {
    serde_json::json!({ "code": code, "input": input })
        .to_string()
        .into_bytes()
}

/// Environment payload for container engines
pub fn env_payload(code: &str, input: &str) -> Vec<String> {
    vec![
        format!("SOURCE_CODE={}", general_purpose::STANDARD.encode(code)),
        format!("TEST_INPUT={}", general_purpose::STANDARD.encode(input)),
    ]
}

/// Extract the evaluation from harness stdout (last marker line wins)
pub fn parse_result(stdout: &str) -> Option<Evaluation> {
    let line = stdout
        .lines()
        .rev()
        .find_map(|line| line.strip_prefix(RESULT_MARKER))?;

    let parsed: HarnessResult = serde_json::from_str(line.trim_end()).ok()?;
    if parsed.ok {
        Some(Evaluation::Output(decode_field(parsed.output)?))
    } else {
        Some(Evaluation::Error(decode_field(parsed.error)?))
    }
}

fn decode_field(field: Option<String>) -> Option<String> {
    let Some(encoded) = field else {
        return Some(String::new());
    };
    let bytes = general_purpose::STANDARD.decode(encoded.as_bytes()).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}
