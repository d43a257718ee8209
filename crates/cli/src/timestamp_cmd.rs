use anyhow::{Context, Result};
use eventscope_core::timestamp::{add_seconds, seconds_to_timestamp, timestamp_to_seconds};

/// `MM:SS` input prints seconds (or the shifted `MM:SS` with `--add`);
/// numeric input prints `MM:SS`.
pub fn run(value: &str, add: Option<f64>) -> Result<()> {
    println!("{}", convert(value, add)?);
    Ok(())
}

fn convert(value: &str, add: Option<f64>) -> Result<String> {
    let value = value.trim();
    if value.contains(':') {
        return match add {
            Some(delta) => Ok(add_seconds(value, delta)?),
            None => Ok(timestamp_to_seconds(value)?.to_string()),
        };
    }

    let seconds: f64 = value
        .parse()
        .with_context(|| format!("Expected MM:SS or seconds, got {value:?}"))?;
    Ok(seconds_to_timestamp(seconds + add.unwrap_or(0.0).floor()))
}
