//! Diamond CLI binary

use std::process::ExitCode;

use anyhow::Context;

fn main() -> anyhow::Result<ExitCode> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    let code = match runtime.block_on(diamond::run()) {
        Ok(code) => code,
        Err(e) => {
            diamond::output::print_error(&e.to_string());
            e.exit_code()
        }
    };
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}
