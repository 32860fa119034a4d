//! `codeloop stream` — one prompt from stdin, answer streamed to stdout.

use std::process::ExitCode;

use codeloop_agent::drivers::{read_prompt, run_stream};
use codeloop_core::tool::ToolKind;

use super::RunOptions;

const EXIT_NO_INPUT: u8 = 2;

pub async fn run(
    tools: Vec<ToolKind>,
    options: RunOptions,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let prompt = match read_prompt(std::io::stdin().lock()) {
        Ok(prompt) => prompt,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(ExitCode::from(EXIT_NO_INPUT));
        }
    };

    let (agent, config) = options.build_agent()?;
    let enabled = if tools.is_empty() {
        ToolKind::ALL.to_vec()
    } else {
        tools
    };

    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr().lock();
    let report = run_stream(
        &agent,
        &prompt,
        &enabled,
        &config.system_prompt,
        &mut stdout,
        &mut stderr,
    )
    .await?;

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
