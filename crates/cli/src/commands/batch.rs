//! `codeloop batch <FILE>` — run a batch file.

use std::path::PathBuf;
use std::process::ExitCode;

use codeloop_agent::drivers::{BatchFile, run_batch};

use super::RunOptions;

/// Exit status for a batch file that cannot be used.
const EXIT_MALFORMED: u8 = 2;

pub async fn run(file: PathBuf, options: RunOptions) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let batch = match BatchFile::load(&file) {
        Ok(batch) => batch,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(ExitCode::from(EXIT_MALFORMED));
        }
    };

    let (agent, config) = options.build_agent()?;

    let mut stdout = std::io::stdout().lock();
    let summary = run_batch(&agent, &batch, &config.system_prompt, &mut stdout).await?;

    Ok(if summary.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
