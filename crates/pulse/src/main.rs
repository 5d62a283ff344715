//! Binary entrypoint.
//!
//! # Usage
//!
//! ```bash
//! pulse --entity src/main.rs --plugin "vim-pulse/1.0.0" --write
//! pulse --entity src/main.rs --extra-heartbeats < heartbeats.json
//! ```

use std::process::ExitCode;

use clap::Parser;

use pulse::flags::Flags;

#[tokio::main]
async fn main() -> ExitCode {
    let flags = Flags::parse();

    let code = pulse::run::run(&flags).await;
    ExitCode::from(code)
}
