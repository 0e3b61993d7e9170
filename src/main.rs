use anyhow::Result;
use clap::Parser;

use topograph::cli::{run, RenderArgs};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    run(RenderArgs::parse())
}
