pub mod action;
pub mod config;
pub mod delivery;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = action::AppArgs::parse();

    args.run().await
}
