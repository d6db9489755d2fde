use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = powens_firefly::args::parse();
    powens_firefly::cli::main(args).await
}
