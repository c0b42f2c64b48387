#[tokio::main]
async fn main() -> anyhow::Result<()> {
    medcase::bootstrapper::run().await
}
