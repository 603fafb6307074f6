#[tokio::main]
async fn main() -> anyhow::Result<()> {
    blockrun::run().await
}
