#[tokio::main]
async fn main() -> anyhow::Result<()> {
    digital_invite::bootstrapper::run().await
}
