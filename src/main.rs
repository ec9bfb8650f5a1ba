#[tokio::main]
async fn main() -> anyhow::Result<()> {
    qrshelf_lib::run().await
}
