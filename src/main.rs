#[actix_web::main]
async fn main() -> std::io::Result<()> {
    consolidador_lib::run().await
}
