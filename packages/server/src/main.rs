//! Binary entrypoint for the compliance API server.

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    defarm_server::run_server().await
}
