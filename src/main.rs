mod availability;
mod data;
mod error;
mod input;
mod server;
mod solver;
mod time;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    server::run_server().await;
}
