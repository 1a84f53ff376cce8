use anyhow::Result;
use axum::Router;
use catalog::IndexOptions;
use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};
use server::build_app;
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Course catalog CSV
    #[arg(long, default_value = "udemy_course_data.csv")]
    catalog: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Reduce title and query terms to their English stem
    #[arg(long, default_value_t = false)]
    stem: bool,
    /// Use ln(N/df) + 1 instead of the smoothed ln((1 + N)/(1 + df)) + 1
    #[arg(long, default_value_t = false)]
    no_smooth_idf: bool,
    /// Use 1 + ln(tf) instead of raw term counts
    #[arg(long, default_value_t = false)]
    sublinear_tf: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let options = IndexOptions { smooth_idf: !args.no_smooth_idf, sublinear_tf: args.sublinear_tf, stem: args.stem };
    let app: Router = build_app(&args.catalog, options)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
