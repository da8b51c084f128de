use crate::db::connection::{init_db, Database};
use crate::responses::error_to_response;
use crate::router::handle;
use astra::Server;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

mod auth;
mod db;
mod domain;
mod errors;
mod responses;
mod router;

#[cfg(test)]
mod tests;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let db_path = std::env::var("CAMPUS_STASH_DB").unwrap_or_else(|_| "campus_stash.sqlite3".into());
    let schema_path =
        std::env::var("CAMPUS_STASH_SCHEMA").unwrap_or_else(|_| "sql/schema.sql".into());

    let db = Database::new(db_path);
    if let Err(e) = init_db(&db, &schema_path) {
        eprintln!("❌ Database initialization failed: {e}");
        std::process::exit(1);
    }

    let addr_str = std::env::var("CAMPUS_STASH_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".into());
    let addr: SocketAddr = match addr_str.parse() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("❌ Bad listen address {addr_str}: {e}");
            std::process::exit(1);
        }
    };

    println!("Starting campus-stash at http://{addr}");

    let server = Server::bind(&addr).max_workers(8);

    let result = server.serve(move |req, _info| match handle(req, &db) {
        Ok(resp) => resp,
        Err(err) => error_to_response(err),
    });

    if let Err(e) = result {
        eprintln!("Server ended with error: {e}");
    }

    println!("Server shut down cleanly.");
}
