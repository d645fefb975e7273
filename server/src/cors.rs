use rocket::http::Method;
use rocket_cors::{AllowedHeaders, AllowedOrigins, Cors, CorsOptions};
use tracing::debug;

use crate::config::CorsConfig;

pub fn create_cors(config: &CorsConfig) -> Result<Cors, rocket_cors::Error> {
    let allowed_origins: Vec<&str> = config
        .allowed_origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .collect();
    debug!("CORS allowed origins: {:?}", allowed_origins);

    CorsOptions {
        allowed_origins: AllowedOrigins::some_exact(&allowed_origins),
        allowed_methods: [Method::Get, Method::Post, Method::Put, Method::Delete, Method::Options]
            .into_iter()
            .map(From::from)
            .collect(),
        allowed_headers: AllowedHeaders::some(&["Accept", "Content-Type"]),
        ..Default::default()
    }
    .to_cors()
}
