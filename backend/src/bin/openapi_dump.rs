//! Print the OpenAPI document as JSON.

use utoipa::OpenApi;
use wanderlust::doc::ApiDoc;

fn main() -> Result<(), serde_json::Error> {
    println!("{}", ApiDoc::openapi().to_pretty_json()?);
    Ok(())
}
