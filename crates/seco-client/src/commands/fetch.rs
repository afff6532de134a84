//! Single request command.

use seco_protocol::RequestType;

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::render;
use crate::session::Session;

/// Sends one request and prints the response.
pub async fn run(
    config: &ClientConfig,
    request_type: RequestType,
    data: &[String],
    json: bool,
) -> ClientResult<()> {
    let session = Session::from_config(config);
    let response = session.execute(request_type, data).await?;

    if json {
        println!("{}", render::json(&response)?);
    } else {
        print!("{}", render::text(&response));
    }
    Ok(())
}
