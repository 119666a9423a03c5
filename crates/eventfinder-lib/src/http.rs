//! Shared blocking HTTP client setup for the hosted service clients.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use tracing::debug;

use crate::error::{Error, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub(crate) fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(user_agent())
        .build()
        .map_err(Error::Http)
}

fn user_agent() -> String {
    format!(
        "eventfinder-lib/{version}",
        version = env!("CARGO_PKG_VERSION")
    )
}

/// Turn a non-success status into [`Error::RemoteStatus`].
pub(crate) fn check_status(service: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        debug!(service, status = %status, "remote call rejected");
        Err(Error::RemoteStatus { service, status })
    }
}
