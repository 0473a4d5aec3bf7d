//! Typed blocking client for the worksheets REST backend.
//!
//! Every call returns [`GatewayError`] on failure: non-2xx responses carry the
//! HTTP status and the body's `message`, transport failures carry status 0.

use std::time::Duration;

use anyhow::{Context, Result};

mod account;
mod bundles;
mod cli;
mod error;
mod http_client;
mod types;
mod worksheets;

pub use self::error::GatewayError;
pub use self::types::*;

#[derive(Clone)]
pub struct RestClient {
    base_url: String,
    client: reqwest::blocking::Client,
    no_redirect: reqwest::blocking::Client,
}

impl RestClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(concat!("worksheets/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout);
        let client = builder.build().context("build reqwest client")?;

        builder = reqwest::blocking::Client::builder()
            .user_agent(concat!("worksheets/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout);
        let no_redirect = builder.build().context("build non-redirecting client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            no_redirect,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
