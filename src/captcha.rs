//! Captcha verification
//!
//! Posts the client token to a reCAPTCHA-compatible `siteverify` endpoint.
//! A `success: false` answer is a normal outcome; only transport or
//! non-200 failures are errors.

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::error::AppError;
use crate::logger;

#[allow(async_fn_in_trait)]
pub trait CaptchaVerifier {
    /// Whether `response` is a valid token for `remote_ip`
    async fn verify(&self, secret: &str, response: &str, remote_ip: &str)
        -> Result<bool, AppError>;
}

pub struct RecaptchaVerifier {
    client: Client,
    verify_url: String,
}

#[derive(Deserialize)]
struct VerifyResponse {
    success: bool,
}

impl RecaptchaVerifier {
    pub fn new(client: Client, verify_url: impl Into<String>) -> Self {
        Self {
            client,
            verify_url: verify_url.into(),
        }
    }
}

impl CaptchaVerifier for RecaptchaVerifier {
    async fn verify(
        &self,
        secret: &str,
        response: &str,
        remote_ip: &str,
    ) -> Result<bool, AppError> {
        let res = self
            .client
            .post(&self.verify_url)
            .form(&[
                ("secret", secret),
                ("response", response),
                ("remoteip", remote_ip),
            ])
            .send()
            .await?;

        if res.status() != StatusCode::OK {
            logger::log_warning(&format!(
                "Captcha verification returned status {}",
                res.status()
            ));
            return Err(AppError::internal("Error validating captcha."));
        }

        let body: VerifyResponse = res.json().await?;
        Ok(body.success)
    }
}
