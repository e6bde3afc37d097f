//! HTTP client for a remote vx oracle.
//!
//! Mirrors the oracle's RPC surface as three JSON endpoints with hex-encoded
//! byte fields:
//!
//! - `POST {base}/make_commitment` `{commitment, context}` -> `{pubkey}`
//! - `POST {base}/make_message` `{commitment, message, round_index, sub_index?, context}` -> `{signature}`
//! - `POST {base}/make_reveal` `{commitment, secret, context?}` -> `{}`

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use vx_types::{Commitment, PublicKey, Signature};

use crate::{OracleClient, OracleError, SignRequest};

/// Per-request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct MakeCommitment<'a> {
    commitment: &'a Commitment,
    context: String,
}

#[derive(Deserialize)]
struct PubkeyResponse {
    pubkey: String,
}

#[derive(Serialize)]
struct MakeMessage<'a> {
    commitment: &'a Commitment,
    message: String,
    round_index: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub_index: Option<u32>,
    context: String,
}

#[derive(Deserialize)]
struct SignatureResponse {
    signature: String,
}

#[derive(Serialize)]
struct MakeReveal<'a> {
    commitment: &'a Commitment,
    secret: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<String>,
}

#[derive(Deserialize)]
struct Ack {}

pub struct HttpOracle {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpOracle {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<R, OracleError> {
        let url = format!("{}/{endpoint}", self.base_url);
        let resp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| classify(&e))?;

        let status = resp.status();
        if status.is_server_error() {
            return Err(OracleError::Unavailable(format!("{endpoint}: HTTP {status}")));
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(OracleError::Protocol(format!(
                "{endpoint}: HTTP {status}: {text}"
            )));
        }
        resp.json::<R>()
            .await
            .map_err(|e| OracleError::Protocol(format!("{endpoint}: bad response body: {e}")))
    }
}

fn classify(e: &reqwest::Error) -> OracleError {
    if e.is_timeout() || e.is_connect() || e.is_request() {
        OracleError::Unavailable(e.to_string())
    } else {
        OracleError::Protocol(e.to_string())
    }
}

fn decode_hex(field: &str, value: &str) -> Result<Vec<u8>, OracleError> {
    hex::decode(value.trim_start_matches("0x"))
        .map_err(|e| OracleError::Protocol(format!("{field} is not hex: {e}")))
}

#[async_trait]
impl OracleClient for HttpOracle {
    async fn commit(
        &self,
        commitment: &Commitment,
        context: &[u8],
    ) -> Result<PublicKey, OracleError> {
        let body = MakeCommitment {
            commitment,
            context: hex::encode(context),
        };
        let resp: PubkeyResponse = self.post("make_commitment", &body).await?;
        Ok(PublicKey::new(decode_hex("pubkey", &resp.pubkey)?))
    }

    async fn sign(&self, request: &SignRequest) -> Result<Signature, OracleError> {
        let body = MakeMessage {
            commitment: &request.commitment,
            message: hex::encode(request.message.as_bytes()),
            round_index: request.round.round,
            sub_index: request.round.sub,
            context: hex::encode(&request.context),
        };
        let resp: SignatureResponse = self.post("make_message", &body).await?;
        Ok(Signature::new(decode_hex("signature", &resp.signature)?))
    }

    async fn reveal(
        &self,
        commitment: &Commitment,
        secret: &[u8; 32],
        context: Option<&[u8]>,
    ) -> Result<(), OracleError> {
        let body = MakeReveal {
            commitment,
            secret: hex::encode(secret),
            context: context.map(hex::encode),
        };
        let _: Ack = self.post("make_reveal", &body).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}
