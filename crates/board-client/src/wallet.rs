use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde_json::json;
use tracing::debug;

use board_types::Value;
use board_types::api::{
    ConnectResponse, ContractInfo, PublicCallResponse, ReadOnlyResponse, TxStatus,
    TxStatusResponse,
};

use crate::error::ClientError;

/// The two calls a wallet exposes to an app: free reads and signed writes.
pub trait WalletProvider: Send + Sync {
    /// Principal of the connected account, if any.
    fn principal(&self) -> Option<&str>;

    fn read_only_call(
        &self,
        function: &str,
        arguments: Vec<Value>,
    ) -> impl Future<Output = Result<ReadOnlyResponse, ClientError>> + Send;

    /// Submits a public call and returns its transaction id. Resolves once
    /// the node accepted the call, not when it is applied.
    fn public_call(
        &self,
        function: &str,
        arguments: Vec<Value>,
    ) -> impl Future<Output = Result<String, ClientError>> + Send;
}

struct Session {
    principal: String,
    token: String,
}

/// Wallet stand-in that talks to a node over HTTP.
pub struct HttpWallet {
    client: Client,
    base_url: String,
    contract_id: String,
    session: Option<Session>,
}

impl HttpWallet {
    pub fn new(base_url: impl Into<String>, contract_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            contract_id: contract_id.into(),
            session: None,
        }
    }

    /// Open a session for `principal`. Replaces any previous session.
    pub async fn connect(&mut self, principal: &str) -> Result<ConnectResponse, ClientError> {
        let resp = self
            .client
            .post(self.url("/auth/connect"))
            .json(&json!({ "principal": principal }))
            .send()
            .await?;
        let connected: ConnectResponse = check(resp).await?.json().await?;

        debug!("Connected as {}", connected.principal);
        self.session = Some(Session {
            principal: connected.principal.clone(),
            token: connected.token.clone(),
        });
        Ok(connected)
    }

    pub fn disconnect(&mut self) {
        self.session = None;
    }

    pub async fn info(&self) -> Result<ContractInfo, ClientError> {
        let resp = self.client.get(self.url("/info")).send().await?;
        Ok(check(resp).await?.json().await?)
    }

    /// `None` when the node does not know the transaction.
    pub async fn tx_status(&self, tx_id: &str) -> Result<Option<TxStatusResponse>, ClientError> {
        let resp = self
            .client
            .get(self.url(&format!("/tx/{}", tx_id)))
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(check(resp).await?.json().await?))
    }

    /// Poll until the transaction leaves `pending`.
    pub async fn wait_for_tx(
        &self,
        tx_id: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<TxStatusResponse, ClientError> {
        let poll = async {
            loop {
                if let Some(tx) = self.tx_status(tx_id).await? {
                    if tx.status != TxStatus::Pending {
                        return Ok::<_, ClientError>(tx);
                    }
                }
                tokio::time::sleep(interval).await;
            }
        };
        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| ClientError::Timeout(tx_id.to_string()))?
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Reads are sent as the connected principal, or as the contract's own
    /// address when nobody is connected.
    fn read_sender(&self) -> &str {
        match &self.session {
            Some(session) => &session.principal,
            None => self
                .contract_id
                .split_once('.')
                .map_or(self.contract_id.as_str(), |(address, _)| address),
        }
    }
}

impl WalletProvider for HttpWallet {
    fn principal(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.principal.as_str())
    }

    async fn read_only_call(
        &self,
        function: &str,
        arguments: Vec<Value>,
    ) -> Result<ReadOnlyResponse, ClientError> {
        let url = self.url(&format!("/contracts/{}/call-read/{}", self.contract_id, function));
        let resp = self
            .client
            .post(url)
            .json(&json!({ "sender": self.read_sender(), "arguments": arguments }))
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn public_call(&self, function: &str, arguments: Vec<Value>) -> Result<String, ClientError> {
        let session = self.session.as_ref().ok_or(ClientError::NotConnected)?;
        let url = self.url(&format!("/contracts/{}/call/{}", self.contract_id, function));
        let resp = self
            .client
            .post(url)
            .bearer_auth(&session.token)
            .json(&json!({ "arguments": arguments }))
            .send()
            .await?;
        let submitted: PublicCallResponse = check(resp).await?.json().await?;

        debug!("Submitted {} as {}", function, submitted.tx_id);
        Ok(submitted.tx_id)
    }
}

async fn check(resp: Response) -> Result<Response, ClientError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Status { status, body })
}
