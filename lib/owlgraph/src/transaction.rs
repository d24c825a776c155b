//! The transactional HTTP protocol of the graph store.
//!
//! A transaction is opened by posting an empty statement list to the
//! transaction endpoint, which answers with the location of the new
//! transaction. Statements are then posted to this location one request at a
//! time and the transaction is committed by posting to `{location}/commit`.
//! Every answer is a JSON envelope with an `errors` array: a non-empty array is
//! the only failure signal, whatever the HTTP status code is.

use crate::error::StoreError;
use crate::mutation::Statement;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use tracing::debug;

/// The `tracing` target every statement sent to the store is logged at, with `debug` level.
pub const CYPHER_LOG_TARGET: &str = "owlgraph::cypher";

/// A raw answer of the graph store.
#[derive(Debug, Clone, Default)]
pub struct TransportResponse {
    pub status: u16,
    /// The `Location` header, if any.
    pub location: Option<String>,
    pub body: Vec<u8>,
}

/// Sends JSON payloads to the graph store.
pub trait Transport {
    /// Posts `body` to `url` and returns the answer, whatever its status code.
    fn post(&self, url: &str, body: Vec<u8>) -> io::Result<TransportResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post(&self, url: &str, body: Vec<u8>) -> io::Result<TransportResponse> {
        (*self).post(url, body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Idle,
    Open,
    Committed,
    Aborted,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "not started",
            Self::Open => "open",
            Self::Committed => "committed",
            Self::Aborted => "aborted",
        })
    }
}

#[derive(Serialize)]
struct Request<'a> {
    statements: &'a [&'a Statement],
}

#[derive(Deserialize)]
struct Envelope {
    errors: Option<Vec<ServerError>>,
    #[serde(default)]
    commit: Option<String>,
}

#[derive(Deserialize)]
struct ServerError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// A single remote transaction, used once.
///
/// Any failure moves the transaction to [`TransactionState::Aborted`]: nothing is
/// retried and the statements already sent are left to the store.
///
/// ```no_run
/// use owlgraph::{HttpTransport, Statement, StoreConfig, Transaction};
///
/// let config = StoreConfig::default();
/// let transport = HttpTransport::new(&config)?;
/// let mut transaction = Transaction::new(&transport, config.transaction_url());
/// transaction.begin()?;
/// transaction.append(&Statement::new("MERGE (n:`Class` {uri: $uri})").with_parameter("uri", "http://example.com/A"))?;
/// transaction.commit()?;
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub struct Transaction<T: Transport> {
    transport: T,
    url: String,
    handle: Option<String>,
    state: TransactionState,
    statement_count: usize,
}

impl<T: Transport> Transaction<T> {
    /// `url` is the transaction endpoint, e.g. `http://localhost:7474/db/data/transaction`.
    pub fn new(transport: T, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into().trim_end_matches('/').to_owned(),
            handle: None,
            state: TransactionState::Idle,
            statement_count: 0,
        }
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// The identifier the store gave to the transaction, once opened.
    pub fn handle(&self) -> Option<&str> {
        self.handle.as_deref()
    }

    /// Number of statements accepted by the store so far.
    pub fn statement_count(&self) -> usize {
        self.statement_count
    }

    /// Opens the transaction.
    pub fn begin(&mut self) -> Result<(), StoreError> {
        self.expect_state(TransactionState::Idle)?;
        let result = self.send(&self.url.clone(), &[]).and_then(|(response, envelope)| {
            let handle = response
                .location
                .as_deref()
                .and_then(handle_from_location)
                .or_else(|| envelope.commit.as_deref().and_then(handle_from_commit_url))
                .ok_or(StoreError::MissingHandle)?;
            debug!(
                location = response.location.as_deref().unwrap_or_default(),
                status = response.status,
                "Transaction initialized"
            );
            Ok(handle.to_owned())
        });
        self.handle = Some(self.track(result)?);
        self.state = TransactionState::Open;
        Ok(())
    }

    /// Sends one statement inside of the open transaction.
    pub fn append(&mut self, statement: &Statement) -> Result<(), StoreError> {
        self.expect_state(TransactionState::Open)?;
        let url = self.handle_url("");
        let result = self.send(&url, &[statement]);
        self.track(result)?;
        self.statement_count += 1;
        Ok(())
    }

    /// Commits the transaction.
    pub fn commit(&mut self) -> Result<(), StoreError> {
        self.expect_state(TransactionState::Open)?;
        let url = self.handle_url("/commit");
        let result = self.send(&url, &[]);
        let (response, _) = self.track(result)?;
        debug!(
            status = response.status,
            statements = self.statement_count,
            "Transaction committed"
        );
        self.state = TransactionState::Committed;
        Ok(())
    }

    fn handle_url(&self, suffix: &str) -> String {
        format!(
            "{}/{}{suffix}",
            self.url,
            self.handle.as_deref().unwrap_or_default()
        )
    }

    fn expect_state(&self, expected: TransactionState) -> Result<(), StoreError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(StoreError::InvalidState(self.state))
        }
    }

    fn track<R>(&mut self, result: Result<R, StoreError>) -> Result<R, StoreError> {
        if result.is_err() {
            self.state = TransactionState::Aborted;
        }
        result
    }

    fn send(
        &self,
        url: &str,
        statements: &[&Statement],
    ) -> Result<(TransportResponse, Envelope), StoreError> {
        let payload = serde_json::to_vec(&Request { statements }).map_err(io::Error::from)?;
        if let [statement] = statements {
            debug!(
                target: CYPHER_LOG_TARGET,
                parameters = %serde_json::Value::Object(statement.parameters.clone()),
                "{}",
                statement.statement
            );
        }
        let response = self.transport.post(url, payload)?;
        let envelope = parse_envelope(&response.body)?;
        Ok((response, envelope))
    }
}

fn parse_envelope(body: &[u8]) -> Result<Envelope, StoreError> {
    let envelope: Envelope = serde_json::from_slice(body).map_err(|e| {
        StoreError::InvalidResponse(format!(
            "{e} in {}",
            String::from_utf8_lossy(body).chars().take(200).collect::<String>()
        ))
    })?;
    let Some(errors) = &envelope.errors else {
        return Err(StoreError::InvalidResponse(
            "the answer has no errors array".into(),
        ));
    };
    if let Some(error) = errors.first() {
        return Err(StoreError::Server {
            code: error.code.clone(),
            message: error.message.clone(),
        });
    }
    Ok(envelope)
}

/// `http://localhost:7474/db/data/transaction/7` -> `7`
fn handle_from_location(location: &str) -> Option<&str> {
    let handle = location.trim_end_matches('/').rsplit('/').next()?;
    (!handle.is_empty() && !handle.contains(':')).then_some(handle)
}

/// `http://localhost:7474/db/data/transaction/7/commit` -> `7`
fn handle_from_commit_url(commit: &str) -> Option<&str> {
    handle_from_location(commit.trim_end_matches('/').strip_suffix("/commit")?)
}
