use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::transaction::{Transport, TransportResponse};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use oxhttp::Client;
use oxhttp::model::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, LOCATION};
use oxhttp::model::{Body, HeaderName, Method, Request, Response};
use std::io::{Error, ErrorKind, Read, Result};
use std::time::Duration;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("owl2graph/", env!("CARGO_PKG_VERSION"));
const JSON_ACCEPT: &str = "application/json; charset=UTF-8";
const REDIRECTION_LIMIT: usize = 5;

fn new_client(timeout: Option<Duration>) -> Result<Client> {
    let mut client = Client::new()
        .with_redirection_limit(REDIRECTION_LIMIT)
        .with_user_agent(USER_AGENT)
        .map_err(invalid_input_error)?;
    if let Some(timeout) = timeout {
        client = client.with_global_timeout(timeout);
    }
    Ok(client)
}

/// [`Transport`] talking to a Neo4j compatible server over HTTP.
pub struct HttpTransport {
    client: Client,
    server: String,
    rest_url: String,
    authorization: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        Ok(Self {
            client: new_client(config.timeout())?,
            server: config.server().to_owned(),
            rest_url: config.rest_url(),
            authorization: config.credentials().map(|(user, password)| {
                format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
            }),
        })
    }

    /// Checks that the server is reachable and that it accepts the credentials.
    pub fn check_server(&self) -> std::result::Result<(), StoreError> {
        info!(server = %self.server, "Checking the graph store");
        let response = self.get(&self.server)?;
        debug!(status = response.status().as_u16(), "Server root answered");
        let response = self.get(&self.rest_url)?;
        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(StoreError::Status {
                url: self.rest_url.clone(),
                status,
            });
        }
        debug!(status, "REST endpoint answered");
        Ok(())
    }

    fn get(&self, url: &str) -> Result<Response<Body>> {
        self.client.request(request(
            Method::GET,
            url,
            JSON_ACCEPT,
            self.authorization.as_deref(),
            &[],
            (),
        )?)
    }
}

impl Transport for HttpTransport {
    fn post(&self, url: &str, body: Vec<u8>) -> Result<TransportResponse> {
        let response = self.client.request(request(
            Method::POST,
            url,
            JSON_ACCEPT,
            self.authorization.as_deref(),
            &[("Content-Type", "application/json"), ("X-Stream", "true")],
            body,
        )?)?;
        Ok(TransportResponse {
            status: response.status().as_u16(),
            location: header_value(&response, LOCATION)?,
            body: read_body(response)?,
        })
    }
}

/// Downloads ontology documents with RDF content negotiation.
pub(crate) struct DocumentClient {
    client: Client,
}

impl DocumentClient {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            client: new_client(timeout)?,
        })
    }

    /// Returns the content type and the body of the document.
    pub fn get(&self, url: &str, accept: &str) -> Result<(String, Body)> {
        let response = self
            .client
            .request(request(Method::GET, url, accept, None, &[], ())?)?;
        let status = response.status();
        if !status.is_success() {
            let body = read_body(response)?;
            return Err(Error::other(format!(
                "{url} answered with status {status}: {}",
                String::from_utf8_lossy(&body)
            )));
        }
        let content_type = header_value(&response, CONTENT_TYPE)?
            .ok_or_else(|| invalid_data_error(format!("{url} did not return a Content-Type")))?;
        Ok((content_type, response.into_body()))
    }
}

fn request<B>(
    method: Method,
    url: &str,
    accept: &str,
    authorization: Option<&str>,
    headers: &[(&str, &str)],
    body: B,
) -> Result<Request<B>> {
    let mut builder = Request::builder()
        .method(method)
        .uri(url)
        .header(ACCEPT, accept);
    if let Some(authorization) = authorization {
        builder = builder.header(AUTHORIZATION, authorization);
    }
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(body).map_err(invalid_input_error)
}

fn header_value(response: &Response<Body>, name: HeaderName) -> Result<Option<String>> {
    response
        .headers()
        .get(name)
        .map(|value| value.to_str().map(ToOwned::to_owned))
        .transpose()
        .map_err(invalid_data_error)
}

fn read_body(response: Response<Body>) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    response.into_body().read_to_end(&mut body)?;
    Ok(body)
}

fn invalid_data_error(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Error {
    Error::new(ErrorKind::InvalidData, error)
}

fn invalid_input_error(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Error {
    Error::new(ErrorKind::InvalidInput, error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Answers a single GET request with `response`.
    fn respond_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/ontology", listener.local_addr().unwrap());
        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            reader.into_inner().write_all(response.as_bytes()).unwrap();
        });
        url
    }

    #[test]
    fn document_with_content_type() {
        let url = respond_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/turtle; charset=utf-8\r\nContent-Length: 2\r\nConnection: close\r\n\r\n#\n",
        );
        let (content_type, body) = DocumentClient::new(None).unwrap().get(&url, "text/turtle").unwrap();
        assert_eq!(content_type, "text/turtle; charset=utf-8");
        assert_eq!(body.to_string().unwrap(), "#\n");
    }

    #[test]
    fn document_error_status() {
        let url = respond_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 7\r\nConnection: close\r\n\r\nmissing",
        );
        let error = DocumentClient::new(None).unwrap().get(&url, "text/turtle").unwrap_err();
        let message = error.to_string();
        assert!(message.contains("404"), "{message}");
        assert!(message.contains("missing"), "{message}");
    }

    #[test]
    fn document_without_content_type() {
        let url = respond_once("HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let error = DocumentClient::new(None).unwrap().get(&url, "text/turtle").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidData);
    }
}
