//! Ollama client for a locally running daemon.

use async_trait::async_trait;
use futures_util::stream::{self, Stream};
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::{debug, info};
use url::Url;

use crate::agent::message::turn;
use crate::error::Error;
use crate::Result;

use super::types::OllamaChunk;
use super::{ChunkStream, LlmClient};

/// Client for the Ollama `/api/chat` endpoint.
#[derive(Clone)]
pub struct OllamaClient {
    endpoint: Url,
    model: String,
    system_prompt: String,
    client: Client,
}

impl OllamaClient {
    /// Probe the daemon once, then return a client bound to `model`.
    ///
    /// A daemon that cannot be reached fails with [`Error::DaemonUnreachable`];
    /// one that answers with anything but `200 OK` fails with
    /// [`Error::DaemonUnhealthy`].
    pub async fn connect(endpoint: Url, model: &str, system_prompt: &str) -> Result<Self> {
        let client = Client::new();
        require_running(&client, &endpoint).await?;
        info!("Ollama is up at {endpoint}");

        Ok(Self {
            endpoint,
            model: model.to_string(),
            system_prompt: system_prompt.to_string(),
            client,
        })
    }

    fn chat_url(&self) -> Result<Url> {
        self.endpoint
            .join("api/chat")
            .map_err(|e| Error::InvalidEndpoint(self.endpoint.to_string(), e.to_string()))
    }
}

async fn require_running(client: &Client, endpoint: &Url) -> Result<()> {
    let response = client.get(endpoint.clone()).send().await.map_err(|e| {
        debug!("Ollama liveness probe failed: {e}");
        Error::DaemonUnreachable(endpoint.to_string())
    })?;

    match response.status() {
        StatusCode::OK => Ok(()),
        status => Err(Error::DaemonUnhealthy(format!("{status} from {endpoint}"))),
    }
}

/// Decode one NDJSON line into the text it carries.
fn parse_chunk(line: &str) -> Result<String> {
    let chunk: OllamaChunk = serde_json::from_str(line)?;

    if let Some(error) = &chunk.error {
        return Err(Error::Llm(format!("Ollama error: {error}")));
    }
    if chunk.done {
        debug!("Ollama finished, eval_count={:?}", chunk.eval_count);
    }

    Ok(chunk.message.map(|m| m.content).unwrap_or_default())
}

/// Split a byte stream into non-empty, trimmed lines.
fn ndjson_lines<S, B, E>(bytes: S) -> impl Stream<Item = Result<String>>
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Into<Error>,
{
    stream::unfold((bytes, Vec::new(), false), |(mut bytes, mut buffer, mut exhausted)| async move {
        loop {
            if let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line).trim().to_string();
                if line.is_empty() {
                    continue;
                }
                return Some((Ok(line), (bytes, buffer, exhausted)));
            }

            if exhausted {
                let rest = String::from_utf8_lossy(&buffer).trim().to_string();
                buffer.clear();
                if rest.is_empty() {
                    return None;
                }
                return Some((Ok(rest), (bytes, buffer, exhausted)));
            }

            match bytes.next().await {
                Some(Ok(chunk)) => buffer.extend_from_slice(chunk.as_ref()),
                Some(Err(e)) => {
                    buffer.clear();
                    return Some((Err(e.into()), (bytes, buffer, true)));
                }
                None => exhausted = true,
            }
        }
    })
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn stream(&self, message: &str) -> Result<ChunkStream> {
        let request = json!({
            "model": self.model,
            "messages": turn(&self.system_prompt, message),
            "stream": true
        });

        debug!("Sending turn to Ollama model {}", self.model);

        let response = self.client.post(self.chat_url()?).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(Error::Llm(format!("Ollama error ({status}): {error_text}")));
        }

        let lines = ndjson_lines(Box::pin(response.bytes_stream()));
        Ok(lines
            .map(|line| line.and_then(|line| parse_chunk(&line)))
            .boxed())
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const NDJSON_BODY: &str = concat!(
        "{\"model\":\"llama3.2\",\"message\":{\"role\":\"assistant\",\"content\":\"Hello\"},\"done\":false}\n",
        "{\"model\":\"llama3.2\",\"message\":{\"role\":\"assistant\",\"content\":\" from llama\"},\"done\":false}\n",
        "{\"model\":\"llama3.2\",\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true,\"eval_count\":7}\n",
    );

    async fn healthy_server() -> mockito::ServerGuard {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .with_status(200)
            .with_body("Ollama is running")
            .create_async()
            .await;
        server
    }

    #[tokio::test]
    async fn test_unreachable_daemon() {
        // Nothing listens on port 1.
        let endpoint = Url::parse("http://127.0.0.1:1").unwrap();
        let err = OllamaClient::connect(endpoint, "llama3.2", "hi").await.err().unwrap();

        assert!(matches!(err, Error::DaemonUnreachable(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_unhealthy_daemon_is_distinct() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/").with_status(500).create_async().await;

        let endpoint = Url::parse(&server.url()).unwrap();
        let err = OllamaClient::connect(endpoint, "llama3.2", "hi").await.err().unwrap();

        assert!(matches!(err, Error::DaemonUnhealthy(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_chat_streams_ndjson() {
        let mut server = healthy_server().await;
        let chat = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::PartialJson(json!({
                "model": "llama3.2",
                "stream": true,
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hi"}
                ]
            })))
            .with_header("content-type", "application/x-ndjson")
            .with_body(NDJSON_BODY)
            .create_async()
            .await;

        let endpoint = Url::parse(&server.url()).unwrap();
        let client = OllamaClient::connect(endpoint, "llama3.2", "be brief").await.unwrap();

        assert_eq!(client.run("hi").await.unwrap(), "Hello from llama");
        chat.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_line_fails_turn() {
        let mut server = healthy_server().await;
        server
            .mock("POST", "/api/chat")
            .with_body("{\"error\":\"model 'llama3.2' not found\"}\n")
            .create_async()
            .await;

        let endpoint = Url::parse(&server.url()).unwrap();
        let client = OllamaClient::connect(endpoint, "llama3.2", "be brief").await.unwrap();

        let err = client.run("hi").await.unwrap_err();
        assert!(matches!(err, Error::Llm(_)));
    }

    #[tokio::test]
    async fn test_lines_split_across_chunks() {
        let parts: Vec<std::result::Result<&[u8], Error>> = vec![
            Ok(b"{\"a\":1}\n{\"b\""),
            Ok(b":2}\n\n"),
            Ok(b"{\"c\":3}"),
        ];
        let lines: Vec<String> = ndjson_lines(stream::iter(parts))
            .map(|l| l.unwrap())
            .collect()
            .await;

        assert_eq!(lines, vec!["{\"a\":1}", "{\"b\":2}", "{\"c\":3}"]);
    }
}
