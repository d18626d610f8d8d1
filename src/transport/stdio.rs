//! Newline-delimited JSON-RPC over stdin/stdout

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::session::{Exchange, Session};
use crate::error::Result;
use crate::mcp::McpHandler;

/// Serve stdin/stdout until EOF; logs must go to stderr
pub async fn serve<H: McpHandler>(handler: &H) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    run(handler, stdin, stdout).await
}

/// One session per non-empty line; each reply is written as one line
pub async fn run<H, R, W>(handler: &H, reader: R, mut writer: W) -> Result<()>
where
    H: McpHandler + ?Sized,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut session = Session::open("stdio");
        let reply = match session.exchange(handler, trimmed.as_bytes()).await {
            Some(Exchange::Reply(value)) => Some(serde_json::to_string(&value)?),
            Some(Exchange::ParseError(response)) => Some(serde_json::to_string(&response)?),
            Some(Exchange::Accepted) | None => None,
        };

        if let Some(reply) = reply {
            writer.write_all(reply.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
    }
    tracing::info!("stdin closed, shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::{McpRequest, McpResponse};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct Echo;

    #[async_trait]
    impl McpHandler for Echo {
        async fn handle_request(&self, request: McpRequest) -> Option<McpResponse> {
            if request.is_notification() {
                return None;
            }
            Some(McpResponse::success(request.id, json!(request.method)))
        }
    }

    #[tokio::test]
    async fn test_one_reply_line_per_request() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            "garbage\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
        );
        let mut output = Vec::new();
        run(&Echo, input.as_bytes(), &mut output).await.unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["result"], "ping");
        assert_eq!(lines[1]["error"]["code"], -32700);
        assert_eq!(lines[2]["id"], 2);
    }
}
