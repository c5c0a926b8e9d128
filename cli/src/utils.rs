use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Ask for the host data directory on stdin. End of input yields an empty
/// answer, which the path resolver rejects.
pub async fn prompt_for_path(question: &str) -> std::io::Result<String> {
    let mut stderr = tokio::io::stderr();
    stderr.write_all(question.as_bytes()).await?;
    stderr.flush().await?;

    read_answer(BufReader::new(tokio::io::stdin())).await
}

async fn read_answer<R: AsyncBufRead + Unpin>(mut reader: R) -> std::io::Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line).await?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Interrupt and terminate handlers, registered as soon as this is created so
/// that a signal arriving before the stack starts is not lost.
pub struct Shutdown {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl Shutdown {
    #[cfg(unix)]
    pub fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {})
    }

    #[cfg(unix)]
    pub async fn wait(mut self) {
        tokio::select! {
            _ = self.interrupt.recv() => {
                tracing::info!("Received SIGINT (Ctrl+C)");
            }
            _ = self.terminate.recv() => {
                tracing::info!("Received SIGTERM");
            }
        }
    }

    #[cfg(not(unix))]
    pub async fn wait(self) {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C");
    }
}
