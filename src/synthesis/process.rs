use std::process::Stdio;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use log::{error, warn, debug};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::errors::SynthesisError;
use crate::subtitle_timing::{BoundaryEvent, BoundaryKind};
use crate::synthesis::{SpeechSynthesizer, SynthesisChunk, SynthesisStream};

// @module: External synthesis command adapter

/// Capacity of the chunk channel between producer task and consumer
const STREAM_CHANNEL_CAPACITY: usize = 64;

/// One newline-delimited JSON record on the synthesis wire.
///
/// `audio` records carry base64 payload in `data`; boundary records carry
/// `offset`/`duration` in milliseconds plus the spoken `text`.
#[derive(Debug, Deserialize)]
struct WireRecord {
    #[serde(rename = "type")]
    kind: String,

    #[serde(default)]
    data: Option<String>,

    #[serde(default)]
    offset: Option<u64>,

    #[serde(default)]
    duration: Option<u64>,

    #[serde(default)]
    text: Option<String>,
}

/// How the external command delivers its output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WireMode {
    /// Newline-delimited JSON records with audio and boundary events
    Streaming,
    /// Raw encoded audio bytes on stdout, no timing information
    Raw,
}

/// Synthesizer that shells out to a configured external command.
///
/// The command template may reference `{text}` and `{voice}` placeholders in
/// its arguments; they are substituted per request.
#[derive(Debug, Clone)]
pub struct ProcessSynthesizer {
    program: String,
    args: Vec<String>,
    mode: WireMode,
}

impl ProcessSynthesizer {
    /// Adapter for an engine that streams timed JSON records
    pub fn streaming(program: impl Into<String>, args: Vec<String>) -> Self {
        ProcessSynthesizer {
            program: program.into(),
            args,
            mode: WireMode::Streaming,
        }
    }

    /// Adapter for a fallback engine that writes raw audio to stdout
    pub fn raw(program: impl Into<String>, args: Vec<String>) -> Self {
        ProcessSynthesizer {
            program: program.into(),
            args,
            mode: WireMode::Raw,
        }
    }

    fn expanded_args(&self, text: &str, voice: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace("{text}", text).replace("{voice}", voice))
            .collect()
    }
}

#[async_trait]
impl SpeechSynthesizer for ProcessSynthesizer {
    fn provides_boundaries(&self) -> bool {
        self.mode == WireMode::Streaming
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<SynthesisStream, SynthesisError> {
        let args = self.expanded_args(text, voice);
        debug!("Starting synthesis engine: {} ({} args)", self.program, args.len());

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SynthesisError::Unavailable(format!("{}: {}", self.program, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SynthesisError::StreamFailed("stdout not captured".to_string()))?;

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        let mode = self.mode;
        let program = self.program.clone();

        tokio::spawn(async move {
            let result = match mode {
                WireMode::Streaming => pump_records(stdout, &tx).await,
                WireMode::Raw => pump_raw(stdout, &tx).await,
            };
            if let Err(e) = result {
                error!("Synthesis stream from {} failed: {}", program, e);
            }

            match child.wait().await {
                Ok(status) if !status.success() => {
                    error!("Synthesis engine {} exited with {}", program, status);
                }
                Err(e) => error!("Failed to reap synthesis engine {}: {}", program, e),
                _ => {}
            }
            // Dropping tx closes the stream for the consumer
        });

        Ok(rx)
    }
}

/// Forward newline-delimited JSON records into the chunk channel
async fn pump_records(
    stdout: tokio::process::ChildStdout,
    tx: &mpsc::Sender<SynthesisChunk>,
) -> std::io::Result<()> {
    let mut lines = BufReader::new(stdout).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record: WireRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping unparseable synthesis record: {}", e);
                continue;
            }
        };

        let chunk = match record.kind.as_str() {
            "audio" => match record.data.as_deref().map(|d| BASE64.decode(d)) {
                Some(Ok(payload)) => SynthesisChunk::Audio(Bytes::from(payload)),
                Some(Err(e)) => {
                    warn!("Skipping audio record with invalid payload: {}", e);
                    continue;
                }
                None => {
                    warn!("Skipping audio record without payload");
                    continue;
                }
            },
            "WordBoundary" | "SentenceBoundary" => {
                let kind = if record.kind == "WordBoundary" {
                    BoundaryKind::Word
                } else {
                    BoundaryKind::Sentence
                };
                SynthesisChunk::Boundary(BoundaryEvent::new(
                    kind,
                    record.text.unwrap_or_default(),
                    record.offset.unwrap_or(0),
                    record.duration.unwrap_or(0),
                ))
            }
            other => {
                warn!("Skipping unknown synthesis record type: {}", other);
                continue;
            }
        };

        if tx.send(chunk).await.is_err() {
            // Consumer went away; stop pumping
            break;
        }
    }

    Ok(())
}

/// Forward raw stdout bytes into the chunk channel as audio
async fn pump_raw(
    mut stdout: tokio::process::ChildStdout,
    tx: &mpsc::Sender<SynthesisChunk>,
) -> std::io::Result<()> {
    let mut buf = [0u8; 8192];

    loop {
        let n = stdout.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        if tx
            .send(SynthesisChunk::Audio(Bytes::copy_from_slice(&buf[..n])))
            .await
            .is_err()
        {
            break;
        }
    }

    Ok(())
}
