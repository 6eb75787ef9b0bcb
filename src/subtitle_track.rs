use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use anyhow::{Result, Context};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

// @module: Subtitle cues and SRT interchange format

// @const: SRT timestamp regex (hours are unbounded, not wrapped at 24)
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2,}):(\d{2}):(\d{2}),(\d{3})$").unwrap()
});

/// Local parse failure for one SRT block. Recovered by skipping the block,
/// never fatal for the whole document.
#[derive(Error, Debug)]
pub enum MalformedCueBlock {
    /// Block has fewer than index + timing + text lines
    #[error("block has only {0} lines")]
    TooShort(usize),

    /// Timing line does not contain exactly one arrow separator
    #[error("timing line has {0} arrow separators")]
    BadTimingLine(usize),

    /// One side of the timing line is not a valid timestamp
    #[error("invalid timestamp: {0}")]
    BadTimestamp(String),

    /// Start and end are inverted
    #[error("cue ends ({end_ms}ms) before it starts ({start_ms}ms)")]
    InvertedRange {
        start_ms: u64,
        end_ms: u64,
    },
}

// @struct: Single timed subtitle cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    // @field: Start time in ms from the beginning of the audio
    pub start_ms: u64,

    // @field: End time in ms
    pub end_ms: u64,

    // @field: Cue text (may span multiple lines)
    pub text: String,
}

impl Cue {
    /// Creates a new cue - used by tests and the aggregation layer
    pub fn new(start_ms: u64, end_ms: u64, text: String) -> Self {
        Cue { start_ms, end_ms, text }
    }

    /// Parse an SRT timestamp (HH:MM:SS,mmm) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        let caps = TIMESTAMP_REGEX
            .captures(timestamp.trim())
            .ok_or_else(|| anyhow::anyhow!("Invalid timestamp format: {}", timestamp))?;

        let hours: u64 = caps[1].parse().context("Failed to parse hours")?;
        let minutes: u64 = caps[2].parse().context("Failed to parse minutes")?;
        let seconds: u64 = caps[3].parse().context("Failed to parse seconds")?;
        let millis: u64 = caps[4].parse().context("Failed to parse milliseconds")?;

        if minutes >= 60 || seconds >= 60 {
            return Err(anyhow::anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Duration covered by this cue
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} --> {}",
            Self::format_timestamp(self.start_ms),
            Self::format_timestamp(self.end_ms)
        )
    }
}

/// Ordered, non-overlapping sequence of cues for one narration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueTrack {
    /// Cues in playback order
    pub cues: Vec<Cue>,
}

impl CueTrack {
    /// Create an empty track
    pub fn new() -> Self {
        CueTrack { cues: Vec::new() }
    }

    /// Create a track from already-ordered cues
    pub fn from_cues(cues: Vec<Cue>) -> Self {
        CueTrack { cues }
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// End of the last cue, i.e. the span the track covers
    pub fn total_span_ms(&self) -> u64 {
        self.cues.last().map_or(0, |c| c.end_ms)
    }

    /// Whether cues are ordered and non-overlapping: cue[i].end <= cue[i+1].start
    pub fn is_monotonic(&self) -> bool {
        self.cues
            .windows(2)
            .all(|pair| pair[0].end_ms <= pair[1].start_ms)
    }

    /// Encode the track as an SRT document.
    ///
    /// Blocks get ascending 1-based indices. Cues whose text is empty after
    /// trimming are skipped rather than emitted as degenerate blocks. An empty
    /// track encodes to an empty document.
    pub fn to_srt_string(&self) -> String {
        let mut out = String::new();
        let mut index = 1;

        for cue in &self.cues {
            let text = cue.text.trim();
            if text.is_empty() {
                continue;
            }
            out.push_str(&index.to_string());
            out.push('\n');
            out.push_str(&format!("{}\n", cue));
            out.push_str(text);
            out.push_str("\n\n");
            index += 1;
        }

        out
    }

    /// Decode an SRT document into a track.
    ///
    /// Decoding is tolerant: malformed blocks are skipped with a warning and
    /// the result degrades to a shorter track. This never fails on individual
    /// block damage, so the return is the track itself, not a Result.
    pub fn parse_srt_string(content: &str) -> Self {
        let mut cues = Vec::new();

        for block in content.split("\n\n") {
            let block = block.trim();
            if block.is_empty() {
                continue;
            }
            match Self::parse_block(block) {
                Ok(cue) => cues.push(cue),
                Err(e) => warn!("Skipping malformed cue block: {}", e),
            }
        }

        // Sort by start time to guarantee playback order regardless of the
        // order blocks appeared in the file
        cues.sort_by_key(|cue| cue.start_ms);

        CueTrack { cues }
    }

    /// Parse one SRT block: index line, timing line, one or more text lines
    fn parse_block(block: &str) -> Result<Cue, MalformedCueBlock> {
        let lines: Vec<&str> = block.lines().collect();
        if lines.len() < 3 {
            return Err(MalformedCueBlock::TooShort(lines.len()));
        }

        // lines[0] is the block index; regenerated on encode, so its value is
        // not trusted here
        let timing = lines[1].trim();
        let sides: Vec<&str> = timing.split("-->").collect();
        if sides.len() != 2 {
            return Err(MalformedCueBlock::BadTimingLine(sides.len().saturating_sub(1)));
        }

        let start_ms = Cue::parse_timestamp(sides[0])
            .map_err(|_| MalformedCueBlock::BadTimestamp(sides[0].trim().to_string()))?;
        let end_ms = Cue::parse_timestamp(sides[1])
            .map_err(|_| MalformedCueBlock::BadTimestamp(sides[1].trim().to_string()))?;

        if end_ms < start_ms {
            return Err(MalformedCueBlock::InvertedRange { start_ms, end_ms });
        }

        Ok(Cue {
            start_ms,
            end_ms,
            text: lines[2..].join("\n").trim().to_string(),
        })
    }

    /// Write the track to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;
        file.write_all(self.to_srt_string().as_bytes())
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;

        Ok(())
    }

    /// Read and decode an SRT file
    pub fn from_srt_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read subtitle file: {}", path.as_ref().display()))?;
        Ok(Self::parse_srt_string(&content))
    }
}

impl fmt::Display for CueTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Cue Track")?;
        writeln!(f, "Cues: {}", self.cues.len())?;
        writeln!(f, "Span: {}", Cue::format_timestamp(self.total_span_ms()))?;
        Ok(())
    }
}
