//! Message sinks

use super::message::{extraction_time, Message};
use crate::error::{Error, Result};
use crate::types::Record;
use std::io::Write;

/// Destination of the message stream
pub trait Sink: Send {
    /// Write one message
    fn write(&mut self, message: &Message) -> Result<()>;

    /// Write a page of records for one stream, sharing one extraction time
    fn write_records(&mut self, stream: &str, records: Vec<Record>) -> Result<()> {
        let time_extracted = extraction_time();
        for record in records {
            self.write(&Message::record(stream, record, &time_extracted))?;
        }
        Ok(())
    }

    /// Make everything written so far visible downstream
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes one JSON document per line
#[derive(Debug)]
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
    lines: usize,
}

impl JsonLinesSink<std::io::Stdout> {
    /// Sink writing to standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Create a sink over any writer
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    /// Number of lines written
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Sink for JsonLinesSink<W> {
    fn write(&mut self, message: &Message) -> Result<()> {
        serde_json::to_writer(&mut self.writer, message)
            .map_err(|e| Error::output(format!("Failed to serialize message: {e}")))?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| Error::output(format!("Failed to write message: {e}")))?;
        self.lines += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| Error::output(format!("Failed to flush output: {e}")))
    }
}

/// Keeps every message in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    messages: Vec<Message>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message in write order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Records written for a stream, in order
    pub fn records(&self, stream: &str) -> Vec<&Record> {
        self.messages
            .iter()
            .filter_map(|message| match message {
                Message::Record {
                    stream: s, record, ..
                } if s == stream => Some(record),
                _ => None,
            })
            .collect()
    }

    /// Values of every state message, in order
    pub fn states(&self) -> Vec<&serde_json::Value> {
        self.messages
            .iter()
            .filter_map(|message| match message {
                Message::State { value } => Some(value),
                _ => None,
            })
            .collect()
    }

    /// Streams that received a schema message, in order
    pub fn schema_streams(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter_map(|message| match message {
                Message::Schema { stream, .. } => Some(stream.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Sink for MemorySink {
    fn write(&mut self, message: &Message) -> Result<()> {
        self.messages.push(message.clone());
        Ok(())
    }
}
