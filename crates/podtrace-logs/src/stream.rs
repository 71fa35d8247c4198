use std::io::BufRead;

use podtrace_types::KubeletEvent;

use crate::buffer::EventBuffer;
use crate::error::PipelineError;
use crate::filter::{FilterDecision, RelevanceFilter};
use crate::parser::LogParser;

/// Counters gathered while reading a log stream
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Lines read from the input
    pub lines: u64,

    /// Lines without any JSON payload
    pub discarded: u64,

    /// Lines turned into events (malformed ones included)
    pub extracted: u64,

    /// Events accepted onto the timeline
    pub accepted: u64,

    /// Whether reading ended on the early stop
    pub stopped_early: bool,
}

/// Drives lines from a reader through the parser and the relevance filter
pub struct LogStream {
    filter: RelevanceFilter,
    buffer: EventBuffer,
    stats: StreamStats,
}

impl LogStream {
    pub fn new(filter: RelevanceFilter) -> Self {
        Self {
            filter,
            buffer: EventBuffer::new(),
            stats: StreamStats::default(),
        }
    }

    /// Offer one raw line. Returns `false` once no more input should be read.
    fn feed_line(&mut self, line: &str) -> bool {
        self.stats.lines += 1;

        let Some(event) = LogParser::parse(line) else {
            self.stats.discarded += 1;
            return true;
        };
        self.stats.extracted += 1;

        match self.filter.check(&event) {
            FilterDecision::Accept => {
                self.stats.accepted += 1;
                self.buffer.push(event);
                true
            }
            FilterDecision::Reject => true,
            FilterDecision::Stop => {
                self.stats.stopped_early = true;
                false
            }
        }
    }

    /// Read `reader` line by line until it is exhausted or the filter stops.
    ///
    /// Invalid UTF-8 is replaced rather than treated as an error; only real
    /// read failures are returned.
    pub fn consume<R: BufRead>(&mut self, mut reader: R) -> Result<(), PipelineError> {
        let mut raw = Vec::new();
        loop {
            raw.clear();
            if reader.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);
            if !self.feed_line(line) {
                break;
            }
        }
        Ok(())
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    pub fn buffer(&self) -> &EventBuffer {
        &self.buffer
    }

    /// Finish reading and return the accepted events in timestamp order
    pub fn finish(self) -> Result<(Vec<KubeletEvent>, StreamStats), PipelineError> {
        if self.buffer.is_empty() {
            return Err(PipelineError::NoMessages {
                pod: self.filter.pod().to_string(),
            });
        }
        Ok((self.buffer.into_sorted(), self.stats))
    }
}
