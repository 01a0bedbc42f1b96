use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::traits::sink::{Sink, SinkSection};

#[derive(Debug, Default)]
struct MemoryState {
    data: Vec<u8>,
    position: usize,
    section: Option<SinkSection>,
    header_bytes: u64,
    data_bytes: u64,
    closes: usize,
}

/// In-memory sink. Clones share the same buffer, so a handle kept by the
/// caller can inspect what the recorder wrote after the sink was moved away.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from pre-existing content, positioned at its start.
    pub fn with_contents(data: Vec<u8>) -> Self {
        let sink = Self::new();
        sink.state.lock().data = data;
        sink
    }

    pub fn contents(&self) -> Vec<u8> {
        self.state.lock().data.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closes > 0
    }

    pub fn close_count(&self) -> usize {
        self.state.lock().closes
    }

    /// Bytes written while `section` was announced.
    pub fn bytes_written_in(&self, section: SinkSection) -> u64 {
        let state = self.state.lock();
        match section {
            SinkSection::Header => state.header_bytes,
            SinkSection::Data => state.data_bytes,
        }
    }

    fn ensure_open(state: &MemoryState) -> io::Result<()> {
        if state.closes > 0 {
            return Err(io::Error::other("sink is closed"));
        }
        Ok(())
    }
}

impl Sink for MemorySink {
    fn set_section(&mut self, section: SinkSection) {
        self.state.lock().section = Some(section);
    }

    fn set_length(&mut self, length: u64) -> io::Result<()> {
        let mut state = self.state.lock();
        Self::ensure_open(&state)?;
        state.data.resize(length as usize, 0);
        Ok(())
    }

    fn seek(&mut self, position: u64) -> io::Result<()> {
        let mut state = self.state.lock();
        Self::ensure_open(&state)?;
        state.position = position as usize;
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        let mut state = self.state.lock();
        Self::ensure_open(&state)?;

        let start = state.position;
        let end = start + data.len();
        if state.data.len() < end {
            state.data.resize(end, 0);
        }
        state.data[start..end].copy_from_slice(data);
        state.position = end;

        let section = state.section;
        match section {
            Some(SinkSection::Header) => state.header_bytes += data.len() as u64,
            Some(SinkSection::Data) => state.data_bytes += data.len() as u64,
            None => {}
        }
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        let mut state = self.state.lock();
        Self::ensure_open(&state)?;
        state.closes += 1;
        Ok(())
    }
}
