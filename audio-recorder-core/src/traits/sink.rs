use std::io;

/// Kind of bytes a sink is about to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkSection {
    Header,
    Data,
}

/// Seekable, length-settable byte destination for an encoded container.
///
/// Multi-byte writes are little-endian. Any random-access writable stream
/// satisfies it; see `FileSink` and `MemorySink`.
pub trait Sink: Send {
    /// Announce what the following writes carry. Sinks may store header and
    /// payload separately; the default ignores it.
    fn set_section(&mut self, _section: SinkSection) {}

    fn set_length(&mut self, length: u64) -> io::Result<()>;

    fn seek(&mut self, position: u64) -> io::Result<()>;

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()>;

    fn write_u32_le(&mut self, value: u32) -> io::Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    fn write_u16_le(&mut self, value: u16) -> io::Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    fn close(&mut self) -> io::Result<()>;
}

impl Sink for Box<dyn Sink> {
    fn set_section(&mut self, section: SinkSection) {
        (**self).set_section(section)
    }

    fn set_length(&mut self, length: u64) -> io::Result<()> {
        (**self).set_length(length)
    }

    fn seek(&mut self, position: u64) -> io::Result<()> {
        (**self).seek(position)
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write_bytes(data)
    }

    fn write_u32_le(&mut self, value: u32) -> io::Result<()> {
        (**self).write_u32_le(value)
    }

    fn write_u16_le(&mut self, value: u16) -> io::Result<()> {
        (**self).write_u16_le(value)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}
