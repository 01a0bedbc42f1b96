/// Circular byte buffer between a device callback and the acquisition thread.
///
/// Wrap in `parking_lot::Mutex` for cross-thread access.
///
/// Overflow behavior: drops the oldest bytes.
#[derive(Debug)]
pub struct RingBuffer {
    buffer: Vec<u8>,
    write_index: usize,
    read_index: usize,
    available: usize,
    dropped: u64,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity.max(1)],
            write_index: 0,
            read_index: 0,
            available: 0,
            dropped: 0,
        }
    }

    /// Append bytes, dropping the oldest on overflow.
    ///
    /// Returns how many older bytes were dropped to make room.
    pub fn write(&mut self, data: &[u8]) -> usize {
        if data.is_empty() {
            return 0;
        }
        let capacity = self.capacity();

        let mut dropped = 0;
        let data = if data.len() > capacity {
            dropped += data.len() - capacity;
            &data[data.len() - capacity..]
        } else {
            data
        };

        let overflow = (self.available + data.len()).saturating_sub(capacity);
        if overflow > 0 {
            self.read_index = (self.read_index + overflow) % capacity;
            self.available -= overflow;
            dropped += overflow;
        }

        let first = data.len().min(capacity - self.write_index);
        self.buffer[self.write_index..self.write_index + first].copy_from_slice(&data[..first]);
        self.buffer[..data.len() - first].copy_from_slice(&data[first..]);
        self.write_index = (self.write_index + data.len()) % capacity;
        self.available += data.len();

        self.dropped += dropped as u64;
        dropped
    }

    /// Move up to `out.len()` bytes into `out`. Returns how many were copied.
    pub fn read_into(&mut self, out: &mut [u8]) -> usize {
        let to_read = out.len().min(self.available);
        if to_read == 0 {
            return 0;
        }
        let capacity = self.capacity();

        let first = to_read.min(capacity - self.read_index);
        out[..first].copy_from_slice(&self.buffer[self.read_index..self.read_index + first]);
        out[first..to_read].copy_from_slice(&self.buffer[..to_read - first]);
        self.read_index = (self.read_index + to_read) % capacity;
        self.available -= to_read;
        to_read
    }

    pub fn count(&self) -> usize {
        self.available
    }

    pub fn is_empty(&self) -> bool {
        self.available == 0
    }

    /// Total bytes lost to overflow since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn reset(&mut self) {
        self.write_index = 0;
        self.read_index = 0;
        self.available = 0;
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}
