//! Byte-bounded accumulator of messages awaiting dispatch.

/// A batch of messages bounded by a byte-size budget.
///
/// Not concurrency-safe; the aggregator is its sole owner and mutator.
#[derive(Debug)]
pub struct Batch {
    max_size_bytes: usize,
    size_bytes: usize,
    messages: Vec<String>,
}

impl Batch {
    /// Create an empty batch with the given byte budget.
    pub fn new(max_size_bytes: usize) -> Self {
        Self {
            max_size_bytes,
            size_bytes: 0,
            messages: Vec::new(),
        }
    }

    /// The configured byte budget.
    pub fn max_size_bytes(&self) -> usize {
        self.max_size_bytes
    }

    /// Sum of byte lengths of the held messages.
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Number of held messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when no messages are held.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a message if it fits within the remaining budget.
    ///
    /// On rejection the message is handed back unchanged and the batch is
    /// left exactly as it was, so the caller can flush and retry. A
    /// zero-byte message always fits.
    pub fn add(&mut self, message: String) -> Result<(), String> {
        if self.size_bytes + message.len() > self.max_size_bytes {
            return Err(message);
        }

        self.size_bytes += message.len();
        self.messages.push(message);

        Ok(())
    }

    /// Atomically take the contents and byte count, resetting to empty.
    ///
    /// Never fails; an empty batch yields an empty vec and 0. The
    /// replacement vec is pre-sized to the drained length to reduce
    /// reallocation on the next fill.
    pub fn flush(&mut self) -> (Vec<String>, usize) {
        let capacity = self.messages.len();
        let messages = std::mem::replace(&mut self.messages, Vec::with_capacity(capacity));

        let size_bytes = self.size_bytes;
        self.size_bytes = 0;

        (messages, size_bytes)
    }
}
