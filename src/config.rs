//! Codec configuration.

/// What to do with bits left over at the end of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingBits {
    /// Fail with a truncated-payload error.
    #[default]
    Reject,
    /// Drop them with a warning.
    Discard,
}

/// Codec configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// Handling of undecodable bits at end of input
    pub trailing_bits: TrailingBits,

    /// Buffer size for file readers and writers (bytes)
    pub buffer_capacity: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            trailing_bits: TrailingBits::default(),
            buffer_capacity: default_buffer_capacity(),
        }
    }
}

impl CodecOptions {
    pub fn with_trailing_bits(mut self, trailing_bits: TrailingBits) -> Self {
        self.trailing_bits = trailing_bits;
        self
    }

    /// Sets the file buffer size. Zero falls back to the default.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = if capacity == 0 {
            default_buffer_capacity()
        } else {
            capacity
        };
        self
    }
}

fn default_buffer_capacity() -> usize {
    1 << 16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CodecOptions::default();
        assert_eq!(options.trailing_bits, TrailingBits::Reject);
        assert_eq!(options.buffer_capacity, 1 << 16);
    }

    #[test]
    fn test_builders() {
        let options = CodecOptions::default()
            .with_trailing_bits(TrailingBits::Discard)
            .with_buffer_capacity(4096);
        assert_eq!(options.trailing_bits, TrailingBits::Discard);
        assert_eq!(options.buffer_capacity, 4096);

        assert_eq!(
            CodecOptions::default().with_buffer_capacity(0).buffer_capacity,
            1 << 16
        );
    }
}
