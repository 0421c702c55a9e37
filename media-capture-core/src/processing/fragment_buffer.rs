/// Ordered buffer of encoded fragments.
///
/// Insertion order is emission order, which is the order required to
/// reassemble the container. Wrap in `Arc<parking_lot::Mutex<_>>` (or keep
/// inside a mutex-protected struct) for access from encoder callbacks.
///
/// Empty fragments are never stored.
#[derive(Debug, Default)]
pub struct FragmentBuffer {
    fragments: Vec<Vec<u8>>,
    total_size: u64,
}

impl FragmentBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment. Returns `false` if it was empty and dropped.
    pub fn push(&mut self, fragment: &[u8]) -> bool {
        if fragment.is_empty() {
            return false;
        }
        self.fragments.push(fragment.to_vec());
        self.total_size += fragment.len() as u64;
        true
    }

    /// Join all fragments in order into one contiguous blob.
    pub fn concat(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.total_size as usize);
        for fragment in &self.fragments {
            data.extend_from_slice(fragment);
        }
        data
    }

    /// Join all fragments and leave the buffer empty.
    pub fn take(&mut self) -> Vec<u8> {
        let data = self.concat();
        self.clear();
        data
    }

    /// Sum of fragment sizes in bytes.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Number of stored fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn clear(&mut self) {
        self.fragments.clear();
        self.total_size = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_concat_in_order() {
        let mut buf = FragmentBuffer::new();
        buf.push(&[1, 2]);
        buf.push(&[3]);
        buf.push(&[4, 5, 6]);

        assert_eq!(buf.len(), 3);
        assert_eq!(buf.total_size(), 6);
        assert_eq!(buf.concat(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn empty_fragments_are_dropped() {
        let mut buf = FragmentBuffer::new();
        assert!(!buf.push(&[]));
        assert!(buf.push(&[7]));
        assert!(!buf.push(&[]));

        assert_eq!(buf.len(), 1);
        assert_eq!(buf.total_size(), 1);
    }

    #[test]
    fn take_empties_buffer() {
        let mut buf = FragmentBuffer::new();
        buf.push(&[9, 9]);

        assert_eq!(buf.take(), vec![9, 9]);
        assert!(buf.is_empty());
        assert_eq!(buf.total_size(), 0);
        assert!(buf.concat().is_empty());
    }

    #[test]
    fn clear_resets_size() {
        let mut buf = FragmentBuffer::new();
        buf.push(&[1, 2, 3]);
        buf.clear();

        assert!(buf.is_empty());
        assert_eq!(buf.total_size(), 0);
    }
}
