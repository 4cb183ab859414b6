//! Outbound frame layout.
//!
//! A frame is one 3-byte header cell followed by one RGB cell per LED. The
//! whole thing is sent as a flat byte slice of `3 + led_count * 3` bytes.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    // cells[0] is the header, cells[1 + i] is LED i
    cells: Vec<[u8; 3]>,
}

impl FrameBuffer {
    /// All-black frame with a zero header.
    pub fn new(led_count: usize) -> Self {
        Self {
            cells: vec![[0; 3]; led_count + 1],
        }
    }

    /// Parse a flat byte frame. Returns `None` unless the length is a
    /// non-zero multiple of three.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() || bytes.len() % 3 != 0 {
            return None;
        }
        let cells: &[[u8; 3]] = bytemuck::try_cast_slice(bytes).ok()?;
        Some(Self {
            cells: cells.to_vec(),
        })
    }

    pub fn led_count(&self) -> usize {
        self.cells.len() - 1
    }

    pub fn header(&self) -> [u8; 3] {
        self.cells[0]
    }

    pub fn set_header(&mut self, rgb: [u8; 3]) {
        self.cells[0] = rgb;
    }

    pub fn pixel(&self, index: usize) -> Option<[u8; 3]> {
        self.cells.get(index + 1).copied()
    }

    /// Overwrite an LED. Out-of-range indices are ignored.
    pub fn set_pixel(&mut self, index: usize, rgb: [u8; 3]) {
        if let Some(cell) = self.cells.get_mut(index + 1) {
            *cell = rgb;
        }
    }

    /// Add onto an LED, saturating each channel at 255.
    pub fn add_pixel(&mut self, index: usize, rgb: [u8; 3]) {
        if let Some(cell) = self.cells.get_mut(index + 1) {
            for (c, v) in cell.iter_mut().zip(rgb) {
                *c = c.saturating_add(v);
            }
        }
    }

    pub fn pixels(&self) -> &[[u8; 3]] {
        &self.cells[1..]
    }

    pub fn pixels_mut(&mut self) -> &mut [[u8; 3]] {
        &mut self.cells[1..]
    }

    pub fn fill(&mut self, rgb: [u8; 3]) {
        self.pixels_mut().fill(rgb);
    }

    /// Wire representation, header included.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.cells)
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.cells)
    }

    pub fn len_bytes(&self) -> usize {
        self.cells.len() * 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::frame_len;

    #[test]
    fn layout_puts_header_first() {
        let mut frame = FrameBuffer::new(4);
        frame.set_header([9, 9, 9]);
        frame.set_pixel(0, [1, 2, 3]);
        frame.set_pixel(3, [4, 5, 6]);
        frame.set_pixel(4, [7, 7, 7]); // out of range
        assert_eq!(frame.len_bytes(), frame_len(4));
        assert_eq!(
            frame.as_bytes(),
            &[9, 9, 9, 1, 2, 3, 0, 0, 0, 0, 0, 0, 4, 5, 6]
        );
    }

    #[test]
    fn add_pixel_saturates() {
        let mut frame = FrameBuffer::new(1);
        frame.set_pixel(0, [200, 10, 255]);
        frame.add_pixel(0, [100, 10, 1]);
        assert_eq!(frame.pixel(0), Some([255, 20, 255]));
    }

    #[test]
    fn from_bytes_checks_length() {
        assert!(FrameBuffer::from_bytes(&[0; 7]).is_none());
        assert!(FrameBuffer::from_bytes(&[]).is_none());
        let frame = FrameBuffer::from_bytes(&[0, 0, 0, 5, 6, 7]).expect("valid frame");
        assert_eq!(frame.led_count(), 1);
        assert_eq!(frame.pixel(0), Some([5, 6, 7]));
    }
}
