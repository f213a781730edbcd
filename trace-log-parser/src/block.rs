//! Block accumulation
//!
//! Groups consecutive lines into blocks. A boundary line closes the block
//! that is currently open and seeds the next one; every other line is
//! appended to the open block. Closed blocks are handed back to the caller
//! and never touched again.

use crate::boundary::BoundaryDetector;
use crate::config::PreambleMode;
use crate::types::{Block, BlockId, LogLine};

/// Observable state of a [`BlockBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// No lines are buffered
    Empty,
    /// A block is open and accepting lines
    Collecting,
}

/// Accumulates lines into blocks for exactly one parse pass
#[derive(Debug)]
pub struct BlockBuffer {
    detector: BoundaryDetector,
    preamble_mode: PreambleMode,
    current: Vec<LogLine>,
    current_id: BlockId,
    next_id: BlockId,
    seen_boundary: bool,
    discarded_preamble_lines: usize,
}

impl BlockBuffer {
    pub fn new(detector: BoundaryDetector, preamble_mode: PreambleMode) -> Self {
        Self {
            detector,
            preamble_mode,
            current: Vec::new(),
            current_id: 0,
            next_id: 1,
            seen_boundary: false,
            discarded_preamble_lines: 0,
        }
    }

    /// Current state of the buffer
    pub fn state(&self) -> BufferState {
        if self.current.is_empty() {
            BufferState::Empty
        } else {
            BufferState::Collecting
        }
    }

    /// Number of preamble lines dropped so far
    pub fn discarded_preamble_lines(&self) -> usize {
        self.discarded_preamble_lines
    }

    /// Feed one line; returns the block it closed, if any
    pub fn push(&mut self, line: LogLine) -> Option<Block> {
        if self.detector.is_boundary(&line.text) {
            log::trace!("Line {} opens a block", line.number);
            self.seen_boundary = true;
            let closed = self.take_current();
            self.current_id = self.next_id;
            self.next_id += 1;
            self.current.push(line);
            return closed;
        }

        if !self.seen_boundary && self.preamble_mode == PreambleMode::Discard {
            log::trace!("Discarding preamble line {}", line.number);
            self.discarded_preamble_lines += 1;
            return None;
        }

        self.current.push(line);
        None
    }

    /// Signal end of input; returns the final open block, if any
    pub fn finish(&mut self) -> Option<Block> {
        self.take_current()
    }

    fn take_current(&mut self) -> Option<Block> {
        if self.current.is_empty() {
            return None;
        }
        Some(Block {
            id: self.current_id,
            lines: std::mem::take(&mut self.current),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<LogLine> {
        let mut offset = 0u64;
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let line = LogLine::new(i + 1, offset, *text);
                offset += text.len() as u64 + 1;
                line
            })
            .collect()
    }

    fn collect_blocks(buffer: &mut BlockBuffer, input: &[&str]) -> Vec<Block> {
        let mut blocks: Vec<Block> = lines(input)
            .into_iter()
            .filter_map(|line| buffer.push(line))
            .collect();
        blocks.extend(buffer.finish());
        blocks
    }

    fn line_numbers(block: &Block) -> Vec<usize> {
        block.lines.iter().map(|l| l.number).collect()
    }

    #[test]
    fn test_blocks_are_closed_by_next_boundary() {
        let mut buffer = BlockBuffer::new(BoundaryDetector::NumericTimestamp, PreambleMode::Discard);
        let blocks = collect_blocks(
            &mut buffer,
            &[
                "0.001s DeviceA  ACK  0x10",
                "  extra info line",
                "0.005s DeviceB  Ping 0x20",
                "0.010s DeviceA  NACK 0x30",
            ],
        );

        assert_eq!(blocks.len(), 3);
        assert_eq!(line_numbers(&blocks[0]), vec![1, 2]);
        assert_eq!(line_numbers(&blocks[1]), vec![3]);
        assert_eq!(line_numbers(&blocks[2]), vec![4]);
        assert_eq!(
            blocks.iter().map(|b| b.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(buffer.state(), BufferState::Empty);
    }

    #[test]
    fn test_state_transitions() {
        let mut buffer = BlockBuffer::new(BoundaryDetector::NumericTimestamp, PreambleMode::Discard);
        assert_eq!(buffer.state(), BufferState::Empty);

        assert!(buffer.push(LogLine::new(1, 0, "0.1s A")).is_none());
        assert_eq!(buffer.state(), BufferState::Collecting);

        assert!(buffer.push(LogLine::new(2, 7, "  more")).is_none());
        let closed = buffer.push(LogLine::new(3, 14, "0.2s B")).unwrap();
        assert_eq!(closed.len(), 2);
        assert_eq!(buffer.state(), BufferState::Collecting);

        let last = buffer.finish().unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(buffer.state(), BufferState::Empty);
        assert!(buffer.finish().is_none());
    }

    #[test]
    fn test_preamble_discarded() {
        let mut buffer = BlockBuffer::new(BoundaryDetector::NumericTimestamp, PreambleMode::Discard);
        let blocks = collect_blocks(&mut buffer, &["header", "more header", "0.1s A  x", "  cont"]);

        assert_eq!(blocks.len(), 1);
        assert_eq!(line_numbers(&blocks[0]), vec![3, 4]);
        assert_eq!(buffer.discarded_preamble_lines(), 2);
    }

    #[test]
    fn test_preamble_as_block_zero() {
        let mut buffer =
            BlockBuffer::new(BoundaryDetector::NumericTimestamp, PreambleMode::BlockZero);
        let blocks = collect_blocks(&mut buffer, &["header", "more header", "0.1s A  x"]);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].id, 0);
        assert_eq!(line_numbers(&blocks[0]), vec![1, 2]);
        assert_eq!(blocks[1].id, 1);
        assert_eq!(buffer.discarded_preamble_lines(), 0);
    }

    #[test]
    fn test_input_without_boundaries() {
        let mut buffer = BlockBuffer::new(BoundaryDetector::NumericTimestamp, PreambleMode::Discard);
        assert!(collect_blocks(&mut buffer, &["a", "b"]).is_empty());

        let mut buffer =
            BlockBuffer::new(BoundaryDetector::NumericTimestamp, PreambleMode::BlockZero);
        let blocks = collect_blocks(&mut buffer, &["a", "b"]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].id, 0);
    }

    #[test]
    fn test_consecutive_boundaries_each_close_a_block() {
        let mut buffer = BlockBuffer::new(BoundaryDetector::NumericTimestamp, PreambleMode::Discard);
        let blocks = collect_blocks(&mut buffer, &["0.1s A", "0.2s B", "0.3s C"]);

        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(|b| b.len() == 1));
    }
}
