//! ND option chain iteration

use rasniffer_core::{Error, Result};
use std::iter::FusedIterator;

use super::packet::NdOption;

/// Length unit of ND options
pub const OPTION_UNIT: usize = 8;

/// Iterator over the options of an ND message.
///
/// Every declared length is checked against the bytes that remain before it
/// is used to advance. The first error ends the iteration.
#[derive(Debug, Clone)]
pub struct NdOptionIter<'a> {
    buf: &'a [u8],
    /// Offset of `buf` inside the ICMPv6 message, for error reporting
    base: usize,
    cursor: usize,
    valid: bool,
}

impl<'a> NdOptionIter<'a> {
    pub fn new(buf: &'a [u8], base: usize) -> Self {
        Self {
            buf,
            base,
            cursor: 0,
            valid: true,
        }
    }

    /// Bytes consumed by the options decoded so far
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.cursor
    }

    fn fail(&mut self, err: Error) -> Option<Result<NdOption>> {
        self.valid = false;
        Some(Err(err))
    }
}

impl<'a> Iterator for NdOptionIter<'a> {
    type Item = Result<NdOption>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.valid || self.cursor >= self.buf.len() {
            return None;
        }

        let offset = self.base + self.cursor;
        let remaining = self.remaining();
        if remaining < 2 {
            return self.fail(Error::OptionOverrun {
                offset,
                declared: 2,
                remaining,
            });
        }

        let units = self.buf[self.cursor + 1] as usize;
        if units == 0 {
            return self.fail(Error::ZeroLengthOption { offset });
        }

        let declared = units * OPTION_UNIT;
        if declared > remaining {
            return self.fail(Error::OptionOverrun {
                offset,
                declared,
                remaining,
            });
        }

        let body = &self.buf[self.cursor..self.cursor + declared];
        match NdOption::decode(body) {
            Ok(option) => {
                self.cursor += declared;
                Some(Ok(option))
            }
            Err(e) => self.fail(e),
        }
    }
}

impl<'a> FusedIterator for NdOptionIter<'a> {}
