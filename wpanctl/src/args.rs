//! Positional argument parsing.
//!
//! Integers are decimal unless prefixed with `0x`; anything after the digits
//! is an error. Enum-typed arguments are parsed as integers, range checked,
//! and only then converted.

use crate::error::{ArgumentError, ArgumentErrorKind};

/// A cursor over the arguments of one command, identifier excluded.
#[derive(Debug, Clone)]
pub struct Arguments<'a> {
    tokens: &'a [&'a str],
    index: usize,
}

impl<'a> Arguments<'a> {
    pub fn new(tokens: &'a [&'a str]) -> Self {
        Self { tokens, index: 0 }
    }

    /// Return the number of arguments not consumed yet.
    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.index
    }

    /// Return the index of the next argument.
    pub fn index(&self) -> usize {
        self.index
    }

    fn error(
        &self,
        index: usize,
        name: &'static str,
        expected: &'static str,
        kind: ArgumentErrorKind,
    ) -> ArgumentError {
        ArgumentError {
            index,
            name,
            expected,
            kind,
        }
    }

    /// Consume the next raw argument.
    pub fn next_token(
        &mut self,
        name: &'static str,
        expected: &'static str,
    ) -> Result<(usize, &'a str), ArgumentError> {
        let index = self.index;
        match self.tokens.get(index) {
            Some(token) => {
                self.index += 1;
                Ok((index, *token))
            }
            None => Err(self.error(index, name, expected, ArgumentErrorKind::TooFew)),
        }
    }

    /// Consume an unsigned integer that must fit `T`.
    pub fn unsigned<T: TryFrom<u64>>(&mut self, name: &'static str) -> Result<T, ArgumentError> {
        self.unsigned_as(name, "unsigned integer")
    }

    fn unsigned_as<T: TryFrom<u64>>(
        &mut self,
        name: &'static str,
        expected: &'static str,
    ) -> Result<T, ArgumentError> {
        let (index, token) = self.next_token(name, expected)?;
        let value = parse_unsigned(token)
            .ok_or_else(|| self.error(index, name, expected, ArgumentErrorKind::Malformed))?;
        T::try_from(value)
            .map_err(|_| self.error(index, name, expected, ArgumentErrorKind::OutOfRange))
    }

    /// Consume a signed integer that must fit `T`.
    pub fn signed<T: TryFrom<i64>>(&mut self, name: &'static str) -> Result<T, ArgumentError> {
        const EXPECTED: &str = "integer";
        let (index, token) = self.next_token(name, EXPECTED)?;
        let value = parse_signed(token)
            .ok_or_else(|| self.error(index, name, EXPECTED, ArgumentErrorKind::Malformed))?;
        T::try_from(value)
            .map_err(|_| self.error(index, name, EXPECTED, ArgumentErrorKind::OutOfRange))
    }

    /// Consume an unsigned integer no larger than `max`.
    pub fn bounded<T>(
        &mut self,
        name: &'static str,
        max: u64,
        expected: &'static str,
    ) -> Result<T, ArgumentError>
    where
        T: TryFrom<u64>,
    {
        let index = self.index;
        let value: u64 = self.unsigned_as(name, expected)?;
        if value > max {
            return Err(self.error(index, name, expected, ArgumentErrorKind::OutOfRange));
        }
        T::try_from(value).map_err(|_| self.error(index, name, expected, ArgumentErrorKind::OutOfRange))
    }

    /// Consume an integer `R` and convert it into the enum `E`.
    pub fn choice<R, E>(&mut self, name: &'static str, expected: &'static str) -> Result<E, ArgumentError>
    where
        R: TryFrom<u64>,
        E: TryFrom<R>,
    {
        let index = self.index;
        let raw: R = self.unsigned_as(name, expected)?;
        E::try_from(raw).map_err(|_| self.error(index, name, expected, ArgumentErrorKind::OutOfRange))
    }

    /// Consume `0` or `1`.
    pub fn boolean(&mut self, name: &'static str) -> Result<bool, ArgumentError> {
        let index = self.index;
        match self.unsigned_as::<u64>(name, "0 or 1")? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(self.error(index, name, "0 or 1", ArgumentErrorKind::OutOfRange)),
        }
    }

    /// Consume a power level in dBm and return it in mBm.
    pub fn dbm(&mut self, name: &'static str) -> Result<i32, ArgumentError> {
        const EXPECTED: &str = "dBm";
        let (index, token) = self.next_token(name, EXPECTED)?;
        let dbm: f32 = token
            .parse()
            .map_err(|_| self.error(index, name, EXPECTED, ArgumentErrorKind::Malformed))?;
        if !dbm.is_finite() {
            return Err(self.error(index, name, EXPECTED, ArgumentErrorKind::Malformed));
        }

        let mbm = (dbm as f64 * 100.0).round();
        if mbm < i32::MIN as f64 || mbm > i32::MAX as f64 {
            return Err(self.error(index, name, EXPECTED, ArgumentErrorKind::OutOfRange));
        }
        Ok(mbm as i32)
    }

    /// Consume exactly `N` hex encoded bytes.
    pub fn hex<const N: usize>(
        &mut self,
        name: &'static str,
        expected: &'static str,
    ) -> Result<[u8; N], ArgumentError> {
        let (index, token) = self.next_token(name, expected)?;
        let token = token.strip_prefix("0x").unwrap_or(token);
        let mut out = [0u8; N];
        hex::decode_to_slice(token, &mut out).map_err(|err| {
            let kind = match err {
                hex::FromHexError::InvalidStringLength | hex::FromHexError::OddLength => {
                    ArgumentErrorKind::OutOfRange
                }
                hex::FromHexError::InvalidHexCharacter { .. } => ArgumentErrorKind::Malformed,
            };
            self.error(index, name, expected, kind)
        })?;
        Ok(out)
    }

    /// Run `f` if arguments are left.
    pub fn optional<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ArgumentError>,
    ) -> Result<Option<T>, ArgumentError> {
        if self.remaining() == 0 {
            return Ok(None);
        }
        f(self).map(Some)
    }

    /// Check that every argument was consumed.
    pub fn finish(&self) -> Result<(), ArgumentError> {
        if self.remaining() > 0 {
            return Err(self.error(self.index, "extra", "no more arguments", ArgumentErrorKind::TooMany));
        }
        Ok(())
    }
}

/// Parse a decimal or `0x` prefixed hexadecimal unsigned integer.
pub fn parse_unsigned(token: &str) -> Option<u64> {
    let (digits, radix) = match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (token, 10),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    u64::from_str_radix(digits, radix).ok()
}

/// Like [`parse_unsigned`], with an optional leading minus sign.
pub fn parse_signed(token: &str) -> Option<i64> {
    match token.strip_prefix('-') {
        Some(magnitude) => {
            let magnitude = parse_unsigned(magnitude)?;
            if magnitude == i64::MIN.unsigned_abs() {
                Some(i64::MIN)
            } else {
                i64::try_from(magnitude).ok().map(|m| -m)
            }
        }
        None => i64::try_from(parse_unsigned(token)?).ok(),
    }
}
