//! UTCTime and GeneralizedTime.
//!
//! Both time types are kept as [`NaiveDateTime`] values in UTC. The
//! functions in this module convert between those and the content octets
//! of the two types.
//!
//! The content follows a fixed grammar. For UTCTime it is
//! `YYMMDDHHMMSS` followed by either `Z` or a numeric offset `±HHMM`.
//! GeneralizedTime uses a four digit year and allows an optional fraction
//! of up to six digits after the seconds. DER only allows the `Z` form and
//! no trailing zeros in the fraction.

use chrono::{
    Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike
};
use log::debug;
use crate::error::{Error, ErrorKind};


//------------ Decoding ------------------------------------------------------

/// A decoded time value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DecodedTime {
    /// The time in UTC.
    pub time: NaiveDateTime,

    /// Whether the encoding deviated from DER.
    pub ber_encoded: bool,
}

/// Decodes the content octets of a UTCTime value.
///
/// Two-digit years below 50 are in the 21st century, all others in the
/// 20th.
pub fn decode_utc_time(content: &[u8]) -> Result<DecodedTime, Error> {
    let mut parser = Parser::new(content);
    let year = parser.digits(2)?;
    let year = if year < 50 { 2000 + year } else { 1900 + year };
    let (date, time) = parser.date_time(year)?;
    let time = NaiveTime::from_hms_opt(time.0, time.1, time.2).ok_or_else(
        || Error::decode("invalid time")
    )?;
    parser.zone(date.and_time(time), false)
}

/// Decodes the content octets of a GeneralizedTime value.
///
/// A fraction with trailing zeros is only acceptable if `bered` is `true`
/// and marks the value as BER encoded.
pub fn decode_generalized_time(
    content: &[u8], bered: bool
) -> Result<DecodedTime, Error> {
    let mut parser = Parser::new(content);
    let year = parser.digits(4)?;
    let (date, (hour, minute, second)) = parser.date_time(year)?;
    let mut ber_encoded = false;
    let micro = if parser.peek() == Some(b'.') {
        parser.skip();
        let digits = parser.fraction_digits();
        if digits.is_empty() || digits.len() > 6 {
            return Err(Error::decode("invalid fraction length"))
        }
        if digits.ends_with(b"0") {
            if !bered {
                return Err(Error::decode("trailing zero in fraction"))
            }
            debug!("accepted trailing zero in GeneralizedTime fraction");
            ber_encoded = true;
        }
        let mut micro = 0;
        for i in 0..6 {
            micro = micro * 10 + digits.get(i).map(|d| u32::from(d - b'0'))
                .unwrap_or(0);
        }
        micro
    }
    else {
        0
    };
    let time = NaiveTime::from_hms_micro_opt(
        hour, minute, second, micro
    ).ok_or_else(|| Error::decode("invalid time"))?;
    let mut res = parser.zone(date.and_time(time), true)?;
    res.ber_encoded |= ber_encoded;
    Ok(res)
}


//------------ Encoding ------------------------------------------------------

/// Checks that a time value can be represented as a UTCTime.
pub fn check_utc_time(time: &NaiveDateTime) -> Result<(), Error> {
    if !(1950..2050).contains(&time.year()) {
        return Err(Error::new(
            ErrorKind::InvalidValueType,
            "UTCTime year out of range 1950..2049"
        ))
    }
    if time.nanosecond() != 0 {
        return Err(Error::new(
            ErrorKind::InvalidValueType, "UTCTime can't hold fractions"
        ))
    }
    Ok(())
}

/// Checks that a time value can be represented as a GeneralizedTime.
pub fn check_generalized_time(time: &NaiveDateTime) -> Result<(), Error> {
    if !(0..10000).contains(&time.year()) {
        return Err(Error::new(
            ErrorKind::InvalidValueType,
            "GeneralizedTime year out of range 0..9999"
        ))
    }
    if time.nanosecond() % 1000 != 0 || time.nanosecond() >= 1_000_000_000 {
        return Err(Error::new(
            ErrorKind::InvalidValueType,
            "GeneralizedTime only holds microseconds"
        ))
    }
    Ok(())
}

/// Returns the content octets of a UTCTime value.
pub fn encode_utc_time(time: &NaiveDateTime) -> Vec<u8> {
    time.format("%y%m%d%H%M%SZ").to_string().into_bytes()
}

/// Returns the content octets of a GeneralizedTime value.
///
/// The fraction is only included if it isn’t zero and is stripped of
/// trailing zeros.
pub fn encode_generalized_time(time: &NaiveDateTime) -> Vec<u8> {
    let mut res = time.format("%Y%m%d%H%M%S").to_string();
    let micro = time.nanosecond() / 1000;
    if micro != 0 {
        let fraction = format!("{:06}", micro);
        res.push('.');
        res.push_str(fraction.trim_end_matches('0'));
    }
    res.push('Z');
    res.into_bytes()
}


//------------ Parser --------------------------------------------------------

/// A helper for parsing the time grammar.
struct Parser<'a> {
    data: &'a [u8],
}

impl<'a> Parser<'a> {
    fn new(data: &'a [u8]) -> Self {
        Parser { data }
    }

    fn peek(&self) -> Option<u8> {
        self.data.first().copied()
    }

    fn skip(&mut self) {
        self.data = &self.data[1..];
    }

    /// Takes exactly `len` decimal digits.
    fn digits(&mut self, len: usize) -> Result<i32, Error> {
        let Some((head, tail)) = self.data.split_at_checked(len) else {
            return Err(Error::decode("too short time value"))
        };
        if !head.iter().all(u8::is_ascii_digit) {
            return Err(Error::decode("non-digit in time value"))
        }
        self.data = tail;
        Ok(head.iter().fold(0, |res, &ch| res * 10 + i32::from(ch - b'0')))
    }

    /// Takes all leading digits.
    fn fraction_digits(&mut self) -> &'a [u8] {
        let len = self.data.iter().take_while(|ch| ch.is_ascii_digit())
            .count();
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        head
    }

    /// Takes month, day, hour, minute, and seconds.
    fn date_time(
        &mut self, year: i32
    ) -> Result<(NaiveDate, (u32, u32, u32)), Error> {
        let month = self.digits(2)? as u32;
        let day = self.digits(2)? as u32;
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            Error::decode("invalid date")
        })?;
        let hour = self.digits(2)? as u32;
        let minute = self.digits(2)? as u32;
        let second = self.digits(2)? as u32;
        if hour > 23 || minute > 59 || second > 59 {
            return Err(Error::decode("invalid time"))
        }
        Ok((date, (hour, minute, second)))
    }

    /// Takes the zone and converts the time into UTC.
    ///
    /// This must be the end of the data.
    fn zone(
        mut self, time: NaiveDateTime, fraction_allowed: bool
    ) -> Result<DecodedTime, Error> {
        let res = match self.peek() {
            Some(b'Z') => {
                self.skip();
                DecodedTime { time, ber_encoded: false }
            }
            Some(sign @ (b'+' | b'-')) => {
                self.skip();
                let hours = self.digits(2)?;
                let minutes = self.digits(2)?;
                if hours > 23 || minutes > 59 {
                    return Err(Error::decode("invalid time offset"))
                }
                let offset = Duration::minutes(
                    i64::from(hours * 60 + minutes)
                );
                let time = if sign == b'+' {
                    time.checked_sub_signed(offset)
                }
                else {
                    time.checked_add_signed(offset)
                }.ok_or_else(|| Error::decode("invalid time offset"))?;
                debug!("accepted time with numeric offset");
                DecodedTime { time, ber_encoded: true }
            }
            Some(b'.') if !fraction_allowed => {
                return Err(Error::decode("fraction in UTCTime"))
            }
            _ => return Err(Error::decode("missing time zone"))
        };
        if !self.data.is_empty() {
            return Err(Error::decode("trailing data in time value"))
        }
        Ok(res)
    }
}


//============ Tests =========================================================
