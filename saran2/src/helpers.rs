use nom::{
    character::complete::{i32 as dec_i32, space0},
    combinator::all_consuming,
    sequence::delimited,
    IResult,
};

/// Wrapper printing a byte slice as text when it is valid UTF-8, and as raw
/// bytes otherwise.
pub struct LossyStr<'a>(pub &'a [u8]);

impl core::fmt::Debug for LossyStr<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match core::str::from_utf8(self.0) {
            Ok(s) => write!(f, "{:?}", s),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LossyStr<'_> {
    fn format(&self, fmt: defmt::Formatter) {
        match core::str::from_utf8(self.0) {
            Ok(s) => defmt::write!(fmt, "{=str}", s),
            Err(_) => defmt::write!(fmt, "{=[u8]:a}", self.0),
        }
    }
}

/// Parse an optionally signed decimal integer, ignoring surrounding spaces.
///
/// Returns `None` for empty input, stray characters or overflow.
pub(crate) fn parse_i32(field: &[u8]) -> Option<i32> {
    let res: IResult<&[u8], i32> = all_consuming(delimited(space0, dec_i32, space0))(field);
    res.ok().map(|(_, value)| value)
}
