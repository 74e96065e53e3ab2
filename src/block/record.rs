//! Durable record format for the block registry.
//!
//! Records are `MAC;number` pairs joined by `,`, for example
//! `AA:BB:CC:DD:EE:02;2,AA:BB:CC:DD:EE:05;5`. The master and virtual
//! placeholders are never written.

use core::fmt::{self, Write};

use heapless::{String, Vec};

use super::mac::MacAddress;
use super::registry::MAX_BLOCKS;
use crate::error::RegistryError;

/// Capacity of a formatted record string for a full registry.
pub const RECORD_CAPACITY: usize = MAX_BLOCKS * 21;

/// One persisted block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRecord {
    /// Hardware address.
    pub mac: MacAddress,
    /// Block number.
    pub number: u8,
}

impl fmt::Display for BlockRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.mac, self.number)
    }
}

/// Write records in the durable format, skipping placeholders.
pub fn write_records<W, I>(out: &mut W, records: I) -> fmt::Result
where
    W: Write,
    I: IntoIterator<Item = BlockRecord>,
{
    let mut first = true;
    for record in records.into_iter().filter(|r| !r.mac.is_virtual()) {
        if !first {
            out.write_char(',')?;
        }
        write!(out, "{}", record)?;
        first = false;
    }
    Ok(())
}

/// Format records into a fixed-capacity string.
pub fn format_records<I>(records: I) -> String<RECORD_CAPACITY>
where
    I: IntoIterator<Item = BlockRecord>,
{
    let mut out = String::new();
    // Capacity covers a full registry
    let _ = write_records(&mut out, records.into_iter().take(MAX_BLOCKS));
    out
}

impl core::str::FromStr for BlockRecord {
    type Err = RegistryError;

    /// Parse one `MAC;number` entry.
    fn from_str(entry: &str) -> Result<Self, Self::Err> {
        let entry = entry.trim();
        let (mac, number) = entry.split_once(';').ok_or_else(|| invalid(entry))?;
        let mac: MacAddress = mac.parse().map_err(|_| invalid(entry))?;
        let number: u8 = number.trim().parse().map_err(|_| invalid(entry))?;
        Ok(Self { mac, number })
    }
}

/// Records read back from the durable format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRecords {
    /// Well-formed records, at most 14.
    pub records: Vec<BlockRecord, MAX_BLOCKS>,
    /// Entries dropped because they did not parse.
    pub skipped: usize,
}

/// Parse the durable format, keeping at most 14 well-formed records.
///
/// Empty input yields no records. A malformed entry is counted in
/// `skipped` and does not stop the entries after it from loading.
pub fn parse_records(input: &str) -> ParsedRecords {
    let mut parsed = ParsedRecords::default();
    for entry in input.trim().split(',').map(str::trim).filter(|e| !e.is_empty()) {
        match entry.parse::<BlockRecord>() {
            Ok(record) => {
                if parsed.records.push(record).is_err() {
                    break;
                }
            }
            Err(_) => parsed.skipped += 1,
        }
    }
    parsed
}

fn invalid(entry: &str) -> RegistryError {
    let mut text = String::new();
    for c in entry.chars().take(64) {
        let _ = text.push(c);
    }
    RegistryError::InvalidRecord(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac(last: u8) -> MacAddress {
        MacAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, last])
    }

    #[test]
    fn test_format() {
        let records = [
            BlockRecord { mac: mac(2), number: 2 },
            BlockRecord { mac: MacAddress::virtual_for(3), number: 3 },
            BlockRecord { mac: mac(5), number: 5 },
        ];
        assert_eq!(
            format_records(records).as_str(),
            "AA:BB:CC:DD:EE:02;2,AA:BB:CC:DD:EE:05;5"
        );
    }

    #[test]
    fn test_parse() {
        let parsed = parse_records("AA:BB:CC:DD:EE:02;2,AA:BB:CC:DD:EE:05;5\n");
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[1], BlockRecord { mac: mac(5), number: 5 });
        assert_eq!(parsed.skipped, 0);
        assert!(parse_records("").records.is_empty());
    }

    #[test]
    fn test_parse_caps_at_fourteen() {
        let mut input = std::string::String::new();
        for n in 0..20u8 {
            if n > 0 {
                input.push(',');
            }
            input.push_str(&format!("{};{}", mac(n), n % 14 + 1));
        }
        assert_eq!(parse_records(&input).records.len(), 14);
    }

    #[test]
    fn test_parse_skips_bad_record() {
        let parsed = parse_records("AA:BB:CC:DD:EE:02;2,garbage,AA:BB:CC:DD:EE:05;5");
        assert_eq!(parsed.skipped, 1);
        assert_eq!(
            parsed.records.as_slice(),
            &[
                BlockRecord { mac: mac(2), number: 2 },
                BlockRecord { mac: mac(5), number: 5 },
            ]
        );

        let parsed = parse_records("AA:BB:CC:DD:EE:02;two,AA:BB:CC:DD:EE:03");
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.skipped, 2);
    }

    #[test]
    fn test_bad_records_do_not_count_toward_limit() {
        let mut input = std::string::String::from("junk,;;,ZZ:ZZ;3");
        for n in 2..=15u8 {
            input.push_str(&format!(",{};{}", mac(n), n));
        }
        let parsed = parse_records(&input);
        assert_eq!(parsed.skipped, 3);
        assert_eq!(parsed.records.len(), 14);
        assert_eq!(parsed.records[0].mac, mac(2));
    }

    #[test]
    fn test_record_from_str() {
        assert_eq!(
            "AA:BB:CC:DD:EE:07;7".parse::<BlockRecord>(),
            Ok(BlockRecord { mac: mac(7), number: 7 })
        );
        assert!(matches!(
            "AA:BB:CC:DD:EE:02".parse::<BlockRecord>(),
            Err(RegistryError::InvalidRecord(_))
        ));
    }
}
