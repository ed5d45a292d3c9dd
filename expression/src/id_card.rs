//! Synthetic 18-character identity numbers.
//!
//! Layout: 6 region digits, 8 birth-date digits (`YYYYMMDD`), 3 sequence
//! digits and one checksum character.

use chrono::{Datelike, Days, NaiveDate};
use rand::Rng;

use crate::error::EvalError;

/// Weight of each of the first 17 characters in the checksum.
pub const WEIGHTS: [u32; 17] = [7, 9, 10, 5, 8, 4, 2, 1, 6, 3, 7, 9, 10, 5, 8, 4, 2];
/// Checksum character indexed by the weighted sum mod 11.
pub const CHECK_CHARS: [char; 11] = ['1', '0', 'X', '9', '8', '7', '6', '5', '4', '3', '2'];

const REGION_LEN: usize = 6;
const SEQUENCE_LIMIT: u16 = 1000;

/// Earliest generated birth date.
fn min_birthday() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdCard {
    region: String,
    birthday: NaiveDate,
    sequence: u16,
}

impl IdCard {
    /// `region` must be 6 digits and `sequence` below 1000.
    pub fn new(region: impl Into<String>, birthday: NaiveDate, sequence: u16) -> Result<Self, EvalError> {
        let region = region.into();
        if region.len() != REGION_LEN || !region.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EvalError::BadIdCard(region));
        }
        if sequence >= SEQUENCE_LIMIT || birthday.year() < 0 || birthday.year() > 9999 {
            return Err(EvalError::BadIdCard(format!("{}/{}/{}", region, birthday, sequence)));
        }
        Ok(IdCard {
            region,
            birthday,
            sequence,
        })
    }

    /// Random region, a birth date between 1900-01-01 and `today`, random sequence.
    pub fn random(rng: &mut impl Rng, today: NaiveDate) -> IdCard {
        let region = (0..3)
            .map(|_| format!("{:02}", rng.gen_range(0..100u32)))
            .collect::<String>();

        let min = min_birthday();
        let span = (today - min).num_days().max(0) as u64;
        let birthday = min
            .checked_add_days(Days::new(rng.gen_range(0..=span)))
            .unwrap_or(min);

        IdCard {
            region,
            birthday,
            sequence: rng.gen_range(0..SEQUENCE_LIMIT),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn birthday(&self) -> NaiveDate {
        self.birthday
    }

    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    /// Odd sequences are assigned to men, even ones to women.
    pub fn gender(&self) -> Gender {
        if self.sequence % 2 == 0 {
            Gender::Female
        } else {
            Gender::Male
        }
    }

    /// The full 18-character number.
    pub fn number(&self) -> String {
        let mut number = format!(
            "{}{}{:03}",
            self.region,
            self.birthday.format("%Y%m%d"),
            self.sequence
        );
        // Always 17 digits, see `new` and `random`.
        if let Ok(check) = checksum(&number) {
            number.push(check);
        }
        number
    }
}

/// Checksum character of the first 17 characters of `code`, which must be digits.
pub fn checksum(code: &str) -> Result<char, EvalError> {
    let digits = code
        .chars()
        .take(WEIGHTS.len())
        .map(|c| c.to_digit(10))
        .collect::<Option<Vec<u32>>>()
        .filter(|digits| digits.len() == WEIGHTS.len())
        .ok_or_else(|| EvalError::BadIdCard(code.to_string()))?;

    let sum: u32 = digits.iter().zip(WEIGHTS).map(|(d, w)| d * w).sum();
    Ok(CHECK_CHARS[(sum % 11) as usize])
}

/// True when `code` ends with the checksum of its first 17 characters.
pub fn is_valid(code: &str) -> bool {
    checksum(code).is_ok_and(|check| code.ends_with(check))
}
