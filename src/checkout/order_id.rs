//! Order Ids
//!
//! Ids look like `OD-M5X2K1AB-7QZ3`: the creation time in milliseconds and four random
//! characters, both in uppercase base 36.

use jiff::Timestamp;
use rand::Rng;

/// Prefix of every order id.
pub const ORDER_ID_PREFIX: &str = "OD";

/// Number of random characters in the suffix.
pub const SUFFIX_LEN: usize = 4;

/// Ids tried before giving up on finding an unused one.
pub const MAX_ATTEMPTS: usize = 16;

const RADIX: u32 = 36;

fn base36_upper(mut value: u64) -> String {
    let mut digits = Vec::new();

    loop {
        let digit = u32::try_from(value % u64::from(RADIX)).unwrap_or_default();

        digits.push(char::from_digit(digit, RADIX).map_or('0', |c| c.to_ascii_uppercase()));

        value /= u64::from(RADIX);

        if value == 0 {
            break;
        }
    }

    digits.iter().rev().collect()
}

/// Generate an order id for the given creation time.
pub fn generate<R: Rng + ?Sized>(created_at: Timestamp, rng: &mut R) -> String {
    let millis = u64::try_from(created_at.as_millisecond()).unwrap_or_default();

    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| {
            char::from_digit(rng.gen_range(0..RADIX), RADIX).map_or('0', |c| c.to_ascii_uppercase())
        })
        .collect();

    format!("{ORDER_ID_PREFIX}-{}-{suffix}", base36_upper(millis))
}

/// Generate an id that `taken` reports as unused, or `None` after [`MAX_ATTEMPTS`] tries.
pub fn generate_unique<R: Rng + ?Sized>(
    created_at: Timestamp,
    rng: &mut R,
    taken: impl Fn(&str) -> bool,
) -> Option<String> {
    (0..MAX_ATTEMPTS)
        .map(|_| generate(created_at, rng))
        .find(|id| !taken(id))
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn base36_matches_known_values() {
        assert_eq!(base36_upper(0), "0");
        assert_eq!(base36_upper(35), "Z");
        assert_eq!(base36_upper(36), "10");
        assert_eq!(base36_upper(1_700_000_000_000), "LOYW3V28");
    }

    #[test]
    fn id_has_expected_shape() -> TestResult {
        let mut rng = StdRng::seed_from_u64(7);
        let created_at = Timestamp::from_millisecond(1_700_000_000_000)?;

        let id = generate(created_at, &mut rng);
        let parts: Vec<_> = id.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts.first().copied(), Some("OD"));
        assert_eq!(parts.get(1).copied(), Some("LOYW3V28"));

        let suffix = parts.get(2).copied().unwrap_or_default();

        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );

        Ok(())
    }

    #[test]
    fn taken_ids_are_regenerated() {
        let mut rng = StdRng::seed_from_u64(1);
        let first = generate(Timestamp::UNIX_EPOCH, &mut StdRng::seed_from_u64(1));

        let id = generate_unique(Timestamp::UNIX_EPOCH, &mut rng, |candidate| {
            candidate == first
        });

        assert!(id.is_some_and(|id| id != first));
    }

    #[test]
    fn gives_up_when_everything_is_taken() {
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(generate_unique(Timestamp::UNIX_EPOCH, &mut rng, |_| true), None);
    }
}
