use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use log::warn;

use crate::lib::error::ParseQuantityError;

/// A parsed Kubernetes resource quantity, held as milliunits.
///
/// CPU quantities are milli-cores; memory quantities are milli-bytes.
/// The representation is exact for every whole-byte and whole-millicore
/// value; sub-milliunit precision (e.g. nanocore usage readings) is
/// rounded up on parse, so a nonzero reading never collapses to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceAmount {
    millis: i64,
}

/// Named resource quantities (`cpu`, `memory`, ...) for one record.
pub type ResourceList = BTreeMap<String, ResourceAmount>;

impl ResourceAmount {
    pub const ZERO: ResourceAmount = ResourceAmount { millis: 0 };

    pub fn from_millis(millis: i64) -> Self {
        Self { millis }
    }

    pub fn millis(&self) -> i64 {
        self.millis
    }

    /// Compact CPU display form: whole cores without a suffix, otherwise
    /// millicores (`2`, `750m`).
    pub fn to_cpu_string(&self) -> String {
        if self.millis % 1000 == 0 {
            format!("{}", self.millis / 1000)
        } else {
            format!("{}m", self.millis)
        }
    }

    /// Whole mebibytes, rounded up to the next integer.
    pub fn to_mebibytes(&self) -> i64 {
        let bytes = self.millis / 1000;
        (bytes + (1 << 20) - 1) >> 20
    }
}

impl Add for ResourceAmount {
    type Output = ResourceAmount;

    fn add(self, rhs: ResourceAmount) -> ResourceAmount {
        ResourceAmount {
            millis: self.millis.saturating_add(rhs.millis),
        }
    }
}

impl AddAssign for ResourceAmount {
    fn add_assign(&mut self, rhs: ResourceAmount) {
        self.millis = self.millis.saturating_add(rhs.millis);
    }
}

impl Sum for ResourceAmount {
    fn sum<I: Iterator<Item = ResourceAmount>>(iter: I) -> ResourceAmount {
        iter.fold(ResourceAmount::ZERO, Add::add)
    }
}

impl FromStr for ResourceAmount {
    type Err = ParseQuantityError;

    /// Parses the Kubernetes quantity grammar: a decimal number followed by
    /// an optional suffix, one of `n u m k M G T P E`, `Ki Mi Gi Ti Pi Ei`,
    /// or a scientific exponent (`1e3`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseQuantityError {
            quantity: s.to_string(),
        };

        let trimmed = s.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(r) => (true, r),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let num_end = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        let (number, suffix) = rest.split_at(num_end);

        let (int_part, frac_part) = match number.split_once('.') {
            Some((int, frac)) => (int, frac),
            None => (number, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err());
        }
        if !frac_part.chars().all(|c| c.is_ascii_digit()) {
            return Err(err());
        }

        let digits = int_part.chars().chain(frac_part.chars());
        let mut mantissa: i128 = 0;
        for c in digits {
            let d = c.to_digit(10).ok_or_else(err)? as i128;
            mantissa = mantissa.checked_mul(10).and_then(|m| m.checked_add(d)).ok_or_else(err)?;
        }

        let (binary, decimal): (i128, i32) = match suffix {
            "" => (1, 0),
            "n" => (1, -9),
            "u" => (1, -6),
            "m" => (1, -3),
            "k" => (1, 3),
            "M" => (1, 6),
            "G" => (1, 9),
            "T" => (1, 12),
            "P" => (1, 15),
            "E" => (1, 18),
            "Ki" => (1 << 10, 0),
            "Mi" => (1 << 20, 0),
            "Gi" => (1 << 30, 0),
            "Ti" => (1_i128 << 40, 0),
            "Pi" => (1_i128 << 50, 0),
            "Ei" => (1_i128 << 60, 0),
            _ => {
                let exp = suffix.strip_prefix(['e', 'E']).ok_or_else(err)?;
                (1, exp.parse::<i32>().map_err(|_| err())?)
            }
        };

        // +3 shifts the stored unit to milli
        let scale = decimal + 3 - frac_part.len() as i32;
        let mut value = mantissa.checked_mul(binary).ok_or_else(err)?;
        if scale >= 0 {
            for _ in 0..scale {
                value = value.checked_mul(10).ok_or_else(err)?;
            }
        } else {
            let divisor = 10_i128.checked_pow((-scale) as u32).ok_or_else(err)?;
            value = (value + divisor - 1).div_euclid(divisor);
        }
        if negative {
            value = -value;
        }

        let millis = i64::try_from(value).map_err(|_| err())?;
        Ok(ResourceAmount { millis })
    }
}

/// Sum of two quantity maps: a fresh map whose value for each key is the
/// sum of both inputs' values, treating an absent key as zero.
pub fn add_resources(a: &ResourceList, b: &ResourceList) -> ResourceList {
    let mut out = a.clone();
    accumulate_resources(&mut out, b);
    out
}

/// Folds `more` into the accumulator, treating absent keys as zero.
pub fn accumulate_resources(acc: &mut ResourceList, more: &ResourceList) {
    for (name, amount) in more {
        *acc.entry(name.clone()).or_default() += *amount;
    }
}

/// Canonical single-line display form, `cpu=<cpu> mem=<MiB>Mi`.
///
/// Used identically for per-container usage, requests, limits, and
/// per-node aggregates.
pub fn format_resources(resources: &ResourceList) -> String {
    let cpu = resources.get("cpu").copied().unwrap_or_default();
    let memory = resources.get("memory").copied().unwrap_or_default();
    format!("cpu={} mem={}Mi", cpu.to_cpu_string(), memory.to_mebibytes())
}

/// Converts a wire-format quantity map into a parsed [`ResourceList`].
///
/// Unparseable entries are logged and skipped rather than failing the
/// whole record.
pub fn parse_resources(wire: &BTreeMap<String, Quantity>) -> ResourceList {
    wire.iter()
        .filter_map(|(name, quantity)| match quantity.0.parse() {
            Ok(amount) => Some((name.clone(), amount)),
            Err(e) => {
                warn!("Skipping unparseable quantity for resource {name}: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> ResourceAmount {
        s.parse().unwrap()
    }

    fn resources(cpu: &str, memory: &str) -> ResourceList {
        ResourceList::from([
            ("cpu".to_string(), amount(cpu)),
            ("memory".to_string(), amount(memory)),
        ])
    }

    #[test]
    fn parses_cpu_forms() {
        assert_eq!(amount("500m").millis(), 500);
        assert_eq!(amount("0.5").millis(), 500);
        assert_eq!(amount("1").millis(), 1000);
        assert_eq!(amount("2.25").millis(), 2250);
        assert_eq!(amount("0").millis(), 0);
    }

    #[test]
    fn parses_memory_forms() {
        assert_eq!(amount("1Ki").millis(), 1024 * 1000);
        assert_eq!(amount("100Mi").millis(), 100 * (1 << 20) as i64 * 1000);
        assert_eq!(amount("1Gi").millis(), (1_i64 << 30) * 1000);
        assert_eq!(amount("128974848").millis(), 128974848 * 1000);
        assert_eq!(amount("1M").millis(), 1_000_000_000);
        assert_eq!(amount("1e3").millis(), 1_000_000);
    }

    #[test]
    fn subunit_readings_round_up() {
        // metrics-server reports CPU in nanocores
        assert_eq!(amount("156340000n").millis(), 157);
        assert_eq!(amount("1n").millis(), 1);
        assert_eq!(amount("1500u").millis(), 2);
    }

    #[test]
    fn rejects_malformed_quantities() {
        for bad in ["", "abc", "1.2.3", "5x", "Mi", "1ee3", "--1"] {
            assert!(bad.parse::<ResourceAmount>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn cpu_string_is_compact() {
        assert_eq!(amount("750m").to_cpu_string(), "750m");
        assert_eq!(amount("2").to_cpu_string(), "2");
        assert_eq!(amount("1500m").to_cpu_string(), "1500m");
        assert_eq!(ResourceAmount::ZERO.to_cpu_string(), "0");
    }

    #[test]
    fn mebibytes_round_up() {
        assert_eq!(amount("150Mi").to_mebibytes(), 150);
        assert_eq!(amount("1").to_mebibytes(), 1);
        assert_eq!(amount("1Gi").to_mebibytes(), 1024);
        assert_eq!(ResourceAmount::ZERO.to_mebibytes(), 0);
    }

    #[test]
    fn addition_merges_by_key() {
        let a = resources("500m", "100Mi");
        let b = resources("250m", "50Mi");
        let sum = add_resources(&a, &b);
        assert_eq!(sum["cpu"], amount("750m"));
        assert_eq!(sum["memory"], amount("150Mi"));

        // absent key treated as zero
        let partial = ResourceList::from([("cpu".to_string(), amount("1"))]);
        let sum = add_resources(&a, &partial);
        assert_eq!(sum["cpu"], amount("1500m"));
        assert_eq!(sum["memory"], amount("100Mi"));
    }

    #[test]
    fn addition_does_not_mutate_inputs() {
        let a = resources("500m", "100Mi");
        let b = resources("250m", "50Mi");
        let _ = add_resources(&a, &b);
        assert_eq!(a["cpu"], amount("500m"));
        assert_eq!(b["cpu"], amount("250m"));
    }

    #[test]
    fn formats_fixed_pattern() {
        let sum = add_resources(&resources("500m", "100Mi"), &resources("250m", "50Mi"));
        assert_eq!(format_resources(&sum), "cpu=750m mem=150Mi");
        assert_eq!(format_resources(&ResourceList::new()), "cpu=0 mem=0Mi");
        assert_eq!(format_resources(&resources("2", "1Gi")), "cpu=2 mem=1024Mi");
    }

    #[test]
    fn wire_conversion_skips_bad_entries() {
        let wire = BTreeMap::from([
            ("cpu".to_string(), Quantity("250m".to_string())),
            ("memory".to_string(), Quantity("not-a-quantity".to_string())),
        ]);
        let parsed = parse_resources(&wire);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed["cpu"], amount("250m"));
    }
}
