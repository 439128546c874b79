//! Archive priority order within one directory.
//!
//! Names starting with `pak` (case-insensitive) come before all others.
//! Two `pak` names that both carry a number compare by its value
//! (`pak0 < pak1 < pak10`); any other pair compares by lowercase string.
//! Earlier means consulted first.
//!
//! The number is the run of digits right after `pak`. Every numbered name
//! then sits in one contiguous block of the string order, which keeps the
//! comparison transitive.

use std::cmp::Ordering;

/// True if `name` ends in `.pak` or `.pkz`, ignoring case.
pub fn is_archive_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".pak") || lower.ends_with(".pkz")
}

/// Digits directly after the `pak` prefix, leading zeros stripped.
fn pak_number(lower: &str) -> Option<&str> {
    let rest = lower.strip_prefix("pak")?;
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    Some(rest[..end].trim_start_matches('0'))
}

/// Numeric order of two digit strings without parsing them.
fn compare_digits(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Precomputed comparison data for one archive file name.
#[derive(Debug, Clone)]
struct ArchiveKey<'a> {
    name: &'a str,
    lower: String,
    pak: bool,
    number: Option<String>,
}

impl<'a> ArchiveKey<'a> {
    fn new(name: &'a str) -> Self {
        let lower = name.to_lowercase();
        let pak = lower.starts_with("pak");
        let number = pak_number(&lower).map(str::to_owned);
        Self {
            name,
            lower,
            pak,
            number,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        let primary = match (self.pak, other.pak) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (true, true) => match (&self.number, &other.number) {
                (Some(a), Some(b)) => {
                    compare_digits(a, b).then_with(|| self.lower.cmp(&other.lower))
                }
                _ => self.lower.cmp(&other.lower),
            },
            (false, false) => self.lower.cmp(&other.lower),
        };
        primary.then_with(|| self.name.cmp(other.name))
    }
}

/// Priority order between two archive file names.
pub fn archive_order(a: &str, b: &str) -> Ordering {
    ArchiveKey::new(a).compare(&ArchiveKey::new(b))
}

pub fn sort_archive_names(names: &mut Vec<String>) {
    let mut keyed: Vec<(ArchiveKey<'_>, usize)> = names
        .iter()
        .enumerate()
        .map(|(i, name)| (ArchiveKey::new(name), i))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| a.compare(b));
    let order: Vec<usize> = keyed.into_iter().map(|(_, i)| i).collect();

    let mut taken: Vec<Option<String>> = names.drain(..).map(Some).collect();
    names.extend(order.into_iter().filter_map(|i| taken[i].take()));
}
