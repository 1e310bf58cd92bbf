//! Migration version numbers (`1.0.3`, `7`, `2_1_0`).

use crate::error::{MigrateError, MigrateResult};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A dotted numeric version. The separator found in the folder is kept so
/// new files match their neighbours.
#[derive(Debug, Clone)]
pub struct MigrationVersion {
    components: Vec<u64>,
    separator: char,
}

impl MigrationVersion {
    /// Parse a version, with or without the leading `V` of a file name.
    pub fn parse(raw: &str) -> MigrateResult<Self> {
        let invalid = |reason: &str| MigrateError::InvalidVersion {
            version: raw.to_string(),
            reason: reason.to_string(),
        };

        let digits = raw.trim().trim_start_matches(['V', 'v']);
        if digits.is_empty() {
            return Err(invalid("no version number"));
        }
        let separator = if digits.contains('_') { '_' } else { '.' };
        if separator == '_' && digits.contains('.') {
            return Err(invalid("mixes '.' and '_' separators"));
        }

        let components = digits
            .split(separator)
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid("components must be non-negative integers"));
                }
                part.parse::<u64>()
                    .map_err(|_| invalid("component out of range"))
            })
            .collect::<MigrateResult<Vec<u64>>>()?;

        Ok(Self {
            components,
            separator,
        })
    }

    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Version for the first file of a new run after `self`.
    ///
    /// The second component is bumped and everything after it reset
    /// (`1.0.14` -> `1.1.0`); a single-component version is incremented.
    pub fn next_run(&self) -> Self {
        let mut components = self.components.clone();
        match components.len() {
            1 => components[0] += 1,
            _ => {
                components[1] += 1;
                for c in components.iter_mut().skip(2) {
                    *c = 0;
                }
            }
        }
        Self {
            components,
            separator: self.separator,
        }
    }

    /// Version for the next file within the same run (`1.1.0` -> `1.1.1`).
    pub fn successor(&self) -> Self {
        let mut components = self.components.clone();
        if let Some(last) = components.last_mut() {
            *last += 1;
        }
        Self {
            components,
            separator: self.separator,
        }
    }

    pub fn separator(&self) -> char {
        self.separator
    }
}

impl FromStr for MigrationVersion {
    type Err = MigrateError;

    fn from_str(s: &str) -> MigrateResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for MigrationVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", self.separator)?;
            }
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}

/// Numeric comparison; missing trailing components count as zero, so
/// `1.1` and `1.1.0` are equal.
impl Ord for MigrationVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| {
                let a = self.components.get(i).copied().unwrap_or(0);
                let b = other.components.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for MigrationVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for MigrationVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MigrationVersion {}
