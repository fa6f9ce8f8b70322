use std::fmt::Write;

use data_encoding::HEXLOWER;
use jiff::Timestamp;
use notary_protocol::tags::{MerkleRoot, Nonce, PublicKey};

use crate::validation::LinkVerification;

/// What one verified link attests to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    server: String,
    midpoint: u64,
    radius: u32,
    root: MerkleRoot,
    delegated_key: PublicKey,
}

impl LinkOutcome {
    pub(crate) fn new(server: &str, verified: &LinkVerification) -> Self {
        Self {
            server: server.to_string(),
            midpoint: verified.midpoint,
            radius: verified.radius,
            root: verified.root,
            delegated_key: verified.delegated_key,
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// Microseconds since the Unix epoch
    pub fn midpoint(&self) -> u64 {
        self.midpoint
    }

    /// Microseconds
    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn root(&self) -> &MerkleRoot {
        &self.root
    }

    pub fn delegated_key(&self) -> &PublicKey {
        &self.delegated_key
    }

    pub fn earliest(&self) -> u64 {
        self.midpoint.saturating_sub(self.radius as u64)
    }

    pub fn latest(&self) -> u64 {
        self.midpoint.saturating_add(self.radius as u64)
    }
}

/// The result of a successful verification. Only produced when every link passed, so each
/// outcome is a verified one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    nonce: Nonce,
    links: Vec<LinkOutcome>,
}

impl VerificationReport {
    pub(crate) fn new(nonce: Nonce, links: Vec<LinkOutcome>) -> Self {
        Self { nonce, links }
    }

    /// The artifact nonce the chain is anchored to
    pub fn nonce(&self) -> &Nonce {
        &self.nonce
    }

    pub fn links(&self) -> &[LinkOutcome] {
        &self.links
    }

    /// The artifact existed no later than this: the earliest upper bound of any link.
    pub fn not_after(&self) -> u64 {
        self.links
            .iter()
            .map(LinkOutcome::latest)
            .min()
            .unwrap_or(u64::MAX)
    }

    /// The chain was completed no earlier than this: the latest lower bound of any link.
    pub fn not_before(&self) -> u64 {
        self.links
            .iter()
            .map(LinkOutcome::earliest)
            .max()
            .unwrap_or(0)
    }

    /// Human-readable summary, one line per link followed by the overall bounds.
    pub fn info(&self) -> String {
        let mut out = String::new();

        // writing to a String cannot fail
        let _ = writeln!(out, "nonce {}", HEXLOWER.encode(self.nonce.as_ref()));

        for (idx, link) in self.links.iter().enumerate() {
            let _ = writeln!(
                out,
                "link {idx}: {} {} ±{}",
                link.server,
                format_micros(link.midpoint),
                format_radius(link.radius)
            );
        }

        let _ = writeln!(out, "existed before: {}", format_micros(self.not_after()));
        let _ = write!(out, "chain completed after: {}", format_micros(self.not_before()));
        out
    }
}

/// RFC 3339 in UTC, falling back to raw microseconds for values jiff cannot represent.
fn format_micros(micros: u64) -> String {
    i64::try_from(micros)
        .ok()
        .and_then(|m| Timestamp::from_microsecond(m).ok())
        .map(|ts| ts.to_string())
        .unwrap_or_else(|| format!("{micros}us"))
}

fn format_radius(micros: u32) -> String {
    format!("{}.{:06}s", micros / 1_000_000, micros % 1_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(server: &str, midpoint: u64, radius: u32) -> LinkOutcome {
        LinkOutcome {
            server: server.to_string(),
            midpoint,
            radius,
            root: MerkleRoot::default(),
            delegated_key: PublicKey::default(),
        }
    }

    #[test]
    fn bounds_across_links() {
        let report = VerificationReport::new(
            Nonce::default(),
            vec![
                outcome("a", 10_000_000, 1_000_000),
                outcome("b", 10_500_000, 100_000),
                outcome("c", 12_000_000, 5_000_000),
            ],
        );

        assert_eq!(report.not_before(), 10_400_000);
        assert_eq!(report.not_after(), 10_600_000);
    }

    #[test]
    fn info_lists_links_in_utc() {
        let report = VerificationReport::new(
            Nonce::default(),
            vec![outcome("Test", 1_700_000_000_000_000, 1_500_000)],
        );

        let info = report.info();
        assert!(
            info.contains("link 0: Test 2023-11-14T22:13:20Z ±1.500000s"),
            "{info}"
        );
        assert!(info.contains("existed before: 2023-11-14T22:13:21.5Z"), "{info}");
        assert!(info.starts_with(&format!("nonce {}", "00".repeat(64))), "{info}");
    }

    #[test]
    fn unrepresentable_midpoint_falls_back() {
        assert_eq!(format_micros(u64::MAX), format!("{}us", u64::MAX));
        assert_eq!(format_radius(42), "0.000042s");
    }
}
