//! Deciding whether a scraped record is the owner being searched for.
//!
//! Cheap string heuristics run first, in a fixed order. Only when none of them
//! accepts any record on the page is the semantic oracle consulted, and an
//! oracle failure counts as "no match".

use std::sync::Arc;

use ownertrace_core::{OwnerIdentity, PersonName};
use serde::Serialize;

use crate::oracle::SemanticOracle;
use crate::types::ProfileRecord;

/// The rule that accepted a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// Record name equals an owner's full name.
    ExactName,
    /// Record name contains both an owner's first and last name.
    NameContainment,
    /// Owner known by last name only; name and a verbatim address agree.
    LastNameWithAddress,
    /// A record address and a target address agree after normalization.
    NormalizedAddress,
    /// The semantic oracle judged the names equivalent.
    Oracle,
}

/// Which [`MatchRule`]s are allowed to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct MatchPolicy {
    pub exact_name: bool,
    pub name_containment: bool,
    pub last_name_with_address: bool,
    pub normalized_address: bool,
    pub oracle: bool,
}

impl MatchPolicy {
    /// Every rule enabled. Used when searching by address.
    #[must_use]
    pub fn address_search() -> Self {
        Self {
            exact_name: true,
            name_containment: true,
            last_name_with_address: true,
            normalized_address: true,
            oracle: true,
        }
    }

    /// Normalized-address matching only. The searched name already narrows
    /// the listing, so a result is confirmed by its address.
    #[must_use]
    pub fn name_search() -> Self {
        Self {
            exact_name: false,
            name_containment: false,
            last_name_with_address: false,
            normalized_address: true,
            oracle: false,
        }
    }
}

/// Who and where we are looking for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchTarget {
    pub owners: Vec<PersonName>,
    pub addresses: Vec<String>,
}

impl MatchTarget {
    #[must_use]
    pub fn for_identity(identity: &OwnerIdentity) -> Self {
        Self {
            owners: identity.owners().cloned().collect(),
            addresses: non_blank(std::iter::once(identity.address.as_str())),
        }
    }

    /// Address-only target, e.g. mailing and property address.
    #[must_use]
    pub fn for_addresses<'a, I: IntoIterator<Item = &'a str>>(addresses: I) -> Self {
        Self {
            owners: Vec::new(),
            addresses: non_blank(addresses),
        }
    }
}

fn non_blank<'a, I: IntoIterator<Item = &'a str>>(values: I) -> Vec<String> {
    values
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Result of matching one page's records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    pub is_match: bool,
    pub rule: Option<MatchRule>,
    pub profile_link: Option<String>,
    /// Raw phone strings carried by the matched record.
    pub initial_phones: Vec<String>,
}

impl MatchOutcome {
    #[must_use]
    pub fn no_match() -> Self {
        Self::default()
    }

    fn matched(rule: MatchRule, record: &ProfileRecord) -> Self {
        Self {
            is_match: true,
            rule: Some(rule),
            profile_link: record.profile_link.clone(),
            initial_phones: record.telephones.clone(),
        }
    }
}

/// Lower-cases, splits on non-alphanumerics, drops the noise tokens `apt`,
/// `s`, `ave` and `esplanade`, and concatenates what is left.
///
/// `"123 S. Main Ave, Apt 4"` becomes `"123main4"`.
#[must_use]
pub fn normalize_address(address: &str) -> String {
    const NOISE: [&str; 4] = ["apt", "s", "ave", "esplanade"];
    address
        .to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty() && !NOISE.contains(token))
        .collect()
}

/// Whether two addresses agree after [`normalize_address`]: either normalized
/// form contains the other. Empty forms never agree.
#[must_use]
pub fn addresses_agree(a: &str, b: &str) -> bool {
    let a = normalize_address(a);
    let b = normalize_address(b);
    !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a))
}

fn squash(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Applies a [`MatchPolicy`] and, if allowed, a [`SemanticOracle`].
#[derive(Clone)]
pub struct IdentityMatcher {
    policy: MatchPolicy,
    oracle: Arc<dyn SemanticOracle>,
}

impl IdentityMatcher {
    #[must_use]
    pub fn new(policy: MatchPolicy, oracle: Arc<dyn SemanticOracle>) -> Self {
        Self { policy, oracle }
    }

    #[must_use]
    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Finds the first record that matches `target`.
    ///
    /// All records are tried against the heuristics before the oracle is asked
    /// about any of them.
    pub async fn match_records(
        &self,
        target: &MatchTarget,
        records: &[ProfileRecord],
    ) -> MatchOutcome {
        for record in records {
            if let Some(rule) = self.heuristic_rule(target, record) {
                tracing::debug!(?rule, name = ?record.name, "record matched heuristically");
                return MatchOutcome::matched(rule, record);
            }
        }

        if !self.policy.oracle {
            return MatchOutcome::no_match();
        }

        for record in records {
            let Some(name) = record.name.as_deref() else {
                continue;
            };
            for owner in target.owners.iter().filter_map(display_name) {
                match self.oracle.same_entity(&owner, name).await {
                    Ok(true) => {
                        tracing::debug!(owner = %owner, name, "record matched by oracle");
                        return MatchOutcome::matched(MatchRule::Oracle, record);
                    }
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!(owner = %owner, name, error = %e, "oracle comparison failed; treating as no match");
                    }
                }
            }
        }

        MatchOutcome::no_match()
    }

    /// The first enabled heuristic rule that accepts `record`.
    #[must_use]
    pub fn heuristic_rule(&self, target: &MatchTarget, record: &ProfileRecord) -> Option<MatchRule> {
        let record_name = record.name.as_deref().map(squash).unwrap_or_default();
        let owners = || target.owners.iter().filter(|o| !o.is_empty());

        if self.policy.exact_name && !record_name.is_empty() {
            let exact = owners()
                .filter_map(PersonName::full_name)
                .any(|full| squash(&full) == record_name);
            if exact {
                return Some(MatchRule::ExactName);
            }
        }

        if self.policy.name_containment && !record_name.is_empty() {
            let contained = owners().any(|o| match (&o.first, &o.last) {
                (Some(first), Some(last)) => {
                    record_name.contains(&squash(first)) && record_name.contains(&squash(last))
                }
                _ => false,
            });
            if contained {
                return Some(MatchRule::NameContainment);
            }
        }

        if self.policy.last_name_with_address && !record_name.is_empty() {
            let last_only = owners().any(|o| {
                o.first.is_none()
                    && o.last
                        .as_deref()
                        .is_some_and(|last| record_name.contains(&squash(last)))
            });
            if last_only && verbatim_address_match(target, record) {
                return Some(MatchRule::LastNameWithAddress);
            }
        }

        if self.policy.normalized_address {
            let agree = record.addresses.iter().any(|address| {
                target
                    .addresses
                    .iter()
                    .any(|wanted| addresses_agree(&address.full, wanted))
            });
            if agree {
                return Some(MatchRule::NormalizedAddress);
            }
        }

        None
    }
}

/// Whatever parts of the name are known, space-joined.
fn display_name(name: &PersonName) -> Option<String> {
    let joined = [name.first.as_deref(), name.last.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    Some(joined).filter(|s| !s.is_empty())
}

fn verbatim_address_match(target: &MatchTarget, record: &ProfileRecord) -> bool {
    record.addresses.iter().any(|address| {
        let full = address.full.to_lowercase();
        target
            .addresses
            .iter()
            .any(|wanted| full.contains(&wanted.to_lowercase()))
    })
}

impl std::fmt::Debug for IdentityMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityMatcher")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "matcher_test.rs"]
mod tests;
