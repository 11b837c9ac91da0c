//! The mutable result built up over a single owner search.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::contacts::{LabeledPhone, PhoneSet};

/// Phone numbers found on one relative's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeContact {
    /// 1-based position of the relative in the crawl order.
    pub index: usize,
    pub link: String,
    pub name: Option<String>,
    /// Associate listed at the same position on the owner's profile.
    pub associate_name: Option<String>,
    pub phones: Vec<LabeledPhone>,
}

/// Everything collected for one owner during one search session.
///
/// A fresh accumulator (`CrawlAccumulator::default()`) is also the value
/// returned when a search fails outright.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlAccumulator {
    pub matched: bool,
    pub phones: PhoneSet,
    pub relative_links: Vec<String>,
    pub associate_links: Vec<String>,
    pub relative_names: Vec<String>,
    pub associate_names: Vec<String>,
    pub emails: Vec<String>,
    pub relatives: Vec<RelativeContact>,
}

impl CrawlAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a match. Once set, `matched` never goes back to `false`.
    pub fn mark_matched(&mut self) {
        self.matched = true;
    }

    pub fn merge_phones<I>(&mut self, phones: I)
    where
        I: IntoIterator<Item = LabeledPhone>,
    {
        self.phones.merge(phones);
    }

    pub fn add_relative_links<I: IntoIterator<Item = String>>(&mut self, links: I) {
        push_unique(&mut self.relative_links, links);
    }

    pub fn add_associate_links<I: IntoIterator<Item = String>>(&mut self, links: I) {
        push_unique(&mut self.associate_links, links);
    }

    pub fn add_relative_names<I: IntoIterator<Item = String>>(&mut self, names: I) {
        push_unique(&mut self.relative_names, names);
    }

    pub fn add_associate_names<I: IntoIterator<Item = String>>(&mut self, names: I) {
        push_unique(&mut self.associate_names, names);
    }

    pub fn add_emails<I: IntoIterator<Item = String>>(&mut self, emails: I) {
        push_unique(&mut self.emails, emails);
    }

    /// Stores a crawled relative, replacing an earlier entry for the same link.
    pub fn record_relative(&mut self, contact: RelativeContact) {
        if let Some(existing) = self.relatives.iter_mut().find(|r| r.link == contact.link) {
            *existing = contact;
        } else {
            self.relatives.push(contact);
        }
        self.relatives.sort_by_key(|r| r.index);
    }

    /// Whether `link` has already been crawled as a relative this session.
    #[must_use]
    pub fn has_crawled_relative(&self, link: &str) -> bool {
        self.relatives.iter().any(|r| r.link == link)
    }

    /// Flattens crawled relatives into `relative{i}Name`, `relative{i}URL`,
    /// `associate{i}Name` and `relative{i}Contact{n}` fields (1-based).
    #[must_use]
    pub fn relative_fields(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        for relative in &self.relatives {
            let i = relative.index;
            fields.insert(format!("relative{i}URL"), relative.link.clone());
            if let Some(name) = &relative.name {
                fields.insert(format!("relative{i}Name"), name.clone());
            }
            if let Some(name) = &relative.associate_name {
                fields.insert(format!("associate{i}Name"), name.clone());
            }
            for (n, phone) in relative.phones.iter().enumerate() {
                fields.insert(format!("relative{i}Contact{}", n + 1), phone.to_string());
            }
        }
        fields
    }
}

fn push_unique<I: IntoIterator<Item = String>>(target: &mut Vec<String>, values: I) {
    for value in values {
        if !target.contains(&value) {
            target.push(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::PhoneLabel;

    #[test]
    fn default_is_the_zero_value() {
        let acc = CrawlAccumulator::default();
        assert!(!acc.matched);
        assert!(acc.phones.is_empty());
        assert!(acc.relative_links.is_empty());
        assert!(acc.emails.is_empty());
        assert!(acc.relatives.is_empty());
    }

    #[test]
    fn link_and_email_lists_deduplicate_by_value() {
        let mut acc = CrawlAccumulator::new();
        acc.add_relative_links(["/a".to_string(), "/b".to_string()]);
        acc.add_relative_links(["/b".to_string(), "/c".to_string()]);
        acc.add_emails(["x@y.com".to_string(), "x@y.com".to_string()]);
        assert_eq!(acc.relative_links, vec!["/a", "/b", "/c"]);
        assert_eq!(acc.emails, vec!["x@y.com"]);
    }

    #[test]
    fn record_relative_keeps_index_order_and_replaces_same_link() {
        let mut acc = CrawlAccumulator::new();
        let contact = |index: usize, link: &str| RelativeContact {
            index,
            link: link.to_string(),
            name: None,
            associate_name: None,
            phones: Vec::new(),
        };
        acc.record_relative(contact(2, "/two"));
        acc.record_relative(contact(1, "/one"));
        acc.record_relative(contact(2, "/two"));
        let order: Vec<usize> = acc.relatives.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 2]);
        assert!(acc.has_crawled_relative("/one"));
        assert!(!acc.has_crawled_relative("/three"));
    }

    #[test]
    fn relative_fields_flattens_with_one_based_contact_numbers() {
        let mut acc = CrawlAccumulator::new();
        acc.record_relative(RelativeContact {
            index: 1,
            link: "https://site.test/detail/mary".to_string(),
            name: Some("Mary Doe".to_string()),
            associate_name: None,
            phones: vec![
                LabeledPhone::new("(555) 111-2222", PhoneLabel::Wireless),
                LabeledPhone::new("(555) 333-4444", PhoneLabel::Unknown),
            ],
        });
        let fields = acc.relative_fields();
        assert_eq!(fields["relative1Name"], "Mary Doe");
        assert_eq!(fields["relative1URL"], "https://site.test/detail/mary");
        assert_eq!(fields["relative1Contact1"], "(555) 111-2222 - Wireless");
        assert_eq!(fields["relative1Contact2"], "(555) 333-4444 - Unknown");
        assert!(!fields.contains_key("associate1Name"));
    }
}
