//! Profile expansion: pull every contact section of a matched profile into the
//! accumulator, then fetch a bounded number of relative profiles in parallel.

use futures::stream::{self, StreamExt};
use ownertrace_core::{CrawlAccumulator, RelativeContact};

use crate::client::urls::resolve_profile_url;
use crate::client::PageFetcher;
use crate::extract::{extract_phone_section, extract_profile_details};
use crate::phone::PhoneLabeler;
use crate::types::PersonLink;

/// Limits on the relative crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionLimits {
    /// Relatives crawled per search session.
    pub max_relatives_to_crawl: usize,
    /// Relative fetches in flight at once.
    pub max_parallel: usize,
}

impl Default for ExpansionLimits {
    fn default() -> Self {
        Self {
            max_relatives_to_crawl: 5,
            max_parallel: 10,
        }
    }
}

/// A relative scheduled for crawling.
struct RelativeJob {
    index: usize,
    link: String,
    name: Option<String>,
    associate_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProfileExpander {
    fetcher: PageFetcher,
    labeler: PhoneLabeler,
    site_base_url: String,
    limits: ExpansionLimits,
}

impl ProfileExpander {
    #[must_use]
    pub fn new(
        fetcher: PageFetcher,
        labeler: PhoneLabeler,
        site_base_url: &str,
        limits: ExpansionLimits,
    ) -> Self {
        Self {
            fetcher,
            labeler,
            site_base_url: site_base_url.to_owned(),
            limits,
        }
    }

    /// Labels `raw` phones and merges them into `acc`.
    pub async fn absorb_phones(&self, raw: &[String], acc: &mut CrawlAccumulator) {
        if raw.is_empty() {
            return;
        }
        let labeled = self.labeler.label(raw).await;
        acc.merge_phones(labeled.into_vec());
    }

    /// Fetches the profile at `profile_url` and folds its contact data, plus
    /// `initial_phones` from the matched record, into `acc`. Then crawls the
    /// profile's relatives.
    pub async fn expand(&self, profile_url: &str, initial_phones: &[String], acc: &mut CrawlAccumulator) {
        tracing::info!(profile_url, "expanding matched profile");
        let html = self.fetcher.fetch_document(profile_url).await;
        let details = extract_profile_details(&html);

        let mut raw_phones = initial_phones.to_vec();
        raw_phones.extend(details.phones.iter().cloned());
        self.absorb_phones(&raw_phones, acc).await;

        let relatives = self.resolve_links(&details.relatives);
        let associates = self.resolve_links(&details.associates);

        acc.add_relative_links(relatives.iter().map(|r| r.link.clone()));
        acc.add_associate_links(associates.iter().map(|a| a.link.clone()));
        acc.add_relative_names(relatives.iter().filter_map(|r| r.name.clone()));
        acc.add_associate_names(associates.iter().filter_map(|a| a.name.clone()));
        acc.add_emails(details.emails);

        tracing::info!(
            profile_url,
            phones = acc.phones.len(),
            relatives = relatives.len(),
            associates = associates.len(),
            emails = acc.emails.len(),
            "profile expanded"
        );

        self.crawl_relatives(&relatives, &associates, acc).await;
    }

    /// Crawls up to the remaining session budget of not-yet-crawled
    /// `relatives`, at most `max_parallel` at a time.
    ///
    /// The associate name of a relative is the associate at the same position
    /// on the profile, if there is one.
    pub async fn crawl_relatives(
        &self,
        relatives: &[PersonLink],
        associates: &[PersonLink],
        acc: &mut CrawlAccumulator,
    ) {
        let budget = self
            .limits
            .max_relatives_to_crawl
            .saturating_sub(acc.relatives.len());
        let first_index = acc.relatives.len() + 1;

        let jobs: Vec<RelativeJob> = relatives
            .iter()
            .enumerate()
            .filter(|(_, r)| !acc.has_crawled_relative(&r.link))
            .take(budget)
            .enumerate()
            .map(|(offset, (position, relative))| RelativeJob {
                index: first_index + offset,
                link: relative.link.clone(),
                name: relative.name.clone(),
                associate_name: associates.get(position).and_then(|a| a.name.clone()),
            })
            .collect();

        if jobs.is_empty() {
            return;
        }
        tracing::info!(count = jobs.len(), max_parallel = self.limits.max_parallel, "crawling relatives");

        let contacts: Vec<RelativeContact> = stream::iter(jobs)
            .map(|job| self.crawl_relative(job))
            .buffer_unordered(self.limits.max_parallel.max(1))
            .collect()
            .await;

        for contact in contacts {
            acc.record_relative(contact);
        }
    }

    async fn crawl_relative(&self, job: RelativeJob) -> RelativeContact {
        tracing::debug!(index = job.index, link = %job.link, "crawling relative");
        let html = self.fetcher.fetch_document(&job.link).await;
        let raw = extract_phone_section(&html);
        let phones = self.labeler.label(&raw).await.into_vec();
        RelativeContact {
            index: job.index,
            link: job.link,
            name: job.name,
            associate_name: job.associate_name,
            phones,
        }
    }

    fn resolve_links(&self, people: &[PersonLink]) -> Vec<PersonLink> {
        let mut resolved: Vec<PersonLink> = Vec::with_capacity(people.len());
        for person in people {
            let link = resolve_profile_url(&self.site_base_url, &person.link);
            if !resolved.iter().any(|p| p.link == link) {
                resolved.push(PersonLink {
                    link,
                    name: person.name.clone(),
                });
            }
        }
        resolved
    }
}
