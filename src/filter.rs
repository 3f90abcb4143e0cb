//! Keyword filtering over the repository list.
//!
//! Every whitespace-separated token of the query must occur, case-insensitively,
//! somewhere in a repository's name, full name, organization or description.
//! The output keeps the input order; there is no ranking.

use crate::github::RepositoryRecord;

/// Lowercased, non-empty query tokens
pub fn keywords(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Text a repository is matched against
pub fn searchable_text(repo: &RepositoryRecord) -> String {
    [
        repo.name.as_str(),
        repo.full_name.as_str(),
        repo.org.as_str(),
        repo.description.as_deref().unwrap_or(""),
    ]
    .join(" ")
    .to_lowercase()
}

pub fn matches(repo: &RepositoryRecord, keywords: &[String]) -> bool {
    let text = searchable_text(repo);
    keywords.iter().all(|k| text.contains(k.as_str()))
}

/// Positions in `repos` of the records matching `query`
pub fn filter_indices(repos: &[RepositoryRecord], query: &str) -> Vec<usize> {
    let keywords = keywords(query);
    if keywords.is_empty() {
        return (0..repos.len()).collect();
    }

    repos
        .iter()
        .enumerate()
        .filter(|(_, repo)| matches(repo, &keywords))
        .map(|(idx, _)| idx)
        .collect()
}

pub fn filter<'a>(repos: &'a [RepositoryRecord], query: &str) -> Vec<&'a RepositoryRecord> {
    filter_indices(repos, query)
        .into_iter()
        .map(|idx| &repos[idx])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(org: &str, name: &str, description: Option<&str>) -> RepositoryRecord {
        RepositoryRecord {
            name: name.to_string(),
            full_name: format!("{org}/{name}"),
            url: format!("https://github.com/{org}/{name}"),
            description: description.map(str::to_string),
            org: org.to_string(),
        }
    }

    fn sample() -> Vec<RepositoryRecord> {
        vec![
            repo("acme", "api-gateway", Some("Edge routing for public APIs")),
            repo("acme", "billing", None),
            repo("globex", "Billing-UI", Some("Invoices dashboard")),
            repo("globex", "docs", Some("Public documentation site")),
            repo("initech", "tps-reports", Some("Report generator")),
        ]
    }

    fn names<'a>(repos: &[&'a RepositoryRecord]) -> Vec<&'a str> {
        repos.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn blank_query_returns_everything() {
        let all = sample();
        for query in ["", "   ", "\t\n"] {
            let result = filter(&all, query);
            assert_eq!(result.len(), all.len());
            assert!(result.iter().zip(&all).all(|(a, b)| std::ptr::eq(*a, b)));
        }
    }

    #[test]
    fn keywords_are_lowercased_and_split_on_whitespace_runs() {
        assert_eq!(keywords("  Foo\t BAR  baz "), vec!["foo", "bar", "baz"]);
        assert!(keywords("   ").is_empty());
    }

    #[test]
    fn single_keyword_is_case_insensitive() {
        let all = sample();
        assert_eq!(names(&filter(&all, "BILLING")), vec!["billing", "Billing-UI"]);
    }

    #[test]
    fn keywords_are_and_combined() {
        let all = sample();
        assert_eq!(names(&filter(&all, "billing globex")), vec!["Billing-UI"]);
        assert!(filter(&all, "billing initech").is_empty());
    }

    #[test]
    fn description_and_org_are_searchable() {
        let all = sample();
        assert_eq!(names(&filter(&all, "public")), vec!["api-gateway", "docs"]);
        assert_eq!(names(&filter(&all, "initech")), vec!["tps-reports"]);
    }

    #[test]
    fn missing_description_matches_as_empty() {
        let all = sample();
        assert!(filter(&all, "none").is_empty());
        assert_eq!(searchable_text(&all[1]), "billing acme/billing acme ");
    }

    #[test]
    fn result_is_an_ordered_subsequence() {
        let all = sample();
        for query in ["a", "b", "o", "public docs", "x", "acme"] {
            let idx = filter_indices(&all, query);
            assert!(idx.windows(2).all(|w| w[0] < w[1]), "query {query:?}");
        }
    }

    #[test]
    fn every_result_contains_every_token() {
        let all = sample();
        for query in ["ap", "glob  ui", "RE port", "e o"] {
            let tokens = keywords(query);
            for repo in filter(&all, query) {
                let text = searchable_text(repo);
                assert!(tokens.iter().all(|t| text.contains(t.as_str())));
            }
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        let all = sample();
        for query in ["", "billing", "public docs", "zzz", "e"] {
            let once: Vec<RepositoryRecord> = filter(&all, query).into_iter().cloned().collect();
            let twice: Vec<RepositoryRecord> = filter(&once, query).into_iter().cloned().collect();
            assert_eq!(once, twice, "query {query:?}");
        }
    }
}
