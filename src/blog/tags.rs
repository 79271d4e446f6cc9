//! Tag normalisation and popularity counts.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}

/// Trims tags, drops empty ones and removes duplicates, keeping the first occurrence.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

/// Counts how many posts carry each tag, most popular first.
///
/// A post counts once per distinct tag. Equal counts keep first-seen order.
pub fn aggregate_tags<I, T>(tag_sets: I) -> Vec<TagCount>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[String]>,
{
    let mut counts: Vec<TagCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for tags in tag_sets {
        let mut seen_in_post = HashSet::new();
        for tag in tags.as_ref() {
            if !seen_in_post.insert(tag.as_str()) {
                continue;
            }
            match index.get(tag) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(tag.clone(), counts.len());
                    counts.push(TagCount {
                        name: tag.clone(),
                        count: 1,
                    });
                }
            }
        }
    }

    // sort_by is stable, so ties stay in first-seen order.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|tags| tags.iter().map(|t| t.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_aggregate_counts_and_sorts() {
        let counts = aggregate_tags(sets(&[&["a", "b"], &["a"]]));
        assert_eq!(
            counts,
            vec![
                TagCount {
                    name: "a".into(),
                    count: 2
                },
                TagCount {
                    name: "b".into(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_aggregate_ties_keep_first_seen_order() {
        let counts = aggregate_tags(sets(&[&["x", "y"], &["z"]]));
        let names: Vec<_> = counts.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_aggregate_counts_a_post_once_per_tag() {
        let counts = aggregate_tags(sets(&[&["rust", "rust"]]));
        assert_eq!(counts[0].count, 1);
    }

    #[test]
    fn test_aggregate_empty_input() {
        assert!(aggregate_tags(Vec::<Vec<String>>::new()).is_empty());
    }

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags(vec![
            " rust ".into(),
            "".into(),
            "web".into(),
            "rust".into(),
            "   ".into(),
        ]);
        assert_eq!(tags, vec!["rust".to_string(), "web".to_string()]);
    }
}
