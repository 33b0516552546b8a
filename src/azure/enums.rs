//! Lookup tables between Azure DevOps numeric enums and their names.
//!
//! Unrecognized codes render as `unknown(<code>)`.

use serde_json::Value;

pub struct EnumTable {
    entries: &'static [(i64, &'static str)],
}

impl EnumTable {
    pub const fn new(entries: &'static [(i64, &'static str)]) -> Self {
        Self { entries }
    }

    pub fn name_of(&self, code: i64) -> String {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| name.to_string())
            .unwrap_or_else(|| format!("unknown({})", code))
    }

    /// Case-insensitive reverse lookup.
    pub fn code_of(&self, name: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name.trim()))
            .map(|(code, _)| *code)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|(_, name)| *name)
    }

    /// Rewrites a numeric JSON value to its name; strings and other values are left alone.
    pub fn normalize(&self, value: &mut Value) {
        if let Some(code) = value.as_i64() {
            *value = Value::String(self.name_of(code));
        }
    }
}

pub const PULL_REQUEST_STATUS: EnumTable = EnumTable::new(&[
    (0, "notSet"),
    (1, "active"),
    (2, "abandoned"),
    (3, "completed"),
]);

pub const MERGE_STATUS: EnumTable = EnumTable::new(&[
    (1, "conflicts"),
    (2, "failure"),
    (3, "notSet"),
    (4, "queued"),
    (5, "rejectedByPolicy"),
    (6, "succeeded"),
]);

pub const MERGE_STRATEGY: EnumTable = EnumTable::new(&[
    (1, "noFastForward"),
    (2, "squash"),
    (3, "rebase"),
    (4, "rebaseMerge"),
]);

pub const REVIEWER_VOTE: EnumTable = EnumTable::new(&[
    (10, "approved"),
    (5, "approvedWithSuggestions"),
    (0, "noVote"),
    (-5, "waitingForAuthor"),
    (-10, "rejected"),
]);

/// Rewrites the enumerated fields of a pull request JSON object in place.
pub fn normalize_pull_request(pull_request: &mut Value) {
    if let Some(status) = pull_request.get_mut("status") {
        PULL_REQUEST_STATUS.normalize(status);
    }
    if let Some(merge_status) = pull_request.get_mut("mergeStatus") {
        MERGE_STATUS.normalize(merge_status);
    }
    if let Some(strategy) = pull_request.pointer_mut("/completionOptions/mergeStrategy") {
        MERGE_STRATEGY.normalize(strategy);
    }
    if let Some(Value::Array(reviewers)) = pull_request.get_mut("reviewers") {
        for reviewer in reviewers {
            if let Some(vote) = reviewer.get_mut("vote") {
                REVIEWER_VOTE.normalize(vote);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pull_request_status_names() {
        let names: Vec<String> = (0..4).map(|c| PULL_REQUEST_STATUS.name_of(c)).collect();
        assert_eq!(names, ["notSet", "active", "abandoned", "completed"]);
        assert_eq!(PULL_REQUEST_STATUS.name_of(4), "unknown(4)");
        assert_eq!(PULL_REQUEST_STATUS.name_of(-1), "unknown(-1)");
    }

    #[test]
    fn merge_status_names() {
        let names: Vec<String> = (1..=6).map(|c| MERGE_STATUS.name_of(c)).collect();
        assert_eq!(
            names,
            [
                "conflicts",
                "failure",
                "notSet",
                "queued",
                "rejectedByPolicy",
                "succeeded"
            ]
        );
        assert_eq!(MERGE_STATUS.name_of(0), "unknown(0)");
    }

    #[test]
    fn reverse_lookup_is_case_insensitive() {
        assert_eq!(MERGE_STRATEGY.code_of("Squash"), Some(2));
        assert_eq!(MERGE_STRATEGY.code_of("rebasemerge"), Some(4));
        assert_eq!(MERGE_STRATEGY.code_of("octopus"), None);
        assert_eq!(REVIEWER_VOTE.code_of("approved"), Some(10));
    }

    #[test]
    fn every_name_round_trips() {
        for table in [&PULL_REQUEST_STATUS, &MERGE_STATUS, &MERGE_STRATEGY, &REVIEWER_VOTE] {
            for name in table.names() {
                let code = table.code_of(name).unwrap();
                assert_eq!(table.name_of(code), name);
            }
        }
    }

    #[test]
    fn normalizes_numeric_fields_only() {
        let mut pr = json!({
            "pullRequestId": 7,
            "status": 1,
            "mergeStatus": "succeeded",
            "completionOptions": { "mergeStrategy": 2 },
            "reviewers": [{ "displayName": "Jane", "vote": 10 }, { "vote": 3 }]
        });
        normalize_pull_request(&mut pr);
        assert_eq!(
            pr,
            json!({
                "pullRequestId": 7,
                "status": "active",
                "mergeStatus": "succeeded",
                "completionOptions": { "mergeStrategy": "squash" },
                "reviewers": [{ "displayName": "Jane", "vote": "approved" }, { "vote": "unknown(3)" }]
            })
        );
    }
}
