use std::collections::BTreeSet;

/// Resolves the `ALLOWED_TOOLS` allow-list against the registered tool names.
///
/// Unset or blank allows every tool. Otherwise the comma-separated names are
/// trimmed, empties dropped and duplicates collapsed. Unknown names are kept
/// in the returned set (they simply match nothing) and logged as a warning.
pub fn parse_allowed_tools(raw: Option<&str>, all_tools: &BTreeSet<String>) -> BTreeSet<String> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return all_tools.clone();
    };

    let allowed: BTreeSet<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    for name in allowed.difference(all_tools) {
        log::warn!("ALLOWED_TOOLS names unknown tool '{}'", name);
    }

    allowed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> BTreeSet<String> {
        ["azdo_get_work_item", "azdo_list_boards", "azdo_list_branches"]
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn unset_allows_everything() {
        assert_eq!(parse_allowed_tools(None, &all()), all());
    }

    #[test]
    fn blank_allows_everything() {
        assert_eq!(parse_allowed_tools(Some("  "), &all()), all());
    }

    #[test]
    fn subset_is_exactly_the_named_tools() {
        let allowed = parse_allowed_tools(
            Some(" azdo_list_boards,azdo_get_work_item,,azdo_list_boards "),
            &all(),
        );
        let expected: BTreeSet<String> = ["azdo_get_work_item", "azdo_list_boards"]
            .into_iter()
            .map(str::to_string)
            .collect();
        assert_eq!(allowed, expected);
    }

    #[test]
    fn unknown_names_match_nothing() {
        let allowed = parse_allowed_tools(Some("azdo_delete_everything"), &all());
        assert!(allowed.is_disjoint(&all()));
    }
}
