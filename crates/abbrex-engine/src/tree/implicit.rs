use crate::profile::Profile;

/// Tag name for an element written without one (`.item`, `#main`), chosen
/// from the nearest named ancestor: `ul>.item` gives `li`, `tr>.c` gives
/// `td`. Falls back to `span` inside inline elements and `div` elsewhere.
pub fn implicit_tag(parent: Option<&str>, profile: &Profile) -> &'static str {
    let parent = parent.map(str::to_lowercase).unwrap_or_default();
    match parent.as_str() {
        "p" => "span",
        "ul" | "ol" => "li",
        "table" | "tbody" | "thead" | "tfoot" => "tr",
        "tr" => "td",
        "colgroup" => "col",
        "select" | "optgroup" => "option",
        "audio" | "video" => "source",
        "object" => "param",
        "map" => "area",
        name if !name.is_empty() && profile.is_inline(name) => "span",
        _ => "div",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Some("ul"), "li")]
    #[case(Some("OL"), "li")]
    #[case(Some("table"), "tr")]
    #[case(Some("tr"), "td")]
    #[case(Some("select"), "option")]
    #[case(Some("em"), "span")]
    #[case(Some("section"), "div")]
    #[case(None, "div")]
    fn picks_tag_from_parent(#[case] parent: Option<&str>, #[case] expected: &str) {
        assert_eq!(implicit_tag(parent, &Profile::default()), expected);
    }
}
