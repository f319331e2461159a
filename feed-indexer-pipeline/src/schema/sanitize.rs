//! Cleaning of decoded cell values.

use scraper::Html;

/// Strip HTML markup, decode entities, then trim and collapse whitespace.
///
/// Entities are decoded after markup is stripped, so an escaped tag such as
/// `&lt;b&gt;` survives as literal text.
pub fn sanitize_value(text: &str) -> String {
    if !text.contains(['<', '&']) {
        return squish(text);
    }

    let fragment = Html::parse_fragment(text);
    let plain: String = fragment.root_element().text().collect();
    squish(&plain)
}

fn squish(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_squished() {
        assert_eq!(sanitize_value("  Senior \n  Engineer "), "Senior Engineer");
    }

    #[test]
    fn test_markup_is_stripped() {
        assert_eq!(
            sanitize_value("<p>Remote <b>first</b></p>\n<p>team</p>"),
            "Remote first team"
        );
    }

    #[test]
    fn test_entities_are_decoded() {
        assert_eq!(sanitize_value("Trade &amp; Policy&nbsp;Analyst"), "Trade & Policy Analyst");
    }

    #[test]
    fn test_escaped_markup_survives_as_text() {
        assert_eq!(
            sanitize_value("&lt;b&gt;Remote&lt;/b&gt; &amp; more"),
            "<b>Remote</b> & more"
        );
    }

    #[test]
    fn test_bare_ampersand_is_kept() {
        assert_eq!(sanitize_value("R&D"), "R&D");
    }
}
