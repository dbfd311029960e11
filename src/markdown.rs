use pulldown_cmark::*;

/// Converts a talk's markdown body to HTML.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(
        &mut out,
        Parser::new_ext(markdown, options).map(convert),
    );
    out
}

fn convert(ev: Event) -> Event {
    match ev {
        // Talks are rendered as cards below the page title (h1) and the
        // section title (h2), so `#` becomes h3.
        Event::Start(Tag::Heading(s)) => Event::Start(Tag::Heading(s + 2)),
        Event::End(Tag::Heading(s)) => Event::End(Tag::Heading(s + 2)),
        _ => ev,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_paragraph() {
        assert_eq!("<p>hello <em>world</em></p>\n", to_html("hello *world*"));
    }

    #[test]
    fn test_headings_are_demoted() {
        assert_eq!("<h3>Title</h3>\n", to_html("# Title"));
        assert_eq!("<h4>Sub</h4>\n", to_html("## Sub"));
    }
}
