use scraper::{ElementRef, Html, Selector};

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

#[track_caller]
pub(crate) fn must_get_by_id<'a>(html: &'a Html, id: &str) -> ElementRef<'a> {
    let selector = Selector::parse(&format!("#{id}")).unwrap();

    html.select(&selector)
        .next()
        .unwrap_or_else(|| panic!("No element found with id \"{id}\""))
}

/// The element's text with surrounding whitespace trimmed.
pub(crate) fn text_of(element: &ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join("").trim().to_owned()
}
