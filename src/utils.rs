use itertools::Itertools;
use lazy_regex::regex;
use scraper::ElementRef;

/// All descendant text of `el`, trimmed.
pub(crate) fn element_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Descendant text nodes trimmed and joined with a single space, empty nodes dropped.
pub(crate) fn joined_text(el: ElementRef) -> String {
    el.text().map(str::trim).filter(|t| !t.is_empty()).join(" ")
}

/// Inlined placeholder images are not real assets.
pub(crate) fn normalize_image_src(src: &str) -> String {
    if src.trim_start().starts_with("data:") {
        String::new()
    } else {
        src.to_string()
    }
}

/// Keeps ASCII digits and `%` in their original order.
pub(crate) fn clean_probability(raw: &str) -> String {
    regex!(r"[^0-9%]").replace_all(raw, "").into_owned()
}
