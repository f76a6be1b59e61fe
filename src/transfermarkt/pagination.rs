use crate::PageCursor;
use lazy_static::lazy_static;
use scraper::{Html, Selector};

const E: &str = "Invalid selector";
const DISABLED: &str = "tm-pagination__list-item--disabled";
lazy_static! {
    static ref PAGE_ITEMS: Selector =
        Selector::parse("ul.tm-pagination li.tm-pagination__list-item").expect(E);
    static ref NEXT_PAGE: Selector =
        Selector::parse("li.tm-pagination__list-item--icon-next-page").expect(E);
}

/// Largest numeric label in the pagination widget.
pub(crate) fn max_page_label(doc: &Html) -> Option<u32> {
    doc.select(&PAGE_ITEMS)
        .filter_map(|li| li.text().collect::<String>().trim().parse::<u32>().ok())
        .max()
}

pub(crate) fn has_next_affordance(doc: &Html) -> bool {
    match doc.select(&NEXT_PAGE).next() {
        Some(li) => !li
            .value()
            .attr("class")
            .map_or(false, |class| class.split_whitespace().any(|c| c == DISABLED)),
        None => false,
    }
}

/// `current_page` is the page that was just processed.
pub(crate) fn next_page(doc: &Html, current_page: u32, total_pages: u32) -> PageCursor {
    let total_pages = max_page_label(doc).unwrap_or(total_pages);
    let proceed = has_next_affordance(doc) && current_page < total_pages;
    PageCursor {
        proceed,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(items: &str) -> Html {
        Html::parse_document(&format!(
            r#"<html><body><div class="pager"><ul class="tm-pagination">{}</ul></div></body></html>"#,
            items
        ))
    }

    const NUMBERED: &str = r#"
        <li class="tm-pagination__list-item"><a href="?page=1">1</a></li>
        <li class="tm-pagination__list-item tm-pagination__list-item--active"><a href="?page=2">2</a></li>
        <li class="tm-pagination__list-item"><a href="?page=3">3</a></li>"#;

    #[test]
    fn continues_while_below_total() {
        let doc = widget(&format!(
            r#"{}<li class="tm-pagination__list-item tm-pagination__list-item--icon-next-page"><a title="Go to next page">›</a></li>"#,
            NUMBERED
        ));
        assert_eq!(max_page_label(&doc), Some(3));
        assert_eq!(
            next_page(&doc, 1, 1),
            PageCursor {
                proceed: true,
                total_pages: 3
            }
        );
    }

    #[test]
    fn stops_once_counter_passes_total() {
        let doc = widget(&format!(
            r#"{}<li class="tm-pagination__list-item tm-pagination__list-item--icon-next-page"><a>›</a></li>"#,
            NUMBERED
        ));
        let cursor = next_page(&doc, 3, 3);
        assert!(!cursor.proceed);
        assert_eq!(cursor.total_pages, 3);
    }

    #[test]
    fn disabled_next_page_stops() {
        let doc = widget(&format!(
            r#"{}<li class="tm-pagination__list-item tm-pagination__list-item--icon-next-page tm-pagination__list-item--disabled"><a>›</a></li>"#,
            NUMBERED
        ));
        assert!(!has_next_affordance(&doc));
        assert!(!next_page(&doc, 1, 3).proceed);
    }

    #[test]
    fn missing_widget_keeps_known_total() {
        let doc = Html::parse_document("<html><body><p>nothing here</p></body></html>");
        assert_eq!(max_page_label(&doc), None);
        assert_eq!(
            next_page(&doc, 1, 4),
            PageCursor {
                proceed: false,
                total_pages: 4
            }
        );
    }
}
