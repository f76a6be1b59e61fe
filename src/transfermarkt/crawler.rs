use super::{pagination, PlayerRumour, WITHOUT_CLUB};
use crate::{
    utils::{clean_probability, element_text, joined_text, normalize_image_src},
    Crawler, CrawlerResult, PageCursor, SkipReason,
};
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};

const MIN_CELLS: usize = 9;

const PLAYER_PATH: &str = "/profil/spieler/";
const CLUB_PATH: &str = "/startseite/verein/";
const COMPETITION_PATH: &str = "/wettbewerb/";

const E: &str = "Invalid selector";
lazy_static! {
    static ref RESULTS_BODY: Selector = Selector::parse("table.items > tbody").expect(E);
    static ref PLAYER_IMAGE: Selector = Selector::parse("img.bilderrahmen-fixed").expect(E);
    static ref FLAG: Selector = Selector::parse("img.flaggenrahmen").expect(E);
    static ref LINK: Selector = Selector::parse("a[href]").expect(E);
    static ref TD: Selector = Selector::parse("td").expect(E);
}

/// Latest transfer rumours listing.
#[derive(Debug, Default)]
pub struct RumoursCrawler;

fn child_elements<'a>(el: ElementRef<'a>, name: &'a str) -> impl Iterator<Item = ElementRef<'a>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(move |c| c.value().name() == name)
}

fn link_to<'a>(cell: ElementRef<'a>, path: &str) -> Option<ElementRef<'a>> {
    cell.select(&LINK)
        .find(|a| a.value().attr("href").map_or(false, |h| h.contains(path)))
}

/// Club name from the club link's title, league from the competition link's text.
fn parse_club(cell: ElementRef) -> (String, String) {
    let club = link_to(cell, CLUB_PATH)
        .map(|a| match a.value().attr("title") {
            Some(title) => title.trim().to_string(),
            None => element_text(a),
        })
        .unwrap_or_else(|| WITHOUT_CLUB.to_string());

    let league = link_to(cell, COMPETITION_PATH)
        .map(|a| {
            let text = element_text(a);
            if text.is_empty() {
                a.value().attr("title").unwrap_or_default().trim().to_string()
            } else {
                text
            }
        })
        .unwrap_or_default();

    (club, league)
}

/// The position sits in the last cell of the inline table next to the portrait.
fn parse_position(cell: ElementRef) -> String {
    cell.select(&TD)
        .last()
        .filter(|td| link_to(*td, PLAYER_PATH).is_none())
        .map(element_text)
        .unwrap_or_default()
}

fn parse_row(row: ElementRef) -> Result<PlayerRumour, SkipReason> {
    let cells: Vec<ElementRef> = child_elements(row, "td").collect();
    if cells.len() < MIN_CELLS {
        return Err(SkipReason::TooFewCells {
            found: cells.len(),
            expected: MIN_CELLS,
        });
    }

    let player = cells[0];
    let player_image = player
        .select(&PLAYER_IMAGE)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(normalize_image_src)
        .unwrap_or_default();
    let player_name = link_to(player, PLAYER_PATH)
        .map(element_text)
        .unwrap_or_default();
    let position = parse_position(player);

    let age = element_text(cells[1]);

    let (nationality, nationality_flag) = match cells[2].select(&FLAG).next() {
        Some(img) => {
            let title = img.value().attr("title").ok_or(SkipReason::MissingAttribute {
                element: "img",
                attr: "title",
            })?;
            let src = img.value().attr("src").ok_or(SkipReason::MissingAttribute {
                element: "img",
                attr: "src",
            })?;
            (title.trim().to_string(), src.to_string())
        }
        None => (String::new(), String::new()),
    };

    let (current_club, current_club_league) = parse_club(cells[3]);
    let (interested_club, interested_club_league) = parse_club(cells[4]);

    let contract_expires = element_text(cells[5]);
    let market_value = element_text(cells[6]);
    let probability = clean_probability(&joined_text(cells[8]));

    Ok(PlayerRumour {
        player_name,
        position,
        age,
        nationality,
        nationality_flag,
        player_image,
        current_club,
        current_club_league,
        interested_club,
        interested_club_league,
        contract_expires,
        market_value,
        probability,
    })
}

impl Crawler for RumoursCrawler {
    type Record = PlayerRumour;

    fn crawl(&self, doc: &Html) -> CrawlerResult<Self::Record> {
        let body = match doc.select(&RESULTS_BODY).next() {
            Some(body) => body,
            None => return CrawlerResult::NoResults,
        };

        let rows: Vec<_> = child_elements(body, "tr").map(parse_row).collect();
        if rows.is_empty() {
            CrawlerResult::NoResults
        } else {
            CrawlerResult::Rows(rows)
        }
    }

    fn next_page(&self, doc: &Html, current_page: u32, total_pages: u32) -> PageCursor {
        pagination::next_page(doc, current_page, total_pages)
    }
}
