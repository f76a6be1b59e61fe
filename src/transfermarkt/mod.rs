mod crawler;
mod pagination;

pub use crawler::RumoursCrawler;

use serde::Serialize;
use std::fmt;

pub const WITHOUT_CLUB: &str = "Without Club";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRumour {
    pub player_name: String,
    pub position: String,
    pub age: String,
    pub nationality: String,
    pub nationality_flag: String,
    pub player_image: String,
    pub current_club: String,
    pub current_club_league: String,
    pub interested_club: String,
    pub interested_club_league: String,
    pub contract_expires: String,
    pub market_value: String,
    pub probability: String,
}

impl fmt::Display for PlayerRumour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Player          : {} ({})", self.player_name, self.position)?;
        writeln!(f, "Age             : {}", self.age)?;
        writeln!(f, "Nationality     : {}", self.nationality)?;
        writeln!(
            f,
            "Current Club    : {} [{}]",
            self.current_club, self.current_club_league
        )?;
        writeln!(
            f,
            "Interested Club : {} [{}]",
            self.interested_club, self.interested_club_league
        )?;
        writeln!(f, "Contract Until  : {}", self.contract_expires)?;
        writeln!(f, "Market Value    : {}", self.market_value)?;
        if self.probability.is_empty() {
            writeln!(f, "Probability     : None")?;
        } else {
            writeln!(f, "Probability     : {}", self.probability)?;
        }
        Ok(())
    }
}
