//! Display strings for catalog records

use crate::db::models::{Artist, Quote, Video};

/// "Name Surname", or just the name when the surname is empty
pub fn artist_display_name(artist: &Artist) -> String {
    let name = artist.name.trim();
    let surname = artist.surname.trim();
    match (name.is_empty(), surname.is_empty()) {
        (_, true) => name.to_string(),
        (true, false) => surname.to_string(),
        (false, false) => format!("{} {}", name, surname),
    }
}

/// Artist names joined for a video subtitle, e.g. "Bill Evans, Scott LaFaro"
pub fn artist_list(artists: &[&Artist]) -> String {
    artists
        .iter()
        .map(|a| artist_display_name(a))
        .collect::<Vec<_>>()
        .join(", ")
}

/// "<artists> · <length>" line shown under a video title
pub fn video_subtitle(video: &Video, artists: &[&Artist]) -> String {
    let names = artist_list(artists);
    match (names.is_empty(), video.duration_text.is_empty()) {
        (true, true) => String::new(),
        (true, false) => video.duration_text.clone(),
        (false, true) => names,
        (false, false) => format!("{} · {}", names, video.duration_text),
    }
}

/// Quote text with attribution, e.g. "“Text” — Miles Davis"
pub fn quote_attribution(quote: &Quote, artist: Option<&Artist>) -> String {
    match artist {
        Some(artist) => format!("“{}” — {}", quote.text, artist_display_name(artist)),
        None => format!("“{}”", quote.text),
    }
}
