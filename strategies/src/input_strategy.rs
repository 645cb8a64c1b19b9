use std::{
    fmt,
    io::{self, BufRead, BufReader, Write},
};

use itertools::Itertools;
use regex::Regex;
use types::{
    rules::{is_valid_bid, MAX_BID, MIN_BID},
    Card, Hand, PlayerState, Room, Strategy,
};

/// Asks a human for every decision. Once the input is closed the seat is given up.
pub struct InputStrategy {
    input: Box<dyn BufRead + Send>,
}

impl Default for InputStrategy {
    fn default() -> Self {
        Self::from_reader(BufReader::new(io::stdin()))
    }
}

impl fmt::Debug for InputStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputStrategy").finish_non_exhaustive()
    }
}

impl InputStrategy {
    pub fn from_reader(input: impl BufRead + Send + 'static) -> Self {
        Self {
            input: Box::new(input),
        }
    }

    /// Re-prompts until `parse` accepts a line. `None` once input is exhausted.
    fn ask<T>(&mut self, prompt: &str, parse: impl Fn(&str) -> Result<T, String>) -> Option<T> {
        let mut buf = String::new();
        loop {
            buf.clear();
            print!("{prompt}");
            let _ = io::stdout().flush();
            match self.input.read_line(&mut buf) {
                Ok(0) => {
                    log::warn!("Input closed, leaving the table");
                    return None;
                }
                Ok(_) => match parse(buf.trim()) {
                    Ok(value) => return Some(value),
                    Err(err) => log::error!("{err}"),
                },
                Err(err) => {
                    log::error!("Error reading input: {err}");
                    return None;
                }
            }
        }
    }
}

impl Strategy for InputStrategy {
    fn select_bid(&mut self, me: &PlayerState, room: &Room) -> Option<u8> {
        print_table(room);
        println!("Your hand: {}", me.hand.sorted_for_display().iter().join(" "));
        self.ask(&format!("Your bid ({MIN_BID}-{MAX_BID})? >> "), bid_from_str)
    }

    fn select_card(&mut self, me: &PlayerState, room: &Room, legal: &[Card]) -> Option<Card> {
        print_table(room);
        println!("Private info: {me}");
        println!(
            "Playable: {}",
            legal.sorted_for_display().iter().join(" || ")
        );

        // if only one card is playable, play it
        if let [only] = legal {
            log::info!("Only have one card available: {only}");
            return Some(*only);
        }
        self.ask("Your card? >> ", |line| card_from_str(line, legal))
    }
}

fn print_table(room: &Room) {
    for (seat, player) in room.players.values().enumerate() {
        let marker = if room.turn_index == Some(seat) { ">" } else { " " };
        println!(
            "{marker} {} bid {} won {} score {:.1} ({} cards)",
            player.name,
            player
                .bid
                .map(|b| b.to_string())
                .unwrap_or("-".to_string()),
            player.tricks_won,
            player.score,
            player.hand.len()
        );
    }
    println!("Trick: [ {} ]", room.trick.iter().join(", "));
}

fn bid_from_str(input: &str) -> Result<u8, String> {
    let bid: u8 = input
        .parse()
        .map_err(|err| format!("Not a number: {input:?} ({err})"))?;
    if !is_valid_bid(bid) {
        return Err(format!("Bid must be between {MIN_BID} and {MAX_BID}"));
    }
    Ok(bid)
}

fn card_from_str(input: &str, legal: &[Card]) -> Result<Card, String> {
    let card_re =
        Regex::new(r"(?i)^(?:play\s+)?(?<card>(?:10|[2-9tjqka])[shcd\u{2660}-\u{2667}])$")
            .expect("Valid card regex");
    let Some(caps) = card_re.captures(input) else {
        return Err(format!("Unable to parse a card from {input:?}"));
    };
    let text = normalise_suit_symbol(
        caps.name("card")
            .expect("card is a required group")
            .as_str(),
    );
    let card = Card::parse(&text).map_err(|err| err.to_string())?;
    if legal.contains(&card) {
        Ok(card)
    } else {
        Err(format!("{card} is not playable right now"))
    }
}

fn normalise_suit_symbol(text: &str) -> String {
    text.replace('\u{2660}', "S")
        .replace('\u{2665}', "H")
        .replace('\u{2666}', "D")
        .replace('\u{2663}', "C")
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn card(text: &str) -> Card {
        Card::parse(text).unwrap()
    }

    fn typed(lines: &str) -> InputStrategy {
        InputStrategy::from_reader(Cursor::new(lines.to_string()))
    }

    #[test]
    fn parses_bids_in_range() {
        assert_eq!(bid_from_str("3"), Ok(3));
        assert!(bid_from_str("0").is_err());
        assert!(bid_from_str("nine").is_err());
    }

    #[test]
    fn parses_card_notation() {
        let legal = vec![card("10H"), card("AS"), card("QD")];
        assert_eq!(card_from_str("10h", &legal), Ok(card("10H")));
        assert_eq!(card_from_str("play AS", &legal), Ok(card("AS")));
        assert_eq!(card_from_str("Q\u{2666}", &legal), Ok(card("QD")));
    }

    #[test]
    fn rejects_unplayable_cards() {
        let legal = vec![card("10H")];
        assert!(card_from_str("2C", &legal).is_err());
        assert!(card_from_str("11H", &legal).is_err());
    }

    #[test]
    fn reprompts_until_a_valid_bid() {
        let me = PlayerState::new("p_me", "Me");
        let mut strategy = typed("nine\n12\n4\n");
        assert_eq!(strategy.select_bid(&me, &Room::default()), Some(4));
    }

    #[test]
    fn closed_input_gives_up_the_seat() {
        let me = PlayerState::new("p_me", "Me");
        let legal = vec![card("10H"), card("AS")];
        assert_eq!(typed("").select_bid(&me, &Room::default()), None);
        assert_eq!(typed("ZZ\n").select_card(&me, &Room::default(), &legal), None);
    }

    #[test]
    fn reads_a_card_from_input() {
        let me = PlayerState::new("p_me", "Me");
        let legal = vec![card("10H"), card("AS")];
        assert_eq!(
            typed("2C\nas\n").select_card(&me, &Room::default(), &legal),
            Some(card("AS"))
        );
    }
}
