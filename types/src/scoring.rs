/// Score change for one player at the end of a round.
///
/// Falling short of the bid costs the whole bid; making it earns the bid plus a
/// tenth of a point for every extra trick.
pub fn round_score(bid: u8, tricks_won: u8) -> f64 {
    let bid = i32::from(bid);
    let won = i32::from(tricks_won);
    let tenths = if won < bid {
        -bid * 10
    } else {
        bid * 10 + (won - bid)
    };
    f64::from(tenths) / 10.0
}

/// Adds a round's delta to a running total, keeping one decimal place.
pub fn accumulate(score: f64, delta: f64) -> f64 {
    round_to_tenths(score + delta)
}

pub fn round_to_tenths(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missed_bid_costs_the_bid() {
        assert_eq!(round_score(5, 3), -5.0);
        assert_eq!(round_score(1, 0), -1.0);
    }

    #[test]
    fn overtricks_add_a_tenth_each() {
        assert_eq!(round_score(5, 7), 5.2);
        assert_eq!(round_score(2, 13), 3.1);
    }

    #[test]
    fn exact_bid_scores_the_bid() {
        assert_eq!(round_score(5, 5), 5.0);
    }

    #[test]
    fn running_total_stays_in_tenths() {
        let mut score = 0.0;
        for _ in 0..10 {
            score = accumulate(score, round_score(3, 4));
        }
        assert_eq!(score, 31.0);
        assert_eq!(accumulate(5.2, -8.0), -2.8);
    }
}
