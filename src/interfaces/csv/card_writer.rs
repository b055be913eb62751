use crate::domain::card::{Card, CardStatus, CardType};
use crate::domain::clock::Clock;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct CardRow {
    card: u32,
    r#type: CardType,
    status: CardStatus,
    balance: String,
    credit_limit: String,
    available: String,
    number: String,
}

/// Writes a summary of issued cards as CSV.
///
/// Card numbers are masked and the CVV is never written. `status` is the
/// status as of the writer's clock, so expired cards report `expired`.
pub struct CardWriter<'a, W: Write> {
    writer: csv::Writer<W>,
    clock: &'a dyn Clock,
}

impl<'a, W: Write> CardWriter<'a, W> {
    pub fn new(destination: W, clock: &'a dyn Clock) -> Self {
        Self {
            writer: csv::Writer::from_writer(destination),
            clock,
        }
    }

    pub fn write_cards(&mut self, cards: impl IntoIterator<Item = (u32, Card)>) -> Result<()> {
        for (reference, card) in cards {
            self.writer.serialize(CardRow {
                card: reference,
                r#type: card.card_type(),
                status: card.effective_status(self.clock),
                balance: card.balance().to_string(),
                credit_limit: card.credit_limit().normalize().to_string(),
                available: card.available_funds().normalize().to_string(),
                number: card.card_number().masked(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
