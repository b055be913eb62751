use super::card::CardType;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Issue,
    Deposit,
    Withdraw,
    Block,
    Unblock,
}

/// One row of a card operations batch.
///
/// `card` is a reference chosen by the batch author; `issue` binds it to the
/// newly created card and later rows use it to address that card. Columns not
/// used by the operation are left empty.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Operation {
    pub op: OperationType,
    pub card: u32,
    #[serde(default)]
    pub holder: Option<String>,
    #[serde(default)]
    pub r#type: Option<CardType>,
    #[serde(default)]
    pub account: Option<Uuid>,
    #[serde(default)]
    pub limit: Option<Decimal>,
    #[serde(default)]
    pub amount: Option<Decimal>,
}
