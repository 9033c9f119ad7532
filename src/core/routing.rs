use crate::domain::model::{is_valid_party_id, PartySide};
use crate::domain::ports::RoutingHeaders;
use crate::utils::error::{OcpiError, Result};

pub const FROM_COUNTRY_CODE: &str = "OCPI-from-country-code";
pub const FROM_PARTY_ID: &str = "OCPI-from-party-id";
pub const TO_COUNTRY_CODE: &str = "OCPI-to-country-code";
pub const TO_PARTY_ID: &str = "OCPI-to-party-id";

/// Optional sender/receiver party identifiers, e.g. `NLABC`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingParties {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl RoutingParties {
    pub fn new(from: Option<String>, to: Option<String>) -> Self {
        Self { from, to }
    }

    pub fn headers(&self) -> Result<RoutingHeaders> {
        routing_headers(self.from.as_deref(), self.to.as_deref())
    }
}

/// 驗證 party 並拆成國碼與 party id 標頭；未提供的一方不產生標頭
pub fn routing_headers(from: Option<&str>, to: Option<&str>) -> Result<RoutingHeaders> {
    let mut headers = RoutingHeaders::new();

    if let Some(party) = from {
        let (country, party_id) = split_party(PartySide::Sender, party)?;
        headers.insert(FROM_COUNTRY_CODE, country.to_string());
        headers.insert(FROM_PARTY_ID, party_id.to_string());
    }

    if let Some(party) = to {
        let (country, party_id) = split_party(PartySide::Receiver, party)?;
        headers.insert(TO_COUNTRY_CODE, country.to_string());
        headers.insert(TO_PARTY_ID, party_id.to_string());
    }

    Ok(headers)
}

fn split_party(side: PartySide, party: &str) -> Result<(&str, &str)> {
    if !is_valid_party_id(party) {
        return Err(OcpiError::InvalidRoutingParty {
            side,
            value: party.to_string(),
        });
    }
    // pattern 保證全為 ASCII
    Ok(party.split_at(2))
}
