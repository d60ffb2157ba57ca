use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Location {
    pub address1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub title: String,
    pub alias: Option<String>,
}

/// An action exposed by a business record, e.g. a reservation link.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EntityAction {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ContextualInfo {
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct Summaries {
    pub short: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct BizAttributes {
    pub biz_summary: Option<BizSummary>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct BizSummary {
    pub summary: Option<String>,
}

/// A single business as it appears on the wire. Every field is optional;
/// upstream responses are not consistent about which ones they populate.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct RawBusiness {
    pub id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub phone: Option<String>,
    pub rating: Option<f64>,
    pub price: Option<String>,
    pub distance: Option<f64>,
    pub location: Option<Location>,
    pub coordinates: Option<Coordinates>,
    pub categories: Option<Vec<Category>>,
    pub reservation_url: Option<String>,
    pub actions: Option<Vec<EntityAction>>,
    pub contextual_info: Option<ContextualInfo>,
    pub summaries: Option<Summaries>,
    pub attributes: Option<BizAttributes>,
}

/// A raw entity record from the chat response: either a flat business or a
/// container wrapping a nested `businesses` list, with container-level
/// summary/category/action fields that nested businesses may fall back to.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct RawRecord {
    #[serde(default)]
    pub businesses: Vec<RawBusiness>,
    #[serde(flatten)]
    pub record: RawBusiness,
}

fn reservable(reservation_url: Option<&str>, actions: &[EntityAction]) -> bool {
    reservation_url.is_some_and(|url| !url.is_empty())
        || actions
            .iter()
            .any(|action| action.kind.as_deref() == Some("reservation"))
}

impl RawBusiness {
    pub fn is_reservable(&self) -> bool {
        reservable(
            self.reservation_url.as_deref(),
            self.actions.as_deref().unwrap_or_default(),
        )
    }
}

/// Whether any top-level record advertises a reservation; drives the
/// rewrite prompt's reservation hint.
pub fn has_reservable_record(records: &[RawRecord]) -> bool {
    records.iter().any(|record| record.record.is_reservable())
}

/// A flattened, deduplicated, summary-enriched business recommendation.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Entity {
    pub id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub phone: Option<String>,
    pub rating: Option<f64>,
    pub price: Option<String>,
    pub distance: Option<f64>,
    pub location: Option<Location>,
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub categories: Vec<Category>,
    pub reservation_url: Option<String>,
    #[serde(default)]
    pub actions: Vec<EntityAction>,
    pub summary: Option<String>,
    pub mock_slots: Option<Vec<String>>,
}

impl Entity {
    /// Uniqueness key: id, else name, else url. Records with none of the
    /// three have no identity and are dropped during normalization.
    pub fn identity_key(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or(self.name.as_deref())
            .or(self.url.as_deref())
            .filter(|key| !key.is_empty())
    }

    pub fn is_reservable(&self) -> bool {
        reservable(self.reservation_url.as_deref(), &self.actions)
    }

    /// Resolution order: explicit reservation URL, first reservation-typed
    /// action's URL, then the entity's own URL when non-blank after trim.
    pub fn reservation_link(&self) -> Option<&str> {
        if let Some(url) = self.reservation_url.as_deref() {
            if !url.is_empty() {
                return Some(url);
            }
        }
        let action_url = self
            .actions
            .iter()
            .find(|action| action.kind.as_deref() == Some("reservation"))
            .and_then(|action| action.url.as_deref());
        action_url
            .or(self.url.as_deref())
            .filter(|url| !url.trim().is_empty())
    }
}
