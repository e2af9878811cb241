use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A scraped storefront whose catalog is compared against the other.
///
/// `Tunisianet` is the A side of every catalog entry and `Mytek` the B side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    Tunisianet,
    Mytek,
}

impl Vendor {
    pub const ALL: [Vendor; 2] = [Vendor::Tunisianet, Vendor::Mytek];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Vendor::Tunisianet => "tunisianet",
            Vendor::Mytek => "mytek",
        }
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One listing from one vendor, as seen by the matching engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Identifier of the catalog entry this record was read from.
    pub entry_id: i64,
    pub vendor: Vendor,
    pub reference: Option<String>,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub brand: Option<String>,
    pub category: Option<String>,
}

impl ProductRecord {
    /// A record with only its identity set; every optional field is empty.
    #[must_use]
    pub fn new(entry_id: i64, vendor: Vendor) -> Self {
        Self {
            entry_id,
            vendor,
            reference: None,
            name: None,
            price: None,
            brand: None,
            category: None,
        }
    }

    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Price usable for comparison: present and non-negative.
    #[must_use]
    pub fn comparable_price(&self) -> Option<Decimal> {
        self.price.filter(|p| !p.is_sign_negative())
    }
}

/// A stored row pairing the A-side and B-side listings of one product.
///
/// Either side may be missing entirely. The `*_similarity` and
/// `price_difference` fields are a score cache: they are `None` until a
/// rescore pass fills them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub tunisianet_reference: Option<String>,
    pub tunisianet_name: Option<String>,
    pub tunisianet_price: Option<Decimal>,
    pub mytek_reference: Option<String>,
    pub mytek_name: Option<String>,
    pub mytek_price: Option<Decimal>,
    pub reference_similarity: Option<f64>,
    pub name_similarity: Option<f64>,
    pub average_similarity: Option<f64>,
    pub price_difference: Option<Decimal>,
}

impl CatalogEntry {
    /// The listing `vendor` contributed to this entry.
    ///
    /// Returns `None` when the vendor has neither a reference nor a name.
    #[must_use]
    pub fn record(&self, vendor: Vendor) -> Option<ProductRecord> {
        let (reference, name, price) = match vendor {
            Vendor::Tunisianet => (
                &self.tunisianet_reference,
                &self.tunisianet_name,
                self.tunisianet_price,
            ),
            Vendor::Mytek => (&self.mytek_reference, &self.mytek_name, self.mytek_price),
        };

        let reference = non_blank(reference.as_deref());
        let name = non_blank(name.as_deref());
        if reference.is_none() && name.is_none() {
            return None;
        }

        Some(ProductRecord {
            entry_id: self.id,
            vendor,
            reference,
            name,
            price,
            brand: self.brand.clone(),
            category: self.category.clone(),
        })
    }

    /// Cached `(reference, name, average)` similarity, when all three are stored.
    #[must_use]
    pub fn cached_scores(&self) -> Option<(f64, f64, f64)> {
        Some((
            self.reference_similarity?,
            self.name_similarity?,
            self.average_similarity?,
        ))
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|s| !s.trim().is_empty())
        .map(ToOwned::to_owned)
}

/// A scored pairing of a source record with one candidate from the other catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub source: ProductRecord,
    pub candidate: ProductRecord,
    pub reference_similarity: f64,
    pub name_similarity: f64,
    pub average_similarity: f64,
}

/// Records judged to describe the same physical product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub entry_ids: Vec<i64>,
    pub records: Vec<ProductRecord>,
    /// Highest average similarity among the entries in the group.
    pub average_similarity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BestDeal {
    Tunisianet,
    Mytek,
    Equal,
}

impl BestDeal {
    /// The cheaper vendor, or `None` when prices are equal.
    #[must_use]
    pub fn vendor(self) -> Option<Vendor> {
        match self {
            BestDeal::Tunisianet => Some(Vendor::Tunisianet),
            BestDeal::Mytek => Some(Vendor::Mytek),
            BestDeal::Equal => None,
        }
    }
}

/// Price comparison between the A-side and B-side listing of a matched pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceComparison {
    pub price_a: Decimal,
    pub price_b: Decimal,
    pub average_price: Decimal,
    pub absolute_difference: Decimal,
    /// Difference relative to `average_price`, in percent.
    pub percentage_difference: Decimal,
    pub best_deal: BestDeal,
}

/// A matched pair whose price gap exceeded the anomaly threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAnomaly {
    #[serde(rename = "match")]
    pub matched: MatchCandidate,
    pub comparison: PriceComparison,
}

/// Fresh values for an entry's cached score columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryScores {
    pub id: i64,
    pub reference_similarity: f64,
    pub name_similarity: f64,
    pub average_similarity: f64,
    /// Absolute price gap; `None` unless both prices are usable.
    pub price_difference: Option<Decimal>,
}
