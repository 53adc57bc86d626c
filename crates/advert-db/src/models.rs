/// Database row type, maps directly to an `advertisements` row.
/// Kept separate from the wire types in advert-types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisementRow {
    pub id: i64,
    pub header: String,
    pub description: String,
    pub user: String,
}
