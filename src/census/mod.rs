mod stats;
mod tracts;

pub use stats::ColumnSummary;
pub(crate) use tracts::is_numeric;
pub use tracts::CensusTracts;

/// Total population column name.
pub const TOTAL_POPULATION: &str = "Total Population";
/// Median household income column name.
pub const MEDIAN_INCOME: &str = "Median Household Income";
/// Total housing units column name.
pub const HOUSING_UNITS: &str = "Total Housing Units";
/// Workers 16 and over column name.
pub const WORKERS: &str = "Workers 16 and over";
/// Total units in structure column name.
pub const STRUCTURE_UNITS: &str = "Total Units in Structure";

/// ACS 5-year variable codes and the column names they are renamed to.
pub const ACS_VARIABLES: [(&str, &str); 5] = [
    ("B01003_001E", TOTAL_POPULATION),
    ("B19013_001E", MEDIAN_INCOME),
    ("B25001_001E", HOUSING_UNITS),
    ("B08014_001E", WORKERS),
    ("B25024_001E", STRUCTURE_UNITS),
];
