//! Pure watchlist assembly: grouping, dedup, and synthetic index
//! expressions in TradingView syntax.

use crate::models::{CategoryListing, MarketCoin};
use crate::resolver::PairBook;

/// TradingView caps synthetic expressions at 10 referenced symbols.
pub const MAX_INDEX_TERMS: usize = 10;

/// One category's pairs as resolved on a single exchange, market-cap
/// rank order preserved, duplicates removed.
#[derive(Debug, Clone)]
pub struct CategoryPairs {
    pub name: String,
    pub pairs: Vec<String>,
}

/// Projects fetched categories through an exchange's pair book.
/// Categories with no resolvable coin on the exchange are dropped
/// here, so nothing downstream ever sees an empty section.
pub fn resolve_categories(
    fetched: &[(CategoryListing, Vec<MarketCoin>)],
    book: &PairBook,
) -> Vec<CategoryPairs> {
    let mut out = Vec::new();
    for (category, coins) in fetched {
        let mut pairs: Vec<String> = Vec::new();
        for coin in coins {
            if let Some(pair) = book.get(&coin.id) {
                if !pairs.iter().any(|p| p == pair) {
                    pairs.push(pair.to_string());
                }
            }
        }
        if !pairs.is_empty() {
            out.push(CategoryPairs {
                name: category.name.clone(),
                pairs,
            });
        }
    }
    out
}

fn filename(exchange_label: &str, suffix: &str) -> String {
    format!("Narratives - {exchange_label} - {suffix}.txt")
}

/// One file per category: a `###` section header followed by the
/// category's pair references.
pub fn individual_files(
    exchange_label: &str,
    categories: &[CategoryPairs],
) -> Vec<(String, Vec<String>)> {
    categories
        .iter()
        .map(|cat| {
            let mut lines = vec![format!("###{}", cat.name)];
            lines.extend(cat.pairs.iter().cloned());
            (filename(exchange_label, &cat.name), lines)
        })
        .collect()
}

/// One file for the whole exchange, categories concatenated in rank
/// order. Dedup spans the file: a coin in two categories keeps only
/// its first occurrence, and a section left empty by dedup is skipped.
pub fn combined_file(
    exchange_label: &str,
    categories: &[CategoryPairs],
) -> Option<(String, Vec<String>)> {
    let mut lines: Vec<String> = Vec::new();
    let mut seen: Vec<&str> = Vec::new();
    for cat in categories {
        let fresh: Vec<&String> = cat
            .pairs
            .iter()
            .filter(|p| !seen.contains(&p.as_str()))
            .collect();
        if fresh.is_empty() {
            continue;
        }
        lines.push(format!("###{}", cat.name));
        for pair in fresh {
            seen.push(pair.as_str());
            lines.push(pair.clone());
        }
    }
    if lines.is_empty() {
        return None;
    }
    Some((filename(exchange_label, "Combined"), lines))
}

/// Geometric mean of the pairs' prices, TradingView's expression
/// syntax: `(A*B*C)^(1/3)`.
fn index_expression(pairs: &[String]) -> String {
    format!("({})^(1/{})", pairs.join("*"), pairs.len())
}

/// Index entries for one category: pairs chunked to the platform cap,
/// one expression each. A single-pair category yields nothing (the
/// degenerate average is just the asset itself).
fn index_entries(cat: &CategoryPairs) -> Vec<(String, String)> {
    if cat.pairs.len() < 2 {
        return Vec::new();
    }
    let chunks: Vec<&[String]> = cat.pairs.chunks(MAX_INDEX_TERMS).collect();
    let many = chunks.len() > 1;
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let label = if many {
                format!("{} #{}", cat.name, i + 1)
            } else {
                cat.name.clone()
            };
            (label, index_expression(chunk))
        })
        .collect()
}

/// The per-exchange indices file: one `###` section per index entry,
/// sections separated by a blank line. `None` when no category has
/// enough pairs for an index.
pub fn indices_file(
    exchange_label: &str,
    categories: &[CategoryPairs],
) -> Option<(String, Vec<String>)> {
    let mut lines: Vec<String> = Vec::new();
    for cat in categories {
        for (label, expr) in index_entries(cat) {
            lines.push(format!("###{label}"));
            lines.push(expr);
            lines.push(String::new());
        }
    }
    if lines.is_empty() {
        return None;
    }
    Some((filename(exchange_label, "Indices"), lines))
}
