use crate::hosts::{Host, HostTable};
use crate::settings::Category;

/// Resolve a user-typed token to a category.
///
/// Two linear passes over the declared categories: first an exact name
/// match, then alias membership. An exact match is a strictly higher tier
/// than an alias match - a category name always wins over any alias, even
/// one belonging to an earlier-declared category. Within a tier the
/// first-declared category wins, which makes duplicate aliases across
/// categories resolve stably.
pub fn resolve_category<'a>(categories: &'a [Category], token: &str) -> Option<&'a Category> {
    categories
        .iter()
        .find(|c| c.name == token)
        .or_else(|| {
            categories
                .iter()
                .find(|c| c.aliases.iter().any(|a| a == token))
        })
}

/// Resolve a user-typed token to a host within one table.
///
/// Same two-pass policy as [`resolve_category`], scoped to the table:
/// exact host name first, then alias membership, in table order.
pub fn resolve_host<'a>(table: &'a HostTable, token: &str) -> Option<&'a Host> {
    table
        .hosts
        .iter()
        .find(|h| h.name == token)
        .or_else(|| {
            table
                .hosts
                .iter()
                .find(|h| h.aliases.iter().any(|a| a == token))
        })
}
