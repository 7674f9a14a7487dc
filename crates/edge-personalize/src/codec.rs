//! Variant Codec: wire assignment to CMS variant aliases.

/// Prefix of every CMS variant alias.
pub const VARIANT_ALIAS_PREFIX: &str = "cs_personalize";

/// Convert one wire pair (`exp=var`) into its CMS alias
/// (`cs_personalize_exp_var`).
pub fn variant_alias(pair: &str) -> String {
    format!("{}_{}", VARIANT_ALIAS_PREFIX, pair.replace('=', "_"))
}

/// Aliases for every pair in a wire string, in input order.
pub fn variant_aliases(variant_param: Option<&str>) -> Vec<String> {
    variant_param
        .unwrap_or_default()
        .split(',')
        .filter(|segment| !segment.is_empty())
        .map(variant_alias)
        .collect()
}

/// Encode a variant parameter for the content repository.
///
/// `None` and `""` produce `""`, meaning baseline entries.
pub fn to_query_encoding(variant_param: Option<&str>) -> String {
    variant_aliases(variant_param).join(",")
}
